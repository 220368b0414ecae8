//! Type interning.
//!
//! Structural descriptors are hash-consed: interning the same `TypeData`
//! twice yields the same `TypeId`, so structural equality of two interned
//! descriptors is an integer comparison. Records and objects are nominal and
//! bypass the dedupe table; each declaration gets a fresh id, and its layout
//! can be supplied after the id exists so a record may refer to itself.
//!
//! All methods take `&self`. The interner is shared by reference between
//! threads; a poisoned lock is recovered because every table is append-only.

use crate::types::{
    ArraySize, ArrayType, FunctionShape, FunctionShapeId, IntrinsicKind, LiteralSetId,
    LiteralValue, ObjectShape, ObjectShapeId, RecordShape, RecordShapeId, TypeData, TypeId,
    TypeListId,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rtc_common::{Atom, ShardedInterner};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::trace;

/// Errors raised while supplying the layout of a nominal descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeDefinitionError {
    #[error("type {0:?} was not declared as a record")]
    NotARecord(TypeId),
    #[error("type {0:?} was not declared as an object")]
    NotAnObject(TypeId),
    #[error("type `{name}` is already defined")]
    AlreadyDefined { name: Arc<str> },
    #[error("duplicate field `{field}` in `{name}`")]
    DuplicateField { name: Arc<str>, field: Arc<str> },
    #[error("attached function `{function}` of `{name}` does not have a function type")]
    NotAFunction { name: Arc<str>, function: Arc<str> },
    #[error("special function index {index} is out of range for `{name}`")]
    FunctionIndexOutOfRange { name: Arc<str>, index: usize },
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T: Eq + Hash> SliceInterner<T> {
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }
        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }
        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Arc<[T]> {
        self.items
            .get(id as usize)
            .unwrap_or(&self.items[0])
            .clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T: Eq + Hash> ValueInterner<T> {
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }
        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// Layout slot of a nominal descriptor.
struct NominalSlot<T> {
    shape: Arc<T>,
    defined: bool,
}

/// Owner of every descriptor and its side tables.
pub struct TypeInterner {
    strings: ShardedInterner,
    types: RwLock<Vec<TypeData>>,
    dedupe: DashMap<TypeData, TypeId, FxBuildHasher>,
    /// Sorted member set of a union to the id of its first-declared ordering.
    union_sets: DashMap<Arc<[TypeId]>, TypeId, FxBuildHasher>,
    type_lists: RwLock<SliceInterner<TypeId>>,
    literal_sets: RwLock<SliceInterner<LiteralValue>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    record_shapes: RwLock<Vec<NominalSlot<RecordShape>>>,
    object_shapes: RwLock<Vec<NominalSlot<ObjectShape>>>,
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = TypeInterner {
            strings: ShardedInterner::new(),
            types: RwLock::new(Vec::new()),
            dedupe: DashMap::with_hasher(FxBuildHasher),
            union_sets: DashMap::with_hasher(FxBuildHasher),
            type_lists: RwLock::new(SliceInterner::new()),
            literal_sets: RwLock::new(SliceInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            record_shapes: RwLock::new(Vec::new()),
            object_shapes: RwLock::new(Vec::new()),
        };
        for kind in IntrinsicKind::ALL {
            let id = interner.intern(TypeData::Intrinsic(kind));
            debug_assert_eq!(id, kind.type_id());
        }
        interner
    }

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    pub fn intern_string(&self, s: &str) -> Atom {
        self.strings.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.strings.resolve(atom)
    }

    // -----------------------------------------------------------------------
    // Core table
    // -----------------------------------------------------------------------

    /// Intern a structural descriptor.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.dedupe.get(&data) {
            return *id;
        }
        match self.dedupe.entry(data) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.push(entry.key().clone());
                entry.insert(id);
                id
            }
        }
    }

    /// Append a descriptor without deduplication.
    fn push(&self, data: TypeData) -> TypeId {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        let id = TypeId(types.len() as u32);
        types.push(data);
        id
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0 as usize)
            .cloned()
    }

    /// Number of descriptors, intrinsics included.
    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Side tables
    // -----------------------------------------------------------------------

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        self.type_lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
    }

    pub fn literal_set(&self, id: LiteralSetId) -> Arc<[LiteralValue]> {
        self.literal_sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .unwrap_or_default()
    }

    pub fn record_shape(&self, id: RecordShapeId) -> Arc<RecordShape> {
        self.record_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0 as usize)
            .map(|slot| slot.shape.clone())
            .unwrap_or_default()
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0 as usize)
            .map(|slot| slot.shape.clone())
            .unwrap_or_default()
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().unwrap_or_else(PoisonError::into_inner);
        TypeListId(lists.intern(members))
    }

    // -----------------------------------------------------------------------
    // Structural constructors
    // -----------------------------------------------------------------------

    pub fn map(&self, constraint: TypeId) -> TypeId {
        self.intern(TypeData::Map(constraint))
    }

    pub fn future(&self, constraint: TypeId) -> TypeId {
        self.intern(TypeData::Future(constraint))
    }

    pub fn table(&self, constraint: Option<TypeId>) -> TypeId {
        self.intern(TypeData::Table(constraint))
    }

    /// Open (unsized) array.
    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(ArrayType {
            element,
            size: ArraySize::Open,
        }))
    }

    pub fn fixed_array(&self, element: TypeId, size: u32) -> TypeId {
        self.intern(TypeData::Array(ArrayType {
            element,
            size: ArraySize::Fixed(size),
        }))
    }

    pub fn tuple(&self, members: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(members);
        self.intern(TypeData::Tuple(list))
    }

    /// Union of `members`.
    ///
    /// Duplicates are dropped keeping the first occurrence, and a single
    /// distinct member is returned as-is. Unions over the same member set
    /// share the id of the first ordering that was interned, so
    /// `union([a, b]) == union([b, a])`.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut seen = FxHashSet::default();
        let members: Vec<TypeId> = members.into_iter().filter(|m| seen.insert(*m)).collect();
        if let [single] = members.as_slice() {
            return *single;
        }

        let mut key = members.clone();
        key.sort_unstable();
        let key: Arc<[TypeId]> = key.into();
        if let Some(id) = self.union_sets.get(&key) {
            return *id;
        }
        match self.union_sets.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let list = self.intern_type_list(members);
                let id = self.intern(TypeData::Union(list));
                entry.insert(id);
                id
            }
        }
    }

    /// Finite type over `values`; duplicate literals are dropped.
    pub fn finite(&self, values: Vec<LiteralValue>) -> TypeId {
        let mut seen = FxHashSet::default();
        let values: Vec<LiteralValue> = values
            .into_iter()
            .filter(|value| seen.insert(value.clone()))
            .collect();
        let set = {
            let mut sets = self
                .literal_sets
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            LiteralSetId(sets.intern(values))
        };
        self.intern(TypeData::Finite(set))
    }

    /// Function descriptor; an empty `returns` list means no return value.
    pub fn function(&self, params: Vec<TypeId>, returns: Vec<TypeId>) -> TypeId {
        let shape = {
            let mut shapes = self
                .function_shapes
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            FunctionShapeId(shapes.intern(FunctionShape { params, returns }))
        };
        self.intern(TypeData::Function(shape))
    }

    // -----------------------------------------------------------------------
    // Nominal descriptors
    // -----------------------------------------------------------------------

    /// Reserve a record id named `name`, to be filled in by `define_record`.
    ///
    /// Until defined, the record is sealed and has no fields.
    pub fn declare_record(&self, name: &str) -> TypeId {
        let placeholder = RecordShape::new(self.intern_string(name), Atom::NONE);
        let shape = {
            let mut shapes = self
                .record_shapes
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let id = RecordShapeId(shapes.len() as u32);
            shapes.push(NominalSlot {
                shape: Arc::new(placeholder),
                defined: false,
            });
            id
        };
        let id = self.push(TypeData::Record(shape));
        trace!(type_id = id.0, name, "declared record");
        id
    }

    /// Supply the layout of a declared record.
    ///
    /// The stored shape is normalized: a sealed record carries no rest type and
    /// an open record without one is bounded by `any`.
    pub fn define_record(
        &self,
        id: TypeId,
        mut shape: RecordShape,
    ) -> Result<(), TypeDefinitionError> {
        let Some(TypeData::Record(shape_id)) = self.lookup(id) else {
            return Err(TypeDefinitionError::NotARecord(id));
        };
        let name = self.resolve_atom(shape.name);
        self.check_unique_fields(&name, shape.fields.iter().map(|f| f.name))?;
        shape.rest_field_type = if shape.sealed {
            None
        } else {
            Some(shape.rest_type())
        };

        let mut shapes = self
            .record_shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = shapes
            .get_mut(shape_id.0 as usize)
            .ok_or(TypeDefinitionError::NotARecord(id))?;
        if slot.defined {
            return Err(TypeDefinitionError::AlreadyDefined { name });
        }
        slot.shape = Arc::new(shape);
        slot.defined = true;
        Ok(())
    }

    /// Declare and define a record in one step.
    pub fn record(&self, shape: RecordShape) -> Result<TypeId, TypeDefinitionError> {
        let id = self.declare_record(&self.resolve_atom(shape.name));
        self.define_record(id, shape)?;
        Ok(id)
    }

    /// Reserve an object id named `name`, to be filled in by `define_object`.
    pub fn declare_object(&self, name: &str) -> TypeId {
        let placeholder = ObjectShape::new(self.intern_string(name), Atom::NONE);
        let shape = {
            let mut shapes = self
                .object_shapes
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let id = ObjectShapeId(shapes.len() as u32);
            shapes.push(NominalSlot {
                shape: Arc::new(placeholder),
                defined: false,
            });
            id
        };
        let id = self.push(TypeData::Object(shape));
        trace!(type_id = id.0, name, "declared object");
        id
    }

    /// Supply the layout of a declared object.
    ///
    /// Attached functions must reference function descriptors, and the
    /// initializer indices must point into `attached_functions`.
    pub fn define_object(&self, id: TypeId, shape: ObjectShape) -> Result<(), TypeDefinitionError> {
        let Some(TypeData::Object(shape_id)) = self.lookup(id) else {
            return Err(TypeDefinitionError::NotAnObject(id));
        };
        let name = self.resolve_atom(shape.name);
        self.check_unique_fields(&name, shape.fields.iter().map(|f| f.name))?;

        for function in &shape.attached_functions {
            if !matches!(self.lookup(function.type_id), Some(TypeData::Function(_))) {
                return Err(TypeDefinitionError::NotAFunction {
                    name,
                    function: self.resolve_atom(function.name),
                });
            }
        }
        for index in [shape.initializer, shape.defaults_initializer]
            .into_iter()
            .flatten()
        {
            if index >= shape.attached_functions.len() {
                return Err(TypeDefinitionError::FunctionIndexOutOfRange { name, index });
            }
        }

        let mut shapes = self
            .object_shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = shapes
            .get_mut(shape_id.0 as usize)
            .ok_or(TypeDefinitionError::NotAnObject(id))?;
        if slot.defined {
            return Err(TypeDefinitionError::AlreadyDefined { name });
        }
        slot.shape = Arc::new(shape);
        slot.defined = true;
        Ok(())
    }

    /// Declare and define an object in one step.
    pub fn object(&self, shape: ObjectShape) -> Result<TypeId, TypeDefinitionError> {
        let id = self.declare_object(&self.resolve_atom(shape.name));
        self.define_object(id, shape)?;
        Ok(id)
    }

    fn check_unique_fields(
        &self,
        name: &Arc<str>,
        fields: impl Iterator<Item = Atom>,
    ) -> Result<(), TypeDefinitionError> {
        let mut seen = FxHashSet::default();
        for field in fields {
            if !seen.insert(field) {
                return Err(TypeDefinitionError::DuplicateField {
                    name: name.clone(),
                    field: self.resolve_atom(field),
                });
            }
        }
        Ok(())
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
