//! Runtime values and the heap that owns containers.
//!
//! Simple values are stored inline in `Value`. Containers (records, objects,
//! maps, arrays, tuples) live in a `ValueHeap` and are referenced through
//! `Value::Ref`, so a container may contain itself. Every container records
//! the descriptor it was created with and a frozen flag; freezing is deep and
//! can never be undone.

use crate::db::TypeDatabase;
use crate::types::{ArraySize, LiteralValue, OrderedFloat, TypeData, TypeId};
use indexmap::IndexMap;
use rtc_common::Atom;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Handle to a container in a `ValueHeap`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(pub(crate) u32);

impl RefId {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(Arc<str>),
    Boolean(bool),
    Byte(u8),
    Ref(RefId),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    #[inline]
    pub fn as_ref_id(&self) -> Option<RefId> {
        match self {
            Value::Ref(r) => Some(*r),
            _ => None,
        }
    }

    /// The descriptor of a simple value; `None` for containers.
    pub fn simple_type(&self) -> Option<TypeId> {
        Some(match self {
            Value::Null => TypeId::NULL,
            Value::Int(_) => TypeId::INT,
            Value::Float(_) => TypeId::FLOAT,
            Value::Decimal(_) => TypeId::DECIMAL,
            Value::String(_) => TypeId::STRING,
            Value::Boolean(_) => TypeId::BOOLEAN,
            Value::Byte(_) => TypeId::BYTE,
            Value::Ref(_) => return None,
        })
    }

    /// The literal a simple value denotes; `None` for containers.
    pub fn as_literal(&self) -> Option<LiteralValue> {
        Some(match self {
            Value::Null => LiteralValue::Null,
            Value::Int(v) => LiteralValue::Int(*v),
            Value::Float(v) => LiteralValue::Float(OrderedFloat(*v)),
            Value::Decimal(v) => LiteralValue::Decimal(*v),
            Value::String(v) => LiteralValue::String(v.clone()),
            Value::Boolean(v) => LiteralValue::Boolean(*v),
            Value::Byte(v) => LiteralValue::Byte(*v),
            Value::Ref(_) => return None,
        })
    }
}

impl From<LiteralValue> for Value {
    fn from(literal: LiteralValue) -> Self {
        match literal {
            LiteralValue::Null => Value::Null,
            LiteralValue::Int(v) => Value::Int(v),
            LiteralValue::Float(v) => Value::Float(v.0),
            LiteralValue::Decimal(v) => Value::Decimal(v),
            LiteralValue::String(v) => Value::String(v),
            LiteralValue::Boolean(v) => Value::Boolean(v),
            LiteralValue::Byte(v) => Value::Byte(v),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "()"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Decimal(v) => write!(f, "{v}d"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}b"),
            Value::Ref(r) => write!(f, "ref#{}", r.0),
        }
    }
}

impl PartialEq for Value {
    /// Containers compare by identity; floats compare bitwise.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Runtime shape of a container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Record,
    Object,
    Map,
    Array,
    Tuple,
}

#[derive(Clone, Debug)]
enum HeapData {
    Mapping(IndexMap<Atom, Value>),
    Sequence(Vec<Value>),
}

/// A heap-allocated container.
#[derive(Clone, Debug)]
pub struct HeapObject {
    type_id: TypeId,
    kind: ContainerKind,
    frozen: bool,
    fixed_length: bool,
    data: HeapData,
}

impl HeapObject {
    /// The descriptor the container was created with.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Entries of a keyed container, in insertion order.
    pub fn entries(&self) -> Option<&IndexMap<Atom, Value>> {
        match &self.data {
            HeapData::Mapping(entries) => Some(entries),
            HeapData::Sequence(_) => None,
        }
    }

    /// Elements of an array or tuple.
    pub fn elements(&self) -> Option<&[Value]> {
        match &self.data {
            HeapData::Mapping(_) => None,
            HeapData::Sequence(elements) => Some(elements),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            HeapData::Mapping(entries) => entries.len(),
            HeapData::Sequence(elements) => elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn children(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match &self.data {
            HeapData::Mapping(entries) => Box::new(entries.values()),
            HeapData::Sequence(elements) => Box::new(elements.iter()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("reference {0:?} does not point into this heap")]
    DanglingRef(RefId),
    #[error("cannot mutate frozen value {0:?}")]
    Frozen(RefId),
    #[error("type {type_id:?} cannot describe a {expected:?} container")]
    KindMismatch {
        type_id: TypeId,
        expected: ContainerKind,
    },
    #[error("{ref_id:?} is not a {expected} container")]
    WrongContainer {
        ref_id: RefId,
        expected: &'static str,
    },
    #[error("cannot change the length of fixed-length value {0:?}")]
    FixedLength(RefId),
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Read access to containers, as needed by the checkers.
pub trait ValueStore {
    fn object(&self, r: RefId) -> Option<&HeapObject>;
}

/// The runtime descriptor of `value`.
///
/// Simple values map to their intrinsic descriptor; containers answer the
/// descriptor they were created with. A dangling reference has no type.
pub fn type_of(value: &Value, store: &dyn ValueStore) -> Option<TypeId> {
    match value {
        Value::Ref(r) => store.object(*r).map(HeapObject::type_id),
        simple => simple.simple_type(),
    }
}

/// Whether `value` can still be changed after creation.
///
/// Simple values never can; containers can until frozen.
pub fn is_mutable(value: &Value, store: &dyn ValueStore) -> bool {
    match value {
        Value::Ref(r) => store.object(*r).is_some_and(|object| !object.is_frozen()),
        _ => false,
    }
}

/// Arena of containers addressed by `RefId`.
#[derive(Default, Debug)]
pub struct ValueHeap {
    objects: Vec<HeapObject>,
}

impl ValueStore for ValueHeap {
    fn object(&self, r: RefId) -> Option<&HeapObject> {
        self.objects.get(r.0 as usize)
    }
}

impl ValueHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, r: RefId) -> Option<&HeapObject> {
        self.objects.get(r.0 as usize)
    }

    fn alloc(&mut self, object: HeapObject) -> Value {
        let r = RefId(self.objects.len() as u32);
        self.objects.push(object);
        Value::Ref(r)
    }

    /// Allocate a record or object value of the record/object type `type_id`.
    pub fn alloc_record(
        &mut self,
        db: &dyn TypeDatabase,
        type_id: TypeId,
        entries: impl IntoIterator<Item = (Atom, Value)>,
    ) -> Result<Value, ValueError> {
        let kind = match db.lookup(type_id) {
            Some(TypeData::Record(_)) => ContainerKind::Record,
            Some(TypeData::Object(_)) => ContainerKind::Object,
            _ => {
                return Err(ValueError::KindMismatch {
                    type_id,
                    expected: ContainerKind::Record,
                });
            }
        };
        Ok(self.alloc(HeapObject {
            type_id,
            kind,
            frozen: false,
            fixed_length: false,
            data: HeapData::Mapping(entries.into_iter().collect()),
        }))
    }

    /// Allocate a map value of a `map<T>` or `json` type.
    pub fn alloc_map(
        &mut self,
        db: &dyn TypeDatabase,
        type_id: TypeId,
        entries: impl IntoIterator<Item = (Atom, Value)>,
    ) -> Result<Value, ValueError> {
        if !matches!(db.lookup(type_id), Some(TypeData::Map(_))) && type_id != TypeId::JSON {
            return Err(ValueError::KindMismatch {
                type_id,
                expected: ContainerKind::Map,
            });
        }
        Ok(self.alloc(HeapObject {
            type_id,
            kind: ContainerKind::Map,
            frozen: false,
            fixed_length: false,
            data: HeapData::Mapping(entries.into_iter().collect()),
        }))
    }

    /// Allocate an array value. A fixed-size array type requires exactly
    /// that many elements and keeps its length afterwards.
    pub fn alloc_array(
        &mut self,
        db: &dyn TypeDatabase,
        type_id: TypeId,
        elements: Vec<Value>,
    ) -> Result<Value, ValueError> {
        let Some(TypeData::Array(array)) = db.lookup(type_id) else {
            return Err(ValueError::KindMismatch {
                type_id,
                expected: ContainerKind::Array,
            });
        };
        let fixed_length = match array.size {
            ArraySize::Fixed(size) if size as usize != elements.len() => {
                return Err(ValueError::LengthMismatch {
                    expected: size as usize,
                    found: elements.len(),
                });
            }
            ArraySize::Fixed(_) => true,
            ArraySize::Open => false,
        };
        Ok(self.alloc(HeapObject {
            type_id,
            kind: ContainerKind::Array,
            frozen: false,
            fixed_length,
            data: HeapData::Sequence(elements),
        }))
    }

    /// Allocate a tuple value; the element count must match the arity.
    pub fn alloc_tuple(
        &mut self,
        db: &dyn TypeDatabase,
        type_id: TypeId,
        elements: Vec<Value>,
    ) -> Result<Value, ValueError> {
        let Some(TypeData::Tuple(list)) = db.lookup(type_id) else {
            return Err(ValueError::KindMismatch {
                type_id,
                expected: ContainerKind::Tuple,
            });
        };
        let arity = db.type_list(list).len();
        if arity != elements.len() {
            return Err(ValueError::LengthMismatch {
                expected: arity,
                found: elements.len(),
            });
        }
        Ok(self.alloc(HeapObject {
            type_id,
            kind: ContainerKind::Tuple,
            frozen: false,
            fixed_length: true,
            data: HeapData::Sequence(elements),
        }))
    }

    fn get_mut_unfrozen(&mut self, r: RefId) -> Result<&mut HeapObject, ValueError> {
        let object = self
            .objects
            .get_mut(r.0 as usize)
            .ok_or(ValueError::DanglingRef(r))?;
        if object.frozen {
            return Err(ValueError::Frozen(r));
        }
        Ok(object)
    }

    fn mapping_mut(&mut self, r: RefId) -> Result<&mut IndexMap<Atom, Value>, ValueError> {
        match &mut self.get_mut_unfrozen(r)?.data {
            HeapData::Mapping(entries) => Ok(entries),
            HeapData::Sequence(_) => Err(ValueError::WrongContainer {
                ref_id: r,
                expected: "keyed",
            }),
        }
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn set_entry(
        &mut self,
        r: RefId,
        key: Atom,
        value: Value,
    ) -> Result<Option<Value>, ValueError> {
        Ok(self.mapping_mut(r)?.insert(key, value))
    }

    /// Remove an entry, keeping the order of the remaining ones.
    pub fn remove_entry(&mut self, r: RefId, key: Atom) -> Result<Option<Value>, ValueError> {
        Ok(self.mapping_mut(r)?.shift_remove(&key))
    }

    /// Append to an open array.
    pub fn push(&mut self, r: RefId, value: Value) -> Result<(), ValueError> {
        let object = self.get_mut_unfrozen(r)?;
        if object.fixed_length {
            return Err(ValueError::FixedLength(r));
        }
        match &mut object.data {
            HeapData::Sequence(elements) => {
                elements.push(value);
                Ok(())
            }
            HeapData::Mapping(_) => Err(ValueError::WrongContainer {
                ref_id: r,
                expected: "sequence",
            }),
        }
    }

    /// Replace the element at `index`.
    pub fn set_element(&mut self, r: RefId, index: usize, value: Value) -> Result<(), ValueError> {
        match &mut self.get_mut_unfrozen(r)?.data {
            HeapData::Sequence(elements) => {
                let len = elements.len();
                let slot = elements
                    .get_mut(index)
                    .ok_or(ValueError::IndexOutOfBounds { index, len })?;
                *slot = value;
                Ok(())
            }
            HeapData::Mapping(_) => Err(ValueError::WrongContainer {
                ref_id: r,
                expected: "sequence",
            }),
        }
    }

    /// Freeze `value` and every container reachable from it.
    ///
    /// Simple values are already immutable, so freezing them does nothing.
    pub fn freeze(&mut self, value: &Value) -> Result<(), ValueError> {
        let Some(root) = value.as_ref_id() else {
            return Ok(());
        };
        let mut pending = vec![root];
        while let Some(r) = pending.pop() {
            let object = self
                .objects
                .get_mut(r.0 as usize)
                .ok_or(ValueError::DanglingRef(r))?;
            if object.frozen {
                continue;
            }
            object.frozen = true;
            pending.extend(object.children().filter_map(Value::as_ref_id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/values_tests.rs"]
mod tests;
