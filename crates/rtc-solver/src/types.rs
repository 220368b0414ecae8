//! Type descriptor model.
//!
//! Descriptors are represented as `TypeData` values interned into a
//! `TypeInterner` and addressed by `TypeId`. Compound payloads (member lists,
//! value spaces, signatures, record and object layouts) live in side tables
//! and are referenced by their own small ids, so `TypeData` stays `Copy`-cheap
//! to clone, hash and compare.
//!
//! Structural descriptors are hash-consed: two structurally equal descriptors
//! share one `TypeId`. Records and objects are nominal: every declaration gets
//! a fresh id, which is what lets a record refer to itself.

use bitflags::bitflags;
use rtc_common::Atom;
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Handle to an interned type descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NULL: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const FLOAT: TypeId = TypeId(2);
    pub const DECIMAL: TypeId = TypeId(3);
    pub const STRING: TypeId = TypeId(4);
    pub const BOOLEAN: TypeId = TypeId(5);
    pub const BYTE: TypeId = TypeId(6);
    pub const XML: TypeId = TypeId(7);
    pub const SERVICE: TypeId = TypeId(8);
    pub const JSON: TypeId = TypeId(9);
    pub const ANY: TypeId = TypeId(10);
    pub const ANYDATA: TypeId = TypeId(11);

    /// First id handed out for a non-intrinsic descriptor.
    pub const FIRST_USER: u32 = 12;
}

/// The built-in (payload-free) descriptor kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Null,
    Int,
    Float,
    Decimal,
    String,
    Boolean,
    Byte,
    Xml,
    Service,
    Json,
    Any,
    Anydata,
}

impl IntrinsicKind {
    /// All intrinsic kinds in `TypeId` order.
    pub const ALL: [IntrinsicKind; 12] = [
        IntrinsicKind::Null,
        IntrinsicKind::Int,
        IntrinsicKind::Float,
        IntrinsicKind::Decimal,
        IntrinsicKind::String,
        IntrinsicKind::Boolean,
        IntrinsicKind::Byte,
        IntrinsicKind::Xml,
        IntrinsicKind::Service,
        IntrinsicKind::Json,
        IntrinsicKind::Any,
        IntrinsicKind::Anydata,
    ];

    pub const fn type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Int => TypeId::INT,
            IntrinsicKind::Float => TypeId::FLOAT,
            IntrinsicKind::Decimal => TypeId::DECIMAL,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
            IntrinsicKind::Byte => TypeId::BYTE,
            IntrinsicKind::Xml => TypeId::XML,
            IntrinsicKind::Service => TypeId::SERVICE,
            IntrinsicKind::Json => TypeId::JSON,
            IntrinsicKind::Any => TypeId::ANY,
            IntrinsicKind::Anydata => TypeId::ANYDATA,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Null => "()",
            IntrinsicKind::Int => "int",
            IntrinsicKind::Float => "float",
            IntrinsicKind::Decimal => "decimal",
            IntrinsicKind::String => "string",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Byte => "byte",
            IntrinsicKind::Xml => "xml",
            IntrinsicKind::Service => "service",
            IntrinsicKind::Json => "json",
            IntrinsicKind::Any => "any",
            IntrinsicKind::Anydata => "anydata",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LiteralSetId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

/// Size state of an array descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArraySize {
    Open,
    Fixed(u32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub element: TypeId,
    pub size: ArraySize,
}

/// A type descriptor.
///
/// Constrained containers store the constraint inline; everything with a
/// variable-length payload stores an id into the interner's side tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    /// `map<T>`
    Map(TypeId),
    /// `future<T>`
    Future(TypeId),
    /// `table<T>`; `None` for a table whose constraint is unknown.
    Table(Option<TypeId>),
    Array(ArrayType),
    /// Fixed-arity tuple, members in declaration order.
    Tuple(TypeListId),
    /// Union, members deduplicated in first-declared order.
    Union(TypeListId),
    /// Finite type over a set of literal values.
    Finite(LiteralSetId),
    Function(FunctionShapeId),
    Record(RecordShapeId),
    Object(ObjectShapeId),
}

bitflags! {
    /// Flags carried by record and object fields and attached functions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u8 {
        const OPTIONAL = 1 << 0;
        const PUBLIC = 1 << 1;
    }
}

bitflags! {
    /// Flags carried by record and object descriptors.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        const PUBLIC = 1 << 0;
    }
}

/// A record or object field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub flags: MemberFlags,
}

impl FieldInfo {
    /// A required, non-public field.
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        FieldInfo {
            name,
            type_id,
            flags: MemberFlags::empty(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.flags |= MemberFlags::OPTIONAL;
        self
    }

    pub fn public(mut self) -> Self {
        self.flags |= MemberFlags::PUBLIC;
        self
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.flags.contains(MemberFlags::OPTIONAL)
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }
}

/// A function attached to an object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttachedFunction {
    pub name: Atom,
    /// Must reference a `TypeData::Function` descriptor.
    pub type_id: TypeId,
    pub flags: MemberFlags,
}

impl AttachedFunction {
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        AttachedFunction {
            name,
            type_id,
            flags: MemberFlags::empty(),
        }
    }

    pub fn public(mut self) -> Self {
        self.flags |= MemberFlags::PUBLIC;
        self
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }
}

/// Parameter and return lists of a function descriptor.
///
/// An empty `returns` list means the function returns nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<TypeId>,
    pub returns: Vec<TypeId>,
}

/// Layout of a record descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordShape {
    pub name: Atom,
    pub package: Atom,
    pub flags: TypeFlags,
    pub fields: Vec<FieldInfo>,
    pub sealed: bool,
    /// Bound for undeclared fields; only meaningful when `sealed` is false.
    pub rest_field_type: Option<TypeId>,
}

impl RecordShape {
    /// A sealed record with no fields.
    pub fn new(name: Atom, package: Atom) -> Self {
        RecordShape {
            name,
            package,
            flags: TypeFlags::empty(),
            fields: Vec::new(),
            sealed: true,
            rest_field_type: None,
        }
    }

    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    /// Open the record, bounding undeclared fields by `rest`.
    pub fn open(mut self, rest: TypeId) -> Self {
        self.sealed = false;
        self.rest_field_type = Some(rest);
        self
    }

    pub fn public(mut self) -> Self {
        self.flags |= TypeFlags::PUBLIC;
        self
    }

    pub fn find_field(&self, name: Atom) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Rest field type, `any` when an open record left it unconstrained.
    #[inline]
    pub fn rest_type(&self) -> TypeId {
        self.rest_field_type.unwrap_or(TypeId::ANY)
    }
}

/// Layout of an object descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectShape {
    pub name: Atom,
    pub package: Atom,
    pub flags: TypeFlags,
    pub fields: Vec<FieldInfo>,
    pub attached_functions: Vec<AttachedFunction>,
    /// Index of the constructor in `attached_functions`.
    pub initializer: Option<usize>,
    /// Index of the field-defaults initializer in `attached_functions`.
    pub defaults_initializer: Option<usize>,
}

impl ObjectShape {
    pub fn new(name: Atom, package: Atom) -> Self {
        ObjectShape {
            name,
            package,
            ..ObjectShape::default()
        }
    }

    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn function(mut self, function: AttachedFunction) -> Self {
        self.attached_functions.push(function);
        self
    }

    pub fn initializer(mut self, function: AttachedFunction) -> Self {
        self.initializer = Some(self.attached_functions.len());
        self.attached_functions.push(function);
        self
    }

    pub fn defaults_initializer(mut self, function: AttachedFunction) -> Self {
        self.defaults_initializer = Some(self.attached_functions.len());
        self.attached_functions.push(function);
        self
    }

    pub fn public(mut self) -> Self {
        self.flags |= TypeFlags::PUBLIC;
        self
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(TypeFlags::PUBLIC)
    }

    pub fn find_field(&self, name: Atom) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Attached functions that form the externally visible contract, i.e.
    /// everything except the initializer and the defaults initializer.
    pub fn contract_functions(&self) -> impl Iterator<Item = &AttachedFunction> + '_ {
        self.attached_functions
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                Some(*index) != self.initializer && Some(*index) != self.defaults_initializer
            })
            .map(|(_, function)| function)
    }
}

/// A record-shaped descriptor: the common view of records and objects used
/// by nominal object equivalency.
#[derive(Clone, Debug)]
pub enum Structure {
    Record(Arc<RecordShape>),
    Object(Arc<ObjectShape>),
}

impl Structure {
    pub fn name(&self) -> Atom {
        match self {
            Structure::Record(shape) => shape.name,
            Structure::Object(shape) => shape.name,
        }
    }

    pub fn package(&self) -> Atom {
        match self {
            Structure::Record(shape) => shape.package,
            Structure::Object(shape) => shape.package,
        }
    }

    pub fn flags(&self) -> TypeFlags {
        match self {
            Structure::Record(shape) => shape.flags,
            Structure::Object(shape) => shape.flags,
        }
    }

    pub fn fields(&self) -> &[FieldInfo] {
        match self {
            Structure::Record(shape) => &shape.fields,
            Structure::Object(shape) => &shape.fields,
        }
    }

    /// Records carry no attached functions.
    pub fn attached_functions(&self) -> &[AttachedFunction] {
        match self {
            Structure::Record(_) => &[],
            Structure::Object(shape) => &shape.attached_functions,
        }
    }

    pub fn find_field(&self, name: Atom) -> Option<&FieldInfo> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// `f64` with bitwise equality and hashing, so float literals can live in
/// hashed value spaces. `NaN` equals itself; `0.0` and `-0.0` differ.
#[derive(Clone, Copy, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// A literal value, as found in the value space of a finite type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Null,
    Int(i64),
    Float(OrderedFloat),
    Decimal(Decimal),
    String(Arc<str>),
    Boolean(bool),
    Byte(u8),
}

impl LiteralValue {
    /// The dynamic type of the literal.
    pub fn type_id(&self) -> TypeId {
        match self {
            LiteralValue::Null => TypeId::NULL,
            LiteralValue::Int(_) => TypeId::INT,
            LiteralValue::Float(_) => TypeId::FLOAT,
            LiteralValue::Decimal(_) => TypeId::DECIMAL,
            LiteralValue::String(_) => TypeId::STRING,
            LiteralValue::Boolean(_) => TypeId::BOOLEAN,
            LiteralValue::Byte(_) => TypeId::BYTE,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => write!(f, "()"),
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Float(v) => write!(f, "{:?}", v.0),
            LiteralValue::Decimal(v) => write!(f, "{v}d"),
            LiteralValue::String(v) => write!(f, "{v:?}"),
            LiteralValue::Boolean(v) => write!(f, "{v}"),
            LiteralValue::Byte(v) => write!(f, "{v}"),
        }
    }
}
