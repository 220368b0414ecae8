//! Runtime type-compatibility solver.
//!
//! Decides, over interned type descriptors and live runtime values:
//!
//! - **is-type**: structural subtyping between two descriptors
//! - **is-like-type**: whether a value's current contents fit a descriptor
//! - **is-same-type**: invariant descriptor equality
//! - **object equivalency**: nominal, visibility-scoped object matching
//!
//! Every answer is a plain `bool`; a failed relation is never an error.
//! Recursive descriptor and value graphs terminate through a call-scoped
//! cycle guard with coinductive semantics.
mod db;
mod diagnostics;
mod format;
pub mod identity;
mod intern;
pub mod objects;
mod query_trace;
pub mod recursion;
pub mod relation_queries;
pub mod shape;
mod subtype;
mod subtype_explain;
mod subtype_rules;
pub mod type_queries;
pub mod types;
pub mod values;

pub use db::TypeDatabase;
pub use diagnostics::SubtypeFailureReason;
pub use format::TypeFormatter;
pub use identity::is_same_type;
pub use intern::{TypeDefinitionError, TypeInterner};
pub use objects::object_equivalent;
pub use relation_queries::{
    RelationKind, RelationPolicy, RelationQuery, RelationResult, check_is_like_type,
    check_is_type, query_relation,
};
pub use shape::{ShapeChecker, is_like_type};
pub use subtype::{SubtypeChecker, SubtypeResult, is_type};
pub use subtype_explain::explain_failure;
pub use types::{
    ArraySize, ArrayType, AttachedFunction, FieldInfo, FunctionShape, IntrinsicKind, LiteralValue,
    MemberFlags, ObjectShape, OrderedFloat, RecordShape, Structure, TypeData, TypeFlags, TypeId,
};
pub use values::{
    ContainerKind, HeapObject, RefId, Value, ValueError, ValueHeap, ValueStore, is_mutable,
    type_of,
};

pub use rtc_common::Atom;
