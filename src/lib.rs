//! Runtime type-compatibility engine.
//!
//! Re-exports the solver and common crates under one name for hosts that
//! embed the engine, plus the environment-driven tracing setup.

pub use rtc_common::{Atom, ShardedInterner, limits};

pub use rtc_solver::identity;
pub use rtc_solver::objects;
pub use rtc_solver::recursion;
pub use rtc_solver::relation_queries;
pub use rtc_solver::shape;
pub use rtc_solver::type_queries;
pub use rtc_solver::types;
pub use rtc_solver::values;

pub use rtc_solver::{
    ArraySize, ArrayType, AttachedFunction, ContainerKind, FieldInfo, FunctionShape, HeapObject,
    IntrinsicKind, LiteralValue, MemberFlags, ObjectShape, OrderedFloat, RecordShape, RefId,
    RelationKind, RelationPolicy, RelationQuery, RelationResult, ShapeChecker, Structure,
    SubtypeChecker, SubtypeFailureReason, SubtypeResult, TypeData, TypeDatabase,
    TypeDefinitionError, TypeFlags, TypeFormatter, TypeId, TypeInterner, Value, ValueError,
    ValueHeap, ValueStore, check_is_like_type, check_is_type, explain_failure, is_like_type,
    is_mutable, is_same_type, is_type, object_equivalent, query_relation, type_of,
};

pub mod tracing_config;
