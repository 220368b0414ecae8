//! Type database abstraction for the checkers.
//!
//! The checkers only ever read descriptors, so they take a `&dyn TypeDatabase`
//! rather than the concrete interner. A runtime that keeps its descriptors in
//! another store can answer these queries directly.

use crate::intern::TypeInterner;
use crate::types::{
    FunctionShape, FunctionShapeId, LiteralSetId, LiteralValue, ObjectShape, ObjectShapeId,
    RecordShape, RecordShapeId, TypeData, TypeId, TypeListId,
};
use rtc_common::Atom;
use std::sync::Arc;

/// Read-only query interface over interned descriptors.
///
/// Unknown ids never panic: `lookup` answers `None` and the side-table
/// accessors answer an empty payload.
pub trait TypeDatabase {
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn literal_set(&self, id: LiteralSetId) -> Arc<[LiteralValue]>;
    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape>;
    fn record_shape(&self, id: RecordShapeId) -> Arc<RecordShape>;
    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape>;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        TypeInterner::lookup(self, id)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        TypeInterner::type_list(self, id)
    }

    fn literal_set(&self, id: LiteralSetId) -> Arc<[LiteralValue]> {
        TypeInterner::literal_set(self, id)
    }

    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        TypeInterner::function_shape(self, id)
    }

    fn record_shape(&self, id: RecordShapeId) -> Arc<RecordShape> {
        TypeInterner::record_shape(self, id)
    }

    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        TypeInterner::object_shape(self, id)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom(self, atom)
    }
}
