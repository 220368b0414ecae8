//! Lookups shared by object equivalency and the explainer.

use crate::db::TypeDatabase;
use crate::types::{FunctionShape, Structure, TypeData, TypeId};
use std::sync::Arc;

pub fn function_shape(db: &dyn TypeDatabase, id: TypeId) -> Option<Arc<FunctionShape>> {
    match db.lookup(id) {
        Some(TypeData::Function(shape)) => Some(db.function_shape(shape)),
        _ => None,
    }
}

/// Record-shaped view of a record or object descriptor.
pub fn structure(db: &dyn TypeDatabase, id: TypeId) -> Option<Structure> {
    match db.lookup(id) {
        Some(TypeData::Record(shape)) => Some(Structure::Record(db.record_shape(shape))),
        Some(TypeData::Object(shape)) => Some(Structure::Object(db.object_shape(shape))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::types::{ObjectShape, RecordShape};
    use rtc_common::Atom;

    #[test]
    fn structure_covers_records_and_objects() {
        let interner = TypeInterner::new();
        let record = interner
            .record(RecordShape::new(interner.intern_string("R"), Atom::NONE))
            .unwrap();
        let object = interner
            .object(ObjectShape::new(interner.intern_string("O"), Atom::NONE).public())
            .unwrap();
        assert!(matches!(structure(&interner, record), Some(Structure::Record(_))));
        let Some(view) = structure(&interner, object) else {
            panic!("expected an object view");
        };
        assert_eq!(&*interner.resolve_atom(view.name()), "O");
        assert!(view.attached_functions().is_empty());
        assert!(structure(&interner, TypeId::INT).is_none());
    }

    #[test]
    fn function_shape_only_for_functions() {
        let interner = TypeInterner::new();
        let f = interner.function(vec![TypeId::INT], vec![]);
        assert_eq!(
            function_shape(&interner, f).map(|shape| shape.params.clone()),
            Some(vec![TypeId::INT])
        );
        assert!(function_shape(&interner, TypeId::INT).is_none());
    }
}
