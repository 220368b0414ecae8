//! Nominal object equivalency.
//!
//! Decides whether a record-shaped descriptor (a record or an object)
//! satisfies the surface of an object type. Visibility must agree, private
//! types must come from the same package, and every member is compared with
//! invariant `is-same-type`. A public target further demands that the whole
//! surface on both sides is public.

use crate::db::TypeDatabase;
use crate::identity::{is_same_type, same_type_lists};
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::type_queries;
use crate::types::{
    AttachedFunction, ObjectShape, ObjectShapeId, Structure, TypeData, TypeFlags, TypeId,
};
use tracing::trace;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_object_equivalency(
        &mut self,
        source: TypeId,
        target: TypeId,
        target_shape: ObjectShapeId,
    ) -> SubtypeResult {
        let Some(source_structure) = type_queries::structure(self.interner, source) else {
            return SubtypeResult::False;
        };
        let target_shape = self.interner.object_shape(target_shape);
        self.guarded(source, target, |this| {
            objects_equivalent(this.interner, &source_structure, &target_shape).into()
        })
    }
}

/// Whether `source` satisfies the object type `target`.
///
/// Answers false when `target` is not an object descriptor or `source` is
/// not record-shaped.
pub fn object_equivalent(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    if source == target {
        return true;
    }
    if !matches!(db.lookup(target), Some(TypeData::Object(_))) {
        return false;
    }
    SubtypeChecker::new(db).is_type(source, target)
}

fn objects_equivalent(db: &dyn TypeDatabase, source: &Structure, target: &ObjectShape) -> bool {
    if (source.flags() ^ target.flags).contains(TypeFlags::PUBLIC) {
        trace!("object visibility differs");
        return false;
    }
    if !target.is_public() && source.package() != target.package {
        trace!("private object from another package");
        return false;
    }
    if target.fields.len() > source.fields().len()
        || target.contract_functions().count() > source.attached_functions().len()
    {
        return false;
    }

    if target.is_public() {
        public_objects_equivalent(db, source, target)
    } else {
        private_objects_equivalent(db, source, target)
    }
}

fn private_objects_equivalent(db: &dyn TypeDatabase, source: &Structure, target: &ObjectShape) -> bool {
    for target_field in &target.fields {
        let Some(source_field) = source.find_field(target_field.name) else {
            return false;
        };
        if !is_same_type(db, source_field.type_id, target_field.type_id) {
            return false;
        }
    }

    target.contract_functions().all(|target_fn| {
        matching_invokable_type(db, source.attached_functions(), target_fn).is_some()
    })
}

fn public_objects_equivalent(db: &dyn TypeDatabase, source: &Structure, target: &ObjectShape) -> bool {
    if source.fields().iter().any(|field| !field.is_public()) {
        trace!("public object target with a non-public source field");
        return false;
    }
    for target_field in &target.fields {
        let Some(source_field) = source.find_field(target_field.name) else {
            return false;
        };
        if !target_field.is_public() || !is_same_type(db, source_field.type_id, target_field.type_id)
        {
            return false;
        }
    }

    if source.attached_functions().iter().any(|f| !f.is_public()) {
        trace!("public object target with a non-public source function");
        return false;
    }
    target.contract_functions().all(|target_fn| {
        target_fn.is_public()
            && matching_invokable_type(db, source.attached_functions(), target_fn).is_some()
    })
}

/// First source function with the target's name whose parameter and return
/// lists are invariantly equal to the target's.
pub fn matching_invokable_type<'s>(
    db: &dyn TypeDatabase,
    source_functions: &'s [AttachedFunction],
    target_function: &AttachedFunction,
) -> Option<&'s AttachedFunction> {
    let target_shape = type_queries::function_shape(db, target_function.type_id)?;
    source_functions.iter().find(|candidate| {
        candidate.name == target_function.name
            && type_queries::function_shape(db, candidate.type_id).is_some_and(|shape| {
                same_type_lists(db, &shape.params, &target_shape.params)
                    && same_type_lists(db, &shape.returns, &target_shape.returns)
            })
    })
}

#[cfg(test)]
#[path = "../tests/object_equivalence_tests.rs"]
mod tests;
