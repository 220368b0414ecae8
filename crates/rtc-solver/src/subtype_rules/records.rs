//! Record targets.
//!
//! Openness can be kept or added on widening, never dropped: a sealed target
//! rejects an open source. Every target field must be declared by the source,
//! and a required target field needs a required source field. Undeclared fields of the source are checked against the target's
//! rest type, or rejected outright when the target is sealed.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{RecordShape, RecordShapeId, TypeData, TypeId};
use smallvec::SmallVec;
use tracing::trace;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_record(
        &mut self,
        source: TypeId,
        target: TypeId,
        target_shape: RecordShapeId,
    ) -> SubtypeResult {
        let Some(TypeData::Record(source_shape)) = self.interner.lookup(source) else {
            return SubtypeResult::False;
        };
        let source_shape = self.interner.record_shape(source_shape);
        let target_shape = self.interner.record_shape(target_shape);
        self.guarded(source, target, |this| {
            this.check_record_members(&source_shape, &target_shape)
        })
    }

    fn check_record_members(&mut self, source: &RecordShape, target: &RecordShape) -> SubtypeResult {
        if target.sealed && !source.sealed {
            trace!("open record is not a sealed record");
            return SubtypeResult::False;
        }
        if !source.sealed {
            let rest = self.check_subtype(source.rest_type(), target.rest_type());
            if rest.is_false() {
                return rest;
            }
        }

        for target_field in &target.fields {
            let source_field = source.find_field(target_field.name);
            match source_field {
                Some(source_field) => {
                    if !target_field.is_optional() && source_field.is_optional() {
                        return SubtypeResult::False;
                    }
                    let result = self.check_subtype(source_field.type_id, target_field.type_id);
                    if result.is_false() {
                        return result;
                    }
                }
                None => {
                    trace!("target field missing from source record");
                    return SubtypeResult::False;
                }
            }
        }

        if target.sealed {
            return source
                .fields
                .iter()
                .all(|field| target.find_field(field.name).is_some())
                .into();
        }

        let rest = target.rest_type();
        let extra = source
            .fields
            .iter()
            .filter(|field| target.find_field(field.name).is_none())
            .map(|field| (field.type_id, rest))
            .collect::<SmallVec<[_; 4]>>();
        self.all_related(extra)
    }
}
