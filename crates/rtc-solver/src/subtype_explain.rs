//! Failure explanation for is-type.
//!
//! The explainer re-runs the same rules as the checker but stops at the first
//! component that fails and reports it as a `SubtypeFailureReason`. Nested
//! components are explained recursively; a pair that is already being
//! explained further up is reported as a plain mismatch.

use crate::db::TypeDatabase;
use crate::diagnostics::SubtypeFailureReason;
use crate::identity::is_same_type;
use crate::objects::matching_invokable_type;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::type_queries;
use crate::types::{IntrinsicKind, ObjectShape, RecordShape, TypeData, TypeFlags, TypeId};

type ExplainGuard = RecursionGuard<(TypeId, TypeId)>;

impl<'a> SubtypeChecker<'a> {
    /// Why `source` is not an is-type of `target`, or `None` if it is.
    pub fn explain_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        match self.check_subtype(source, target) {
            result if result.is_true() => None,
            SubtypeResult::DepthExceeded => Some(SubtypeFailureReason::DepthExceeded),
            _ => {
                let mut seen = ExplainGuard::with_profile(RecursionProfile::Explain);
                Some(self.explain_pair(source, target, &mut seen))
            }
        }
    }

    fn explain_pair(
        &mut self,
        source: TypeId,
        target: TypeId,
        seen: &mut ExplainGuard,
    ) -> SubtypeFailureReason {
        let key = (source, target);
        if !seen.enter(key).is_entered() {
            return SubtypeFailureReason::TypeMismatch {
                source_type: source,
                target_type: target,
            };
        }
        let reason = self.explain_target(source, target, seen);
        seen.leave(key);
        reason
    }

    /// Explanation of a component pair, or `None` when it is related.
    fn explain_nested(
        &mut self,
        source: TypeId,
        target: TypeId,
        seen: &mut ExplainGuard,
    ) -> Option<Box<SubtypeFailureReason>> {
        match self.check_subtype(source, target) {
            result if result.is_true() => None,
            SubtypeResult::DepthExceeded => Some(Box::new(SubtypeFailureReason::DepthExceeded)),
            _ => Some(Box::new(self.explain_pair(source, target, seen))),
        }
    }

    fn explain_target(
        &mut self,
        source: TypeId,
        target: TypeId,
        seen: &mut ExplainGuard,
    ) -> SubtypeFailureReason {
        let mismatch = SubtypeFailureReason::TypeMismatch {
            source_type: source,
            target_type: target,
        };
        let Some(target_data) = self.interner.lookup(target) else {
            return mismatch;
        };
        let source_data = self.interner.lookup(source);

        match (source_data, target_data) {
            (_, TypeData::Intrinsic(IntrinsicKind::Anydata)) => {
                SubtypeFailureReason::UnsupportedTarget {
                    target_type: target,
                }
            }
            (Some(TypeData::Array(array)), TypeData::Intrinsic(IntrinsicKind::Json)) => {
                SubtypeFailureReason::ElementTypeMismatch {
                    index: None,
                    source_element: array.element,
                    target_element: TypeId::JSON,
                    nested_reason: self.explain_nested(array.element, TypeId::JSON, seen),
                }
            }
            (Some(TypeData::Map(constraint)), TypeData::Intrinsic(IntrinsicKind::Json)) => {
                self.constraint_mismatch(constraint, TypeId::JSON, seen)
            }
            (Some(TypeData::Map(s)), TypeData::Map(t))
            | (Some(TypeData::Future(s)), TypeData::Future(t)) => {
                self.constraint_mismatch(s, t, seen)
            }
            (Some(TypeData::Table(s)), TypeData::Table(t)) => self.constraint_mismatch(
                s.unwrap_or(TypeId::ANY),
                t.unwrap_or(TypeId::ANY),
                seen,
            ),
            (Some(TypeData::Array(s)), TypeData::Array(t)) => {
                if s.size != t.size {
                    SubtypeFailureReason::ArraySizeMismatch {
                        source_size: s.size,
                        target_size: t.size,
                    }
                } else {
                    SubtypeFailureReason::ElementTypeMismatch {
                        index: None,
                        source_element: s.element,
                        target_element: t.element,
                        nested_reason: self.explain_nested(s.element, t.element, seen),
                    }
                }
            }
            (Some(TypeData::Tuple(s)), TypeData::Tuple(t)) => {
                let s = self.interner.type_list(s);
                let t = self.interner.type_list(t);
                if s.len() != t.len() {
                    return SubtypeFailureReason::TupleArityMismatch {
                        source_count: s.len(),
                        target_count: t.len(),
                    };
                }
                for (index, (&source_element, &target_element)) in s.iter().zip(t.iter()).enumerate()
                {
                    if let Some(nested) = self.explain_nested(source_element, target_element, seen)
                    {
                        return SubtypeFailureReason::ElementTypeMismatch {
                            index: Some(index),
                            source_element,
                            target_element,
                            nested_reason: Some(nested),
                        };
                    }
                }
                mismatch
            }
            (_, TypeData::Union(_)) => SubtypeFailureReason::NoUnionMember {
                source_type: source,
                target_type: target,
            },
            (Some(TypeData::Finite(s)), TypeData::Finite(t)) => {
                let s = self.interner.literal_set(s);
                let t = self.interner.literal_set(t);
                if s.len() != t.len() {
                    return SubtypeFailureReason::FiniteCardinalityMismatch {
                        source_count: s.len(),
                        target_count: t.len(),
                    };
                }
                match s.iter().find(|value| !t.contains(value)) {
                    Some(value) => SubtypeFailureReason::FiniteValueMissing {
                        value: value.clone(),
                    },
                    None => mismatch,
                }
            }
            (Some(TypeData::Function(_)), TypeData::Function(_)) => {
                SubtypeFailureReason::SignatureMismatch {
                    source_type: source,
                    target_type: target,
                }
            }
            (Some(TypeData::Record(s)), TypeData::Record(t)) => {
                let s = self.interner.record_shape(s);
                let t = self.interner.record_shape(t);
                self.explain_record(source, target, &s, &t, seen)
                    .unwrap_or(mismatch)
            }
            (_, TypeData::Object(t)) => {
                let t = self.interner.object_shape(t);
                explain_object(self.interner, source, target, &t).unwrap_or(mismatch)
            }
            _ => mismatch,
        }
    }

    fn constraint_mismatch(
        &mut self,
        source: TypeId,
        target: TypeId,
        seen: &mut ExplainGuard,
    ) -> SubtypeFailureReason {
        SubtypeFailureReason::ConstraintMismatch {
            source_constraint: source,
            target_constraint: target,
            nested_reason: self.explain_nested(source, target, seen),
        }
    }

    fn explain_record(
        &mut self,
        source_type: TypeId,
        target_type: TypeId,
        source: &RecordShape,
        target: &RecordShape,
        seen: &mut ExplainGuard,
    ) -> Option<SubtypeFailureReason> {
        if target.sealed && !source.sealed {
            return Some(SubtypeFailureReason::OpenToSealedRecord {
                source_type,
                target_type,
            });
        }
        if !source.sealed {
            if let Some(nested) = self.explain_nested(source.rest_type(), target.rest_type(), seen)
            {
                return Some(SubtypeFailureReason::RestTypeMismatch {
                    source_rest: source.rest_type(),
                    target_rest: target.rest_type(),
                    nested_reason: Some(nested),
                });
            }
        }

        for target_field in &target.fields {
            match source.find_field(target_field.name) {
                None => {
                    return Some(SubtypeFailureReason::MissingField {
                        field_name: target_field.name,
                        target_type,
                    });
                }
                Some(source_field) => {
                    if !target_field.is_optional() && source_field.is_optional() {
                        return Some(SubtypeFailureReason::OptionalFieldRequired {
                            field_name: target_field.name,
                        });
                    }
                    if let Some(nested) =
                        self.explain_nested(source_field.type_id, target_field.type_id, seen)
                    {
                        return Some(SubtypeFailureReason::FieldTypeMismatch {
                            field_name: target_field.name,
                            source_field_type: source_field.type_id,
                            target_field_type: target_field.type_id,
                            nested_reason: Some(nested),
                        });
                    }
                }
            }
        }

        for source_field in &source.fields {
            if target.find_field(source_field.name).is_some() {
                continue;
            }
            if target.sealed {
                return Some(SubtypeFailureReason::ExtraField {
                    field_name: source_field.name,
                    target_type,
                });
            }
            if let Some(nested) = self.explain_nested(source_field.type_id, target.rest_type(), seen)
            {
                return Some(SubtypeFailureReason::FieldTypeMismatch {
                    field_name: source_field.name,
                    source_field_type: source_field.type_id,
                    target_field_type: target.rest_type(),
                    nested_reason: Some(nested),
                });
            }
        }
        None
    }
}

/// First object-equivalency rule that `source` breaks.
fn explain_object(
    db: &dyn TypeDatabase,
    source_type: TypeId,
    target_type: TypeId,
    target: &ObjectShape,
) -> Option<SubtypeFailureReason> {
    let source = type_queries::structure(db, source_type)?;
    if (source.flags() ^ target.flags).contains(TypeFlags::PUBLIC) {
        return Some(SubtypeFailureReason::VisibilityMismatch {
            source_type,
            target_type,
        });
    }
    if !target.is_public() && source.package() != target.package {
        return Some(SubtypeFailureReason::PackageMismatch {
            source_package: source.package(),
            target_package: target.package,
        });
    }
    if target.fields.len() > source.fields().len()
        || target.contract_functions().count() > source.attached_functions().len()
    {
        return Some(SubtypeFailureReason::MemberCountMismatch {
            source_type,
            target_type,
        });
    }

    let public = target.is_public();
    if public {
        if let Some(field) = source.fields().iter().find(|f| !f.is_public()) {
            return Some(SubtypeFailureReason::NonPublicMember {
                member_name: field.name,
            });
        }
    }
    for target_field in &target.fields {
        let Some(source_field) = source.find_field(target_field.name) else {
            return Some(SubtypeFailureReason::MissingField {
                field_name: target_field.name,
                target_type,
            });
        };
        if public && !target_field.is_public() {
            return Some(SubtypeFailureReason::NonPublicMember {
                member_name: target_field.name,
            });
        }
        if !is_same_type(db, source_field.type_id, target_field.type_id) {
            return Some(SubtypeFailureReason::FieldTypeMismatch {
                field_name: target_field.name,
                source_field_type: source_field.type_id,
                target_field_type: target_field.type_id,
                nested_reason: None,
            });
        }
    }

    if public {
        if let Some(function) = source.attached_functions().iter().find(|f| !f.is_public()) {
            return Some(SubtypeFailureReason::NonPublicMember {
                member_name: function.name,
            });
        }
    }
    for target_fn in target.contract_functions() {
        if public && !target_fn.is_public() {
            return Some(SubtypeFailureReason::NonPublicMember {
                member_name: target_fn.name,
            });
        }
        if matching_invokable_type(db, source.attached_functions(), target_fn).is_none() {
            return Some(SubtypeFailureReason::MissingFunction {
                function_name: target_fn.name,
            });
        }
    }
    None
}

/// One-shot failure explanation with default limits.
pub fn explain_failure(
    interner: &dyn TypeDatabase,
    source: TypeId,
    target: TypeId,
) -> Option<SubtypeFailureReason> {
    SubtypeChecker::new(interner).explain_failure(source, target)
}

#[cfg(test)]
#[path = "../tests/explain_tests.rs"]
mod tests;
