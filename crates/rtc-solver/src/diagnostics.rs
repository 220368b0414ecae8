//! Reasons an is-type relation does not hold.
//!
//! Produced by `SubtypeChecker::explain_failure` for error messages at cast
//! and conversion sites. Nested reasons point at the component that failed
//! first; only one failure is reported per level.

use crate::format::TypeFormatter;
use crate::types::{ArraySize, LiteralValue, TypeId};
use rtc_common::Atom;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    /// Source and target are different kinds of descriptor.
    TypeMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
    /// `anydata` targets are never satisfied.
    UnsupportedTarget { target_type: TypeId },
    /// A sealed record target cannot accept an open record.
    OpenToSealedRecord {
        source_type: TypeId,
        target_type: TypeId,
    },
    RestTypeMismatch {
        source_rest: TypeId,
        target_rest: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    MissingField { field_name: Atom, target_type: TypeId },
    /// An optional source field cannot satisfy a required target field.
    OptionalFieldRequired { field_name: Atom },
    FieldTypeMismatch {
        field_name: Atom,
        source_field_type: TypeId,
        target_field_type: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// The source declares a field a sealed target does not have.
    ExtraField { field_name: Atom, target_type: TypeId },
    ArraySizeMismatch {
        source_size: ArraySize,
        target_size: ArraySize,
    },
    /// Element of an array (`index: None`) or tuple.
    ElementTypeMismatch {
        index: Option<usize>,
        source_element: TypeId,
        target_element: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    TupleArityMismatch {
        source_count: usize,
        target_count: usize,
    },
    /// Constraint of a `map`, `future` or `table`.
    ConstraintMismatch {
        source_constraint: TypeId,
        target_constraint: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    NoUnionMember {
        source_type: TypeId,
        target_type: TypeId,
    },
    FiniteCardinalityMismatch {
        source_count: usize,
        target_count: usize,
    },
    FiniteValueMissing { value: LiteralValue },
    /// Parameter or return lists are not identical.
    SignatureMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
    VisibilityMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
    PackageMismatch {
        source_package: Atom,
        target_package: Atom,
    },
    /// The target declares more fields or functions than the source has.
    MemberCountMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
    NonPublicMember { member_name: Atom },
    MissingFunction { function_name: Atom },
    DepthExceeded,
}

impl SubtypeFailureReason {
    /// Render the reason, including nested reasons, as one line.
    pub fn message(&self, formatter: &TypeFormatter<'_>) -> String {
        let ty = |id: &TypeId| formatter.format(*id);
        let name = |atom: &Atom| formatter.atom(*atom);
        let with_nested = |head: String, nested: &Option<Box<SubtypeFailureReason>>| match nested {
            Some(nested) => format!("{head}: {}", nested.message(formatter)),
            None => head,
        };

        match self {
            SubtypeFailureReason::TypeMismatch {
                source_type,
                target_type,
            } => format!(
                "'{}' is not assignable to '{}'",
                ty(source_type),
                ty(target_type)
            ),
            SubtypeFailureReason::UnsupportedTarget { target_type } => {
                format!("'{}' is not supported as a target", ty(target_type))
            }
            SubtypeFailureReason::OpenToSealedRecord {
                source_type,
                target_type,
            } => format!(
                "open record '{}' cannot be used as sealed record '{}'",
                ty(source_type),
                ty(target_type)
            ),
            SubtypeFailureReason::RestTypeMismatch {
                source_rest,
                target_rest,
                nested_reason,
            } => with_nested(
                format!(
                    "rest field type '{}' is not assignable to '{}'",
                    ty(source_rest),
                    ty(target_rest)
                ),
                nested_reason,
            ),
            SubtypeFailureReason::MissingField {
                field_name,
                target_type,
            } => format!(
                "missing field '{}' required by '{}'",
                name(field_name),
                ty(target_type)
            ),
            SubtypeFailureReason::OptionalFieldRequired { field_name } => format!(
                "field '{}' is optional but required in the target",
                name(field_name)
            ),
            SubtypeFailureReason::FieldTypeMismatch {
                field_name,
                source_field_type,
                target_field_type,
                nested_reason,
            } => with_nested(
                format!(
                    "field '{}' of type '{}' is not assignable to '{}'",
                    name(field_name),
                    ty(source_field_type),
                    ty(target_field_type)
                ),
                nested_reason,
            ),
            SubtypeFailureReason::ExtraField {
                field_name,
                target_type,
            } => format!(
                "field '{}' is not declared by sealed record '{}'",
                name(field_name),
                ty(target_type)
            ),
            SubtypeFailureReason::ArraySizeMismatch {
                source_size,
                target_size,
            } => format!(
                "array size {} does not match {}",
                size_label(*source_size),
                size_label(*target_size)
            ),
            SubtypeFailureReason::ElementTypeMismatch {
                index,
                source_element,
                target_element,
                nested_reason,
            } => {
                let head = match index {
                    Some(index) => format!(
                        "element {index} of type '{}' is not assignable to '{}'",
                        ty(source_element),
                        ty(target_element)
                    ),
                    None => format!(
                        "element type '{}' is not assignable to '{}'",
                        ty(source_element),
                        ty(target_element)
                    ),
                };
                with_nested(head, nested_reason)
            }
            SubtypeFailureReason::TupleArityMismatch {
                source_count,
                target_count,
            } => format!("tuple of {source_count} members cannot be used as one of {target_count}"),
            SubtypeFailureReason::ConstraintMismatch {
                source_constraint,
                target_constraint,
                nested_reason,
            } => with_nested(
                format!(
                    "constraint '{}' is not assignable to '{}'",
                    ty(source_constraint),
                    ty(target_constraint)
                ),
                nested_reason,
            ),
            SubtypeFailureReason::NoUnionMember {
                source_type,
                target_type,
            } => format!(
                "'{}' is not assignable to any member of '{}'",
                ty(source_type),
                ty(target_type)
            ),
            SubtypeFailureReason::FiniteCardinalityMismatch {
                source_count,
                target_count,
            } => format!(
                "finite type of {source_count} values cannot be used as one of {target_count}"
            ),
            SubtypeFailureReason::FiniteValueMissing { value } => {
                format!("value {value} is not in the target value space")
            }
            SubtypeFailureReason::SignatureMismatch {
                source_type,
                target_type,
            } => format!(
                "signature '{}' is not identical to '{}'",
                ty(source_type),
                ty(target_type)
            ),
            SubtypeFailureReason::VisibilityMismatch {
                source_type,
                target_type,
            } => format!(
                "visibility of '{}' differs from '{}'",
                ty(source_type),
                ty(target_type)
            ),
            SubtypeFailureReason::PackageMismatch {
                source_package,
                target_package,
            } => format!(
                "private type from package '{}' cannot satisfy one from '{}'",
                name(source_package),
                name(target_package)
            ),
            SubtypeFailureReason::MemberCountMismatch {
                source_type,
                target_type,
            } => format!(
                "'{}' has fewer members than '{}' requires",
                ty(source_type),
                ty(target_type)
            ),
            SubtypeFailureReason::NonPublicMember { member_name } => {
                format!("member '{}' is not public", name(member_name))
            }
            SubtypeFailureReason::MissingFunction { function_name } => format!(
                "no function '{}' with an identical signature",
                name(function_name)
            ),
            SubtypeFailureReason::DepthExceeded => {
                "type is too deeply nested to compare".to_string()
            }
        }
    }
}

fn size_label(size: ArraySize) -> String {
    match size {
        ArraySize::Open => "open".to_string(),
        ArraySize::Fixed(n) => n.to_string(),
    }
}
