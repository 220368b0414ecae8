use super::*;
use crate::format::TypeFormatter;
use crate::intern::TypeInterner;
use crate::types::{ArraySize, AttachedFunction, FieldInfo, LiteralValue};
use crate::relation_queries::RelationPolicy;
use rtc_common::Atom;

fn record(interner: &TypeInterner, shape: RecordShape) -> TypeId {
    interner.record(shape).unwrap()
}

#[test]
fn related_pairs_have_no_explanation() {
    let interner = TypeInterner::new();
    assert_eq!(explain_failure(&interner, TypeId::INT, TypeId::ANY), None);
    let ints = interner.map(TypeId::INT);
    assert_eq!(explain_failure(&interner, ints, TypeId::JSON), None);
}

#[test]
fn array_size_mismatch_is_reported() {
    let interner = TypeInterner::new();
    let fixed = interner.fixed_array(TypeId::INT, 3);
    let open = interner.array(TypeId::INT);
    let reason = explain_failure(&interner, fixed, open).unwrap();
    assert_eq!(
        reason,
        SubtypeFailureReason::ArraySizeMismatch {
            source_size: ArraySize::Fixed(3),
            target_size: ArraySize::Open,
        }
    );
    assert_eq!(
        reason.message(&TypeFormatter::new(&interner)),
        "array size 3 does not match open"
    );
}

#[test]
fn nested_reasons_point_at_the_failing_component() {
    let interner = TypeInterner::new();
    let strings = interner.map(TypeId::STRING);
    let ints = interner.map(TypeId::INT);
    let reason = explain_failure(&interner, strings, ints).unwrap();
    assert_eq!(
        reason.message(&TypeFormatter::new(&interner)),
        "constraint 'string' is not assignable to 'int': 'string' is not assignable to 'int'"
    );
}

#[test]
fn record_failures_name_the_field() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("x");
    let y = interner.intern_string("y");
    let target = record(
        &interner,
        RecordShape::new(interner.intern_string("Target"), Atom::NONE)
            .field(FieldInfo::new(x, TypeId::INT))
            .field(FieldInfo::new(y, TypeId::INT)),
    );

    let missing = record(
        &interner,
        RecordShape::new(interner.intern_string("OnlyX"), Atom::NONE)
            .field(FieldInfo::new(x, TypeId::INT)),
    );
    let reason = explain_failure(&interner, missing, target).unwrap();
    assert_eq!(
        reason.message(&TypeFormatter::new(&interner)),
        "missing field 'y' required by 'Target'"
    );

    let optional = record(
        &interner,
        RecordShape::new(interner.intern_string("Opt"), Atom::NONE)
            .field(FieldInfo::new(x, TypeId::INT))
            .field(FieldInfo::new(y, TypeId::INT).optional()),
    );
    assert_eq!(
        explain_failure(&interner, optional, target),
        Some(SubtypeFailureReason::OptionalFieldRequired { field_name: y })
    );

    let z = interner.intern_string("z");
    let extra = record(
        &interner,
        RecordShape::new(interner.intern_string("Extra"), Atom::NONE)
            .field(FieldInfo::new(x, TypeId::INT))
            .field(FieldInfo::new(y, TypeId::INT))
            .field(FieldInfo::new(z, TypeId::INT)),
    );
    assert_eq!(
        explain_failure(&interner, extra, target),
        Some(SubtypeFailureReason::ExtraField {
            field_name: z,
            target_type: target,
        })
    );

    let open = record(
        &interner,
        RecordShape::new(interner.intern_string("Open"), Atom::NONE)
            .field(FieldInfo::new(x, TypeId::INT))
            .field(FieldInfo::new(y, TypeId::INT))
            .open(TypeId::ANY),
    );
    assert_eq!(
        explain_failure(&interner, open, target),
        Some(SubtypeFailureReason::OpenToSealedRecord {
            source_type: open,
            target_type: target,
        })
    );
}

#[test]
fn tuple_failures_carry_the_index() {
    let interner = TypeInterner::new();
    let source = interner.tuple(vec![TypeId::INT, TypeId::STRING]);
    let target = interner.tuple(vec![TypeId::INT, TypeId::INT]);
    let Some(SubtypeFailureReason::ElementTypeMismatch { index, .. }) =
        explain_failure(&interner, source, target)
    else {
        panic!("expected an element mismatch");
    };
    assert_eq!(index, Some(1));

    let short = interner.tuple(vec![TypeId::INT]);
    assert_eq!(
        explain_failure(&interner, short, target),
        Some(SubtypeFailureReason::TupleArityMismatch {
            source_count: 1,
            target_count: 2,
        })
    );
}

#[test]
fn finite_cardinality_is_checked_first() {
    let interner = TypeInterner::new();
    let three = interner.finite(vec![
        LiteralValue::Int(1),
        LiteralValue::Int(2),
        LiteralValue::Int(3),
    ]);
    let two = interner.finite(vec![LiteralValue::Int(1), LiteralValue::Int(2)]);
    let reason = explain_failure(&interner, three, two).unwrap();
    assert_eq!(
        reason.message(&TypeFormatter::new(&interner)),
        "finite type of 3 values cannot be used as one of 2"
    );

    let other = interner.finite(vec![LiteralValue::Int(1), LiteralValue::Int(9)]);
    assert_eq!(
        explain_failure(&interner, two, other),
        Some(SubtypeFailureReason::FiniteValueMissing {
            value: LiteralValue::Int(2),
        })
    );
}

#[test]
fn unions_functions_and_anydata() {
    let interner = TypeInterner::new();
    let union = interner.union(vec![TypeId::INT, TypeId::STRING]);
    let reason = explain_failure(&interner, TypeId::BOOLEAN, union).unwrap();
    assert_eq!(
        reason.message(&TypeFormatter::new(&interner)),
        "'boolean' is not assignable to any member of 'int|string'"
    );

    let f = interner.function(vec![TypeId::INT], vec![TypeId::STRING]);
    let g = interner.function(vec![union], vec![TypeId::STRING]);
    assert!(matches!(
        explain_failure(&interner, f, g),
        Some(SubtypeFailureReason::SignatureMismatch { .. })
    ));

    assert_eq!(
        explain_failure(&interner, TypeId::INT, TypeId::ANYDATA),
        Some(SubtypeFailureReason::UnsupportedTarget {
            target_type: TypeId::ANYDATA,
        })
    );
}

#[test]
fn object_failures_follow_equivalency_rules() {
    let interner = TypeInterner::new();
    let pkg = interner.intern_string("acme/app");
    let id = interner.intern_string("id");
    let run = interner.intern_string("run");
    let run_type = interner.function(vec![], vec![]);

    let target = interner
        .object(
            ObjectShape::new(interner.intern_string("Job"), pkg)
                .public()
                .field(FieldInfo::new(id, TypeId::INT).public())
                .function(AttachedFunction::new(run, run_type).public()),
        )
        .unwrap();

    let private = interner
        .object(ObjectShape::new(interner.intern_string("P"), pkg))
        .unwrap();
    assert!(matches!(
        explain_failure(&interner, private, target),
        Some(SubtypeFailureReason::VisibilityMismatch { .. })
    ));

    let hidden = interner
        .object(
            ObjectShape::new(interner.intern_string("Hidden"), pkg)
                .public()
                .field(FieldInfo::new(id, TypeId::INT))
                .function(AttachedFunction::new(run, run_type).public()),
        )
        .unwrap();
    assert_eq!(
        explain_failure(&interner, hidden, target),
        Some(SubtypeFailureReason::NonPublicMember { member_name: id })
    );

    let walk = interner.intern_string("walk");
    let wrong_fn = interner
        .object(
            ObjectShape::new(interner.intern_string("Walker"), pkg)
                .public()
                .field(FieldInfo::new(id, TypeId::INT).public())
                .function(AttachedFunction::new(walk, run_type).public()),
        )
        .unwrap();
    let reason = explain_failure(&interner, wrong_fn, target).unwrap();
    assert_eq!(
        reason.message(&TypeFormatter::new(&interner)),
        "no function 'run' with an identical signature"
    );
}

#[test]
fn depth_exhaustion_is_its_own_reason() {
    let interner = TypeInterner::new();
    let source = (0..6).fold(TypeId::INT, |element, _| interner.array(element));
    let target = (0..6).fold(TypeId::STRING, |element, _| interner.array(element));
    let policy = RelationPolicy::default().with_max_subtype_depth(2);
    let mut checker = SubtypeChecker::with_policy(&interner, &policy);
    assert_eq!(
        checker.explain_failure(source, target),
        Some(SubtypeFailureReason::DepthExceeded)
    );
}

#[test]
fn optional_target_field_still_reported_missing() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("x");
    let target = record(
        &interner,
        RecordShape::new(interner.intern_string("Opt"), Atom::NONE)
            .field(FieldInfo::new(x, TypeId::INT).optional()),
    );
    let empty = record(
        &interner,
        RecordShape::new(interner.intern_string("Empty"), Atom::NONE),
    );
    assert_eq!(
        explain_failure(&interner, empty, target),
        Some(SubtypeFailureReason::MissingField {
            field_name: x,
            target_type: target,
        })
    );
}
