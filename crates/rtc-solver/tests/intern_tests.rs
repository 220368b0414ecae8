use super::*;
use crate::types::{AttachedFunction, FieldInfo, ObjectShape, RecordShape};

#[test]
fn intrinsics_are_preinterned_in_order() {
    let interner = TypeInterner::new();
    for kind in IntrinsicKind::ALL {
        assert_eq!(
            interner.lookup(kind.type_id()),
            Some(TypeData::Intrinsic(kind))
        );
        assert_eq!(interner.intern(TypeData::Intrinsic(kind)), kind.type_id());
    }
    assert_eq!(interner.len(), TypeId::FIRST_USER as usize);
}

#[test]
fn structural_descriptors_are_hash_consed() {
    let interner = TypeInterner::new();
    assert_eq!(interner.map(TypeId::INT), interner.map(TypeId::INT));
    assert_ne!(interner.map(TypeId::INT), interner.map(TypeId::STRING));
    assert_eq!(interner.array(TypeId::INT), interner.array(TypeId::INT));
    assert_ne!(
        interner.array(TypeId::INT),
        interner.fixed_array(TypeId::INT, 3)
    );
    assert_eq!(
        interner.tuple(vec![TypeId::INT, TypeId::STRING]),
        interner.tuple(vec![TypeId::INT, TypeId::STRING])
    );
    assert_eq!(
        interner.function(vec![TypeId::INT], vec![TypeId::STRING]),
        interner.function(vec![TypeId::INT], vec![TypeId::STRING])
    );
}

#[test]
fn union_dedupes_and_ignores_member_order() {
    let interner = TypeInterner::new();
    let first = interner.union(vec![TypeId::INT, TypeId::STRING]);
    let reversed = interner.union(vec![TypeId::STRING, TypeId::INT]);
    let duplicated = interner.union(vec![TypeId::INT, TypeId::STRING, TypeId::INT]);
    assert_eq!(first, reversed);
    assert_eq!(first, duplicated);

    let Some(TypeData::Union(list)) = interner.lookup(first) else {
        panic!("expected a union");
    };
    // First-declared ordering is kept for display.
    assert_eq!(&*interner.type_list(list), &[TypeId::INT, TypeId::STRING]);
}

#[test]
fn single_member_union_collapses() {
    let interner = TypeInterner::new();
    assert_eq!(interner.union(vec![TypeId::INT, TypeId::INT]), TypeId::INT);
}

#[test]
fn finite_drops_duplicate_literals() {
    let interner = TypeInterner::new();
    let a = interner.finite(vec![LiteralValue::Int(1), LiteralValue::Int(1), LiteralValue::Int(2)]);
    let b = interner.finite(vec![LiteralValue::Int(1), LiteralValue::Int(2)]);
    assert_eq!(a, b);
}

#[test]
fn records_are_nominal() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("x");
    let shape = RecordShape::new(interner.intern_string("Point"), Atom::NONE)
        .field(FieldInfo::new(x, TypeId::INT));
    let first = interner.record(shape.clone()).unwrap();
    let second = interner.record(shape).unwrap();
    assert_ne!(first, second);
}

#[test]
fn declare_then_define_allows_self_reference() {
    let interner = TypeInterner::new();
    let node = interner.declare_record("Node");
    let next = interner.intern_string("next");
    let shape = RecordShape::new(interner.intern_string("Node"), Atom::NONE)
        .field(FieldInfo::new(next, node).optional());
    interner.define_record(node, shape).unwrap();

    let Some(TypeData::Record(shape_id)) = interner.lookup(node) else {
        panic!("expected a record");
    };
    let stored = interner.record_shape(shape_id);
    assert_eq!(stored.fields[0].type_id, node);
    assert!(stored.fields[0].is_optional());
}

#[test]
fn record_rest_types_are_normalized() {
    let interner = TypeInterner::new();
    let stored = |id: TypeId| {
        let Some(TypeData::Record(shape_id)) = interner.lookup(id) else {
            panic!("expected a record");
        };
        interner.record_shape(shape_id)
    };

    let open = RecordShape {
        sealed: false,
        ..RecordShape::new(interner.intern_string("Open"), Atom::NONE)
    };
    let open = interner.record(open).unwrap();
    assert_eq!(stored(open).rest_field_type, Some(TypeId::ANY));

    let sealed = RecordShape {
        rest_field_type: Some(TypeId::STRING),
        ..RecordShape::new(interner.intern_string("Sealed"), Atom::NONE)
    };
    let sealed = interner.record(sealed).unwrap();
    assert!(stored(sealed).sealed);
    assert_eq!(stored(sealed).rest_field_type, None);

    let bounded = RecordShape::new(interner.intern_string("Bounded"), Atom::NONE)
        .open(TypeId::INT);
    let bounded = interner.record(bounded).unwrap();
    assert_eq!(stored(bounded).rest_field_type, Some(TypeId::INT));
}

#[test]
fn defining_twice_is_rejected() {
    let interner = TypeInterner::new();
    let id = interner.declare_record("R");
    let shape = RecordShape::new(interner.intern_string("R"), Atom::NONE);
    interner.define_record(id, shape.clone()).unwrap();
    assert!(matches!(
        interner.define_record(id, shape),
        Err(TypeDefinitionError::AlreadyDefined { .. })
    ));
}

#[test]
fn duplicate_fields_are_rejected() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("x");
    let shape = RecordShape::new(interner.intern_string("R"), Atom::NONE)
        .field(FieldInfo::new(x, TypeId::INT))
        .field(FieldInfo::new(x, TypeId::STRING));
    let err = interner.record(shape).unwrap_err();
    assert_eq!(err.to_string(), "duplicate field `x` in `R`");
}

#[test]
fn defining_non_record_is_rejected() {
    let interner = TypeInterner::new();
    let shape = RecordShape::new(Atom::NONE, Atom::NONE);
    assert_eq!(
        interner.define_record(TypeId::INT, shape),
        Err(TypeDefinitionError::NotARecord(TypeId::INT))
    );
}

#[test]
fn object_functions_must_be_function_typed() {
    let interner = TypeInterner::new();
    let run = interner.intern_string("run");
    let shape = ObjectShape::new(interner.intern_string("Job"), Atom::NONE)
        .function(AttachedFunction::new(run, TypeId::INT));
    assert!(matches!(
        interner.object(shape),
        Err(TypeDefinitionError::NotAFunction { .. })
    ));
}

#[test]
fn object_initializer_index_must_be_in_range() {
    let interner = TypeInterner::new();
    let mut shape = ObjectShape::new(interner.intern_string("Job"), Atom::NONE);
    shape.initializer = Some(0);
    assert!(matches!(
        interner.object(shape),
        Err(TypeDefinitionError::FunctionIndexOutOfRange { index: 0, .. })
    ));
}

#[test]
fn unknown_ids_answer_empty_payloads() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId(9_999)), None);
    assert!(interner.type_list(TypeListId(9_999)).is_empty());
    assert!(interner.literal_set(LiteralSetId(9_999)).is_empty());
    assert!(interner.function_shape(FunctionShapeId(9_999)).params.is_empty());
    assert!(interner.record_shape(RecordShapeId(9_999)).fields.is_empty());
}

#[test]
fn concurrent_interning_agrees() {
    use rayon::prelude::*;

    let interner = TypeInterner::new();
    let ids: Vec<TypeId> = (0..64)
        .into_par_iter()
        .map(|i| {
            let element = if i % 2 == 0 { TypeId::INT } else { TypeId::STRING };
            interner.map(interner.array(element))
        })
        .collect();
    let even = interner.map(interner.array(TypeId::INT));
    let odd = interner.map(interner.array(TypeId::STRING));
    for (i, id) in ids.into_iter().enumerate() {
        assert_eq!(id, if i % 2 == 0 { even } else { odd });
    }
}
