//! End-to-end compatibility checks through the public facade.
//!
//! Values are built on a `ValueHeap` the way a host interpreter would, then
//! judged with `check_is_type`, which picks declared-type or shape checking
//! depending on mutability.

use rayon::prelude::*;
use rtc::{
    Atom, FieldInfo, LiteralValue, ObjectShape, RecordShape, RelationPolicy, RelationQuery,
    TypeFormatter, TypeId, TypeInterner, Value, ValueHeap, check_is_like_type, check_is_type,
    explain_failure, is_type, object_equivalent, query_relation, type_of,
};
use rust_decimal::Decimal;

struct Runtime {
    types: TypeInterner,
    heap: ValueHeap,
}

impl Runtime {
    fn new() -> Self {
        Runtime {
            types: TypeInterner::new(),
            heap: ValueHeap::new(),
        }
    }

    fn name(&self, s: &str) -> Atom {
        self.types.intern_string(s)
    }

    fn map_of(&mut self, constraint: TypeId, entries: &[(&str, Value)]) -> Value {
        let map = self.types.map(constraint);
        let entries: Vec<(Atom, Value)> = entries
            .iter()
            .map(|(key, value)| (self.name(key), value.clone()))
            .collect();
        self.heap.alloc_map(&self.types, map, entries).unwrap()
    }

    fn is(&self, value: &Value, target: TypeId) -> bool {
        check_is_type(&self.types, &self.heap, value, target)
    }
}

#[test]
fn frozen_values_are_their_own_type() {
    let mut rt = Runtime::new();
    let point = rt
        .types
        .record(
            RecordShape::new(rt.name("Point"), Atom::NONE)
                .field(FieldInfo::new(rt.name("x"), TypeId::INT))
                .field(FieldInfo::new(rt.name("y"), TypeId::INT)),
        )
        .unwrap();
    let x = rt.name("x");
    let y = rt.name("y");
    let record = rt
        .heap
        .alloc_record(&rt.types, point, [(x, Value::Int(1)), (y, Value::Int(2))])
        .unwrap();
    let decimals = rt.types.array(TypeId::DECIMAL);
    let list = rt
        .heap
        .alloc_array(&rt.types, decimals, vec![Value::Decimal(Decimal::new(15, 1))])
        .unwrap();

    for value in [
        record,
        list,
        Value::Int(3),
        Value::string("s"),
        Value::Null,
        Value::Decimal(Decimal::ONE),
    ] {
        rt.heap.freeze(&value).unwrap();
        let declared = type_of(&value, &rt.heap).unwrap();
        assert!(is_type(&rt.types, declared, declared));
        assert!(rt.is(&value, declared));
    }
}

#[test]
fn record_sealing_on_live_values() {
    let mut rt = Runtime::new();
    let x = rt.name("x");
    let sealed = rt
        .types
        .record(RecordShape::new(rt.name("X"), Atom::NONE).field(FieldInfo::new(x, TypeId::INT)))
        .unwrap();
    let open = rt
        .types
        .record(
            RecordShape::new(rt.name("OpenX"), Atom::NONE)
                .field(FieldInfo::new(x, TypeId::INT))
                .open(TypeId::STRING),
        )
        .unwrap();

    let just_x = rt.map_of(TypeId::ANY, &[("x", Value::Int(5))]);
    assert!(rt.is(&just_x, sealed));

    let with_y = rt.map_of(TypeId::ANY, &[("x", Value::Int(5)), ("y", Value::Int(10))]);
    assert!(!rt.is(&with_y, sealed));

    let labelled = rt.map_of(
        TypeId::ANY,
        &[("x", Value::Int(5)), ("label", Value::string("hi"))],
    );
    assert!(rt.is(&labelled, open));
}

#[test]
fn mutation_changes_the_answer_until_frozen() {
    let mut rt = Runtime::new();
    let ints = rt.types.map(TypeId::INT);
    let value = rt.map_of(TypeId::ANY, &[("a", Value::Int(1))]);
    assert!(rt.is(&value, ints));

    let r = value.as_ref_id().unwrap();
    let b = rt.name("b");
    rt.heap.set_entry(r, b, Value::string("two")).unwrap();
    assert!(!rt.is(&value, ints));

    rt.heap.remove_entry(r, b).unwrap();
    assert!(rt.is(&value, ints));

    // Frozen, only the declared map<any> counts.
    rt.heap.freeze(&value).unwrap();
    assert!(!rt.is(&value, ints));
    assert!(check_is_like_type(&rt.types, &rt.heap, &value, ints));
}

#[test]
fn union_membership_of_simple_values() {
    let rt = Runtime::new();
    let int_or_string = rt.types.union(vec![TypeId::INT, TypeId::STRING]);
    assert!(rt.is(&Value::string("hello"), int_or_string));
    assert!(!rt.is(&Value::Boolean(true), int_or_string));
}

#[test]
fn array_size_state_is_invariant() {
    let rt = Runtime::new();
    let fixed = rt.types.fixed_array(TypeId::INT, 3);
    let open = rt.types.array(TypeId::INT);
    assert!(!is_type(&rt.types, fixed, open));
    assert!(!is_type(&rt.types, open, fixed));
}

#[test]
fn finite_subset_is_not_a_subtype() {
    let rt = Runtime::new();
    let three = rt.types.finite(vec![
        LiteralValue::Int(1),
        LiteralValue::Int(2),
        LiteralValue::Int(3),
    ]);
    let two = rt.types.finite(vec![LiteralValue::Int(1), LiteralValue::Int(2)]);
    assert!(!is_type(&rt.types, three, two));
    assert!(!is_type(&rt.types, two, three));

    let formatter = TypeFormatter::new(&rt.types);
    let reason = explain_failure(&rt.types, three, two).unwrap();
    assert_eq!(
        reason.message(&formatter),
        "finite type of 3 values cannot be used as one of 2"
    );
}

#[test]
fn cyclic_record_types_terminate() {
    let rt = Runtime::new();
    let next = rt.name("next");
    let linked = |name: &str, value: TypeId| {
        let id = rt.types.declare_record(name);
        rt.types
            .define_record(
                id,
                RecordShape::new(rt.name(name), Atom::NONE)
                    .field(FieldInfo::new(rt.name("value"), value))
                    .field(FieldInfo::new(next, id).optional()),
            )
            .unwrap();
        id
    };
    let node = linked("Node", TypeId::INT);
    let link = linked("Link", TypeId::INT);
    let json_node = linked("JsonNode", TypeId::JSON);

    // Distinct ids, so each answer goes through the member rules and ends at
    // the (source, target) pair already in progress.
    assert!(is_type(&rt.types, node, link));
    assert!(is_type(&rt.types, link, node));
    assert!(is_type(&rt.types, node, json_node));
    assert!(!is_type(&rt.types, json_node, node));
}

#[test]
fn object_equivalence_visibility_rules() {
    let rt = Runtime::new();
    let pkg = rt.name("acme/app");
    let x = rt.name("x");

    let needs_x = rt
        .types
        .object(ObjectShape::new(rt.name("NeedsX"), pkg).field(FieldInfo::new(x, TypeId::INT)))
        .unwrap();
    let lacks_x = rt
        .types
        .object(
            ObjectShape::new(rt.name("LacksX"), pkg)
                .field(FieldInfo::new(rt.name("z"), TypeId::INT)),
        )
        .unwrap();
    assert!(!object_equivalent(&rt.types, lacks_x, needs_x));

    let public_target = rt
        .types
        .object(
            ObjectShape::new(rt.name("Api"), pkg)
                .public()
                .field(FieldInfo::new(x, TypeId::INT).public()),
        )
        .unwrap();
    let leaky = rt
        .types
        .object(
            ObjectShape::new(rt.name("Impl"), pkg)
                .public()
                .field(FieldInfo::new(x, TypeId::INT).public())
                .field(FieldInfo::new(rt.name("cache"), TypeId::ANY)),
        )
        .unwrap();
    assert!(!object_equivalent(&rt.types, leaky, public_target));
}

#[test]
fn functions_are_neither_co_nor_contravariant() {
    let rt = Runtime::new();
    let int_or_string = rt.types.union(vec![TypeId::INT, TypeId::STRING]);
    let narrow = rt.types.function(vec![TypeId::INT], vec![TypeId::STRING]);
    let wide = rt.types.function(vec![int_or_string], vec![TypeId::STRING]);
    assert!(!is_type(&rt.types, narrow, wide));
    assert!(!is_type(&rt.types, wide, narrow));
}

#[test]
fn independent_queries_share_nothing() {
    let mut rt = Runtime::new();
    let json_map = rt.map_of(TypeId::ANY, &[("k", Value::Float(0.5))]);
    let bytes = rt.map_of(TypeId::ANY, &[("k", Value::Byte(1))]);
    let values = [json_map, bytes];

    let answers: Vec<bool> = (0..128)
        .into_par_iter()
        .map(|i| {
            let query = RelationQuery::ValueIsType {
                store: &rt.heap,
                value: &values[i % 2],
                target: TypeId::JSON,
            };
            query_relation(&rt.types, query, RelationPolicy::default()).is_related()
        })
        .collect();
    for (i, related) in answers.into_iter().enumerate() {
        assert_eq!(related, i % 2 == 0);
    }
}
