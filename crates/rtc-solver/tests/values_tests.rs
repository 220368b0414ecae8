use super::*;
use crate::intern::TypeInterner;
use crate::types::{FieldInfo, RecordShape};

struct Fixture {
    interner: TypeInterner,
    heap: ValueHeap,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: TypeInterner::new(),
            heap: ValueHeap::new(),
        }
    }

    fn atom(&self, s: &str) -> Atom {
        self.interner.intern_string(s)
    }

    fn point_type(&self) -> TypeId {
        let shape = RecordShape::new(self.atom("Point"), Atom::NONE)
            .field(FieldInfo::new(self.atom("x"), TypeId::INT))
            .open(TypeId::INT);
        self.interner.record(shape).unwrap()
    }
}

#[test]
fn simple_values_are_typed_and_immutable() {
    let fx = Fixture::new();
    assert_eq!(type_of(&Value::Int(5), &fx.heap), Some(TypeId::INT));
    assert_eq!(type_of(&Value::string("hi"), &fx.heap), Some(TypeId::STRING));
    assert_eq!(type_of(&Value::Null, &fx.heap), Some(TypeId::NULL));
    assert_eq!(type_of(&Value::Byte(7), &fx.heap), Some(TypeId::BYTE));
    assert!(!is_mutable(&Value::Int(5), &fx.heap));
}

#[test]
fn containers_report_declared_type() {
    let mut fx = Fixture::new();
    let point = fx.point_type();
    let x = fx.atom("x");
    let value = fx
        .heap
        .alloc_record(&fx.interner, point, [(x, Value::Int(1))])
        .unwrap();
    assert_eq!(type_of(&value, &fx.heap), Some(point));
    assert!(is_mutable(&value, &fx.heap));

    let object = fx.heap.get(value.as_ref_id().unwrap()).unwrap();
    assert_eq!(object.kind(), ContainerKind::Record);
    assert_eq!(object.entries().unwrap().get(&x), Some(&Value::Int(1)));
}

#[test]
fn dangling_reference_has_no_type() {
    let fx = Fixture::new();
    let dangling = Value::Ref(RefId(42));
    assert_eq!(type_of(&dangling, &fx.heap), None);
    assert!(!is_mutable(&dangling, &fx.heap));
}

#[test]
fn alloc_checks_descriptor_kind() {
    let mut fx = Fixture::new();
    let err = fx
        .heap
        .alloc_record(&fx.interner, TypeId::INT, std::iter::empty())
        .unwrap_err();
    assert_eq!(
        err,
        ValueError::KindMismatch {
            type_id: TypeId::INT,
            expected: ContainerKind::Record,
        }
    );

    let map = fx.interner.map(TypeId::INT);
    assert!(fx.heap.alloc_array(&fx.interner, map, vec![]).is_err());
    assert!(fx.heap.alloc_map(&fx.interner, map, std::iter::empty()).is_ok());
    assert!(
        fx.heap
            .alloc_map(&fx.interner, TypeId::JSON, std::iter::empty())
            .is_ok()
    );
}

#[test]
fn fixed_size_arrays_and_tuples_keep_their_length() {
    let mut fx = Fixture::new();
    let fixed = fx.interner.fixed_array(TypeId::INT, 2);
    assert_eq!(
        fx.heap
            .alloc_array(&fx.interner, fixed, vec![Value::Int(1)])
            .unwrap_err(),
        ValueError::LengthMismatch {
            expected: 2,
            found: 1,
        }
    );
    let value = fx
        .heap
        .alloc_array(&fx.interner, fixed, vec![Value::Int(1), Value::Int(2)])
        .unwrap();
    let r = value.as_ref_id().unwrap();
    assert_eq!(
        fx.heap.push(r, Value::Int(3)),
        Err(ValueError::FixedLength(r))
    );
    fx.heap.set_element(r, 1, Value::Int(9)).unwrap();
    assert_eq!(
        fx.heap.get(r).unwrap().elements().unwrap(),
        &[Value::Int(1), Value::Int(9)]
    );

    let pair = fx.interner.tuple(vec![TypeId::INT, TypeId::STRING]);
    assert!(
        fx.heap
            .alloc_tuple(&fx.interner, pair, vec![Value::Int(1)])
            .is_err()
    );
}

#[test]
fn mutations_update_contents() {
    let mut fx = Fixture::new();
    let ints = fx.interner.array(TypeId::INT);
    let list = fx.heap.alloc_array(&fx.interner, ints, vec![]).unwrap();
    let r = list.as_ref_id().unwrap();
    fx.heap.push(r, Value::Int(1)).unwrap();
    fx.heap.push(r, Value::Int(2)).unwrap();
    assert_eq!(fx.heap.get(r).unwrap().len(), 2);
    assert_eq!(
        fx.heap.set_element(r, 5, Value::Int(0)),
        Err(ValueError::IndexOutOfBounds { index: 5, len: 2 })
    );

    let map_type = fx.interner.map(TypeId::INT);
    let (a, b) = (fx.atom("a"), fx.atom("b"));
    let map = fx
        .heap
        .alloc_map(&fx.interner, map_type, [(a, Value::Int(1)), (b, Value::Int(2))])
        .unwrap();
    let m = map.as_ref_id().unwrap();
    assert_eq!(
        fx.heap.set_entry(m, a, Value::Int(10)).unwrap(),
        Some(Value::Int(1))
    );
    assert_eq!(fx.heap.remove_entry(m, a).unwrap(), Some(Value::Int(10)));
    let keys: Vec<Atom> = fx.heap.get(m).unwrap().entries().unwrap().keys().copied().collect();
    assert_eq!(keys, vec![b]);

    assert!(matches!(
        fx.heap.push(m, Value::Int(1)),
        Err(ValueError::WrongContainer { .. })
    ));
}

#[test]
fn freeze_is_deep_and_blocks_mutation() {
    let mut fx = Fixture::new();
    let ints = fx.interner.array(TypeId::INT);
    let inner = fx
        .heap
        .alloc_array(&fx.interner, ints, vec![Value::Int(1)])
        .unwrap();
    let outer_type = fx.interner.array(ints);
    let outer = fx
        .heap
        .alloc_array(&fx.interner, outer_type, vec![inner.clone()])
        .unwrap();

    fx.heap.freeze(&outer).unwrap();
    assert!(!is_mutable(&outer, &fx.heap));
    assert!(!is_mutable(&inner, &fx.heap));

    let inner_ref = inner.as_ref_id().unwrap();
    assert_eq!(
        fx.heap.push(inner_ref, Value::Int(2)),
        Err(ValueError::Frozen(inner_ref))
    );
    // Freezing again is a no-op.
    fx.heap.freeze(&outer).unwrap();
    fx.heap.freeze(&Value::Int(3)).unwrap();
}

#[test]
fn freeze_terminates_on_self_containing_value() {
    let mut fx = Fixture::new();
    let map_type = fx.interner.map(TypeId::ANY);
    let map = fx
        .heap
        .alloc_map(&fx.interner, map_type, std::iter::empty())
        .unwrap();
    let r = map.as_ref_id().unwrap();
    let me = fx.atom("me");
    fx.heap.set_entry(r, me, map.clone()).unwrap();
    fx.heap.freeze(&map).unwrap();
    assert!(fx.heap.get(r).unwrap().is_frozen());
}

#[test]
fn literal_view_of_simple_values() {
    assert_eq!(Value::Int(3).as_literal(), Some(LiteralValue::Int(3)));
    assert_eq!(
        Value::string("a").as_literal(),
        Some(LiteralValue::String("a".into()))
    );
    assert_eq!(Value::Ref(RefId(0)).as_literal(), None);
    assert_eq!(Value::from(LiteralValue::Boolean(true)), Value::Boolean(true));
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}
