use pretty_assertions::assert_eq;
use serde_json::json;

use nestype::{
    expand_entries, get_nested, ContainerKinds, Error, FlatValue, Flattener, Mapping, NdArray,
    NestedType, Record, SetOrder, Step, TraversalConfig, TypeTag, Value, ValueSet,
};

/// `[1, 2, {'a': (3, 4), 'b': 'x'}]`
fn scenario_value() -> Value {
    Value::list(vec![
        Value::from(1),
        Value::from(2),
        Value::from(
            Mapping::sorted()
                .with("a", Value::tuple([3, 4]))
                .with("b", "x"),
        ),
    ])
}

/// A mixed structure touching every container kind and several leaf types.
fn experiment_record() -> Value {
    Value::from(
        Mapping::insertion()
            .with("name", "mnist-mlp")
            .with("seed", 1234)
            .with("weights", NdArray::new(vec![2, 3], vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap())
            .with(
                "layers",
                Value::list(vec![
                    Value::tuple(vec![Value::from("dense"), Value::from(128), Value::from(true)]),
                    Value::tuple(vec![Value::from("dense"), Value::from(10), Value::from(false)]),
                ]),
            )
            .with(
                "scores",
                Mapping::sorted().with("test", 0.97).with("train", 0.99).with("valid", Value::Null),
            )
            .with("tags", ValueSet::from_values(["baseline", "mlp"]))
            .with("optimizer", Record::new("Sgd").with_attr("lr", 0.01)),
    )
}

fn ordered_config() -> TraversalConfig {
    TraversalConfig::new().with_set_order(SetOrder::Canonical)
}

/// Scenario 1: schema and leaves of the reference value.
#[test]
fn test_schema_and_leaves_of_reference_value() {
    let nested = NestedType::from_sample(&scenario_value()).unwrap();
    assert_eq!(nested.schema().to_string(), "[int, int, {'a': (int, int), 'b': str}]");
    assert_eq!(
        nested.leaves_of(&scenario_value()).unwrap(),
        vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4), Value::from("x")]
    );
}

/// Scenarios 2-4: filling with good, mistyped and short leaf sequences.
#[test]
fn test_fill_scenarios() {
    let nested = NestedType::from_sample(&scenario_value()).unwrap();

    let filled = nested
        .fill(vec![Value::from(9), Value::from(9), Value::from(9), Value::from(9), Value::from("z")], true)
        .unwrap();
    assert_eq!(filled.to_string(), "[9, 9, {'a': (9, 9), 'b': 'z'}]");

    let err = nested.fill(vec![Value::from(9); 5], true).unwrap_err();
    assert_eq!(
        err,
        Error::SchemaMismatch {
            expected: TypeTag::Str,
            actual: TypeTag::Int,
            position: 4,
        }
    );

    let err = nested.fill(vec![Value::from(9); 3], true).unwrap_err();
    assert!(matches!(err, Error::InsufficientData { filled: 3, expected: 5 }));
}

/// Scenario 5: a shared sub-object is decomposed once and reported once.
#[test]
fn test_shared_sub_object_flattens_once() {
    let shared = Value::from(Mapping::sorted().with("w", 1.5).with("b", 0.5));
    let v = Value::list(vec![shared.clone(), Value::from("between"), shared.clone()]);

    let entries = Flattener::new().flatten(&v).unwrap();
    let rendered: Vec<String> = entries
        .iter()
        .map(|e| format!("{} = {}", e.path_string(), e.value))
        .collect();

    assert_eq!(rendered.len(), 4);
    assert_eq!(&rendered[..3], &["[0]['b'] = 0.5", "[0]['w'] = 1.5", "[1] = 'between'"]);
    assert_eq!(entries[3].path_string(), "[2]");
    assert_eq!(
        entries[3].value,
        FlatValue::AlreadySeen {
            address: shared.identity().unwrap()
        }
    );
    assert!(rendered[3].starts_with("[2] = Already seen object at 0x"));
}

/// Scenario 6: one float leaf is enough to make types differ.
#[test]
fn test_match_fails_on_single_leaf_type() {
    let float_sample = Value::list(vec![
        Value::from(1),
        Value::from(2),
        Value::from(
            Mapping::sorted()
                .with("a", Value::tuple(vec![Value::from(3.0), Value::from(4)]))
                .with("b", "x"),
        ),
    ]);
    let nested = NestedType::from_sample(&float_sample).unwrap();
    assert!(!nested.matches(&scenario_value()));

    match nested.check(&scenario_value()) {
        Err(Error::TypeMismatch { expected, actual }) => {
            assert_eq!(expected.to_string(), "[int, int, {'a': (float, int), 'b': str}]");
            assert_eq!(actual.to_string(), "[int, int, {'a': (int, int), 'b': str}]");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_round_trip_mixed_record() {
    let record = experiment_record();
    let nested = NestedType::from_sample_with(&record, ordered_config()).unwrap();

    let leaves = nested.leaves_of(&record).unwrap();
    assert_eq!(leaves.len(), nested.leaf_count());
    assert_eq!(nested.fill(leaves, true).unwrap(), record);
}

#[test]
fn test_descriptor_reused_across_values() {
    let nested = NestedType::from_sample_with(&experiment_record(), ordered_config()).unwrap();

    let mut leaves = nested.leaves_of(&experiment_record()).unwrap();
    leaves[1] = Value::from(99);
    let rebuilt = nested.fill(leaves, true).unwrap();

    assert!(nested.matches(&rebuilt));
    assert_ne!(rebuilt, experiment_record());
    assert_eq!(get_nested(&rebuilt, &[Step::from("seed")]).unwrap(), &Value::from(99));
}

#[test]
fn test_deterministic_mapping_order() {
    let a = Value::from(Mapping::sorted().with("lr", 0.1).with("epochs", 3).with("batch", 32));
    let b = Value::from(Mapping::sorted().with("batch", 32).with("lr", 0.1).with("epochs", 3));

    let nested_a = NestedType::from_sample(&a).unwrap();
    let nested_b = NestedType::from_sample(&b).unwrap();
    assert_eq!(nested_a, nested_b);
    assert_eq!(nested_a.leaves_of(&a).unwrap(), nested_b.leaves_of(&b).unwrap());
}

#[test]
fn test_sets_need_explicit_order_for_leaves() {
    let v = Value::list(vec![Value::from(ValueSet::from_values([3, 1, 2]))]);

    let unordered = NestedType::from_sample(&v).unwrap();
    assert!(unordered.matches(&v));
    assert!(matches!(unordered.leaves_of(&v), Err(Error::Ordering(_))));

    let ordered = NestedType::from_sample_with(&v, ordered_config()).unwrap();
    assert_eq!(
        ordered.leaves_of(&v).unwrap(),
        vec![Value::from(1), Value::from(2), Value::from(3)]
    );
}

#[test]
fn test_sequence_only_configuration() {
    let config = TraversalConfig::new().with_kinds(ContainerKinds::SEQUENCE);
    let v = Value::list(vec![Value::from(Mapping::sorted().with("a", 1)), Value::from(2)]);
    let nested = NestedType::from_sample_with(&v, config).unwrap();

    assert_eq!(nested.to_string(), "NestedType([map, int])");
    let leaves = nested.leaves_of(&v).unwrap();
    assert_eq!(leaves.len(), 2);
    assert_eq!(nested.fill(leaves, true).unwrap(), v);
}

#[test]
fn test_json_documents_round_trip() {
    let doc = json!({
        "model": {"hidden": [64, 32], "dropout": 0.5},
        "name": "run-7",
        "metrics": [{"epoch": 1, "loss": 0.9}, {"epoch": 2, "loss": 0.4}]
    });
    let v = Value::from_json(&doc).unwrap();
    let nested = NestedType::from_sample(&v).unwrap();

    let leaves = nested.leaves_of(&v).unwrap();
    assert_eq!(
        Value::from(leaves.clone()).to_json(),
        json!([1, 0.9, 2, 0.4, 0.5, 64, 32, "run-7"])
    );
    assert_eq!(nested.fill(leaves, true).unwrap().to_json(), doc);
}

#[test]
fn test_flatten_then_expand() {
    let doc = json!({"a": [1, {"b": "x"}], "c": {"d": true}});
    let v = Value::from_json(&doc).unwrap();

    let entries = Flattener::new().flatten(&v).unwrap();
    let paths: Vec<String> = entries.iter().map(|e| e.path_string()).collect();
    assert_eq!(paths, vec!["['a'][0]", "['a'][1]['b']", "['c']['d']"]);
    assert_eq!(expand_entries(&entries).unwrap().to_json(), doc);
}

#[test]
fn test_depth_guard_on_deep_input() {
    let mut v = Value::from(0);
    for _ in 0..40 {
        v = Value::list(vec![v]);
    }
    let config = TraversalConfig::new().with_max_depth(16);
    assert_eq!(
        NestedType::from_sample_with(&v, config).unwrap_err(),
        Error::DepthExceeded { limit: 16 }
    );
    assert!(NestedType::from_sample(&v).is_ok());
}

#[test]
fn test_set_descriptor_reused_on_other_matching_set() {
    let sample = Value::from(ValueSet::from_values(vec![
        Value::tuple(vec![Value::from(1), Value::from("a")]),
        Value::tuple(vec![Value::from(2), Value::from(3)]),
    ]));
    let other = Value::from(ValueSet::from_values(vec![
        Value::tuple(vec![Value::from(1), Value::from(5)]),
        Value::tuple(vec![Value::from(2), Value::from("b")]),
    ]));
    let nested = NestedType::from_sample_with(&sample, ordered_config()).unwrap();
    assert!(nested.matches(&other));

    let leaves = nested.leaves_of(&other).unwrap();
    assert_eq!(nested.fill(leaves, true).unwrap(), other);
}

#[test]
fn test_set_fill_never_loses_elements() {
    let nested =
        NestedType::from_sample_with(&Value::from(ValueSet::from_values([1, 2])), ordered_config()).unwrap();

    assert_eq!(
        nested.fill(vec![Value::from(9), Value::from(9)], true).unwrap_err(),
        Error::DuplicateSetElements { expected: 2, distinct: 1 }
    );
    let filled = nested.fill(vec![Value::from(9), Value::from(7)], true).unwrap();
    assert!(nested.matches(&filled));
}
