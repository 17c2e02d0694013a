use bucketview::path::{get, get_with_captures, validate, GetOptions, PathKey};
use bucketview::testing::{car, car_model, full_car, object};
use bucketview::{Duration, ModelField, ScalarType, Value};

fn json() -> GetOptions {
    GetOptions::as_json()
}

#[test]
fn test_literal_get_matches_direct_access() {
    let record = full_car();
    for path in ["name", "tyres.front.psi", "axles.rear.brand", "engine.litres", "extras.note"] {
        let got = get(&car_model(), &record, path, GetOptions::default()).unwrap();
        assert_eq!(Some(&got), record.lookup(path), "path {}", path);
    }
}

#[test]
fn test_sequence_index() {
    let got = get(&car_model(), &full_car(), "parts.1.name", GetOptions::default()).unwrap();
    assert_eq!(got, Value::from("wheel"));

    let out_of_range = get(&car_model(), &full_car(), "parts.9.name", GetOptions::default()).unwrap();
    assert_eq!(out_of_range, Value::Null);

    let err = get(&car_model(), &full_car(), "parts.first.name", GetOptions::default()).unwrap_err();
    assert!(err.is_invalid_modelpath());
}

#[test]
fn test_record_fan_keeps_keys() {
    let got = get(&car_model(), &full_car(), "tyres.*.psi", GetOptions::default()).unwrap();
    assert_eq!(
        got,
        object([("front", Value::Int(32)), ("rear", Value::Int(30))])
    );
}

#[test]
fn test_sequence_fan_keeps_length() {
    let got = get(&car_model(), &full_car(), "parts.*.cost", GetOptions::default()).unwrap();
    let items = got.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], Value::Decimal(_)));
    assert_eq!(items[1], Value::Null);
}

#[test]
fn test_undeclared_follow_on_in_dynamic_fan_is_absent() {
    let got = get(&car_model(), &full_car(), "tyres.*.pattern", GetOptions::default()).unwrap();
    assert_eq!(got, object([("front", Value::Null), ("rear", Value::Null)]));
}

#[test]
fn test_dynamic_fan_keeps_schema_errors_below_it() {
    let axle = |field: &str| ModelField::structure([(field, ModelField::int())]);
    let schema = ModelField::structure([(
        "cars",
        ModelField::record(ModelField::structure([("a", axle("psi")), ("b", axle("load"))])),
    )]);
    let record = object([(
        "cars",
        object([("x", object([("a", object([("psi", Value::Int(30))]))]))]),
    )]);

    for path in ["cars.*.*.psi", "cars.*.$5"] {
        let err = get(&schema, &record, path, GetOptions::default()).unwrap_err();
        assert!(err.is_invalid_modelpath(), "path {}", path);
    }
    assert_eq!(
        get(&schema, &record, "cars.*.a.pattern", GetOptions::default()).unwrap(),
        object([("x", Value::Null)])
    );
    assert_eq!(
        get(&schema, &record, "cars.*.a.psi", GetOptions::default()).unwrap(),
        object([("x", Value::Int(30))])
    );
}

#[test]
fn test_structure_fan() {
    let got = get(&car_model(), &full_car(), "axles.*.psi", GetOptions::default()).unwrap();
    assert_eq!(got, object([("front", Value::Int(33)), ("rear", Value::Int(34))]));
}

#[test]
fn test_trailing_wildcard_matches_plain_get() {
    let record = object([(
        "engine",
        object([
            ("kind", Value::from("electric")),
            ("kwh", Value::Int(75)),
            ("badge", Value::from("undeclared")),
        ]),
    )]);
    let plain = get(&car_model(), &record, "engine", GetOptions::default()).unwrap();
    let fanned = get(&car_model(), &record, "engine.*", GetOptions::default()).unwrap();
    assert_eq!(plain, fanned);
    assert_eq!(
        plain,
        object([("kind", Value::from("electric")), ("kwh", Value::Int(75))])
    );

    let axles = get(&car_model(), &full_car(), "axles", GetOptions::default()).unwrap();
    assert_eq!(axles, get(&car_model(), &full_car(), "axles.*", GetOptions::default()).unwrap());
}

#[test]
fn test_structure_fan_with_mismatched_children_is_invalid() {
    let schema = ModelField::structure([
        ("a", ModelField::structure([("x", ModelField::int())])),
        ("b", ModelField::structure([("y", ModelField::int())])),
    ]);
    let record = object([("a", object([("x", Value::Int(1))]))]);
    let err = get(&schema, &record, "*.x", GetOptions::default()).unwrap_err();
    assert!(err.is_invalid_modelpath());
}

#[test]
fn test_missing_data_is_absent_not_an_error() {
    let record = car(1, "plain", 1);
    for path in ["tyres.front.psi", "parts.0.name", "tag_ids.0", "engine.litres"] {
        let value = get(&car_model(), &record, path, GetOptions::default()).unwrap();
        assert_eq!(value, Value::Null, "path {}", path);
    }
    assert_eq!(
        get(&car_model(), &record, "tyres.*.psi", GetOptions::default()).unwrap(),
        Value::Null
    );
}

#[test]
fn test_schema_mismatch_is_invalid_modelpath() {
    let record = full_car();
    for path in ["wheels", "name.first", "price.*", "tyres.front.psi.low"] {
        let err = get(&car_model(), &record, path, GetOptions::default()).unwrap_err();
        assert!(err.is_invalid_modelpath(), "path {}", path);
    }
}

#[test]
fn test_data_mismatch_is_corrupted_data() {
    let record = object([("id", Value::Int(1)), ("tyres", Value::Int(5))]);
    let err = get(&car_model(), &record, "tyres.front.psi", GetOptions::default()).unwrap_err();
    assert!(err.is_corrupted_data());

    let record = object([("id", Value::from("one"))]);
    let err = get(&car_model(), &record, "id", GetOptions::default()).unwrap_err();
    assert!(err.is_corrupted_data());
}

#[test]
fn test_union_alternative_is_selected_by_shape() {
    let record = full_car();
    let litres = get(&car_model(), &record, "engine.litres", GetOptions::default()).unwrap();
    assert_eq!(litres, Value::Float(2.5));

    let electric = object([(
        "engine",
        object([("kind", Value::from("electric")), ("kwh", Value::Int(75))]),
    )]);
    let kwh = get(&car_model(), &electric, "engine.kwh", GetOptions::default()).unwrap();
    assert_eq!(kwh, Value::Int(75));

    let neither = object([("engine", object([("kind", Value::from("steam"))]))]);
    let err = get(&car_model(), &neither, "engine.kind", GetOptions::default()).unwrap_err();
    assert!(err.is_corrupted_data());
}

#[test]
fn test_any_field_is_schemaless() {
    let record = full_car();
    assert_eq!(
        get(&car_model(), &record, "extras.note", GetOptions::default()).unwrap(),
        Value::from("spare key")
    );
    assert_eq!(
        get(&car_model(), &record, "extras.*", GetOptions::default()).unwrap(),
        object([("note", Value::from("spare key"))])
    );
    assert_eq!(
        get(&car_model(), &record, "extras.missing.deeper", GetOptions::default()).unwrap(),
        Value::Null
    );
}

#[test]
fn test_back_reference_uses_inherited_captures() {
    let captures = [PathKey::Key("rear".to_string())];
    let got = get_with_captures(
        &car_model(),
        &full_car(),
        "pressures.$0",
        &captures,
        GetOptions::default(),
    )
    .unwrap();
    assert_eq!(got.into_value(), Value::Int(29));

    let err = get(&car_model(), &full_car(), "pressures.$0", GetOptions::default()).unwrap_err();
    assert!(err.is_invalid_modelpath());
}

#[test]
fn test_as_json_canonicalizes_special_scalars() {
    let record = full_car();
    let cases = [
        ("released", "2021-06-15", ScalarType::Date),
        ("registered_at", "2021-07-01T09:30:00Z", ScalarType::Datetime),
        ("warranty", "7 hours", ScalarType::Duration),
        ("price", "19999.99", ScalarType::Decimal),
        ("engine.serviced", "2023-01-02", ScalarType::Date),
    ];
    for (path, expected, scalar) in cases {
        let raw = get(&car_model(), &record, path, GetOptions::default()).unwrap();
        let text = get(&car_model(), &record, path, json()).unwrap();
        assert_eq!(text, Value::from(expected), "path {}", path);
        assert_eq!(scalar.parse_canonical(expected), Some(raw), "path {}", path);
    }

    let costs = get(&car_model(), &record, "parts.*.cost", json()).unwrap();
    assert_eq!(costs, Value::Array(vec![Value::from("120.10"), Value::Null]));
}

#[test]
fn test_as_json_handles_extreme_durations() {
    let schema = ModelField::structure([("span", ModelField::duration())]);
    let record = object([("span", Value::Duration(Duration::hours(i64::MIN)))]);
    let text = get(&schema, &record, "span", json()).unwrap();
    assert_eq!(text, Value::String(format!("{} hours", i64::MIN)));
}

#[test]
fn test_validate_returns_leaf_schema() {
    assert_eq!(validate(&car_model(), "axles.front.psi").unwrap(), Some(ModelField::int()));
    assert_eq!(validate(&car_model(), "axles.*.psi").unwrap(), Some(ModelField::int()));
    assert_eq!(validate(&car_model(), "extras.anything").unwrap(), None);
    assert!(validate(&car_model(), "axles.*.pattern").unwrap_err().is_invalid_modelpath());
}
