use bucketview::testing::{self, car, full_car, loader, object};
use bucketview::view::{build_view, BuildOptions, Projected, Records, ViewBuilder, ViewError};
use bucketview::{
    Bucket, BucketRegistry, InjectSource, MemoryLoader, ScalarType, Value, ViewEntry, ViewField,
    ViewSchema,
};

fn registry_with(bucket: Bucket) -> BucketRegistry {
    let mut registry = testing::registry();
    registry.register(bucket);
    registry
}

fn marked(view: &str, fields: Vec<(&str, Value)>) -> Value {
    let mut fields = fields;
    fields.push(("$v", Value::from(view)));
    object(fields)
}

#[tokio::test]
async fn test_summary_view_with_related_record() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "summary", &car(1, "coupe", 2)).await.unwrap();
    assert_eq!(
        built,
        marked(
            "summary",
            vec![
                ("id", Value::Int(1)),
                ("name", Value::from("coupe")),
                (
                    "color",
                    marked("label", vec![("id", Value::Int(2)), ("name", Value::from("green"))]),
                ),
            ],
        )
    );
}

#[tokio::test]
async fn test_unmatched_one_link_projects_null() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "summary", &car(1, "coupe", 4)).await.unwrap();
    assert_eq!(built.get("color"), Some(&Value::Null));
}

#[tokio::test]
async fn test_extended_view_is_union_of_fields() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "detail", &full_car()).await.unwrap();
    let keys: Vec<&str> = built.as_object().unwrap().keys().map(String::as_str).collect();
    for key in ["id", "name", "color", "price", "released", "warranty", "tags", "$v"] {
        assert!(keys.contains(&key), "missing {}", key);
    }
    assert_eq!(keys.len(), 8);
    assert_eq!(built.get("name"), Some(&Value::from("ROADSTER")));
    assert_eq!(built.get("$v"), Some(&Value::from("detail")));

    let tags = built.get("tags").and_then(Value::as_array).unwrap();
    assert_eq!(
        tags,
        &vec![
            marked("basic", vec![("label", Value::from("fast"))]),
            marked("basic", vec![("label", Value::from("classic"))]),
        ]
    );
}

#[tokio::test]
async fn test_serialized_output_round_trips() {
    let registry = testing::registry();
    let loader = loader();
    let raw = ViewBuilder::new(&registry, &loader)
        .build("car", "detail", &full_car())
        .await
        .unwrap();
    let serialized = ViewBuilder::new(&registry, &loader)
        .with_options(BuildOptions::serialized())
        .build("car", "detail", &full_car())
        .await
        .unwrap();

    let cases = [
        ("price", ScalarType::Decimal),
        ("released", ScalarType::Date),
        ("warranty", ScalarType::Duration),
    ];
    for (field, scalar) in cases {
        let text = serialized.get(field).and_then(Value::as_str).unwrap();
        assert_eq!(scalar.parse_canonical(text).as_ref(), raw.get(field), "field {}", field);
    }
    assert_eq!(serialized.get("released"), Some(&Value::from("2021-06-15")));
}

#[tokio::test]
async fn test_serialized_output_canonicalizes_nested_scalars() {
    let registry = testing::registry();
    let loader = loader();
    let serialized = ViewBuilder::new(&registry, &loader)
        .with_options(BuildOptions::serialized())
        .build("car", "everything", &full_car())
        .await
        .unwrap();

    let serviced = serialized.lookup("engine.serviced").and_then(Value::as_str).unwrap();
    assert_eq!(serviced, "2023-01-02");
    assert_eq!(
        ScalarType::Date.parse_canonical(serviced).as_ref(),
        full_car().lookup("engine.serviced")
    );
    assert_eq!(
        serialized.get("registered_at"),
        Some(&Value::from("2021-07-01T09:30:00Z"))
    );
    assert_eq!(serialized.lookup("parts.0.cost"), Some(&Value::from("120.10")));
}

#[tokio::test]
async fn test_wildcard_fields_and_chain_with_back_reference() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "tyres", &full_car()).await.unwrap();
    assert_eq!(
        built.get("psi"),
        Some(&object([("front", Value::Int(32)), ("rear", Value::Int(30))]))
    );
    assert_eq!(
        built.get("checked"),
        Some(&object([("front", Value::Int(31)), ("rear", Value::Int(29))]))
    );
}

#[tokio::test]
async fn test_embedded_view_fields_are_inlined() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "everything", &full_car()).await.unwrap();
    assert_eq!(built.get("id"), Some(&Value::Int(7)));
    assert_eq!(built.get("$v"), Some(&Value::from("everything")));
    assert_eq!(built.get("tyres"), full_car().get("tyres"));
}

#[tokio::test]
async fn test_injected_root_fields() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "flat", &car(1, "coupe", 2)).await.unwrap();
    assert_eq!(
        built,
        marked(
            "flat",
            vec![
                ("id", Value::Int(1)),
                ("name", Value::from("coupe")),
                ("color_id", Value::Int(2)),
            ],
        )
    );
}

#[tokio::test]
async fn test_field_modifiers() {
    let bucket = testing::car_bucket().with_view(
        ViewSchema::new("modifiers")
            .field("color_name", ViewField::graph("color").pick("name"))
            .field(
                "tag_labels",
                ViewField::graph("tags").map(ViewField::computed(|ctx| {
                    ctx.value.get("label").cloned().into()
                })),
            )
            .field("tags_by_id", ViewField::graph("tags").as_dict("id"))
            .field(
                "psi_by_side",
                ViewField::model("tyres").obj(ViewField::computed(|ctx| {
                    ctx.value.get("psi").cloned().into()
                })),
            )
            .field(
                "shout",
                ViewField::model("name").transform(|value, _| match value {
                    Value::String(name) => Value::String(format!("{}!", name)),
                    other => other,
                }),
            )
            .field(
                "part_labels",
                ViewField::model_with(
                    "parts.*",
                    vec![ViewEntry::field("label", ViewField::model("name"))],
                ),
            ),
    );
    let registry = registry_with(bucket);
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "modifiers", &full_car()).await.unwrap();
    assert_eq!(built.get("color_name"), Some(&Value::from("green")));
    assert_eq!(
        built.get("tag_labels"),
        Some(&Value::Array(vec![Value::from("fast"), Value::from("classic")]))
    );
    assert_eq!(
        built.get("tags_by_id"),
        Some(&object([
            ("1", testing::tag(1, "fast")),
            ("3", testing::tag(3, "classic")),
        ]))
    );
    assert_eq!(
        built.get("psi_by_side"),
        Some(&object([("front", Value::Int(32)), ("rear", Value::Int(30))]))
    );
    assert_eq!(built.get("shout"), Some(&Value::from("roadster!")));
    assert_eq!(
        built.get("part_labels"),
        Some(&Value::Array(vec![
            object([("label", Value::from("seat"))]),
            object([("label", Value::from("wheel"))]),
        ]))
    );
}

#[tokio::test]
async fn test_graph_continuations_resolve_against_related_bucket() {
    let bucket = testing::car_bucket().with_view(
        ViewSchema::new("related_paths")
            .field("labels", ViewField::graph("tags").map(ViewField::model("label")))
            .field("color_name", ViewField::graph("color").chain(ViewField::model("name")))
            .field(
                "labels_by_index",
                ViewField::graph("tags").obj(ViewField::model("label")),
            ),
    );
    let registry = registry_with(bucket);
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "related_paths", &full_car()).await.unwrap();
    assert_eq!(
        built.get("labels"),
        Some(&Value::Array(vec![Value::from("fast"), Value::from("classic")]))
    );
    assert_eq!(built.get("color_name"), Some(&Value::from("green")));
    assert_eq!(
        built.get("labels_by_index"),
        Some(&object([("0", Value::from("fast")), ("1", Value::from("classic"))]))
    );

    let unmatched = builder.build("car", "related_paths", &car(2, "van", 9)).await.unwrap();
    assert_eq!(unmatched.get("labels"), Some(&Value::Array(vec![])));
    assert_eq!(unmatched.get("color_name"), Some(&Value::Null));
}

#[tokio::test]
async fn test_map_over_scalar_is_invalid_view() {
    let bucket = testing::car_bucket().with_view(
        ViewSchema::new("bad_map")
            .field("letters", ViewField::model("name").map(ViewField::model("id"))),
    );
    let registry = registry_with(bucket);
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let err = builder.build("car", "bad_map", &car(1, "coupe", 1)).await.unwrap_err();
    assert!(matches!(err, ViewError::InvalidView { .. }));
}

#[tokio::test]
async fn test_view_cycle_is_invalid_view() {
    let bucket = testing::car_bucket()
        .with_view(ViewSchema::extend("loop_a", "loop_b"))
        .with_view(ViewSchema::new("loop_b").embed("loop_a"));
    let registry = registry_with(bucket);
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let err = builder.build("car", "loop_a", &car(1, "coupe", 1)).await.unwrap_err();
    assert!(matches!(err, ViewError::InvalidView { .. }), "{}", err);
}

#[tokio::test]
async fn test_unknown_view_and_bucket() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let err = builder.build("car", "nope", &car(1, "a", 1)).await.unwrap_err();
    assert!(matches!(err, ViewError::ViewNotFound { .. }));
    let err = builder.build("boat", "summary", &car(1, "a", 1)).await.unwrap_err();
    assert_eq!(err, ViewError::BucketNotFound("boat".to_string()));
}

#[tokio::test]
async fn test_batch_fetches_each_distinct_key_once() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);
    let records: Vec<Value> = [1, 2, 1, 3, 2, 4, 1]
        .iter()
        .enumerate()
        .map(|(i, color)| car(i as i64, "x", *color))
        .collect();

    let built = builder.build_many("car", "summary", &records).await;
    assert_eq!(built.len(), records.len());
    assert_eq!(loader.calls_for("color"), 4);
    for (record, result) in records.iter().zip(&built) {
        let projected = result.as_ref().unwrap();
        assert_eq!(projected.get("id"), record.get("id"));
    }
    assert_eq!(built[5].as_ref().unwrap().get("color"), Some(&Value::Null));
}

#[tokio::test]
async fn test_batch_failure_is_isolated() {
    let registry = testing::registry();
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);
    let broken = object([
        ("id", Value::Int(2)),
        ("name", Value::Int(42)),
        ("color_id", Value::Int(1)),
    ]);
    let records = vec![car(1, "a", 1), broken, car(3, "c", 3)];

    let built = builder.build_many("car", "summary", &records).await;
    assert!(built[0].is_ok());
    assert!(matches!(&built[1], Err(ViewError::Path(e)) if e.is_corrupted_data()));
    assert!(built[2].is_ok());
}

#[tokio::test]
async fn test_loader_failure_surfaces_per_record() {
    let registry = testing::registry();
    let loader = MemoryLoader::new().failing("color");
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder
        .build_many("car", "summary", &[car(1, "a", 1), car(2, "b", 2)])
        .await;
    assert!(built.iter().all(|result| matches!(result, Err(ViewError::Graph(_)))));
}

#[tokio::test]
async fn test_composition_view() {
    let registry = testing::registry();
    let loader = loader();
    let order = object([("id", Value::Int(1)), ("customer", Value::from("ada"))]);

    let built = build_view(
        &registry,
        &loader,
        "order",
        "invoice",
        Records::One(&order),
        BuildOptions::serialized(),
    )
    .await
    .unwrap()
    .into_one()
    .unwrap();

    assert_eq!(
        built.get("products"),
        Some(&Value::Array(vec![
            marked("card", vec![("title", Value::from("lamp")), ("price", Value::from("12.50"))]),
            marked("card", vec![("title", Value::from("desk")), ("price", Value::from("149.00"))]),
        ]))
    );
}

#[tokio::test]
async fn test_build_view_batch_keeps_order() {
    let registry = testing::registry();
    let loader = loader();
    let records = vec![car(1, "a", 3), car(2, "b", 1)];

    let projected = build_view(
        &registry,
        &loader,
        "car",
        "summary",
        Records::Many(&records),
        BuildOptions::default(),
    )
    .await
    .unwrap();
    let Projected::Many(results) = projected else {
        panic!("expected a batch result");
    };
    let colors: Vec<_> = results
        .iter()
        .map(|r| r.as_ref().unwrap().lookup("color.name").cloned())
        .collect();
    assert_eq!(colors, vec![Some(Value::from("blue")), Some(Value::from("red"))]);
}

#[tokio::test]
async fn test_custom_view_marker() {
    let registry = testing::registry();
    let loader = loader();
    let options = BuildOptions {
        view_marker: "_view".to_string(),
        ..BuildOptions::default()
    };
    let builder = ViewBuilder::new(&registry, &loader).with_options(options);

    let built = builder.build("car", "ids", &car(1, "a", 1)).await.unwrap();
    assert_eq!(built, object([("id", Value::Int(1)), ("_view", Value::from("ids"))]));
}

#[tokio::test]
async fn test_injected_source_in_subfields() {
    let bucket = testing::car_bucket().with_view(ViewSchema::new("axle_copy").field(
        "axles",
        ViewField::model_with("axles.*", vec![ViewEntry::inject(InjectSource::Current)]),
    ));
    let registry = registry_with(bucket);
    let loader = loader();
    let builder = ViewBuilder::new(&registry, &loader);

    let built = builder.build("car", "axle_copy", &full_car()).await.unwrap();
    assert_eq!(built.get("axles"), full_car().get("axles"));
}
