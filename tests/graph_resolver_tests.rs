use bucketview::graph::{GraphError, GraphResolver};
use bucketview::testing::{self, car, loader, object};
use bucketview::{GraphLink, MemoryLoader, Value};

#[tokio::test]
async fn test_one_link_resolves_first_match() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();

    let related = resolver.resolve(cars, "color", &car(1, "a", 2)).await.unwrap();
    assert_eq!(related, testing::color(2, "green"));
}

#[tokio::test]
async fn test_one_link_without_match_is_absent() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();

    let related = resolver.resolve(cars, "color", &car(1, "a", 4)).await.unwrap();
    assert_eq!(related, Value::Null);
}

#[tokio::test]
async fn test_many_link_matches_any_of_array_condition() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();

    let tags = resolver.resolve_many(cars, "tags", &testing::full_car()).await.unwrap();
    assert_eq!(tags, vec![testing::tag(1, "fast"), testing::tag(3, "classic")]);

    let none = resolver.resolve(cars, "tags", &car(2, "b", 1)).await.unwrap();
    assert_eq!(none, Value::Array(vec![]));
}

#[tokio::test]
async fn test_literal_condition() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = testing::car_bucket().with_link("blue", GraphLink::one("color").when_eq("name", "blue"));

    let related = resolver.resolve(&cars, "blue", &car(1, "a", 1)).await.unwrap();
    assert_eq!(related, testing::color(3, "blue"));
}

#[tokio::test]
async fn test_composition_goes_through_pivot() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let orders = registry.get("order").unwrap();
    let order = object([("id", Value::Int(1)), ("customer", Value::from("ada"))]);

    let products = resolver.resolve_many(orders, "products", &order).await.unwrap();
    let titles: Vec<_> = products.iter().filter_map(|p| p.get("title")).cloned().collect();
    assert_eq!(titles, vec![Value::from("lamp"), Value::from("desk")]);
    assert_eq!(loader.calls_for("order_item"), 1);
    assert_eq!(loader.calls_for("product"), 2);
}

#[tokio::test]
async fn test_identical_fetches_are_issued_once() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();

    for id in 0..5 {
        resolver.resolve(cars, "color", &car(id, "x", 1)).await.unwrap();
    }
    assert_eq!(loader.call_count(), 1);
    assert_eq!(resolver.distinct_fetches(), 1);
}

#[tokio::test]
async fn test_batch_fetches_each_distinct_key_once_in_order() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader).with_max_concurrent_fetches(2);
    let cars = registry.get("car").unwrap();
    let records: Vec<Value> = [1, 2, 1, 3, 2, 4, 1]
        .iter()
        .enumerate()
        .map(|(i, color)| car(i as i64, "x", *color))
        .collect();

    let related = resolver.resolve_one_batch(cars, "color", &records).await.unwrap();
    assert_eq!(loader.call_count(), 4);
    let names: Vec<_> = related.iter().map(|c| c.get("name").cloned()).collect();
    assert_eq!(
        names,
        vec![
            Some(Value::from("red")),
            Some(Value::from("green")),
            Some(Value::from("red")),
            Some(Value::from("blue")),
            Some(Value::from("green")),
            None,
            Some(Value::from("red")),
        ]
    );
}

#[tokio::test]
async fn test_batch_of_many_links() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();
    let records = vec![testing::full_car(), car(2, "b", 1), testing::full_car()];

    let related = resolver.resolve_many_batch(cars, "tags", &records).await.unwrap();
    assert_eq!(related.len(), 3);
    assert_eq!(related[0].len(), 2);
    assert!(related[1].is_empty());
    assert_eq!(related[0], related[2]);
    assert_eq!(loader.call_count(), 2);
}

#[tokio::test]
async fn test_unknown_link_is_an_error() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();

    let err = resolver.resolve(cars, "owner", &car(1, "a", 1)).await.unwrap_err();
    assert_eq!(err, GraphError::link_not_found("car", "owner"));
}

#[tokio::test]
async fn test_loader_failure_is_reported() {
    let registry = testing::registry();
    let loader = MemoryLoader::new().failing("color");
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();

    let err = resolver.resolve(cars, "color", &car(1, "a", 1)).await.unwrap_err();
    assert!(matches!(err, GraphError::Loader { ref bucket, .. } if bucket == "color"));
}

#[tokio::test]
async fn test_condition_path_error_is_reported() {
    let registry = testing::registry();
    let loader = loader();
    let resolver = GraphResolver::new(&registry, &loader);
    let cars = registry.get("car").unwrap();
    let broken = object([("id", Value::Int(1)), ("color_id", Value::from("red"))]);

    let err = resolver.resolve(cars, "color", &broken).await.unwrap_err();
    assert!(matches!(err, GraphError::Path(ref e) if e.is_corrupted_data()));
    assert_eq!(loader.call_count(), 0);
}
