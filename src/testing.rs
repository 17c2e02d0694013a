//! Fixture buckets and records shared by unit and integration tests.
//!
//! * `car`: structures, records, sequences, a union and every special scalar; links
//!   to `color` (one) and `tag` (many)
//! * `color`, `tag`: small lookup buckets
//! * `order` / `order_item` / `product`: a composition link through a pivot bucket

use chrono::{NaiveDate, TimeZone, Utc};

use crate::graph::MemoryLoader;
use crate::schema::types::{GraphLink, InjectSource, ModelField, ViewField, ViewSchema};
use crate::schema::{Bucket, BucketRegistry};
use crate::value::{Duration, Object, Value};

/// Builds an object value.
pub fn object<I, K>(fields: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect::<Object>(),
    )
}

pub fn decimal(text: &str) -> Value {
    Value::parse_decimal(text).unwrap_or(Value::Null)
}

fn tyre_model() -> ModelField {
    ModelField::structure([
        ("psi", ModelField::int()),
        ("brand", ModelField::string().optional()),
    ])
}

fn engine_model() -> ModelField {
    ModelField::union([
        ModelField::structure([
            ("kind", ModelField::enumeration(["electric"])),
            ("kwh", ModelField::int()),
        ]),
        ModelField::structure([
            ("kind", ModelField::enumeration(["combustion"])),
            ("litres", ModelField::float()),
            ("serviced", ModelField::date().optional()),
        ]),
    ])
}

pub fn car_model() -> ModelField {
    ModelField::structure([
        ("id", ModelField::int()),
        ("name", ModelField::string()),
        ("color_id", ModelField::int().optional()),
        ("tag_ids", ModelField::sequence(ModelField::int()).optional()),
        ("released", ModelField::date().optional()),
        ("registered_at", ModelField::datetime().optional()),
        ("warranty", ModelField::duration().optional()),
        ("price", ModelField::decimal().optional()),
        ("tyres", ModelField::record(tyre_model()).optional()),
        ("pressures", ModelField::record(ModelField::int()).optional()),
        (
            "parts",
            ModelField::sequence(ModelField::structure([
                ("name", ModelField::string()),
                ("cost", ModelField::decimal().optional()),
            ]))
            .optional(),
        ),
        (
            "axles",
            ModelField::structure([("front", tyre_model()), ("rear", tyre_model())]).optional(),
        ),
        ("engine", engine_model().optional()),
        ("extras", ModelField::any().optional()),
    ])
}

/// The `car` bucket with its links and views.
pub fn car_bucket() -> Bucket {
    Bucket::new("car", car_model())
        .with_link("color", GraphLink::one("color").when("id", "color_id"))
        .with_link("tags", GraphLink::many("tag").when("id", "tag_ids"))
        .with_view(
            ViewSchema::new("summary")
                .field("id", ViewField::model("id"))
                .field("name", ViewField::model("name"))
                .field("color", ViewField::graph_view("color", "label")),
        )
        .with_view(
            ViewSchema::extend("detail", "summary")
                .field(
                    "name",
                    ViewField::computed(|ctx| match ctx.root.get("name") {
                        Some(Value::String(name)) => Value::String(name.to_uppercase()),
                        _ => Value::Null,
                    }),
                )
                .field("price", ViewField::model("price"))
                .field("released", ViewField::model("released"))
                .field("warranty", ViewField::model("warranty"))
                .field("tags", ViewField::graph_view("tags", "basic")),
        )
        .with_view(
            ViewSchema::new("tyres")
                .field("psi", ViewField::model("tyres.*.psi"))
                .field(
                    "checked",
                    ViewField::model("tyres.*").chain(ViewField::model("pressures.$0")),
                ),
        )
        .with_view(ViewSchema::new("ids").field("id", ViewField::model("id")))
        .with_view(
            ViewSchema::new("everything")
                .embed("ids")
                .field("registered_at", ViewField::model("registered_at"))
                .field("engine", ViewField::model("engine"))
                .field("parts", ViewField::model("parts"))
                .field("tyres", ViewField::model("tyres")),
        )
        .with_view(
            ViewSchema::new("flat")
                .inject(InjectSource::Root)
                .field("id", ViewField::computed(|ctx| ctx.root.get("id").cloned().into())),
        )
}

pub fn color_bucket() -> Bucket {
    Bucket::new(
        "color",
        ModelField::structure([("id", ModelField::int()), ("name", ModelField::string())]),
    )
    .with_view(
        ViewSchema::new("label")
            .field("id", ViewField::model("id"))
            .field("name", ViewField::model("name")),
    )
}

pub fn tag_bucket() -> Bucket {
    Bucket::new(
        "tag",
        ModelField::structure([("id", ModelField::int()), ("label", ModelField::string())]),
    )
    .with_view(ViewSchema::new("basic").field("label", ViewField::model("label")))
}

pub fn order_bucket() -> Bucket {
    Bucket::new(
        "order",
        ModelField::structure([("id", ModelField::int()), ("customer", ModelField::string())]),
    )
    .with_link(
        "products",
        GraphLink::many("product")
            .when("order_id", "id")
            .through("order_item", [("id", "product_id")]),
    )
    .with_view(
        ViewSchema::new("invoice")
            .field("customer", ViewField::model("customer"))
            .field("products", ViewField::graph_view("products", "card")),
    )
}

pub fn order_item_bucket() -> Bucket {
    Bucket::new(
        "order_item",
        ModelField::structure([
            ("order_id", ModelField::int()),
            ("product_id", ModelField::int()),
            ("quantity", ModelField::int()),
        ]),
    )
}

pub fn product_bucket() -> Bucket {
    Bucket::new(
        "product",
        ModelField::structure([
            ("id", ModelField::int()),
            ("title", ModelField::string()),
            ("price", ModelField::decimal()),
        ]),
    )
    .with_view(
        ViewSchema::new("card")
            .field("title", ViewField::model("title"))
            .field("price", ViewField::model("price")),
    )
}

/// Registry with every fixture bucket.
pub fn registry() -> BucketRegistry {
    BucketRegistry::new()
        .with(car_bucket())
        .with(color_bucket())
        .with(tag_bucket())
        .with(order_bucket())
        .with(order_item_bucket())
        .with(product_bucket())
}

pub fn color(id: i64, name: &str) -> Value {
    object([("id", Value::Int(id)), ("name", Value::from(name))])
}

pub fn tag(id: i64, label: &str) -> Value {
    object([("id", Value::Int(id)), ("label", Value::from(label))])
}

/// A minimal car: id, name and color.
pub fn car(id: i64, name: &str, color_id: i64) -> Value {
    object([
        ("id", Value::Int(id)),
        ("name", Value::from(name)),
        ("color_id", Value::Int(color_id)),
    ])
}

/// A car with every field filled in.
pub fn full_car() -> Value {
    let tyre = |psi: i64, brand: &str| object([("psi", Value::Int(psi)), ("brand", Value::from(brand))]);
    let released = NaiveDate::from_ymd_opt(2021, 6, 15).map(Value::Date).unwrap_or_default();
    let registered = Utc
        .with_ymd_and_hms(2021, 7, 1, 9, 30, 0)
        .single()
        .map(Value::DateTime)
        .unwrap_or_default();
    object([
        ("id", Value::Int(7)),
        ("name", Value::from("roadster")),
        ("color_id", Value::Int(2)),
        ("tag_ids", Value::Array(vec![Value::Int(1), Value::Int(3)])),
        ("released", released),
        ("registered_at", registered),
        ("warranty", Value::Duration(Duration::hours(7))),
        ("price", decimal("19999.99")),
        (
            "tyres",
            object([("front", tyre(32, "grip")), ("rear", tyre(30, "grip"))]),
        ),
        ("pressures", object([("front", Value::Int(31)), ("rear", Value::Int(29))])),
        (
            "parts",
            Value::Array(vec![
                object([("name", Value::from("seat")), ("cost", decimal("120.10"))]),
                object([("name", Value::from("wheel"))]),
            ]),
        ),
        (
            "axles",
            object([("front", tyre(33, "axle")), ("rear", tyre(34, "axle"))]),
        ),
        (
            "engine",
            object([
                ("kind", Value::from("combustion")),
                ("litres", Value::Float(2.5)),
                (
                    "serviced",
                    NaiveDate::from_ymd_opt(2023, 1, 2).map(Value::Date).unwrap_or_default(),
                ),
            ]),
        ),
        ("extras", object([("note", Value::from("spare key"))])),
    ])
}

pub fn colors() -> Vec<Value> {
    vec![color(1, "red"), color(2, "green"), color(3, "blue")]
}

pub fn tags() -> Vec<Value> {
    vec![tag(1, "fast"), tag(2, "cheap"), tag(3, "classic")]
}

/// Loader with colors, tags, products and order items.
pub fn loader() -> MemoryLoader {
    let item = |order: i64, product: i64, quantity: i64| {
        object([
            ("order_id", Value::Int(order)),
            ("product_id", Value::Int(product)),
            ("quantity", Value::Int(quantity)),
        ])
    };
    let product = |id: i64, title: &str, price: &str| {
        object([
            ("id", Value::Int(id)),
            ("title", Value::from(title)),
            ("price", decimal(price)),
        ])
    };
    MemoryLoader::new()
        .with_records("color", colors())
        .with_records("tag", tags())
        .with_records("order_item", vec![item(1, 10, 2), item(1, 11, 1), item(2, 10, 5)])
        .with_records(
            "product",
            vec![product(10, "lamp", "12.50"), product(11, "desk", "149.00")],
        )
}
