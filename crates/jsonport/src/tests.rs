// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests for the conversion engine.

use super::*;

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use serde_json::json;

fn user_port() -> JsonPort {
    let mut port = JsonPort::new();
    port.register_record(
        RecordBuilder::new("User")
            .field("name", TypeExpr::Str)
            .field("age", TypeExpr::Int)
            .build(),
    )
    .unwrap();
    port
}

fn john() -> Value {
    Value::record(
        "User",
        [("name", Value::from("John")), ("age", Value::from(30i64))],
    )
}

#[test]
fn test_user_roundtrip() {
    let port = user_port();

    let wire = port.dump(&john()).unwrap();
    assert_eq!(wire, json!({"name": "John", "age": 30}));

    let back = port.load(&wire, &TypeExpr::named("User")).unwrap();
    assert_eq!(back, john());
}

#[test]
fn test_missing_required_field_names_it() {
    let port = user_port();
    let err = port
        .load(&json!({"name": "John"}), &TypeExpr::named("User"))
        .unwrap_err();
    assert_eq!(
        err,
        DeserializationError::MissingField {
            object_type: "User".to_string(),
            field: "age".to_string(),
        }
    );
}

#[test]
fn test_type_mismatch_carries_expected_and_value() {
    let port = user_port();
    let err = port
        .load(&json!({"name": "John", "age": "thirty"}), &TypeExpr::named("User"))
        .unwrap_err();
    assert_eq!(
        err,
        DeserializationError::TypeMismatch {
            expected: "int".to_string(),
            value: json!("thirty"),
        }
    );
}

#[test]
fn test_unknown_keys_are_ignored() {
    let port = user_port();
    let wire = json!({"name": "John", "age": 30, "nickname": "Johnny"});
    let back = port.load(&wire, &TypeExpr::named("User")).unwrap();
    assert_eq!(back, john());
}

#[test]
fn test_field_defaults_apply_on_load() {
    let mut port = JsonPort::new();
    port.register_record(
        RecordBuilder::new("Config")
            .field("host", TypeExpr::Str)
            .field_default("port", TypeExpr::Int, Value::Int(8080))
            .optional_field("comment", TypeExpr::Str)
            .build(),
    )
    .unwrap();

    let back = port
        .load(&json!({"host": "localhost"}), &TypeExpr::named("Config"))
        .unwrap();
    let record = back.as_record().unwrap();
    assert_eq!(record.get("port"), Some(Value::Int(8080)));
    assert_eq!(record.get("comment"), Some(Value::Null));
}

#[test]
fn test_enum_roundtrip_and_unknown_value() {
    let mut port = JsonPort::new();
    port.register_enum(
        EnumBuilder::new("Role")
            .member("ADMIN", "admin")
            .member("USER", "user")
            .member("MODERATOR", "moderator")
            .build(),
    )
    .unwrap();

    for member in ["ADMIN", "USER", "MODERATOR"] {
        let value = Value::enum_member("Role", member);
        let wire = port.dump(&value).unwrap();
        let back = port.load(&wire, &TypeExpr::named("Role")).unwrap();
        assert_eq!(back, value);
    }

    let err = port
        .load(&json!("root"), &TypeExpr::named("Role"))
        .unwrap_err();
    assert!(matches!(err, DeserializationError::UnknownEnumValue { .. }));
}

#[test]
fn test_numeric_enum_and_duplicate_value_tiebreak() {
    let mut port = JsonPort::new();
    port.register_enum(
        EnumBuilder::new("Status")
            .member("OK", 200)
            .member("FOUND", 200)
            .member("NOT_FOUND", 404)
            .build(),
    )
    .unwrap();

    let wire = port.dump(&Value::enum_member("Status", "FOUND")).unwrap();
    assert_eq!(wire, json!(200));

    // The reverse direction belongs to the first declared member.
    let back = port.load(&json!(200), &TypeExpr::named("Status")).unwrap();
    assert_eq!(back, Value::enum_member("Status", "OK"));
}

#[test]
fn test_optional_roundtrip() {
    let port = JsonPort::new();
    let expr = TypeExpr::optional(TypeExpr::Int);

    let wire = port.dump_as(&Value::Null, &expr).unwrap();
    assert_eq!(wire, json!(null));
    assert_eq!(port.load(&json!(null), &expr).unwrap(), Value::Null);
    assert_eq!(port.load(&json!(7), &expr).unwrap(), Value::Int(7));
}

#[test]
fn test_union_declared_order_wins() {
    let port = JsonPort::new();
    let expr = TypeExpr::union(vec![TypeExpr::Int, TypeExpr::Str]);

    // "5" must stay a string, not coerce to the int alternative.
    assert_eq!(port.load(&json!("5"), &expr).unwrap(), Value::from("5"));
    assert_eq!(port.load(&json!(5), &expr).unwrap(), Value::Int(5));

    let err = port.load(&json!(true), &expr).unwrap_err();
    assert!(matches!(err, DeserializationError::NoUnionMatch { .. }));
}

#[test]
fn test_union_over_records_dispatches_by_name() {
    let mut port = JsonPort::new();
    port.register_record(
        RecordBuilder::new("Cat")
            .field("meows", TypeExpr::Bool)
            .build(),
    )
    .unwrap();
    port.register_record(
        RecordBuilder::new("Dog")
            .field("barks", TypeExpr::Bool)
            .build(),
    )
    .unwrap();

    let expr = TypeExpr::union(vec![TypeExpr::named("Cat"), TypeExpr::named("Dog")]);
    let dog = Value::record("Dog", [("barks", Value::from(true))]);

    let wire = port.dump_as(&dog, &expr).unwrap();
    assert_eq!(wire, json!({"barks": true}));

    let back = port.load(&wire, &expr).unwrap();
    // Cat is tried first and fails on its missing field; Dog matches.
    assert_eq!(back, dog);
}

#[test]
fn test_circular_reference_direct() {
    let mut port = JsonPort::new();
    port.register_record(
        RecordBuilder::new("Node")
            .field("label", TypeExpr::Str)
            .optional_field("next", TypeExpr::named("Node"))
            .build(),
    )
    .unwrap();

    let node = Arc::new(RecordValue::with_fields(
        "Node",
        [("label", Value::from("a"))],
    ));
    node.set("next", Value::Record(node.clone()));

    let err = port.dump(&Value::Record(node.clone())).unwrap_err();
    assert_eq!(
        err,
        SerializationError::CircularReference {
            object_type: "Node".to_string(),
        }
    );

    node.set("next", Value::Null);
}

#[test]
fn test_circular_reference_transitive() {
    let mut port = JsonPort::new();
    port.register_record(
        RecordBuilder::new("Node")
            .field("label", TypeExpr::Str)
            .optional_field("next", TypeExpr::named("Node"))
            .build(),
    )
    .unwrap();

    let a = Arc::new(RecordValue::with_fields("Node", [("label", Value::from("a"))]));
    let b = Arc::new(RecordValue::with_fields("Node", [("label", Value::from("b"))]));
    a.set("next", Value::Record(b.clone()));
    b.set("next", Value::Record(a.clone()));

    let err = port.dump(&Value::Record(a.clone())).unwrap_err();
    assert!(matches!(err, SerializationError::CircularReference { .. }));

    a.set("next", Value::Null);
    b.set("next", Value::Null);
}

#[test]
fn test_acyclic_linked_list_roundtrips() {
    let mut port = JsonPort::new();
    port.register_record(
        RecordBuilder::new("Node")
            .field("label", TypeExpr::Str)
            .optional_field("next", TypeExpr::named("Node"))
            .build(),
    )
    .unwrap();

    let tail = Value::record("Node", [("label", Value::from("tail")), ("next", Value::Null)]);
    let head = Value::record("Node", [("label", Value::from("head")), ("next", tail)]);

    let wire = port.dump(&head).unwrap();
    assert_eq!(
        wire,
        json!({"label": "head", "next": {"label": "tail", "next": null}})
    );

    let back = port.load(&wire, &TypeExpr::named("Node")).unwrap();
    assert_eq!(back, head);
}

#[test]
fn test_datetime_roundtrip_forms() {
    let port = JsonPort::new();

    let naive = NaiveDate::from_ymd_opt(2025, 1, 14)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    let wire = port.dump(&Value::from(naive)).unwrap();
    assert_eq!(wire, json!("2025-01-14T10:30:00"));
    assert_eq!(
        port.load(&wire, &TypeExpr::DateTime).unwrap(),
        Value::from(naive)
    );

    let zoned = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 14, 10, 30, 0)
        .unwrap();
    let wire = port.dump(&Value::from(zoned)).unwrap();
    assert_eq!(wire, json!("2025-01-14T10:30:00+01:00"));
    assert_eq!(
        port.load(&wire, &TypeExpr::DateTime).unwrap(),
        Value::from(zoned)
    );

    let err = port
        .load(&json!("yesterday"), &TypeExpr::DateTime)
        .unwrap_err();
    assert!(matches!(err, DeserializationError::InvalidDateTime { .. }));
}

#[test]
fn test_date_and_time_wire_forms() {
    let port = JsonPort::new();

    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    assert_eq!(port.dump(&Value::from(date)).unwrap(), json!("2025-06-01"));

    let time = chrono::NaiveTime::from_hms_micro_opt(23, 59, 59, 250_000).unwrap();
    let wire = port.dump(&Value::from(time)).unwrap();
    assert_eq!(wire, json!("23:59:59.250000"));
    assert_eq!(port.load(&wire, &TypeExpr::Time).unwrap(), Value::from(time));
}

#[test]
fn test_set_roundtrip_ignores_order_and_duplicates() {
    let port = JsonPort::new();
    let expr = TypeExpr::set(TypeExpr::Str);

    let value = Value::Set(vec![Value::from("rust"), Value::from("json")]);
    let wire = port.dump_as(&value, &expr).unwrap();
    let back = port.load(&wire, &expr).unwrap();
    assert_eq!(back, value);

    let collapsed = port.load(&json!(["a", "a", "b"]), &expr).unwrap();
    assert_eq!(
        collapsed,
        Value::Set(vec![Value::from("a"), Value::from("b")])
    );
}

#[test]
fn test_tuple_fixed_and_variadic() {
    let port = JsonPort::new();

    let fixed = TypeExpr::tuple(vec![TypeExpr::Float, TypeExpr::Float, TypeExpr::Float]);
    let dims = Value::Tuple(vec![
        Value::Float(35.5),
        Value::Float(24.0),
        Value::Float(2.1),
    ]);
    let wire = port.dump_as(&dims, &fixed).unwrap();
    assert_eq!(wire, json!([35.5, 24.0, 2.1]));
    assert_eq!(port.load(&wire, &fixed).unwrap(), dims);

    let err = port.load(&json!([35.5, 24.0]), &fixed).unwrap_err();
    assert_eq!(
        err,
        DeserializationError::LengthMismatch {
            expected: 3,
            found: 2,
        }
    );

    let variadic = TypeExpr::tuple_of(TypeExpr::Int);
    let back = port.load(&json!([1, 2, 3, 4]), &variadic).unwrap();
    assert_eq!(
        back,
        Value::Tuple(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4)
        ])
    );
}

#[test]
fn test_map_with_enum_keys() {
    let mut port = JsonPort::new();
    port.register_enum(
        EnumBuilder::new("Role")
            .member("ADMIN", "admin")
            .member("USER", "user")
            .build(),
    )
    .unwrap();

    let expr = TypeExpr::map(TypeExpr::named("Role"), TypeExpr::Int);
    let value = Value::Map(vec![
        (Value::enum_member("Role", "ADMIN"), Value::Int(1)),
        (Value::enum_member("Role", "USER"), Value::Int(42)),
    ]);

    let wire = port.dump_as(&value, &expr).unwrap();
    assert_eq!(wire, json!({"admin": 1, "user": 42}));

    let back = port.load(&wire, &expr).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_nested_order_scenario() {
    let mut port = JsonPort::new();
    port.register_enum(
        EnumBuilder::new("Category")
            .member("ELECTRONICS", "electronics")
            .member("BOOKS", "books")
            .build(),
    )
    .unwrap();
    port.register_enum(
        EnumBuilder::new("OrderStatus")
            .member("PENDING", "pending")
            .member("CONFIRMED", "confirmed")
            .member("SHIPPED", "shipped")
            .build(),
    )
    .unwrap();
    port.register_record(
        RecordBuilder::new("Product")
            .field("id", TypeExpr::Int)
            .field("name", TypeExpr::Str)
            .field("price", TypeExpr::Float)
            .field("category", TypeExpr::named("Category"))
            .field_default("tags", TypeExpr::set(TypeExpr::Str), Value::Set(vec![]))
            .optional_field(
                "dimensions",
                TypeExpr::tuple(vec![TypeExpr::Float, TypeExpr::Float, TypeExpr::Float]),
            )
            .build(),
    )
    .unwrap();
    port.register_record(
        RecordBuilder::new("Order")
            .field("id", TypeExpr::Int)
            .field("items", TypeExpr::list(TypeExpr::named("Product")))
            .field("status", TypeExpr::named("OrderStatus"))
            .field("placed_at", TypeExpr::DateTime)
            .field(
                "metadata",
                TypeExpr::map(
                    TypeExpr::Str,
                    TypeExpr::union(vec![TypeExpr::Str, TypeExpr::Int]),
                ),
            )
            .build(),
    )
    .unwrap();

    let laptop = Value::record(
        "Product",
        [
            ("id", Value::Int(1)),
            ("name", Value::from("Laptop")),
            ("price", Value::Float(999.99)),
            ("category", Value::enum_member("Category", "ELECTRONICS")),
            (
                "tags",
                Value::Set(vec![Value::from("portable"), Value::from("tech")]),
            ),
            (
                "dimensions",
                Value::Tuple(vec![
                    Value::Float(35.5),
                    Value::Float(24.0),
                    Value::Float(2.1),
                ]),
            ),
        ],
    );
    let book = Value::record(
        "Product",
        [
            ("id", Value::Int(2)),
            ("name", Value::from("Rust Book")),
            ("price", Value::Float(49.99)),
            ("category", Value::enum_member("Category", "BOOKS")),
            ("tags", Value::Set(vec![])),
            ("dimensions", Value::Null),
        ],
    );
    let placed_at = NaiveDate::from_ymd_opt(2025, 3, 2)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    let order = Value::record(
        "Order",
        [
            ("id", Value::Int(1001)),
            ("items", Value::List(vec![laptop, book])),
            ("status", Value::enum_member("OrderStatus", "CONFIRMED")),
            ("placed_at", Value::from(placed_at)),
            (
                "metadata",
                Value::Map(vec![
                    (Value::from("channel"), Value::from("web")),
                    (Value::from("priority"), Value::Int(2)),
                ]),
            ),
        ],
    );

    let wire = port.dump(&order).unwrap();
    assert_eq!(wire["status"], json!("confirmed"));
    assert_eq!(wire["items"][0]["category"], json!("electronics"));
    assert_eq!(wire["items"][1]["dimensions"], json!(null));
    assert_eq!(wire["placed_at"], json!("2025-03-02T09:15:00"));

    let back = port.load(&wire, &TypeExpr::named("Order")).unwrap();
    assert_eq!(back, order);
}

#[test]
fn test_unregistered_type_folds_into_operation_error() {
    let port = JsonPort::new();

    let ghost = Value::record("Ghost", [("x", Value::Int(1))]);
    let err = port.dump(&ghost).unwrap_err();
    assert_eq!(
        err,
        SerializationError::Resolve(ResolveError::UnknownType("Ghost".to_string()))
    );

    let err = port.load(&json!({}), &TypeExpr::named("Ghost")).unwrap_err();
    assert_eq!(
        err,
        DeserializationError::Resolve(ResolveError::UnknownType("Ghost".to_string()))
    );
}

#[test]
fn test_heterogeneous_list_dump() {
    let port = JsonPort::new();
    let mixed = Value::List(vec![Value::Int(1), Value::from("two"), Value::Null]);
    let wire = port.dump(&mixed).unwrap();
    assert_eq!(wire, json!([1, "two", null]));
}

#[test]
fn test_cache_hits_accumulate_across_dumps() {
    let port = user_port();

    port.dump(&john()).unwrap();
    let after_first = port.cache_stats();
    assert_eq!(after_first.named.misses, 1);

    port.dump(&john()).unwrap();
    let after_second = port.cache_stats();
    assert_eq!(after_second.named.misses, 1);
    assert!(after_second.named.hits > after_first.named.hits);
}

#[test]
fn test_tiny_cache_still_converts_correctly() {
    let mut port = JsonPort::with_cache_capacities(1, 1);
    port.register_record(
        RecordBuilder::new("A")
            .field("x", TypeExpr::Int)
            .build(),
    )
    .unwrap();
    port.register_record(
        RecordBuilder::new("B")
            .field("y", TypeExpr::Str)
            .build(),
    )
    .unwrap();

    let a = Value::record("A", [("x", Value::Int(1))]);
    let b = Value::record("B", [("y", Value::from("z"))]);

    // Each dump evicts the other record's descriptor; results stay correct.
    for _ in 0..3 {
        assert_eq!(port.dump(&a).unwrap(), json!({"x": 1}));
        assert_eq!(port.dump(&b).unwrap(), json!({"y": "z"}));
    }
    assert!(port.cache_stats().named.misses >= 6);
}

#[test]
fn test_clear_caches_keeps_results_stable() {
    let port = user_port();
    let before = port.dump(&john()).unwrap();
    port.clear_caches();
    let after = port.dump(&john()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_concurrent_dumps_share_the_engine() {
    let port = Arc::new(user_port());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let port = Arc::clone(&port);
            scope.spawn(move || {
                for _ in 0..50 {
                    let wire = port.dump(&john()).unwrap();
                    let back = port.load(&wire, &TypeExpr::named("User")).unwrap();
                    assert_eq!(back, john());
                }
            });
        }
    });
}
