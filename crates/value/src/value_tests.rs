// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use yare::parameterized;

use super::*;
use crate::error::Tag;

#[test]
fn tag_matches_variant() {
    assert_eq!(Value::Absent.tag(), Tag::Absent);
    assert_eq!(Value::Bool(true).tag(), Tag::Bool);
    assert_eq!(Value::Int(-1).tag(), Tag::Int);
    assert_eq!(Value::UInt(1).tag(), Tag::UInt);
    assert_eq!(Value::Real(0.5).tag(), Tag::Real);
    assert_eq!(Value::text("x").tag(), Tag::Text);
    assert_eq!(Value::Bytes(vec![0]).tag(), Tag::Bytes);
    assert_eq!(Value::List(vec![]).tag(), Tag::List);
    assert_eq!(Value::map([("k", Value::Absent)]).tag(), Tag::Map);
    assert_eq!(Value::record([("f", Value::Absent)]).tag(), Tag::Record);
}

#[parameterized(
    absent = { Value::Absent, false },
    false_bool = { Value::Bool(false), false },
    true_bool = { Value::Bool(true), true },
    zero_int = { Value::Int(0), false },
    neg_int = { Value::Int(-3), true },
    zero_uint = { Value::UInt(0), false },
    zero_real = { Value::Real(0.0), false },
    real = { Value::Real(0.1), true },
    empty_text = { Value::text(""), false },
    text = { Value::text("x"), true },
    empty_bytes = { Value::Bytes(vec![]), false },
    empty_list = { Value::List(vec![]), false },
    list = { Value::List(vec![Value::Absent]), true },
)]
fn truthiness(value: Value, expected: bool) {
    assert_eq!(value.is_truthy(), expected);
}

#[test]
fn empty_map_and_record_are_falsy() {
    assert!(!Value::Map(Map::new()).is_truthy());
    assert!(!Value::Record(Vec::new()).is_truthy());
    assert!(Value::map([("k", Value::Absent)]).is_truthy());
}

#[test]
fn map_constructor_keeps_keys_unique() {
    let v = Value::map([("a", Value::Int(1)), ("a", Value::Int(2)), ("b", Value::Int(3))]);
    let m = v.as_map().unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m["a"], Value::Int(2));
}

#[test]
fn map_preserves_insertion_order() {
    let v = Value::map([("z", Value::Int(1)), ("a", Value::Int(2))]);
    let keys: Vec<&str> = v.as_map().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, ["z", "a"]);
}

#[test]
fn serde_externally_tagged_form() {
    let json = serde_json::to_string(&Value::Int(5)).unwrap();
    assert_eq!(json, r#"{"int":5}"#);

    let json = serde_json::to_string(&Value::Absent).unwrap();
    assert_eq!(json, r#""absent""#);

    let parsed: Value = serde_json::from_str(r#"{"uint":7}"#).unwrap();
    assert_eq!(parsed, Value::UInt(7));
}

#[test]
fn from_impls() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(5i64), Value::Int(5));
    assert_eq!(Value::from("hi"), Value::text("hi"));
    assert_eq!(Value::from(vec![1u8, 2]), Value::Bytes(vec![1, 2]));
}
