// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-crate value/codec specs: wire shapes an embedding application
//! can rely on.

use yare::parameterized;

use ob_codec::{Codec, JsonCodec, PlainJsonCodec};
use ob_value::Value;

#[parameterized(
    absent = { Value::Absent, r#""absent""# },
    bool_true = { Value::Bool(true), r#"{"bool":true}"# },
    int = { Value::Int(-3), r#"{"int":-3}"# },
    uint = { Value::UInt(7), r#"{"uint":7}"# },
    text = { Value::text("hi"), r#"{"text":"hi"}"# },
    bytes = { Value::Bytes(vec![1, 2]), r#"{"bytes":[1,2]}"# },
)]
fn tagged_wire_shape_is_stable(value: Value, expected: &str) {
    let bytes = JsonCodec.encode(&value).unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), expected);
    assert_eq!(JsonCodec.decode(&bytes).unwrap(), value);
}

#[test]
fn tagged_and_plain_agree_on_interop_payloads() {
    let value = Value::record([
        ("name", Value::text("eth0")),
        ("up", Value::Bool(true)),
        ("mtu", Value::Int(1500)),
    ]);

    let tagged = JsonCodec.decode(&JsonCodec.encode(&value).unwrap()).unwrap();
    assert_eq!(tagged, value);

    // Plain JSON narrows records to maps but keeps field order and data.
    let plain = PlainJsonCodec.decode(&PlainJsonCodec.encode(&value).unwrap()).unwrap();
    assert_eq!(plain.get("name"), &Value::text("eth0"));
    assert_eq!(plain.get("up"), &Value::Bool(true));
    assert_eq!(plain.get("mtu"), &Value::Int(1500));
}

#[test]
fn plain_json_accepts_foreign_documents() {
    let doc = br#"{"jsonrpc":"2.0","id":1,"result":[null,2.5,"ok"]}"#;
    let value = PlainJsonCodec.decode(doc).unwrap();
    assert_eq!(value.get("jsonrpc"), &Value::text("2.0"));
    assert_eq!(value.get("result").index(0), &Value::Absent);
    assert_eq!(value.get("result").index(1), &Value::Real(2.5));
}
