// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use yare::parameterized;

use ob_value::Value;

use super::*;
use crate::codec::{Codec, DecodeError, EncodeError};

fn roundtrip(v: &Value) -> Value {
    let codec = JsonCodec;
    let bytes = codec.encode(v).expect("encode failed");
    codec.decode(&bytes).expect("decode failed")
}

#[parameterized(
    absent = { Value::Absent },
    boolean = { Value::Bool(true) },
    int = { Value::Int(-42) },
    uint = { Value::UInt(u64::MAX) },
    real = { Value::Real(0.25) },
    text = { Value::text("héllo") },
    bytes = { Value::Bytes(vec![0, 255, 7]) },
    empty_list = { Value::List(vec![]) },
)]
fn roundtrips_scalar_tags(v: Value) {
    assert_eq!(roundtrip(&v), v);
}

#[test]
fn roundtrips_nested_containers() {
    let v = Value::record([
        ("name", Value::text("netinfo")),
        ("counts", Value::List(vec![Value::Int(1), Value::UInt(2)])),
        ("meta", Value::map([("absent", Value::Absent)])),
    ]);
    assert_eq!(roundtrip(&v), v);
}

#[test]
fn uint_and_int_stay_distinct() {
    // Plain JSON would collapse these; the tagged form must not.
    assert_eq!(roundtrip(&Value::UInt(5)), Value::UInt(5));
    assert_eq!(roundtrip(&Value::Int(5)), Value::Int(5));
}

#[test]
fn non_finite_real_fails_encode() {
    let codec = JsonCodec;
    assert!(matches!(codec.encode(&Value::Real(f64::NAN)), Err(EncodeError::NonFiniteReal)));
    assert!(matches!(
        codec.encode(&Value::List(vec![Value::Real(f64::INFINITY)])),
        Err(EncodeError::NonFiniteReal)
    ));
}

#[test]
fn malformed_bytes_fail_decode() {
    let codec = JsonCodec;
    assert!(matches!(codec.decode(b"{not json"), Err(DecodeError::Malformed(_))));
    assert!(matches!(codec.decode(b"{\"no_such_tag\": 1}"), Err(DecodeError::Malformed(_))));
}
