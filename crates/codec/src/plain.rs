// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Untagged JSON adapter for interop with plain-JSON peers.
//!
//! Documented narrowings (this adapter is not lossless):
//! - `Absent` ⇒ `null` (and back)
//! - `UInt` in `i64` range ⇒ decodes as `Int`
//! - `Bytes` ⇒ array of numbers (decodes as `List` of `Int`)
//! - `Record` ⇒ object with first-field-wins on duplicate names
//!   (decodes as `Map`)
//! - non-finite reals fail at encode

use ob_value::Value;

use crate::codec::{check_depth, Codec, DecodeError, EncodeError};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainJsonCodec;

impl Codec for PlainJsonCodec {
    fn name(&self) -> &'static str {
        "json-plain"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let json = to_json(value)?;
        serde_json::to_vec(&json).map_err(|e| EncodeError::Serialize(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let json: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let value = from_json(json);
        check_depth(&value)?;
        Ok(value)
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value, EncodeError> {
    use serde_json::Value as Json;

    Ok(match value {
        Value::Absent => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::UInt(u) => Json::from(*u),
        Value::Real(r) => {
            serde_json::Number::from_f64(*r).map(Json::Number).ok_or(EncodeError::NonFiniteReal)?
        }
        Value::Text(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
        Value::List(items) => {
            Json::Array(items.iter().map(to_json).collect::<Result<_, _>>()?)
        }
        Value::Map(entries) => {
            let mut obj = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                obj.insert(k.clone(), to_json(v)?);
            }
            Json::Object(obj)
        }
        Value::Record(fields) => {
            // First field wins, matching Value::get on records.
            let mut obj = serde_json::Map::with_capacity(fields.len());
            for (name, v) in fields {
                if !obj.contains_key(name) {
                    obj.insert(name.clone(), to_json(v)?);
                }
            }
            Json::Object(obj)
        }
    })
}

fn from_json(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::Absent,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Json::String(s) => Value::Text(s),
        Json::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        Json::Object(obj) => {
            Value::Map(obj.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

#[cfg(test)]
#[path = "plain_tests.rs"]
mod tests;
