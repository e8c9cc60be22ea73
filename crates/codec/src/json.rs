// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lossless JSON adapter using the externally-tagged value form.
//!
//! Wire shape: `{"int": 5}`, `{"uint": 7}`, `{"bytes": [1,2]}`, `"absent"`.
//! Every tag round-trips; the single narrowing is that non-finite reals
//! fail at encode, because JSON has no NaN/infinity literal.

use ob_value::Value;

use crate::codec::{check_depth, Codec, DecodeError, EncodeError};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        if has_non_finite_real(value) {
            return Err(EncodeError::NonFiniteReal);
        }
        serde_json::to_vec(value).map_err(|e| EncodeError::Serialize(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        check_depth(&value)?;
        Ok(value)
    }
}

fn has_non_finite_real(value: &Value) -> bool {
    let mut found = false;
    value.walk(&mut |node, _| {
        if let Value::Real(r) = node {
            if !r.is_finite() {
                found = true;
            }
        }
    });
    found
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
