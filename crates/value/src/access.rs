// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed and lenient accessors, plus explicit numeric conversion.
//!
//! Typed accessors fail with `ValueError::Type` when the stored tag does
//! not match. Lenient accessors return `Absent` (or `None`) instead of
//! failing, so callers probing optional fields never branch on errors.

use crate::error::{Tag, ValueError};
use crate::value::{Map, Record, Value};

static ABSENT: Value = Value::Absent;

impl Value {
    // ---- typed accessors ----

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(ValueError::mismatch(Tag::Bool, other.tag())),
        }
    }

    pub fn as_int(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(ValueError::mismatch(Tag::Int, other.tag())),
        }
    }

    pub fn as_uint(&self) -> Result<u64, ValueError> {
        match self {
            Value::UInt(u) => Ok(*u),
            other => Err(ValueError::mismatch(Tag::UInt, other.tag())),
        }
    }

    pub fn as_real(&self) -> Result<f64, ValueError> {
        match self {
            Value::Real(r) => Ok(*r),
            other => Err(ValueError::mismatch(Tag::Real, other.tag())),
        }
    }

    pub fn as_text(&self) -> Result<&str, ValueError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(ValueError::mismatch(Tag::Text, other.tag())),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], ValueError> {
        match self {
            Value::Bytes(b) => Ok(b),
            other => Err(ValueError::mismatch(Tag::Bytes, other.tag())),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::List(l) => Ok(l),
            other => Err(ValueError::mismatch(Tag::List, other.tag())),
        }
    }

    pub fn as_map(&self) -> Result<&Map, ValueError> {
        match self {
            Value::Map(m) => Ok(m),
            other => Err(ValueError::mismatch(Tag::Map, other.tag())),
        }
    }

    pub fn as_record(&self) -> Result<&Record, ValueError> {
        match self {
            Value::Record(r) => Ok(r),
            other => Err(ValueError::mismatch(Tag::Record, other.tag())),
        }
    }

    // ---- lenient accessors ----

    /// Look up `key` in a map or record, returning `Absent` when the key
    /// is missing or this value is not a keyed container.
    ///
    /// For records, the first field with a matching name wins.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Map(m) => m.get(key).unwrap_or(&ABSENT),
            Value::Record(r) => {
                r.iter().find(|(name, _)| name == key).map(|(_, v)| v).unwrap_or(&ABSENT)
            }
            _ => &ABSENT,
        }
    }

    /// Look up a list element by index, returning `Absent` when out of
    /// bounds or this value is not a list.
    pub fn index(&self, i: usize) -> &Value {
        match self {
            Value::List(l) => l.get(i).unwrap_or(&ABSENT),
            _ => &ABSENT,
        }
    }

    /// Strict keyed lookup: `Type` error on a non-keyed container,
    /// `Key` error on a missing key.
    pub fn try_get(&self, key: &str) -> Result<&Value, ValueError> {
        match self {
            Value::Map(m) => m.get(key).ok_or_else(|| ValueError::Key(key.to_string())),
            Value::Record(r) => r
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, v)| v)
                .ok_or_else(|| ValueError::Key(key.to_string())),
            other => Err(ValueError::mismatch(Tag::Map, other.tag())),
        }
    }

    pub fn opt_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn opt_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    // ---- numeric conversion ----
    //
    // Widening (int → real) is always permitted. Narrowing only happens
    // through these explicit calls and fails with `Range` when lossy.

    /// Convert any numeric value to a real (widening).
    pub fn to_real(&self) -> Result<f64, ValueError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::UInt(u) => Ok(*u as f64),
            Value::Real(r) => Ok(*r),
            other => Err(ValueError::mismatch(Tag::Real, other.tag())),
        }
    }

    /// Convert any numeric value to a signed integer, failing when lossy.
    pub fn to_int(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::UInt(u) => i64::try_from(*u)
                .map_err(|_| ValueError::range(Tag::Int, format!("{u} exceeds i64::MAX"))),
            Value::Real(r) => {
                if r.fract() == 0.0 && *r >= i64::MIN as f64 && *r <= i64::MAX as f64 {
                    Ok(*r as i64)
                } else {
                    Err(ValueError::range(Tag::Int, format!("{r} is not an integral i64")))
                }
            }
            other => Err(ValueError::mismatch(Tag::Int, other.tag())),
        }
    }

    /// Convert any numeric value to an unsigned integer, failing when lossy.
    pub fn to_uint(&self) -> Result<u64, ValueError> {
        match self {
            Value::UInt(u) => Ok(*u),
            Value::Int(i) => u64::try_from(*i)
                .map_err(|_| ValueError::range(Tag::UInt, format!("{i} is negative"))),
            Value::Real(r) => {
                if r.fract() == 0.0 && *r >= 0.0 && *r <= u64::MAX as f64 {
                    Ok(*r as u64)
                } else {
                    Err(ValueError::range(Tag::UInt, format!("{r} is not an integral u64")))
                }
            }
            other => Err(ValueError::mismatch(Tag::UInt, other.tag())),
        }
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
