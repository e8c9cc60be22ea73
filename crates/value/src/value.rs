// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Value` tree: a tagged, immutable, recursively-defined dynamic value.
//!
//! Children are exclusively owned by their container, so a `Value` is a
//! strict tree — cyclic structures are unrepresentable by construction.
//! Codecs decoding external input additionally enforce [`MAX_DEPTH`] so an
//! adversarially nested payload is rejected instead of recursed into.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Tag;

/// Key-unique ordered mapping of text to `Value`.
pub type Map = IndexMap<String, Value>;

/// Ordered list of (name, value) pairs — a lightweight record.
pub type Record = Vec<(String, Value)>;

/// Maximum nesting depth accepted from external input.
pub const MAX_DEPTH: usize = 64;

/// Canonical dynamic value carried across every transport.
///
/// Serde encodes the externally-tagged form (`{"int": 5}`, `"absent"`),
/// which round-trips all ten tags losslessly through JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Absent,
    Bool(bool),
    Int(i64),
    #[serde(rename = "uint")]
    UInt(u64),
    Real(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
    Record(Record),
}

impl Value {
    /// The tag of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Absent => Tag::Absent,
            Value::Bool(_) => Tag::Bool,
            Value::Int(_) => Tag::Int,
            Value::UInt(_) => Tag::UInt,
            Value::Real(_) => Tag::Real,
            Value::Text(_) => Tag::Text,
            Value::Bytes(_) => Tag::Bytes,
            Value::List(_) => Tag::List,
            Value::Map(_) => Tag::Map,
            Value::Record(_) => Tag::Record,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Truthiness: absent, false, zero numerics, and empty containers are
    /// falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::UInt(u) => *u != 0,
            Value::Real(r) => *r != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Record(r) => !r.is_empty(),
        }
    }

    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Build a record from (name, value) pairs.
    pub fn record(fields: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        Value::Record(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// Build a map from (key, value) pairs. Later duplicates overwrite
    /// earlier ones, keeping keys unique.
    pub fn map(entries: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Absent
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
