// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural equality and the same-tag total order.
//!
//! Equality is structural across the whole tree. Ordering is only defined
//! between values carrying the same tag; `Real` uses IEEE 754 total order
//! so it can serve as a map or sort key (NaN compares consistently).

use std::cmp::Ordering;

use crate::value::Value;

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            // Bit equality keeps Eq reflexive for NaN payloads.
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Total order between two values of the same tag.
    ///
    /// Returns `None` when the tags differ — cross-tag ordering is
    /// deliberately undefined. Containers compare lexicographically
    /// element-wise (and are themselves same-tag recursive).
    pub fn same_tag_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Absent, Value::Absent) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::UInt(a), Value::UInt(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => Some(a.total_cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => cmp_seq(a.iter(), b.iter(), a.len(), b.len()),
            (Value::Map(a), Value::Map(b)) => cmp_pairs(
                a.iter().map(|(k, v)| (k.as_str(), v)),
                b.iter().map(|(k, v)| (k.as_str(), v)),
                a.len(),
                b.len(),
            ),
            (Value::Record(a), Value::Record(b)) => cmp_pairs(
                a.iter().map(|(k, v)| (k.as_str(), v)),
                b.iter().map(|(k, v)| (k.as_str(), v)),
                a.len(),
                b.len(),
            ),
            _ => None,
        }
    }
}

fn cmp_seq<'a>(
    a: impl Iterator<Item = &'a Value>,
    b: impl Iterator<Item = &'a Value>,
    a_len: usize,
    b_len: usize,
) -> Option<Ordering> {
    for (x, y) in a.zip(b) {
        match x.same_tag_cmp(y)? {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(a_len.cmp(&b_len))
}

fn cmp_pairs<'a>(
    a: impl Iterator<Item = (&'a str, &'a Value)>,
    b: impl Iterator<Item = (&'a str, &'a Value)>,
    a_len: usize,
    b_len: usize,
) -> Option<Ordering> {
    for ((ka, va), (kb, vb)) in a.zip(b) {
        match ka.cmp(kb) {
            Ordering::Equal => {}
            other => return Some(other),
        }
        match va.same_tag_cmp(vb)? {
            Ordering::Equal => {}
            other => return Some(other),
        }
    }
    Some(a_len.cmp(&b_len))
}

#[cfg(test)]
#[path = "cmp_tests.rs"]
mod tests;
