// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-order traversal for codec adapters and depth checks.

use crate::value::Value;

impl Value {
    /// Visit every node in the tree pre-order, passing its nesting depth
    /// (the root is depth 0). Codec adapters use this to drive encoders
    /// without matching on every container tag themselves.
    pub fn walk(&self, f: &mut impl FnMut(&Value, usize)) {
        self.walk_at(0, f);
    }

    fn walk_at(&self, depth: usize, f: &mut impl FnMut(&Value, usize)) {
        f(self, depth);
        match self {
            Value::List(items) => {
                for item in items {
                    item.walk_at(depth + 1, f);
                }
            }
            Value::Map(entries) => {
                for (_, v) in entries {
                    v.walk_at(depth + 1, f);
                }
            }
            Value::Record(fields) => {
                for (_, v) in fields {
                    v.walk_at(depth + 1, f);
                }
            }
            _ => {}
        }
    }

    /// Maximum nesting depth of the tree (a scalar is 0).
    pub fn depth(&self) -> usize {
        let mut max = 0;
        self.walk(&mut |_, d| max = max.max(d));
        max
    }
}

#[cfg(test)]
#[path = "walk_tests.rs"]
mod tests;
