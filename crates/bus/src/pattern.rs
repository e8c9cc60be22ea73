// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal name patterns: exact match or trailing-wildcard prefix.
//!
//! `"net.link"` matches only that name; `"net.*"` matches `"net.link"`,
//! `"net.addr.v4"`, and `"net"` itself is NOT matched (the prefix ends at
//! the dot). `"*"` matches everything.

use std::fmt;

/// A parsed subscription pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Exact(String),
    /// Matches any name starting with the stored prefix (dot included).
    Prefix(String),
    All,
}

impl Pattern {
    /// Parse a pattern string. `"*"` matches all; a trailing `".*"` makes
    /// a prefix pattern; anything else is an exact name.
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            Pattern::All
        } else if let Some(prefix) = s.strip_suffix(".*") {
            Pattern::Prefix(format!("{prefix}."))
        } else {
            Pattern::Exact(s.to_string())
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(exact) => name == exact,
            Pattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Pattern::All => true,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(exact) => f.write_str(exact),
            Pattern::Prefix(prefix) => write!(f, "{prefix}*"),
            Pattern::All => f.write_str("*"),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::parse(s)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
