// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boolean dependency expressions over switch names.
//!
//! Evaluation uses standard short-circuit rules: `And` stops on the
//! first false operand, `Or` on the first true, both left to right.

use std::collections::BTreeSet;
use std::fmt;

/// A boolean tree over other switch names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Name(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Self {
        Self::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Self {
        Self::Or(operands.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Expr) -> Self {
        Self::Not(Box::new(operand))
    }

    /// Every switch name referenced anywhere in the tree, deduplicated.
    pub fn deps(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_deps(&mut out);
        out
    }

    fn collect_deps(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Name(name) => {
                out.insert(name.clone());
            }
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_deps(out);
                }
            }
            Self::Not(operand) => operand.collect_deps(out),
        }
    }

    /// Short-circuit evaluation against `lookup`. An empty `And` is true
    /// and an empty `Or` is false, matching the boolean identities.
    pub fn eval(&self, lookup: &impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Name(name) => lookup(name),
            Self::And(operands) => operands.iter().all(|operand| operand.eval(lookup)),
            Self::Or(operands) => operands.iter().any(|operand| operand.eval(lookup)),
            Self::Not(operand) => !operand.eval(lookup),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::And(operands) => write_joined(f, operands, " & "),
            Self::Or(operands) => write_joined(f, operands, " | "),
            Self::Not(operand) => write!(f, "!{operand}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[Expr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{operand}")?;
    }
    write!(f, ")")
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
