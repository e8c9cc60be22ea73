// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ob-switchboard: the dependency-driven boolean switch engine.
//!
//! A switchboard holds named boolean cells. A cell is either a leaf
//! (directly assigned) or derived from a boolean expression over other
//! cells. Leaf writes pass an interceptor chain, commit atomically, and
//! recompute every transitively-dependent derived cell exactly once per
//! write batch. Readers see an immutable snapshot; subscribers observe
//! `(old, new)` pairs on dispatch workers, in commit order.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod board;
mod error;
mod expr;
mod graph;

pub use board::{Intercept, InterceptorToken, SwitchToken, Switchboard};
pub use error::SwitchError;
pub use expr::Expr;
