// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ob-value: canonical dynamic value model for the omnibus IPC framework.
//!
//! Every signal, request, and response payload crossing a transport is a
//! [`Value`] tree. Codec adapters translate between `Value` and a wire
//! format; the bus and switchboard layers never see transport-native types.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod macros;

mod access;
mod cmp;
mod error;
mod fault;
mod value;
mod walk;

pub use error::{Tag, ValueError};
pub use fault::{fault_codes, Fault};
pub use value::{Map, Record, Value, MAX_DEPTH};
