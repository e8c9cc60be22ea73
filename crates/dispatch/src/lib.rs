// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ob-dispatch: the async dispatch queue decoupling transport I/O from
//! application callbacks.
//!
//! Transport bindings never invoke application handlers directly; inbound
//! work crosses from I/O context to application context through exactly one
//! [`DispatchQueue`]. The queue is an explicit, constructible instance owned
//! by whichever scope composes the application — there is no ambient global.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod queue;
mod timers;

pub use queue::{DispatchConfig, DispatchQueue, DroppedError, OverflowPolicy};
pub use timers::{TimerHandle, Timers};
