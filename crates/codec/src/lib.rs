// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ob-codec: pluggable codec adapters between the value model and wire bytes.
//!
//! A transport binding carries opaque byte frames; a [`Codec`] turns a
//! [`Value`](ob_value::Value) into those bytes and back. Every adapter must
//! round-trip each tag it claims to support losslessly; a representation gap
//! is a documented narrowing on the adapter, never a silent drop.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod json;
mod plain;

pub use codec::{Codec, DecodeError, EncodeError};
pub use json::JsonCodec;
pub use plain::PlainJsonCodec;
