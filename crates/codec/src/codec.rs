// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The codec adapter contract.

use thiserror::Error;

use ob_value::Value;

/// Encode/decode bridge between the value model and one wire format.
///
/// Implementations must be stateless (or internally synchronized): one
/// codec instance is shared by every connection of a transport binding.
pub trait Codec: Send + Sync {
    /// Short stable name used in diagnostics ("json", "json-plain", ...).
    fn name(&self) -> &'static str;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError>;

    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError>;
}

/// Errors producing wire bytes from a value.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// JSON has no representation for NaN or infinity.
    #[error("non-finite real cannot be encoded")]
    NonFiniteReal,
}

/// Errors reconstructing a value from wire bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// External input deeper than the value model permits is rejected
    /// before it is recursed into.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },
}

/// Reject trees from external input that exceed the value model's
/// nesting bound.
pub(crate) fn check_depth(value: &Value) -> Result<(), DecodeError> {
    let depth = value.depth();
    if depth > ob_value::MAX_DEPTH {
        return Err(DecodeError::DepthExceeded { depth, limit: ob_value::MAX_DEPTH });
    }
    Ok(())
}
