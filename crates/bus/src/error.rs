// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus-layer errors.
//!
//! Transport connect failures are retried internally with backoff; the
//! errors here surface to callers only at bind time (registry fallback
//! exhausted), at call completion (timeout, fault), or on explicit close.

use thiserror::Error;

use ob_value::Fault;

use crate::registry::BindAttempt;
use crate::roles::Role;

/// Failure to establish a transport connection.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("connection refused: {0}")]
    Refused(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("address not served by this transport: {0}")]
    BadAddress(String),

    #[error("connection closed")]
    Closed,
}

/// Failure to hand bytes to a live connection.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("not connected")]
    NotConnected,

    #[error("i/o error: {0}")]
    Io(String),

    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },
}

/// Failure completing a request/response call.
#[derive(Debug, Error)]
pub enum CallError {
    /// No response arrived within the deadline; the request id is orphaned
    /// and a late response will be discarded.
    #[error("request timed out")]
    Timeout,

    /// The endpoint was closed while the call was in flight.
    #[error("endpoint closed")]
    Closed,

    #[error("not connected")]
    NotConnected,

    /// The responder returned a structured fault.
    #[error(transparent)]
    Fault(#[from] Fault),

    #[error("payload encoding failed: {0}")]
    Encode(String),

    #[error("response decoding failed: {0}")]
    Decode(String),
}

/// Failure enqueueing a signal for publication.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("endpoint closed")]
    Closed,

    #[error("payload encoding failed: {0}")]
    Encode(String),
}

/// Failure binding a logical service through the provider registry.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("no provider registered for service {0}")]
    UnknownService(String),

    /// Every candidate transport failed; `attempts` names each one and
    /// its failure reason.
    #[error("no provider available for service {service}: {}", format_attempts(attempts))]
    ProviderUnavailable { service: String, attempts: Vec<BindAttempt> },
}

fn format_attempts(attempts: &[BindAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{} ({}): {}", a.kind, a.address, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// An endpoint was used through the wrong role wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("endpoint has role {actual}, operation requires {expected}")]
pub struct RoleMismatch {
    pub expected: Role,
    pub actual: Role,
}

/// A wire envelope did not match the expected record shape.
#[derive(Debug, Clone, Error)]
#[error("malformed envelope: {0}")]
pub struct EnvelopeError(pub String);
