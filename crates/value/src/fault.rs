// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Fault`: the uniform structured error carried across every transport.
//!
//! A fault always has a domain, a numeric code, and a message; `details`
//! carries optional structured context. Responder handlers that fail are
//! converted to faults before crossing the wire — an unstructured failure
//! never leaves the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValueError;
use crate::value::Value;

/// Well-known fault codes in the `"omnibus"` domain.
pub mod fault_codes {
    /// No handler registered for the requested method.
    pub const NOT_FOUND: i64 = 1;
    /// Handler failed without a more specific code.
    pub const INTERNAL: i64 = 2;
    /// Payload failed decoding on the responder side.
    pub const BAD_PAYLOAD: i64 = 3;
}

/// Structured cross-transport error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{domain}:{code}] {message}")]
pub struct Fault {
    pub domain: String,
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl Fault {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self { domain: domain.into(), code, message: message.into(), details: Value::Absent }
    }

    /// Fault in the framework's own `"omnibus"` domain.
    pub fn framework(code: i64, message: impl Into<String>) -> Self {
        Self::new("omnibus", code, message)
    }

    pub fn not_found(method: &str) -> Self {
        Self::framework(fault_codes::NOT_FOUND, format!("no such method: {method}"))
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Record-shaped `Value` form used on the wire.
    pub fn to_value(&self) -> Value {
        Value::record([
            ("domain", Value::text(&self.domain)),
            ("code", Value::Int(self.code)),
            ("message", Value::text(&self.message)),
            ("details", self.details.clone()),
        ])
    }

    /// Parse the record shape produced by [`Fault::to_value`].
    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(Self {
            domain: value.try_get("domain")?.as_text()?.to_string(),
            code: value.try_get("code")?.as_int()?,
            message: value.try_get("message")?.as_text()?.to_string(),
            details: value.get("details").clone(),
        })
    }
}

#[cfg(test)]
#[path = "fault_tests.rs"]
mod tests;
