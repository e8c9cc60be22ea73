// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire envelope: every frame on every transport is one of these,
//! expressed as a record-shaped [`Value`] so any codec adapter can carry it.

use uuid::Uuid;

use ob_value::{Fault, Value};

use crate::error::EnvelopeError;

/// One logical message crossing a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Named event with a per-name monotonic sequence number.
    Signal { name: String, seq: u64, payload: Value },

    /// One half of a request/response exchange, multiplexed by id.
    Request { id: Uuid, method: String, payload: Value },

    Response { id: Uuid, payload: Value },

    /// Structured failure for a request.
    Fault { id: Uuid, fault: Fault },

    /// Subscription forwarding, so a broker peer can filter signals.
    Subscribe { pattern: String },

    Unsubscribe { pattern: String },
}

impl Envelope {
    pub fn type_name(&self) -> &'static str {
        match self {
            Envelope::Signal { .. } => "signal",
            Envelope::Request { .. } => "request",
            Envelope::Response { .. } => "response",
            Envelope::Fault { .. } => "fault",
            Envelope::Subscribe { .. } => "subscribe",
            Envelope::Unsubscribe { .. } => "unsubscribe",
        }
    }

    /// Record-shaped value form handed to the codec adapter.
    pub fn to_value(&self) -> Value {
        let type_field = ("type", Value::text(self.type_name()));
        match self {
            Envelope::Signal { name, seq, payload } => Value::record([
                type_field,
                ("name", Value::text(name)),
                ("seq", Value::UInt(*seq)),
                ("payload", payload.clone()),
            ]),
            Envelope::Request { id, method, payload } => Value::record([
                type_field,
                ("id", Value::text(id.to_string())),
                ("method", Value::text(method)),
                ("payload", payload.clone()),
            ]),
            Envelope::Response { id, payload } => Value::record([
                type_field,
                ("id", Value::text(id.to_string())),
                ("payload", payload.clone()),
            ]),
            Envelope::Fault { id, fault } => Value::record([
                type_field,
                ("id", Value::text(id.to_string())),
                ("fault", fault.to_value()),
            ]),
            Envelope::Subscribe { pattern } => {
                Value::record([type_field, ("pattern", Value::text(pattern))])
            }
            Envelope::Unsubscribe { pattern } => {
                Value::record([type_field, ("pattern", Value::text(pattern))])
            }
        }
    }

    /// Parse the record shape produced by [`Envelope::to_value`].
    pub fn from_value(value: &Value) -> Result<Self, EnvelopeError> {
        let kind = text_field(value, "type")?;
        match kind.as_str() {
            "signal" => Ok(Envelope::Signal {
                name: text_field(value, "name")?,
                seq: value
                    .try_get("seq")
                    .and_then(|v| v.as_uint())
                    .map_err(|e| EnvelopeError(e.to_string()))?,
                payload: value.get("payload").clone(),
            }),
            "request" => Ok(Envelope::Request {
                id: id_field(value)?,
                method: text_field(value, "method")?,
                payload: value.get("payload").clone(),
            }),
            "response" => {
                Ok(Envelope::Response { id: id_field(value)?, payload: value.get("payload").clone() })
            }
            "fault" => Ok(Envelope::Fault {
                id: id_field(value)?,
                fault: Fault::from_value(value.get("fault"))
                    .map_err(|e| EnvelopeError(format!("bad fault: {e}")))?,
            }),
            "subscribe" => Ok(Envelope::Subscribe { pattern: text_field(value, "pattern")? }),
            "unsubscribe" => Ok(Envelope::Unsubscribe { pattern: text_field(value, "pattern")? }),
            other => Err(EnvelopeError(format!("unknown envelope type: {other}"))),
        }
    }
}

fn text_field(value: &Value, field: &str) -> Result<String, EnvelopeError> {
    value
        .try_get(field)
        .and_then(|v| v.as_text())
        .map(str::to_string)
        .map_err(|e| EnvelopeError(format!("field {field}: {e}")))
}

fn id_field(value: &Value) -> Result<Uuid, EnvelopeError> {
    let raw = text_field(value, "id")?;
    Uuid::parse_str(&raw).map_err(|e| EnvelopeError(format!("bad request id {raw}: {e}")))
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
