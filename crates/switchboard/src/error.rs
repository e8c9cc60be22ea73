// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Switchboard errors. All are synchronous: they surface to the caller
/// of the offending operation and never leave the graph half-updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// Registering this dependency expression would create a cycle; the
    /// graph is unchanged.
    #[error("dependency for switch {0} would create a cycle")]
    Cycle(String),

    /// An interceptor denied the write; no state changed.
    #[error("write to switch {0} was denied by an interceptor")]
    Intercepted(String),

    #[error("unknown switch: {0}")]
    Unknown(String),

    /// Direct writes are only valid on leaf switches.
    #[error("switch {0} is derived and cannot be assigned directly")]
    NotLeaf(String),
}
