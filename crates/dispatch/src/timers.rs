// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared timer facility for deadlines and delayed work.
//!
//! One `Timers` instance serves a whole endpoint (or application): each
//! scheduled timer is a lightweight spawned task racing a sleep against
//! its cancellation token. Requester deadlines and reconnect backoff both
//! run through here.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Handle to one scheduled timer; dropping it does NOT cancel the timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Cancel the timer if it has not fired yet. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Factory for cancellable one-shot timers.
///
/// Shutting down the owning scope cancels every outstanding timer via the
/// shared root token.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    root: CancellationToken,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` after `delay` unless cancelled first.
    pub fn after(&self, delay: Duration, f: impl FnOnce() + Send + 'static) -> TimerHandle {
        let token = self.root.child_token();
        let task_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => f(),
                _ = task_token.cancelled() => {}
            }
        });
        TimerHandle { token }
    }

    /// Cancel every timer created from this facility.
    pub fn cancel_all(&self) {
        self.root.cancel();
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
