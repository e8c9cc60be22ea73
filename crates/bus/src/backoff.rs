// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential reconnect backoff with jitter.
//!
//! Jitter entropy comes from a v4 uuid, the same source the bus already
//! uses for request ids, so no extra randomness dependency is needed.

use std::time::Duration;

use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base: Duration,
    pub max: Duration,
    /// Fractional jitter: each delay is scaled by `1 ± jitter`.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self { base: Duration::from_millis(100), max: Duration::from_secs(30), jitter: 0.25 }
    }
}

/// Delay sequence for one reconnect episode. Reset on successful connect.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Next delay: `base * 2^attempt`, capped at `max`, jittered.
    pub fn next_delay(&mut self) -> Duration {
        let exp = self.config.base.as_secs_f64() * f64::from(2u32).powi(self.attempt as i32);
        let capped = exp.min(self.config.max.as_secs_f64());
        self.attempt = self.attempt.saturating_add(1);

        let jittered = capped * (1.0 + self.config.jitter * (2.0 * unit_random() - 1.0));
        Duration::from_secs_f64(jittered.max(0.0))
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Uniform-ish value in [0, 1) derived from uuid v4 entropy.
fn unit_random() -> f64 {
    let bits = Uuid::new_v4().as_u128();
    (bits >> 75) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
