// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider registry: maps logical service names to transport candidates.
//!
//! Application code binds a service by name and role; the registry walks
//! the candidate list in registration order and returns the first endpoint
//! that connects. Every failed candidate is recorded so an exhausted bind
//! can say exactly what was tried and why each attempt failed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use ob_codec::Codec;
use ob_dispatch::DispatchQueue;

use crate::endpoint::{Endpoint, EndpointConfig};
use crate::error::BindError;
use crate::roles::Role;
use crate::transport::{Transport, TransportKind};

/// One failed candidate during a bind, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct BindAttempt {
    pub kind: TransportKind,
    pub address: String,
    pub error: String,
}

struct Provider {
    transport: Arc<dyn Transport>,
    config: EndpointConfig,
}

#[derive(Default)]
struct Inner {
    /// Candidates per service, in priority (registration) order.
    services: Mutex<HashMap<String, Vec<Provider>>>,
    /// Attempt trail from the most recent bind of each service.
    last_attempts: Mutex<HashMap<String, Vec<BindAttempt>>>,
}

/// Ordered provider-selection registry.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    inner: Arc<Inner>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate for `service`. Priority follows registration
    /// order: the first registered is tried first.
    pub fn register(&self, service: &str, transport: Arc<dyn Transport>, config: EndpointConfig) {
        let mut services = self.inner.services.lock();
        services
            .entry(service.to_string())
            .or_default()
            .push(Provider { transport, config });
    }

    /// Candidate count for a service (diagnostics).
    pub fn provider_count(&self, service: &str) -> usize {
        self.inner.services.lock().get(service).map_or(0, Vec::len)
    }

    /// The attempt trail from the most recent bind of `service`. Empty if
    /// the first candidate connected, or the service was never bound.
    pub fn last_attempts(&self, service: &str) -> Vec<BindAttempt> {
        self.inner.last_attempts.lock().get(service).cloned().unwrap_or_default()
    }

    /// Bind `service` with `role`: try each candidate in priority order
    /// and return the first endpoint that connects.
    pub async fn bind(
        &self,
        service: &str,
        role: Role,
        codec: Arc<dyn Codec>,
        queue: Arc<DispatchQueue>,
    ) -> Result<Endpoint, BindError> {
        let candidates: Vec<(Arc<dyn Transport>, EndpointConfig)> = {
            let services = self.inner.services.lock();
            let providers = services
                .get(service)
                .ok_or_else(|| BindError::UnknownService(service.to_string()))?;
            if providers.is_empty() {
                return Err(BindError::UnknownService(service.to_string()));
            }
            providers
                .iter()
                .map(|p| (Arc::clone(&p.transport), p.config.clone()))
                .collect()
        };

        let mut attempts = Vec::new();
        for (transport, config) in candidates {
            let kind = transport.kind();
            let address = config.address.clone();
            match Endpoint::connect(transport, role, Arc::clone(&codec), Arc::clone(&queue), config)
                .await
            {
                Ok(endpoint) => {
                    if !attempts.is_empty() {
                        info!(
                            service,
                            %kind,
                            address,
                            skipped = attempts.len(),
                            "service bound via fallback provider"
                        );
                    } else {
                        debug!(service, %kind, address, "service bound");
                    }
                    self.inner
                        .last_attempts
                        .lock()
                        .insert(service.to_string(), attempts);
                    return Ok(endpoint);
                }
                Err(e) => {
                    debug!(service, %kind, address, "provider failed: {}", e);
                    attempts.push(BindAttempt { kind, address, error: e.to_string() });
                }
            }
        }

        self.inner
            .last_attempts
            .lock()
            .insert(service.to_string(), attempts.clone());
        Err(BindError::ProviderUnavailable { service: service.to_string(), attempts })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
