// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role wrappers over an endpoint.
//!
//! An endpoint is created with exactly one role; the wrapper types make
//! the permitted operations a compile-time surface and the role check a
//! single runtime gate at acquisition.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use ob_value::{Fault, Value};

use crate::endpoint::{Endpoint, EndpointInner};
use crate::error::{CallError, PublishError, RoleMismatch};

/// What an endpoint is allowed to do on its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Publisher,
    Subscriber,
    Requester,
    Responder,
}

ob_value::simple_display! {
    Role {
        Publisher => "publisher",
        Subscriber => "subscriber",
        Requester => "requester",
        Responder => "responder",
    }
}

/// Handle for one active subscription; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionToken(pub(crate) Uuid);

impl Endpoint {
    fn check_role(&self, expected: Role) -> Result<Arc<EndpointInner>, RoleMismatch> {
        if self.role() == expected {
            Ok(Arc::clone(&self.inner))
        } else {
            Err(RoleMismatch { expected, actual: self.role() })
        }
    }

    pub fn publisher(&self) -> Result<Publisher, RoleMismatch> {
        self.check_role(Role::Publisher).map(|inner| Publisher { inner })
    }

    pub fn subscriber(&self) -> Result<Subscriber, RoleMismatch> {
        self.check_role(Role::Subscriber).map(|inner| Subscriber { inner })
    }

    pub fn requester(&self) -> Result<Requester, RoleMismatch> {
        self.check_role(Role::Requester).map(|inner| Requester { inner })
    }

    pub fn responder(&self) -> Result<Responder, RoleMismatch> {
        self.check_role(Role::Responder).map(|inner| Responder { inner })
    }
}

/// Emits named signals; non-blocking, buffered while disconnected.
pub struct Publisher {
    inner: Arc<EndpointInner>,
}

impl Publisher {
    /// Publish `payload` under `name`; returns the per-name sequence
    /// number assigned to this signal.
    pub fn publish(&self, name: &str, payload: Value) -> Result<u64, PublishError> {
        self.inner.publish(name, payload)
    }
}

/// Receives signals matching registered patterns.
pub struct Subscriber {
    inner: Arc<EndpointInner>,
}

impl Subscriber {
    /// Register `handler` for signals matching `pattern` (`"a.b"`,
    /// `"a.*"`, or `"*"`). Handlers run on the dispatch queue.
    pub fn subscribe(
        &self,
        pattern: &str,
        handler: impl Fn(&str, u64, &Value) + Send + Sync + 'static,
    ) -> SubscriptionToken {
        SubscriptionToken(self.inner.subscribe(pattern, Arc::new(handler)))
    }

    /// Remove a subscription; unknown tokens are a no-op.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.inner.unsubscribe(token.0);
    }
}

/// Issues requests and awaits correlated responses.
pub struct Requester {
    inner: Arc<EndpointInner>,
}

impl Requester {
    /// Call `method` with `payload`, waiting up to `timeout` for the
    /// response. Concurrent calls are multiplexed by request id.
    pub async fn call(
        &self,
        method: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, CallError> {
        self.inner.call(method, payload, timeout).await
    }
}

/// Serves named methods; each inbound request yields exactly one
/// response or fault.
pub struct Responder {
    inner: Arc<EndpointInner>,
}

macro_rules! role_debug {
    ($($wrapper:ident),+) => {
        $(impl fmt::Debug for $wrapper {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($wrapper)).field(&self.inner).finish()
            }
        })+
    };
}

role_debug!(Publisher, Subscriber, Requester, Responder);

impl Responder {
    /// Register the handler for `method`, replacing any previous one.
    /// Requests for unregistered methods are answered with a not-found
    /// fault.
    pub fn register(
        &self,
        method: &str,
        handler: impl Fn(Value) -> Result<Value, Fault> + Send + Sync + 'static,
    ) {
        self.inner.methods.lock().insert(method.to_string(), Arc::new(handler));
    }

    /// Drop the handler for `method`, if registered.
    pub fn unregister(&self, method: &str) {
        self.inner.methods.lock().remove(method);
    }
}

#[cfg(test)]
#[path = "roles_tests.rs"]
mod tests;
