// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The switchboard: interceptors, commit protocol, and notification.
//!
//! Writes are serialized by a single writer lock. A commit clones the
//! current graph, applies the batch, recomputes dependents, and swaps the
//! snapshot in atomically, so readers never observe a partially-updated
//! graph. Subscriber callbacks run on the dispatch queue in commit order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use ob_bus::{Pattern, Publisher};
use ob_dispatch::DispatchQueue;
use ob_value::Value;

use crate::error::SwitchError;
use crate::expr::Expr;
use crate::graph::Graph;

/// Interceptor verdict on a pending leaf write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intercept {
    Approve,
    Deny,
    /// Replace the pending value and continue down the chain.
    Rewrite(bool),
}

/// Handle for one subscription; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchToken(Uuid);

/// Handle for one registered interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorToken(Uuid);

type Interceptor = Arc<dyn Fn(&str, bool) -> Intercept + Send + Sync>;
type ChangeHandler = Arc<dyn Fn(&str, bool, bool) + Send + Sync>;

struct Subscriber {
    token: Uuid,
    pattern: Pattern,
    handler: ChangeHandler,
}

struct Inner {
    graph: RwLock<Arc<Graph>>,
    /// Serializes commits; notification order equals commit order.
    write: Mutex<()>,
    interceptors: Mutex<HashMap<String, Vec<(Uuid, Interceptor)>>>,
    subscribers: Mutex<Vec<Subscriber>>,
    queue: Arc<DispatchQueue>,
    mirror: Mutex<Option<Publisher>>,
}

/// Dependency-driven boolean switch engine.
#[derive(Clone)]
pub struct Switchboard {
    inner: Arc<Inner>,
}

impl Switchboard {
    pub fn new(queue: Arc<DispatchQueue>) -> Self {
        Self {
            inner: Arc::new(Inner {
                graph: RwLock::new(Arc::new(Graph::default())),
                write: Mutex::new(()),
                interceptors: Mutex::new(HashMap::new()),
                subscribers: Mutex::new(Vec::new()),
                queue,
                mirror: Mutex::new(None),
            }),
        }
    }

    /// Mirror every commit as a `switch:<name>` signal on `publisher`,
    /// so remote peers observe switch changes over any transport.
    pub fn mirror_to(&self, publisher: Publisher) {
        *self.inner.mirror.lock() = Some(publisher);
    }

    /// Declare a leaf switch. Idempotent.
    pub fn register(&self, name: &str) {
        let _w = self.inner.write.lock();
        let mut next = (**self.inner.graph.read()).clone();
        next.register_leaf(name);
        *self.inner.graph.write() = Arc::new(next);
    }

    /// Wire `name` to a dependency expression, making it derived. Missing
    /// dependencies are created as unset leaves. A would-be cycle is
    /// rejected with the graph left unchanged.
    pub fn register_dependency(&self, name: &str, expr: Expr) -> Result<(), SwitchError> {
        let _w = self.inner.write.lock();
        let current = Arc::clone(&self.inner.graph.read());

        if current.would_cycle(name, &expr.deps()) {
            return Err(SwitchError::Cycle(name.to_string()));
        }

        let mut next = (*current).clone();
        next.set_expr(name, expr);

        // The new expression may change the cell's effective value right
        // away, and that change flows downstream like any other.
        let mut changes = Vec::new();
        changes.extend(next.recompute_cell(name));
        changes.extend(next.recompute_from(&[name.to_string()]));

        *self.inner.graph.write() = Arc::new(next);
        debug!(switch = name, "dependency registered");
        self.notify(&changes);
        Ok(())
    }

    /// Assign one leaf switch. See [`Switchboard::set_many`].
    pub fn set(&self, name: &str, value: bool) -> Result<(), SwitchError> {
        self.set_many(&[(name, value)])
    }

    /// Assign a batch of leaf switches atomically. Each pending write runs
    /// its interceptor chain; the first denial aborts the whole batch with
    /// no state change. Every derived switch transitively dependent on the
    /// batch is recomputed exactly once.
    ///
    /// Interceptors run synchronously inside the commit and must not write
    /// back into the board.
    pub fn set_many(&self, writes: &[(&str, bool)]) -> Result<(), SwitchError> {
        let _w = self.inner.write.lock();
        let current = Arc::clone(&self.inner.graph.read());

        for (name, _) in writes {
            match current.is_leaf(name) {
                None => return Err(SwitchError::Unknown((*name).to_string())),
                Some(false) => return Err(SwitchError::NotLeaf((*name).to_string())),
                Some(true) => {}
            }
        }

        let mut approved: Vec<(String, bool)> = Vec::with_capacity(writes.len());
        for (name, value) in writes {
            let mut pending = *value;
            let chain = self.inner.interceptors.lock().get(*name).cloned().unwrap_or_default();
            for (_, interceptor) in chain {
                match interceptor(name, pending) {
                    Intercept::Approve => {}
                    Intercept::Rewrite(value) => pending = value,
                    Intercept::Deny => {
                        info!(switch = %name, "write denied by interceptor");
                        return Err(SwitchError::Intercepted((*name).to_string()));
                    }
                }
            }
            approved.push(((*name).to_string(), pending));
        }

        let mut next = (*current).clone();
        let mut changes = Vec::new();
        let mut roots = Vec::with_capacity(approved.len());
        for (name, value) in approved {
            let old = next.assign(&name, value);
            if old != value {
                changes.push((name.clone(), old, value));
            }
            roots.push(name);
        }
        changes.extend(next.recompute_from(&roots));

        *self.inner.graph.write() = Arc::new(next);
        self.notify(&changes);
        Ok(())
    }

    /// Effective value of a switch; unset cells read as false.
    pub fn get(&self, name: &str) -> Result<bool, SwitchError> {
        self.inner
            .graph
            .read()
            .value(name)
            .ok_or_else(|| SwitchError::Unknown(name.to_string()))
    }

    /// Observe committed changes to switches matching `pattern` (`"a.b"`,
    /// `"a.*"`, or `"*"`). Handlers receive `(name, old, new)` on dispatch
    /// workers, in commit order.
    pub fn subscribe(
        &self,
        pattern: &str,
        handler: impl Fn(&str, bool, bool) + Send + Sync + 'static,
    ) -> SwitchToken {
        let token = Uuid::new_v4();
        self.inner.subscribers.lock().push(Subscriber {
            token,
            pattern: Pattern::parse(pattern),
            handler: Arc::new(handler),
        });
        SwitchToken(token)
    }

    /// Remove a subscription; unknown tokens are a no-op.
    pub fn unsubscribe(&self, token: SwitchToken) {
        self.inner.subscribers.lock().retain(|s| s.token != token.0);
    }

    /// Append an interceptor to `name`'s chain.
    pub fn register_interceptor(
        &self,
        name: &str,
        interceptor: impl Fn(&str, bool) -> Intercept + Send + Sync + 'static,
    ) -> InterceptorToken {
        let token = Uuid::new_v4();
        self.inner
            .interceptors
            .lock()
            .entry(name.to_string())
            .or_default()
            .push((token, Arc::new(interceptor)));
        InterceptorToken(token)
    }

    /// Remove an interceptor from whichever chain holds it.
    pub fn unregister_interceptor(&self, token: InterceptorToken) {
        let mut chains = self.inner.interceptors.lock();
        for chain in chains.values_mut() {
            chain.retain(|(id, _)| *id != token.0);
        }
    }

    /// Fan committed changes out to matching subscribers and the mirror.
    /// Called with the writer lock held so ordering follows commits.
    fn notify(&self, changes: &[(String, bool, bool)]) {
        if changes.is_empty() {
            return;
        }
        let subscribers = self.inner.subscribers.lock();
        let mirror = self.inner.mirror.lock();
        for (name, old, new) in changes {
            for sub in subscribers.iter().filter(|s| s.pattern.matches(name)) {
                let handler = Arc::clone(&sub.handler);
                let changed = name.clone();
                let (old, new) = (*old, *new);
                if self.inner.queue.dispatch(move || handler(&changed, old, new)).is_err() {
                    debug!(switch = %name, "change notification dropped by dispatch queue");
                }
            }
            if let Some(publisher) = mirror.as_ref() {
                let payload = Value::record([
                    ("switch", Value::text(name)),
                    ("old", Value::Bool(*old)),
                    ("new", Value::Bool(*new)),
                ]);
                if let Err(e) = publisher.publish(&format!("switch:{name}"), payload) {
                    debug!(switch = %name, "mirror publish failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
