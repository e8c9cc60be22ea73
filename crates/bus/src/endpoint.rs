// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint core: one transport-bound communication identity.
//!
//! An endpoint owns exactly one connection to one transport, a bounded
//! buffer of frames awaiting reconnect, the subscription and method
//! tables, and the in-flight request map. A supervisor task runs the
//! connection state machine:
//!
//! `Disconnected → Connecting → Connected → Closing → Closed`, plus
//! `Connected → Disconnected` on transport failure, with exponential
//! backoff + jitter between reconnect attempts until `close` is called.
//!
//! Inbound frames cross to application context through the dispatch
//! queue; nothing here runs on a transport I/O task.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ob_codec::Codec;
use ob_dispatch::{DispatchQueue, Timers};
use ob_value::{Fault, Value};

use crate::backoff::{Backoff, BackoffConfig};
use crate::envelope::Envelope;
use crate::error::{CallError, ConnectionError, PublishError, SendError};
use crate::pattern::Pattern;
use crate::roles::Role;
use crate::transport::{Connection, ReceiveEvent, Transport, TransportConfig};

/// Orphaned request ids retained for late-response discarding.
const MAX_ORPHANS: usize = 1024;

/// Connection state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
    Closed,
}

ob_value::simple_display! {
    LinkState {
        Disconnected => "disconnected",
        Connecting => "connecting",
        Connected => "connected",
        Closing => "closing",
        Closed => "closed",
    }
}

/// Endpoint construction parameters.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub address: String,
    pub transport: TransportConfig,
    /// Frames held while disconnected; oldest dropped on overflow.
    pub pending_capacity: usize,
    pub backoff: BackoffConfig,
}

impl EndpointConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            transport: TransportConfig::default(),
            pending_capacity: 256,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_pending_capacity(mut self, capacity: usize) -> Self {
        self.pending_capacity = capacity.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }
}

struct Link {
    state: LinkState,
    conn: Option<Box<dyn Connection>>,
}

pub(crate) struct SubEntry {
    pub(crate) token: Uuid,
    pub(crate) raw: String,
    pub(crate) pattern: Pattern,
    pub(crate) handler: Arc<dyn Fn(&str, u64, &Value) + Send + Sync>,
}

type CallSlot = oneshot::Sender<Result<Value, CallError>>;

pub(crate) struct EndpointInner {
    address: String,
    role: Role,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn Codec>,
    queue: Arc<DispatchQueue>,
    timers: Timers,
    transport_config: TransportConfig,
    backoff_config: BackoffConfig,

    link: Mutex<Link>,
    /// Supervisor wakeup on transport failure.
    conn_down: Notify,
    closed: CancellationToken,

    pending: Mutex<VecDeque<Vec<u8>>>,
    pending_capacity: usize,
    pending_dropped: AtomicU64,

    seqs: Mutex<HashMap<String, u64>>,
    pub(crate) subs: Mutex<Vec<SubEntry>>,
    calls: Mutex<HashMap<Uuid, CallSlot>>,
    orphans: Mutex<HashSet<Uuid>>,
    pub(crate) methods: Mutex<HashMap<String, Arc<dyn Fn(Value) -> Result<Value, Fault> + Send + Sync>>>,
}

/// One communication identity bound to one transport and one role.
///
/// Closing the endpoint tears down all subscriptions and fails every
/// in-flight request, synchronously with respect to `close` returning.
pub struct Endpoint {
    pub(crate) inner: Arc<EndpointInner>,
}

impl Endpoint {
    /// Connect through `transport` and start the supervisor.
    ///
    /// The initial connect failure surfaces to the caller so the provider
    /// registry can fall back to the next candidate; once connected,
    /// later failures are retried internally.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        role: Role,
        codec: Arc<dyn Codec>,
        queue: Arc<DispatchQueue>,
        config: EndpointConfig,
    ) -> Result<Self, ConnectionError> {
        let conn = transport.connect(&config.address, &config.transport).await?;

        let inner = Arc::new(EndpointInner {
            address: config.address,
            role,
            transport,
            codec,
            queue,
            timers: Timers::new(),
            transport_config: config.transport,
            backoff_config: config.backoff,
            link: Mutex::new(Link { state: LinkState::Connecting, conn: None }),
            conn_down: Notify::new(),
            closed: CancellationToken::new(),
            pending: Mutex::new(VecDeque::new()),
            pending_capacity: config.pending_capacity,
            pending_dropped: AtomicU64::new(0),
            seqs: Mutex::new(HashMap::new()),
            subs: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
            orphans: Mutex::new(HashSet::new()),
            methods: Mutex::new(HashMap::new()),
        });

        inner.attach(conn);
        tokio::spawn(supervise(Arc::clone(&inner)));
        Ok(Self { inner })
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn role(&self) -> Role {
        self.inner.role
    }

    pub fn state(&self) -> LinkState {
        self.inner.link.lock().state
    }

    /// Frames dropped from the pending buffer during disconnect windows.
    pub fn pending_dropped(&self) -> u64 {
        self.inner.pending_dropped.load(Ordering::Relaxed)
    }

    /// Close the endpoint: tears down subscriptions, fails in-flight
    /// requests with `CallError::Closed`, and stops reconnecting.
    /// Idempotent; effective before this call returns.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl fmt::Debug for EndpointInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .field("role", &self.role)
            .field("state", &self.link.lock().state)
            .finish()
    }
}

impl EndpointInner {
    /// Install a live connection: wire the receive callback, flush the
    /// pending buffer, and replay active subscriptions.
    fn attach(self: &Arc<Self>, conn: Box<dyn Connection>) {
        let weak: Weak<EndpointInner> = Arc::downgrade(self);
        conn.set_receive_callback(Arc::new(move |event| {
            let Some(inner) = weak.upgrade() else { return };
            match event {
                ReceiveEvent::Frame(bytes) => {
                    let target = Arc::clone(&inner);
                    // Crossing point: decode and handle on a dispatch
                    // worker, never on the transport I/O task.
                    let _ = inner.queue.dispatch(move || target.process_frame(&bytes));
                }
                ReceiveEvent::Closed => inner.conn_down.notify_one(),
            }
        }));

        {
            let mut link = self.link.lock();
            if link.state == LinkState::Closing || link.state == LinkState::Closed {
                conn.close();
                return;
            }
            link.state = LinkState::Connected;
            link.conn = Some(conn);
        }

        self.replay_subscriptions();
        self.flush_pending();
    }

    fn replay_subscriptions(&self) {
        let patterns: Vec<String> =
            self.subs.lock().iter().map(|entry| entry.raw.clone()).collect();
        for pattern in patterns {
            if let Ok(bytes) = self.encode(&Envelope::Subscribe { pattern }) {
                let _ = self.send_now(bytes);
            }
        }
    }

    fn flush_pending(&self) {
        loop {
            let Some(bytes) = self.pending.lock().pop_front() else { break };
            if self.send_now(bytes.clone()).is_err() {
                // Link died mid-flush; keep the frame for the next attempt.
                self.pending.lock().push_front(bytes);
                break;
            }
        }
    }

    fn encode(&self, env: &Envelope) -> Result<Vec<u8>, String> {
        self.codec.encode(&env.to_value()).map_err(|e| e.to_string())
    }

    /// Send on the live connection, or fail with `NotConnected`.
    fn send_now(&self, bytes: Vec<u8>) -> Result<(), SendError> {
        let link = self.link.lock();
        match (&link.state, &link.conn) {
            (LinkState::Connected, Some(conn)) => conn.send(bytes),
            _ => Err(SendError::NotConnected),
        }
    }

    /// Send when connected, otherwise hold in the bounded pending buffer.
    fn send_or_buffer(&self, bytes: Vec<u8>) {
        if let Err(e) = self.send_now(bytes.clone()) {
            debug!("send failed ({}), buffering frame", e);
            self.buffer_frame(bytes);
        }
    }

    fn buffer_frame(&self, bytes: Vec<u8>) {
        let mut pending = self.pending.lock();
        if pending.len() >= self.pending_capacity {
            pending.pop_front();
            let total = self.pending_dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(total, "pending buffer full, dropped oldest frame");
        }
        pending.push_back(bytes);
    }

    // ---- role operations (called through the role wrappers) ----

    pub(crate) fn publish(self: &Arc<Self>, name: &str, payload: Value) -> Result<u64, PublishError> {
        if self.closed.is_cancelled() {
            return Err(PublishError::Closed);
        }

        let seq = {
            let mut seqs = self.seqs.lock();
            let entry = seqs.entry(name.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        let env = Envelope::Signal { name: name.to_string(), seq, payload };
        let bytes = self.encode(&env).map_err(PublishError::Encode)?;

        if self.link.lock().state == LinkState::Connected {
            let inner = Arc::clone(self);
            // Non-blocking: the transport send runs on a dispatch worker.
            if self.queue.dispatch(move || inner.send_or_buffer(bytes)).is_err() {
                // Queue overflow/closed is already counted by the queue.
                debug!(name, "publish dropped by dispatch queue");
            }
        } else {
            self.buffer_frame(bytes);
        }
        Ok(seq)
    }

    pub(crate) fn subscribe(
        &self,
        pattern: &str,
        handler: Arc<dyn Fn(&str, u64, &Value) + Send + Sync>,
    ) -> Uuid {
        let token = Uuid::new_v4();
        self.subs.lock().push(SubEntry {
            token,
            raw: pattern.to_string(),
            pattern: Pattern::parse(pattern),
            handler,
        });
        // Best effort: a broker peer uses this to filter; native peers
        // ignore it. Replayed on reconnect.
        if let Ok(bytes) = self.encode(&Envelope::Subscribe { pattern: pattern.to_string() }) {
            let _ = self.send_now(bytes);
        }
        token
    }

    /// Idempotent: unknown tokens are a no-op.
    pub(crate) fn unsubscribe(&self, token: Uuid) {
        let removed_raw = {
            let mut subs = self.subs.lock();
            let pos = subs.iter().position(|entry| entry.token == token);
            pos.map(|i| subs.remove(i).raw)
        };
        if let Some(raw) = removed_raw {
            // Only tell the broker when no other subscription still
            // wants this pattern.
            let still_used = self.subs.lock().iter().any(|entry| entry.raw == raw);
            if !still_used {
                if let Ok(bytes) = self.encode(&Envelope::Unsubscribe { pattern: raw }) {
                    let _ = self.send_now(bytes);
                }
            }
        }
    }

    pub(crate) async fn call(
        self: &Arc<Self>,
        method: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, CallError> {
        if self.closed.is_cancelled() {
            return Err(CallError::Closed);
        }

        let id = Uuid::new_v4();
        let env = Envelope::Request { id, method: method.to_string(), payload };
        let bytes = self.encode(&env).map_err(CallError::Encode)?;

        let (tx, rx) = oneshot::channel();
        self.calls.lock().insert(id, tx);

        // Requests are never buffered across disconnects: the caller is
        // waiting and a stale delivery after reconnect would be worse
        // than a prompt failure.
        if self.send_now(bytes).is_err() {
            self.calls.lock().remove(&id);
            return Err(CallError::NotConnected);
        }

        let expire = Arc::clone(self);
        let timer = self.timers.after(timeout, move || expire.expire_call(id));

        let result = rx.await.unwrap_or(Err(CallError::Closed));
        timer.cancel();
        result
    }

    /// Deadline hit: orphan the id so a late response is discarded.
    fn expire_call(&self, id: Uuid) {
        if let Some(tx) = self.calls.lock().remove(&id) {
            let mut orphans = self.orphans.lock();
            if orphans.len() >= MAX_ORPHANS {
                debug!("orphan set at capacity, clearing");
                orphans.clear();
            }
            orphans.insert(id);
            let _ = tx.send(Err(CallError::Timeout));
        }
    }

    // ---- inbound (dispatch worker context) ----

    fn process_frame(self: &Arc<Self>, bytes: &[u8]) {
        let value = match self.codec.decode(bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!("undecodable frame: {}", e);
                return;
            }
        };
        let env = match Envelope::from_value(&value) {
            Ok(env) => env,
            Err(e) => {
                warn!("malformed envelope: {}", e);
                return;
            }
        };

        match env {
            Envelope::Signal { name, seq, payload } => self.handle_signal(&name, seq, &payload),
            Envelope::Request { id, method, payload } => self.handle_request(id, &method, payload),
            Envelope::Response { id, payload } => self.complete_call(id, Ok(payload)),
            Envelope::Fault { id, fault } => self.complete_call(id, Err(CallError::Fault(fault))),
            // Filtering hints are consumed by broker peers, not endpoints.
            Envelope::Subscribe { .. } | Envelope::Unsubscribe { .. } => {}
        }
    }

    fn handle_signal(&self, name: &str, seq: u64, payload: &Value) {
        let handlers: Vec<Arc<dyn Fn(&str, u64, &Value) + Send + Sync>> = self
            .subs
            .lock()
            .iter()
            .filter(|entry| entry.pattern.matches(name))
            .map(|entry| Arc::clone(&entry.handler))
            .collect();
        for handler in handlers {
            handler(name, seq, payload);
        }
    }

    fn handle_request(&self, id: Uuid, method: &str, payload: Value) {
        if self.role != Role::Responder {
            return;
        }
        let handler = self.methods.lock().get(method).cloned();
        let reply = match handler {
            Some(handler) => match handler(payload) {
                Ok(value) => Envelope::Response { id, payload: value },
                Err(fault) => Envelope::Fault { id, fault },
            },
            None => Envelope::Fault { id, fault: Fault::not_found(method) },
        };
        match self.encode(&reply) {
            Ok(bytes) => {
                if let Err(e) = self.send_now(bytes) {
                    debug!(method, "reply not sent: {}", e);
                }
            }
            Err(e) => warn!(method, "reply encoding failed: {}", e),
        }
    }

    fn complete_call(&self, id: Uuid, result: Result<Value, CallError>) {
        if let Some(tx) = self.calls.lock().remove(&id) {
            let _ = tx.send(result);
        } else if self.orphans.lock().remove(&id) {
            debug!(%id, "late response for orphaned request discarded");
        } else {
            debug!(%id, "response for unknown request discarded");
        }
    }

    // ---- lifecycle ----

    fn close(&self) {
        if self.closed.is_cancelled() {
            return;
        }
        {
            let mut link = self.link.lock();
            link.state = LinkState::Closing;
            if let Some(conn) = link.conn.take() {
                conn.close();
            }
        }
        self.closed.cancel();

        // Fail every in-flight request before close returns.
        let slots: Vec<CallSlot> = self.calls.lock().drain().map(|(_, tx)| tx).collect();
        for tx in slots {
            let _ = tx.send(Err(CallError::Closed));
        }
        self.subs.lock().clear();
        self.orphans.lock().clear();
        self.timers.cancel_all();

        self.link.lock().state = LinkState::Closed;
        info!(address = %self.address, "endpoint closed");
    }
}

/// Connection supervisor: reconnect with backoff on failure, stop on close.
async fn supervise(inner: Arc<EndpointInner>) {
    loop {
        tokio::select! {
            _ = inner.conn_down.notified() => {}
            _ = inner.closed.cancelled() => return,
        }
        if inner.closed.is_cancelled() {
            return;
        }

        {
            let mut link = inner.link.lock();
            if link.state == LinkState::Closing || link.state == LinkState::Closed {
                return;
            }
            link.state = LinkState::Disconnected;
            if let Some(conn) = link.conn.take() {
                conn.close();
            }
        }
        warn!(address = %inner.address, "transport failed, reconnecting");

        let mut backoff = Backoff::new(inner.backoff_config);
        loop {
            let delay = backoff.next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = inner.closed.cancelled() => return,
            }

            inner.link.lock().state = LinkState::Connecting;
            match inner.transport.connect(&inner.address, &inner.transport_config).await {
                Ok(conn) => {
                    info!(address = %inner.address, attempt = backoff.attempt(), "reconnected");
                    inner.attach(conn);
                    break;
                }
                Err(e) => {
                    debug!(address = %inner.address, attempt = backoff.attempt(), "reconnect failed: {}", e);
                    inner.link.lock().state = LinkState::Disconnected;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
