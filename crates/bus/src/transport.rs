// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transport binding contract.
//!
//! A concrete backend implements [`Transport`] (connection factory) and
//! [`Connection`] (one live link). The endpoint layer depends only on these
//! two traits; backends never invoke application callbacks directly — the
//! receive callback is installed by the endpoint and immediately trampolines
//! inbound frames onto the dispatch queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConnectionError, SendError};

/// Kinds of transport a provider can register. `Rpc` and `PubSub` are
/// reserved for out-of-tree bindings; the registry treats all kinds
/// uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Native,
    Tcp,
    Unix,
    Rpc,
    PubSub,
}

ob_value::simple_display! {
    TransportKind {
        Native => "native",
        Tcp => "tcp",
        Unix => "unix",
        Rpc => "rpc",
        PubSub => "pubsub",
    }
}

/// Per-connection tuning handed to `Transport::connect`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Deadline for the connect attempt itself.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_secs(5) }
    }
}

/// What a binding reports through the receive callback.
#[derive(Debug)]
pub enum ReceiveEvent {
    /// One complete inbound frame.
    Frame(Vec<u8>),
    /// The peer closed or the link failed; no further events follow.
    Closed,
}

pub type ReceiveCallback = Arc<dyn Fn(ReceiveEvent) + Send + Sync>;

/// Connection factory for one backend.
#[async_trait]
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    async fn connect(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Box<dyn Connection>, ConnectionError>;
}

/// Callback slot with a backlog for frames arriving before installation.
///
/// Delivery happens under the lock so installing a callback can never race
/// a frame into the backlog. Endpoint callbacks only trampoline onto the
/// dispatch queue, so holding the lock across the call is cheap.
#[derive(Default)]
pub(crate) struct CallbackSink {
    inner: parking_lot::Mutex<SinkState>,
}

#[derive(Default)]
struct SinkState {
    callback: Option<ReceiveCallback>,
    backlog: std::collections::VecDeque<ReceiveEvent>,
}

impl CallbackSink {
    pub(crate) fn deliver(&self, event: ReceiveEvent) {
        let mut state = self.inner.lock();
        match state.callback.clone() {
            Some(cb) => cb(event),
            None => state.backlog.push_back(event),
        }
    }

    pub(crate) fn install(&self, callback: ReceiveCallback) {
        let mut state = self.inner.lock();
        state.callback = Some(Arc::clone(&callback));
        while let Some(event) = state.backlog.pop_front() {
            callback(event);
        }
    }
}

/// One live link produced by a [`Transport`].
///
/// `send` must not block: bindings queue outbound frames internally and
/// perform I/O on their own tasks.
pub trait Connection: Send + Sync {
    fn send(&self, frame: Vec<u8>) -> Result<(), SendError>;

    /// Install the single receive callback. Frames arriving before a
    /// callback is installed are buffered by the binding.
    fn set_receive_callback(&self, callback: ReceiveCallback);

    /// Close the link. Idempotent; triggers a final `Closed` event.
    fn close(&self);

    fn is_open(&self) -> bool;
}
