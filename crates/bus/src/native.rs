// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process native transport: an address-keyed hub of peer connections.
//!
//! Every frame sent on an address is delivered to every other peer on the
//! same address — bus semantics with no sockets and no serialization cost
//! beyond the codec. Addresses must be declared with [`NativeHub::serve`]
//! before peers may connect, mirroring a listener bind; connecting to an
//! undeclared address fails, which is what lets the provider registry fall
//! back to another transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ConnectionError, SendError};
use crate::transport::{
    CallbackSink, Connection, ReceiveCallback, ReceiveEvent, Transport, TransportConfig,
    TransportKind,
};

#[derive(Default)]
struct HubInner {
    served: Mutex<HashMap<String, Vec<Arc<Peer>>>>,
}

/// Shared in-process hub. Clone handles freely; all clones see the same
/// address space.
#[derive(Clone, Default)]
pub struct NativeHub {
    inner: Arc<HubInner>,
}

impl NativeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an address so peers can connect to it. Idempotent.
    pub fn serve(&self, address: &str) {
        self.inner.served.lock().entry(address.to_string()).or_default();
    }

    /// Stop serving an address and close every peer on it.
    pub fn retire(&self, address: &str) {
        let peers = self.inner.served.lock().remove(address).unwrap_or_default();
        for peer in peers {
            peer.shutdown();
        }
    }

    /// Live peer count on an address (diagnostics).
    pub fn peer_count(&self, address: &str) -> usize {
        self.inner.served.lock().get(address).map_or(0, Vec::len)
    }

    /// The [`Transport`] view of this hub.
    pub fn transport(&self) -> NativeTransport {
        NativeTransport { hub: self.clone() }
    }
}

/// Transport binding over a [`NativeHub`].
#[derive(Clone)]
pub struct NativeTransport {
    hub: NativeHub,
}

#[async_trait]
impl Transport for NativeTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Native
    }

    async fn connect(
        &self,
        address: &str,
        _config: &TransportConfig,
    ) -> Result<Box<dyn Connection>, ConnectionError> {
        let mut served = self.hub.inner.served.lock();
        let peers = served
            .get_mut(address)
            .ok_or_else(|| ConnectionError::BadAddress(address.to_string()))?;

        let peer = Arc::new(Peer {
            id: Uuid::new_v4(),
            address: address.to_string(),
            hub: Arc::downgrade(&self.hub.inner),
            open: AtomicBool::new(true),
            sink: CallbackSink::default(),
        });
        peers.push(Arc::clone(&peer));
        debug!(address, peers = peers.len(), "native peer connected");
        Ok(Box::new(NativeConnection { peer }))
    }
}

struct Peer {
    id: Uuid,
    address: String,
    hub: Weak<HubInner>,
    open: AtomicBool,
    sink: CallbackSink,
}

impl Peer {
    fn deliver(&self, event: ReceiveEvent) {
        self.sink.deliver(event);
    }

    /// Mark closed and emit the final `Closed` event (once).
    fn shutdown(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.deliver(ReceiveEvent::Closed);
        }
    }

    fn detach(&self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Some(peers) = hub.served.lock().get_mut(&self.address) {
                peers.retain(|p| p.id != self.id);
            }
        }
    }
}

/// Connection handle for one native peer.
pub(crate) struct NativeConnection {
    peer: Arc<Peer>,
}

impl Connection for NativeConnection {
    fn send(&self, frame: Vec<u8>) -> Result<(), SendError> {
        if !self.peer.open.load(Ordering::SeqCst) {
            return Err(SendError::NotConnected);
        }
        let hub = self.peer.hub.upgrade().ok_or(SendError::NotConnected)?;
        let peers = {
            let served = hub.served.lock();
            served.get(&self.peer.address).cloned().unwrap_or_default()
        };
        for other in peers.iter().filter(|p| p.id != self.peer.id) {
            other.deliver(ReceiveEvent::Frame(frame.clone()));
        }
        Ok(())
    }

    fn set_receive_callback(&self, callback: ReceiveCallback) {
        self.peer.sink.install(callback);
    }

    fn close(&self) {
        self.peer.detach();
        self.peer.shutdown();
    }

    fn is_open(&self) -> bool {
        self.peer.open.load(Ordering::SeqCst)
    }
}

impl Drop for NativeConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
