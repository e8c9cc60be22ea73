// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relay: the broker process side of the socket transports.
//!
//! Sockets are point-to-point, so bus fan-out needs a hub: every endpoint
//! connects to the relay, which routes frames between them. Signals are
//! forwarded only to connections that announced a matching subscription
//! pattern; requests, responses, and faults are forwarded to every other
//! connection and correlated by id at the endpoints. Frames are routed as
//! received — the relay decodes only enough to classify them.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ob_codec::Codec;

use crate::envelope::Envelope;
use crate::error::ConnectionError;
use crate::pattern::Pattern;
use crate::tcp::{accept_tcp, bind_tcp};
use crate::transport::{Connection, ReceiveEvent};
use crate::unix::{accept_unix, bind_unix};

struct Client {
    conn: Arc<dyn Connection>,
    subs: Vec<(String, Pattern)>,
}

struct RelayInner {
    codec: Arc<dyn Codec>,
    clients: Mutex<HashMap<Uuid, Client>>,
    cancel: CancellationToken,
}

/// Frame broker for socket-backed buses. One relay may serve several
/// listeners; all of them share one client space.
pub struct Relay {
    inner: Arc<RelayInner>,
}

impl Relay {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                codec,
                clients: Mutex::new(HashMap::new()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Listen on a Unix socket path, replacing a stale socket file.
    pub fn serve_unix(&self, path: &str) -> Result<(), ConnectionError> {
        let listener = bind_unix(path)?;
        info!(path, "relay listening on unix socket");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => inner.admit(accept_unix(stream)),
                        Err(e) => {
                            warn!("unix accept failed: {}", e);
                            break;
                        }
                    },
                    _ = inner.cancel.cancelled() => break,
                }
            }
        });
        Ok(())
    }

    /// Listen on a TCP address; returns the bound address (useful with
    /// an ephemeral port).
    pub async fn serve_tcp(&self, address: &str) -> Result<String, ConnectionError> {
        let listener = bind_tcp(address).await?;
        let local = listener
            .local_addr()
            .map_err(|e| ConnectionError::Io(e.to_string()))?
            .to_string();
        info!(address = %local, "relay listening on tcp");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => inner.admit(accept_tcp(stream)),
                        Err(e) => {
                            warn!("tcp accept failed: {}", e);
                            break;
                        }
                    },
                    _ = inner.cancel.cancelled() => break,
                }
            }
        });
        Ok(local)
    }

    /// Connected endpoint count (diagnostics).
    pub fn client_count(&self) -> usize {
        self.inner.clients.lock().len()
    }

    /// Stop accepting, close every client connection. Idempotent.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        let clients: Vec<Arc<dyn Connection>> = {
            let mut map = self.inner.clients.lock();
            map.drain().map(|(_, c)| c.conn).collect()
        };
        for conn in &clients {
            conn.close();
        }
        info!(closed = clients.len(), "relay shut down");
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl RelayInner {
    /// Register an accepted connection and start routing its frames.
    fn admit(self: &Arc<Self>, conn: Box<dyn Connection>) {
        let id = Uuid::new_v4();
        let conn: Arc<dyn Connection> = Arc::from(conn);

        // Register before installing the callback: installation flushes
        // any backlogged frames, and routing needs the client present.
        let total = {
            let mut clients = self.clients.lock();
            clients.insert(id, Client { conn: Arc::clone(&conn), subs: Vec::new() });
            clients.len()
        };
        debug!(%id, total, "relay client connected");

        let weak: Weak<RelayInner> = Arc::downgrade(self);
        conn.set_receive_callback(Arc::new(move |event| {
            let Some(inner) = weak.upgrade() else { return };
            match event {
                ReceiveEvent::Frame(bytes) => inner.route(id, bytes),
                ReceiveEvent::Closed => {
                    inner.clients.lock().remove(&id);
                    debug!(%id, "relay client disconnected");
                }
            }
        }));
    }

    fn route(&self, from: Uuid, bytes: Vec<u8>) {
        let env = match self.codec.decode(&bytes).map_err(|e| e.to_string()).and_then(|v| {
            Envelope::from_value(&v).map_err(|e| e.to_string())
        }) {
            Ok(env) => env,
            Err(e) => {
                warn!(%from, "unroutable frame dropped: {}", e);
                return;
            }
        };

        match env {
            Envelope::Subscribe { pattern } => {
                let mut clients = self.clients.lock();
                if let Some(client) = clients.get_mut(&from) {
                    if !client.subs.iter().any(|(raw, _)| *raw == pattern) {
                        client.subs.push((pattern.clone(), Pattern::parse(&pattern)));
                        debug!(%from, pattern, "subscription added");
                    }
                }
            }
            Envelope::Unsubscribe { pattern } => {
                let mut clients = self.clients.lock();
                if let Some(client) = clients.get_mut(&from) {
                    client.subs.retain(|(raw, _)| *raw != pattern);
                }
            }
            Envelope::Signal { ref name, .. } => {
                self.forward(from, &bytes, |client| {
                    client.subs.iter().any(|(_, p)| p.matches(name))
                });
            }
            // Requests and replies are correlated by id at the endpoints;
            // the relay just fans them out.
            Envelope::Request { .. } | Envelope::Response { .. } | Envelope::Fault { .. } => {
                self.forward(from, &bytes, |_| true);
            }
        }
    }

    fn forward(&self, from: Uuid, bytes: &[u8], want: impl Fn(&Client) -> bool) {
        let targets: Vec<Arc<dyn Connection>> = {
            let clients = self.clients.lock();
            clients
                .iter()
                .filter(|(id, client)| **id != from && want(client))
                .map(|(_, client)| Arc::clone(&client.conn))
                .collect()
        };
        for conn in targets {
            if let Err(e) = conn.send(bytes.to_vec()) {
                debug!("relay forward failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
