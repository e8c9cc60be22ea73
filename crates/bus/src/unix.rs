// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix domain socket binding: the local desktop-bus style transport.
//!
//! Same framing as TCP; the address is a filesystem path.

use async_trait::async_trait;
use tokio::net::{UnixListener, UnixStream};
use tracing::debug;

use crate::error::ConnectionError;
use crate::stream::StreamConnection;
use crate::transport::{Connection, Transport, TransportConfig, TransportKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnixTransport;

#[async_trait]
impl Transport for UnixTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Unix
    }

    async fn connect(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Box<dyn Connection>, ConnectionError> {
        let stream = tokio::time::timeout(config.connect_timeout, UnixStream::connect(address))
            .await
            .map_err(|_| ConnectionError::Io(format!("connect to {address} timed out")))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                    ConnectionError::Refused(address.to_string())
                }
                _ => ConnectionError::Io(e.to_string()),
            })?;
        debug!(address, "unix socket connected");

        let (reader, writer) = stream.into_split();
        Ok(Box::new(StreamConnection::spawn(reader, writer)))
    }
}

/// Wrap an accepted Unix stream as a [`Connection`] (server side).
pub(crate) fn accept_unix(stream: UnixStream) -> Box<dyn Connection> {
    let (reader, writer) = stream.into_split();
    Box::new(StreamConnection::spawn(reader, writer))
}

/// Bind a Unix listener for a relay host, replacing a stale socket file.
pub(crate) fn bind_unix(address: &str) -> Result<UnixListener, ConnectionError> {
    if std::path::Path::new(address).exists() {
        let _ = std::fs::remove_file(address);
    }
    UnixListener::bind(address).map_err(|e| ConnectionError::Io(e.to_string()))
}
