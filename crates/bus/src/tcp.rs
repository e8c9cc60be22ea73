// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP transport binding: length-prefixed frames over `TcpStream`.

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use crate::error::ConnectionError;
use crate::stream::StreamConnection;
use crate::transport::{Connection, Transport, TransportConfig, TransportKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

#[async_trait]
impl Transport for TcpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Tcp
    }

    async fn connect(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Box<dyn Connection>, ConnectionError> {
        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| ConnectionError::Io(format!("connect to {address} timed out")))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::ConnectionRefused => {
                    ConnectionError::Refused(address.to_string())
                }
                _ => ConnectionError::Io(e.to_string()),
            })?;
        stream.set_nodelay(true).map_err(|e| ConnectionError::Io(e.to_string()))?;
        debug!(address, "tcp connected");

        let (reader, writer) = stream.into_split();
        Ok(Box::new(StreamConnection::spawn(reader, writer)))
    }
}

/// Wrap an accepted TCP stream as a [`Connection`] (server side).
pub(crate) fn accept_tcp(stream: TcpStream) -> Box<dyn Connection> {
    let _ = stream.set_nodelay(true);
    let (reader, writer) = stream.into_split();
    Box::new(StreamConnection::spawn(reader, writer))
}

/// Bind a TCP listener for a relay host.
pub(crate) async fn bind_tcp(address: &str) -> Result<TcpListener, ConnectionError> {
    TcpListener::bind(address).await.map_err(|e| ConnectionError::Io(e.to_string()))
}
