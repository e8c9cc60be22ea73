// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket-backed connection shared by the TCP and Unix bindings.
//!
//! Generic over reader/writer halves so both stream types (and in-memory
//! duplex pairs in tests) use the same reader task, writer task, and
//! shutdown discipline. The reader task owns inbound framing and reports
//! EOF or I/O failure as a final `Closed` event; neither task ever runs
//! application callbacks — the installed callback trampolines onto the
//! dispatch queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::SendError;
use crate::frame::{read_frame, write_frame, FrameError};
use crate::transport::{CallbackSink, Connection, ReceiveCallback, ReceiveEvent};

struct Shared {
    sink: CallbackSink,
    open: AtomicBool,
    cancel: CancellationToken,
}

impl Shared {
    /// Mark closed and emit the final `Closed` event (once).
    fn shutdown(&self) {
        self.cancel.cancel();
        if self.open.swap(false, Ordering::SeqCst) {
            self.sink.deliver(ReceiveEvent::Closed);
        }
    }
}

/// One live socket connection: an outbound queue drained by a writer task
/// and a reader task feeding the receive callback.
pub(crate) struct StreamConnection {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    shared: Arc<Shared>,
}

impl StreamConnection {
    pub(crate) fn spawn<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            sink: CallbackSink::default(),
            open: AtomicBool::new(true),
            cancel: CancellationToken::new(),
        });

        tokio::spawn(writer_task(writer, rx, Arc::clone(&shared)));
        tokio::spawn(reader_task(reader, Arc::clone(&shared)));

        Self { outbound, shared }
    }
}

impl Connection for StreamConnection {
    fn send(&self, frame: Vec<u8>) -> Result<(), SendError> {
        if !self.shared.open.load(Ordering::SeqCst) {
            return Err(SendError::NotConnected);
        }
        if frame.len() > crate::frame::MAX_FRAME {
            return Err(SendError::FrameTooLarge {
                size: frame.len(),
                max: crate::frame::MAX_FRAME,
            });
        }
        self.outbound.send(frame).map_err(|_| SendError::NotConnected)
    }

    fn set_receive_callback(&self, callback: ReceiveCallback) {
        self.shared.sink.install(callback);
    }

    fn close(&self) {
        self.shared.shutdown();
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

async fn writer_task<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
    shared: Arc<Shared>,
) {
    loop {
        let frame = tokio::select! {
            frame = rx.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
            _ = shared.cancel.cancelled() => break,
        };
        if let Err(e) = write_frame(&mut writer, &frame).await {
            debug!("outbound write failed: {}", e);
            shared.shutdown();
            break;
        }
        trace!(len = frame.len(), "frame written");
    }
}

async fn reader_task<R: AsyncRead + Unpin>(mut reader: R, shared: Arc<Shared>) {
    loop {
        let result = tokio::select! {
            result = read_frame(&mut reader) => result,
            _ = shared.cancel.cancelled() => break,
        };
        match result {
            Ok(frame) => {
                trace!(len = frame.len(), "frame received");
                shared.sink.deliver(ReceiveEvent::Frame(frame));
            }
            Err(FrameError::ConnectionClosed) => {
                debug!("peer closed connection");
                shared.shutdown();
                break;
            }
            Err(e) => {
                debug!("inbound read failed: {}", e);
                shared.shutdown();
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
