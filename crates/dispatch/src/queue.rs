// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded multi-producer dispatch queue drained by a worker pool.
//!
//! Producers (transport I/O tasks) enqueue jobs; a configurable pool of
//! worker tasks drains them. Ordering is FIFO per producer, not globally
//! FIFO across producers, unless the pool size is one. Overflow behavior
//! is a deployment choice; drops are never silent — they increment a
//! counter readable via [`DispatchQueue::dropped`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// What to do with a new job when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Block the producer until space frees up or the timeout elapses.
    BlockWithTimeout(Duration),
    /// Reject the incoming job.
    DropNewest,
    /// Evict the oldest queued job to make room.
    DropOldest,
}

/// A queued job was discarded instead of executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DroppedError {
    #[error("dispatch queue is full")]
    Overflow,

    #[error("dispatch queue is closed")]
    Closed,
}

/// Dispatch queue construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Worker pool size. One worker gives globally FIFO execution.
    pub workers: usize,
    /// Maximum queued jobs before the overflow policy applies.
    pub capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { workers: 1, capacity: 1024, overflow: OverflowPolicy::DropOldest }
    }
}

impl DispatchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

struct State {
    queue: VecDeque<Job>,
    closing: bool,
}

struct Inner {
    state: Mutex<State>,
    /// Signalled when a slot frees up (block-with-timeout producers).
    space: Condvar,
    /// Signalled when a job is queued (idle workers).
    work: Notify,
    capacity: usize,
    overflow: OverflowPolicy,
    dropped: AtomicU64,
}

/// The single crossing point from I/O context to application context.
///
/// Must be created inside a tokio runtime; workers are spawned tasks.
pub struct DispatchQueue {
    inner: Arc<Inner>,
    workers: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

enum Next {
    Run(Job),
    Wait,
    Exit,
}

impl DispatchQueue {
    pub fn new(config: DispatchConfig) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State { queue: VecDeque::new(), closing: false }),
            space: Condvar::new(),
            work: Notify::new(),
            capacity: config.capacity.max(1),
            overflow: config.overflow,
            dropped: AtomicU64::new(0),
        });
        let workers = (0..config.workers.max(1))
            .map(|_| tokio::spawn(worker_loop(Arc::clone(&inner))))
            .collect();
        Self { inner, workers: Mutex::new(workers) }
    }

    /// Enqueue a synchronous callback.
    pub fn dispatch(&self, f: impl FnOnce() + Send + 'static) -> Result<(), DroppedError> {
        self.dispatch_future(Box::pin(async move { f() }))
    }

    /// Enqueue a future to be driven by a worker.
    ///
    /// Non-blocking for the drop policies. Under `BlockWithTimeout` the
    /// producer blocks (its thread, not the runtime) until space frees up
    /// or the timeout elapses.
    pub fn dispatch_future(
        &self,
        job: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Result<(), DroppedError> {
        let inner = &self.inner;
        let mut st = inner.state.lock();
        if st.closing {
            return Err(DroppedError::Closed);
        }

        if st.queue.len() >= inner.capacity {
            match inner.overflow {
                OverflowPolicy::DropOldest => {
                    st.queue.pop_front();
                    let total = inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(total, "dispatch queue full, dropped oldest job");
                }
                OverflowPolicy::DropNewest => {
                    let total = inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(total, "dispatch queue full, rejected newest job");
                    return Err(DroppedError::Overflow);
                }
                OverflowPolicy::BlockWithTimeout(timeout) => {
                    let deadline = Instant::now() + timeout;
                    while st.queue.len() >= inner.capacity && !st.closing {
                        if inner.space.wait_until(&mut st, deadline).timed_out() {
                            break;
                        }
                    }
                    if st.closing {
                        return Err(DroppedError::Closed);
                    }
                    if st.queue.len() >= inner.capacity {
                        inner.dropped.fetch_add(1, Ordering::Relaxed);
                        return Err(DroppedError::Overflow);
                    }
                }
            }
        }

        st.queue.push_back(job);
        drop(st);
        inner.work.notify_one();
        Ok(())
    }

    /// Jobs currently waiting for a worker.
    pub fn len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total jobs discarded by overflow or fast shutdown.
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closing
    }

    /// Stop accepting jobs; workers drain what is already queued, then exit.
    /// Idempotent.
    pub fn close(&self) {
        let mut st = self.inner.state.lock();
        if st.closing {
            return;
        }
        st.closing = true;
        let pending = st.queue.len();
        drop(st);
        info!(pending, "dispatch queue closing, draining");
        self.inner.work.notify_waiters();
        self.inner.space.notify_all();
    }

    /// Fast shutdown: discard pending jobs instead of draining them.
    /// Discards count toward [`DispatchQueue::dropped`]. Idempotent.
    pub fn close_now(&self) {
        let mut st = self.inner.state.lock();
        st.closing = true;
        let discarded = st.queue.len() as u64;
        st.queue.clear();
        drop(st);
        if discarded > 0 {
            self.inner.dropped.fetch_add(discarded, Ordering::Relaxed);
        }
        info!(discarded, "dispatch queue closed, pending jobs discarded");
        self.inner.work.notify_waiters();
        self.inner.space.notify_all();
    }

    /// Wait for every worker to exit. Call after `close`/`close_now`.
    pub async fn join(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(inner: Arc<Inner>) {
    loop {
        let next = {
            let mut st = inner.state.lock();
            match st.queue.pop_front() {
                Some(job) => {
                    inner.space.notify_one();
                    Next::Run(job)
                }
                None if st.closing => Next::Exit,
                None => Next::Wait,
            }
        };
        match next {
            Next::Run(job) => job.await,
            Next::Wait => inner.work.notified().await,
            Next::Exit => break,
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
