// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ob-bus: the transport-agnostic endpoint and channel abstraction.
//!
//! One logical publish/subscribe and request/response API carried, without
//! application-code changes, over any backend implementing the
//! [`Transport`] contract. In-tree bindings: an in-process native hub, TCP,
//! and Unix domain sockets (both length-prefix framed). The
//! [`ProviderRegistry`] picks a binding per logical service at bind time,
//! falling back down an ordered priority list.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod backoff;
mod endpoint;
mod envelope;
mod error;
mod frame;
mod native;
mod pattern;
mod registry;
mod relay;
mod roles;
mod stream;
mod tcp;
mod transport;
mod unix;

pub use backoff::{Backoff, BackoffConfig};
pub use endpoint::{Endpoint, EndpointConfig, LinkState};
pub use envelope::Envelope;
pub use error::{
    BindError, CallError, ConnectionError, EnvelopeError, PublishError, RoleMismatch, SendError,
};
pub use frame::{read_frame, write_frame, FrameError, MAX_FRAME};
pub use native::{NativeHub, NativeTransport};
pub use pattern::Pattern;
pub use registry::{BindAttempt, ProviderRegistry};
pub use relay::Relay;
pub use roles::{Publisher, Requester, Responder, Role, Subscriber, SubscriptionToken};
pub use tcp::TcpTransport;
pub use transport::{
    Connection, ReceiveCallback, ReceiveEvent, Transport, TransportConfig, TransportKind,
};
pub use unix::UnixTransport;
