// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end relay routing over real sockets.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use ob_codec::JsonCodec;
use ob_dispatch::{DispatchConfig, DispatchQueue};
use ob_value::Value;

use super::*;
use crate::endpoint::{Endpoint, EndpointConfig};
use crate::roles::Role;
use crate::tcp::TcpTransport;
use crate::transport::Transport;
use crate::unix::UnixTransport;

fn queue() -> Arc<DispatchQueue> {
    Arc::new(DispatchQueue::new(DispatchConfig::default()))
}

async fn endpoint(
    transport: Arc<dyn Transport>,
    role: Role,
    address: &str,
    q: &Arc<DispatchQueue>,
) -> Endpoint {
    Endpoint::connect(
        transport,
        role,
        Arc::new(JsonCodec),
        Arc::clone(q),
        EndpointConfig::new(address),
    )
    .await
    .unwrap()
}

struct Received {
    signals: Mutex<Vec<(String, u64, Value)>>,
    notify: Notify,
}

fn recorder() -> Arc<Received> {
    Arc::new(Received { signals: Mutex::new(Vec::new()), notify: Notify::new() })
}

/// Give in-flight frames time to cross the relay.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn pub_sub_through_unix_relay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bus.sock");
    let path = path.to_str().unwrap();

    let relay = Relay::new(Arc::new(JsonCodec));
    relay.serve_unix(path).unwrap();

    let q = queue();
    let sub_ep = endpoint(Arc::new(UnixTransport), Role::Subscriber, path, &q).await;
    let pub_ep = endpoint(Arc::new(UnixTransport), Role::Publisher, path, &q).await;

    let received = recorder();
    let r = Arc::clone(&received);
    sub_ep.subscriber().unwrap().subscribe("weather.*", move |name, seq, payload| {
        r.signals.lock().push((name.to_string(), seq, payload.clone()));
        r.notify.notify_one();
    });
    settle().await; // let the subscription reach the relay

    pub_ep.publisher().unwrap().publish("weather.rain", Value::Real(0.7)).unwrap();

    loop {
        if !received.signals.lock().is_empty() {
            break;
        }
        received.notify.notified().await;
    }
    let signals = received.signals.lock();
    assert_eq!(signals[0], ("weather.rain".to_string(), 1, Value::Real(0.7)));
}

#[tokio::test]
async fn request_response_through_tcp_relay() {
    let relay = Relay::new(Arc::new(JsonCodec));
    let address = relay.serve_tcp("127.0.0.1:0").await.unwrap();

    let q = queue();
    let res_ep = endpoint(Arc::new(TcpTransport), Role::Responder, &address, &q).await;
    res_ep.responder().unwrap().register("echo", |payload| Ok(payload));

    let req_ep = endpoint(Arc::new(TcpTransport), Role::Requester, &address, &q).await;
    let result = req_ep
        .requester()
        .unwrap()
        .call("echo", Value::text("hello"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(result, Value::text("hello"));
}

#[tokio::test]
async fn relay_forwards_signals_only_to_matching_subscribers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bus.sock");
    let path = path.to_str().unwrap();

    let relay = Relay::new(Arc::new(JsonCodec));
    relay.serve_unix(path).unwrap();

    let q = queue();
    let sub_a = endpoint(Arc::new(UnixTransport), Role::Subscriber, path, &q).await;
    let sub_b = endpoint(Arc::new(UnixTransport), Role::Subscriber, path, &q).await;
    let pub_ep = endpoint(Arc::new(UnixTransport), Role::Publisher, path, &q).await;

    let hits_a = recorder();
    let ra = Arc::clone(&hits_a);
    sub_a.subscriber().unwrap().subscribe("alpha.*", move |name, seq, payload| {
        ra.signals.lock().push((name.to_string(), seq, payload.clone()));
        ra.notify.notify_one();
    });
    let hits_b = recorder();
    let rb = Arc::clone(&hits_b);
    sub_b.subscriber().unwrap().subscribe("beta.*", move |name, seq, payload| {
        rb.signals.lock().push((name.to_string(), seq, payload.clone()));
        rb.notify.notify_one();
    });
    settle().await;

    pub_ep.publisher().unwrap().publish("alpha.one", Value::Int(1)).unwrap();
    loop {
        if !hits_a.signals.lock().is_empty() {
            break;
        }
        hits_a.notify.notified().await;
    }
    settle().await;
    assert_eq!(hits_a.signals.lock().len(), 1);
    assert!(hits_b.signals.lock().is_empty());
}

#[tokio::test]
async fn shutdown_disconnects_clients() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bus.sock");
    let path = path.to_str().unwrap();

    let relay = Relay::new(Arc::new(JsonCodec));
    relay.serve_unix(path).unwrap();

    let q = queue();
    let ep = endpoint(Arc::new(UnixTransport), Role::Publisher, path, &q).await;
    settle().await;
    assert_eq!(relay.client_count(), 1);

    relay.shutdown();
    relay.shutdown(); // idempotent
    assert_eq!(relay.client_count(), 0);

    // The endpoint notices the dead link and leaves Connected.
    let mut waited = 0;
    while ep.state() == crate::endpoint::LinkState::Connected && waited < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }
    assert_ne!(ep.state(), crate::endpoint::LinkState::Connected);
}
