// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider selection across heterogeneous transports.

use crate::prelude::*;

use ob_bus::BindError;

#[tokio::test]
async fn bind_falls_back_from_native_to_socket_provider() {
    // The preferred native address is not served, so binding falls
    // through to the Unix relay.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("netinfo.sock");
    let path = path.to_str().unwrap();

    let relay = Relay::new(Arc::new(JsonCodec));
    relay.serve_unix(path).unwrap();

    let hub = NativeHub::new();
    let registry = ProviderRegistry::new();
    registry.register("netinfo", Arc::new(hub.transport()), EndpointConfig::new("netinfo.local"));
    registry.register("netinfo", Arc::new(UnixTransport), EndpointConfig::new(path));

    let q = queue();
    let ep = registry
        .bind("netinfo", Role::Publisher, Arc::new(JsonCodec), Arc::clone(&q))
        .await
        .unwrap();
    assert_eq!(ep.address(), path);

    let attempts = registry.last_attempts("netinfo");
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].address, "netinfo.local");
}

#[tokio::test]
async fn exhausted_bind_names_every_failed_transport() {
    let hub = NativeHub::new();
    let registry = ProviderRegistry::new();
    registry.register("sysinfo", Arc::new(hub.transport()), EndpointConfig::new("sysinfo.local"));
    registry.register(
        "sysinfo",
        Arc::new(UnixTransport),
        EndpointConfig::new("/nonexistent/sysinfo.sock"),
    );

    let err = registry
        .bind("sysinfo", Role::Requester, Arc::new(JsonCodec), queue())
        .await
        .unwrap_err();
    let BindError::ProviderUnavailable { service, attempts } = err else {
        panic!("expected ProviderUnavailable");
    };
    assert_eq!(service, "sysinfo");
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().all(|a| !a.error.is_empty()));
}

#[tokio::test]
async fn bound_endpoint_carries_traffic_end_to_end() {
    let hub = NativeHub::new();
    hub.serve("logs");

    let registry = ProviderRegistry::new();
    registry.register("logs", Arc::new(hub.transport()), EndpointConfig::new("logs"));

    let q = queue();
    let pub_ep = registry
        .bind("logs", Role::Publisher, Arc::new(JsonCodec), Arc::clone(&q))
        .await
        .unwrap();
    let sub_ep = registry
        .bind("logs", Role::Subscriber, Arc::new(JsonCodec), Arc::clone(&q))
        .await
        .unwrap();

    let log = SignalLog::new();
    let l = Arc::clone(&log);
    sub_ep.subscriber().unwrap().subscribe("line.*", move |n, s, p| l.record(n, s, p));

    pub_ep.publisher().unwrap().publish("line.error", Value::text("disk I/O")).unwrap();
    log.wait_for(1).await;
    assert_eq!(log.entries()[0].2, Value::text("disk I/O"));
}
