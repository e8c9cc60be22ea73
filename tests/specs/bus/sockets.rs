// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus specs over real sockets through a relay broker.

use crate::prelude::*;

use ob_value::Fault;

#[tokio::test]
async fn desktop_bus_style_pubsub_over_unix_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("omnibus.sock");
    let path = path.to_str().unwrap();

    let relay = Relay::new(Arc::new(JsonCodec));
    relay.serve_unix(path).unwrap();

    let q = queue();
    let sub_ep = endpoint(Arc::new(UnixTransport), Role::Subscriber, path, &q).await;
    let pub_ep = endpoint(Arc::new(UnixTransport), Role::Publisher, path, &q).await;

    let log = SignalLog::new();
    let l = Arc::clone(&log);
    sub_ep.subscriber().unwrap().subscribe("net.*", move |n, s, p| l.record(n, s, p));
    settle().await; // subscription must reach the relay first

    let publisher = pub_ep.publisher().unwrap();
    publisher.publish("net.up", Value::Bool(true)).unwrap();
    publisher.publish("disk.full", Value::Bool(false)).unwrap();

    log.wait_for(1).await;
    settle().await;
    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0], ("net.up".to_string(), 1, Value::Bool(true)));
}

#[tokio::test]
async fn rpc_style_calls_over_tcp() {
    let relay = Relay::new(Arc::new(JsonCodec));
    let address = relay.serve_tcp("127.0.0.1:0").await.unwrap();

    let q = queue();
    let res_ep = endpoint(Arc::new(TcpTransport), Role::Responder, &address, &q).await;
    res_ep.responder().unwrap().register("upper", |payload| {
        let text = payload.as_text().map_err(|e| Fault::new("app", 1, e.to_string()))?;
        Ok(Value::text(text.to_uppercase()))
    });

    let req_ep = endpoint(Arc::new(TcpTransport), Role::Requester, &address, &q).await;
    let reply = req_ep
        .requester()
        .unwrap()
        .call("upper", Value::text("quiet"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(reply, Value::text("QUIET"));
}

#[tokio::test]
async fn same_application_code_runs_on_either_transport() {
    // The closure only sees the role wrappers; it cannot tell which
    // backend carries the frames.
    async fn exercise(res_ep: &Endpoint, req_ep: &Endpoint) {
        res_ep.responder().unwrap().register("ping", |_| Ok(Value::text("pong")));
        let reply = req_ep
            .requester()
            .unwrap()
            .call("ping", Value::Absent, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply, Value::text("pong"));
    }

    let q = queue();

    let hub = NativeHub::new();
    hub.serve("svc");
    let res = endpoint(Arc::new(hub.transport()), Role::Responder, "svc", &q).await;
    let req = endpoint(Arc::new(hub.transport()), Role::Requester, "svc", &q).await;
    exercise(&res, &req).await;

    let relay = Relay::new(Arc::new(JsonCodec));
    let address = relay.serve_tcp("127.0.0.1:0").await.unwrap();
    let res = endpoint(Arc::new(TcpTransport), Role::Responder, &address, &q).await;
    let req = endpoint(Arc::new(TcpTransport), Role::Requester, &address, &q).await;
    exercise(&res, &req).await;
}
