// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end bus specs over the in-process native transport.

use crate::prelude::*;

use ob_bus::CallError;
use ob_value::{fault_codes, Fault};

#[tokio::test]
async fn one_publisher_fans_out_to_many_subscribers() {
    let hub = NativeHub::new();
    hub.serve("metrics");
    let q = queue();

    let pub_ep = endpoint(Arc::new(hub.transport()), Role::Publisher, "metrics", &q).await;
    let sub_a = endpoint(Arc::new(hub.transport()), Role::Subscriber, "metrics", &q).await;
    let sub_b = endpoint(Arc::new(hub.transport()), Role::Subscriber, "metrics", &q).await;

    let log_a = SignalLog::new();
    let a = Arc::clone(&log_a);
    sub_a.subscriber().unwrap().subscribe("cpu.*", move |n, s, p| a.record(n, s, p));
    let log_b = SignalLog::new();
    let b = Arc::clone(&log_b);
    sub_b.subscriber().unwrap().subscribe("*", move |n, s, p| b.record(n, s, p));

    let publisher = pub_ep.publisher().unwrap();
    publisher.publish("cpu.load", Value::Real(0.5)).unwrap();
    publisher.publish("mem.free", Value::UInt(4096)).unwrap();

    log_a.wait_for(1).await;
    log_b.wait_for(2).await;
    settle().await;

    // The narrow subscription saw only the cpu signal.
    let entries = log_a.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "cpu.load");
    // The wildcard subscription saw both, in publish order.
    let entries = log_b.entries();
    assert_eq!(entries[0].0, "cpu.load");
    assert_eq!(entries[1].0, "mem.free");
}

#[tokio::test]
async fn concurrent_calls_multiplex_by_request_id() {
    let hub = NativeHub::new();
    hub.serve("calc");
    let q = queue();

    let res_ep = endpoint(Arc::new(hub.transport()), Role::Responder, "calc", &q).await;
    res_ep.responder().unwrap().register("negate", |payload| {
        let n = payload
            .as_int()
            .map_err(|e| Fault::framework(fault_codes::BAD_PAYLOAD, e.to_string()))?;
        Ok(Value::Int(-n))
    });

    let req_ep = endpoint(Arc::new(hub.transport()), Role::Requester, "calc", &q).await;
    let requester = Arc::new(req_ep.requester().unwrap());

    let mut handles = Vec::new();
    for i in 0..8i64 {
        let requester = Arc::clone(&requester);
        handles.push(tokio::spawn(async move {
            requester.call("negate", Value::Int(i), Duration::from_secs(5)).await
        }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), Value::Int(-(i as i64)));
    }
}

#[tokio::test]
async fn structured_payloads_survive_the_wire() {
    let hub = NativeHub::new();
    hub.serve("files");
    let q = queue();

    let res_ep = endpoint(Arc::new(hub.transport()), Role::Responder, "files", &q).await;
    res_ep.responder().unwrap().register("stat", |payload| {
        let path = payload
            .try_get("path")
            .and_then(|v| v.as_text())
            .map_err(|e| Fault::framework(fault_codes::BAD_PAYLOAD, e.to_string()))?;
        Ok(Value::record([
            ("path", Value::text(path)),
            ("size", Value::UInt(1024)),
            ("tags", Value::List(vec![Value::text("ro"), Value::Absent])),
        ]))
    });

    let req_ep = endpoint(Arc::new(hub.transport()), Role::Requester, "files", &q).await;
    let reply = req_ep
        .requester()
        .unwrap()
        .call(
            "stat",
            Value::record([("path", Value::text("/tmp/x"))]),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(reply.get("path"), &Value::text("/tmp/x"));
    assert_eq!(reply.get("size"), &Value::UInt(1024));
    assert_eq!(reply.get("tags").index(1), &Value::Absent);
}

#[tokio::test]
async fn responder_faults_reach_the_caller_intact() {
    let hub = NativeHub::new();
    hub.serve("vol");
    let q = queue();

    let res_ep = endpoint(Arc::new(hub.transport()), Role::Responder, "vol", &q).await;
    res_ep.responder().unwrap().register("mount", |_| {
        Err(Fault::new("volume", 13, "device busy")
            .with_details(Value::record([("device", Value::text("/dev/sda1"))])))
    });

    let req_ep = endpoint(Arc::new(hub.transport()), Role::Requester, "vol", &q).await;
    let err = req_ep
        .requester()
        .unwrap()
        .call("mount", Value::Absent, Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        CallError::Fault(fault) => {
            assert_eq!(fault.domain, "volume");
            assert_eq!(fault.code, 13);
            assert_eq!(fault.details.get("device"), &Value::text("/dev/sda1"));
        }
        other => panic!("expected fault, got {other:?}"),
    }
}
