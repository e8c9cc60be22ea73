// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switchboard propagation specs, including the bus mirror.

use crate::prelude::*;

use ob_switchboard::{Expr, Intercept, SwitchError, Switchboard};

#[tokio::test]
async fn fan_in_graph_converges_to_committed_state() {
    let q = queue();
    let board = Switchboard::new(Arc::clone(&q));
    board
        .register_dependency(
            "online",
            Expr::and([Expr::name("link"), Expr::not(Expr::name("airplane"))]),
        )
        .unwrap();
    board
        .register_dependency("sync", Expr::and([Expr::name("online"), Expr::name("enabled")]))
        .unwrap();

    board.set_many(&[("link", true), ("enabled", true)]).unwrap();
    assert!(board.get("online").unwrap());
    assert!(board.get("sync").unwrap());

    board.set("airplane", true).unwrap();
    assert!(!board.get("online").unwrap());
    assert!(!board.get("sync").unwrap());
}

#[tokio::test]
async fn interceptor_guards_a_remote_visible_switch() {
    let hub = NativeHub::new();
    hub.serve("switches");
    let q = queue();

    let pub_ep = endpoint(Arc::new(hub.transport()), Role::Publisher, "switches", &q).await;
    let sub_ep = endpoint(Arc::new(hub.transport()), Role::Subscriber, "switches", &q).await;

    let log = SignalLog::new();
    let l = Arc::clone(&log);
    sub_ep.subscriber().unwrap().subscribe("*", move |n, s, p| l.record(n, s, p));

    let board = Switchboard::new(Arc::clone(&q));
    board.mirror_to(pub_ep.publisher().unwrap());
    board.register("maintenance");
    board.register_interceptor("maintenance", |_, value| {
        // Entering maintenance is allowed; leaving it is vetoed.
        if value {
            Intercept::Approve
        } else {
            Intercept::Deny
        }
    });

    board.set("maintenance", true).unwrap();
    log.wait_for(1).await;
    let entries = log.entries();
    assert_eq!(entries[0].0, "switch:maintenance");
    assert_eq!(entries[0].2.get("old"), &Value::Bool(false));
    assert_eq!(entries[0].2.get("new"), &Value::Bool(true));

    // The denied write never reaches the bus.
    assert_eq!(
        board.set("maintenance", false),
        Err(SwitchError::Intercepted("maintenance".to_string()))
    );
    settle().await;
    assert_eq!(log.entries().len(), 1);
}

#[tokio::test]
async fn derived_changes_are_mirrored_alongside_leaves() {
    let hub = NativeHub::new();
    hub.serve("switches");
    let q = queue();

    let pub_ep = endpoint(Arc::new(hub.transport()), Role::Publisher, "switches", &q).await;
    let sub_ep = endpoint(Arc::new(hub.transport()), Role::Subscriber, "switches", &q).await;

    let log = SignalLog::new();
    let l = Arc::clone(&log);
    sub_ep.subscriber().unwrap().subscribe("*", move |n, s, p| l.record(n, s, p));

    let board = Switchboard::new(Arc::clone(&q));
    board.mirror_to(pub_ep.publisher().unwrap());
    board.register_dependency("ready", Expr::name("power")).unwrap();

    board.set("power", true).unwrap();
    log.wait_for(2).await;

    let names: Vec<String> = log.entries().iter().map(|(n, _, _)| n.clone()).collect();
    // Leaf commit first, then its dependent, matching commit order.
    assert_eq!(names, vec!["switch:power".to_string(), "switch:ready".to_string()]);
}
