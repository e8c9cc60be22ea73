// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! StreamConnection tests over in-memory duplex pipes.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{duplex, split};
use tokio::sync::Notify;

use super::*;
use crate::transport::{Connection, ReceiveCallback, ReceiveEvent};

struct Seen {
    frames: Mutex<Vec<Vec<u8>>>,
    closed: Mutex<bool>,
    notify: Notify,
}

fn collector() -> (ReceiveCallback, Arc<Seen>) {
    let seen = Arc::new(Seen {
        frames: Mutex::new(Vec::new()),
        closed: Mutex::new(false),
        notify: Notify::new(),
    });
    let s = Arc::clone(&seen);
    let cb: ReceiveCallback = Arc::new(move |event| {
        match event {
            ReceiveEvent::Frame(bytes) => s.frames.lock().push(bytes),
            ReceiveEvent::Closed => *s.closed.lock() = true,
        }
        s.notify.notify_one();
    });
    (cb, seen)
}

fn pair() -> (StreamConnection, StreamConnection) {
    let (a, b) = duplex(64 * 1024);
    let (ar, aw) = split(a);
    let (br, bw) = split(b);
    (StreamConnection::spawn(ar, aw), StreamConnection::spawn(br, bw))
}

#[tokio::test]
async fn frames_flow_both_ways() {
    let (a, b) = pair();
    let (cb_a, seen_a) = collector();
    let (cb_b, seen_b) = collector();
    a.set_receive_callback(cb_a);
    b.set_receive_callback(cb_b);

    a.send(b"ping".to_vec()).unwrap();
    seen_b.notify.notified().await;
    assert_eq!(*seen_b.frames.lock(), vec![b"ping".to_vec()]);

    b.send(b"pong".to_vec()).unwrap();
    seen_a.notify.notified().await;
    assert_eq!(*seen_a.frames.lock(), vec![b"pong".to_vec()]);
}

#[tokio::test]
async fn peer_close_reports_closed_event() {
    let (a, b) = pair();
    let (cb_b, seen_b) = collector();
    b.set_receive_callback(cb_b);

    a.close();
    while !*seen_b.closed.lock() {
        seen_b.notify.notified().await;
    }
    assert!(!b.is_open() || *seen_b.closed.lock());
}

#[tokio::test]
async fn send_after_close_fails() {
    let (a, _b) = pair();
    a.close();
    assert!(matches!(a.send(b"x".to_vec()), Err(crate::error::SendError::NotConnected)));
}

#[tokio::test]
async fn oversized_send_is_rejected() {
    let (a, _b) = pair();
    let huge = vec![0u8; crate::frame::MAX_FRAME + 1];
    assert!(matches!(a.send(huge), Err(crate::error::SendError::FrameTooLarge { .. })));
}

#[tokio::test]
async fn frames_sent_in_order_arrive_in_order() {
    let (a, b) = pair();
    let (cb_b, seen_b) = collector();
    b.set_receive_callback(cb_b);

    for i in 0u8..10 {
        a.send(vec![i]).unwrap();
    }
    loop {
        seen_b.notify.notified().await;
        if seen_b.frames.lock().len() == 10 {
            break;
        }
    }
    let frames = seen_b.frames.lock();
    assert_eq!(*frames, (0u8..10).map(|i| vec![i]).collect::<Vec<_>>());
}
