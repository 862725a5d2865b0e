// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::sync::mpsc;

fn floor(label: &str) -> Floor {
    label.parse().unwrap()
}

fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(line) = rx.try_recv() {
        out.push(line);
    }
    out
}

/// S1: idle call on a single car assigns that car and sends `FLOOR <source>`.
#[test]
fn dispatch_call_picks_the_only_covering_car_and_emits_floor_to_source() {
    let mut fleet = Fleet::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx);

    let assigned = fleet.dispatch_call(floor("3"), floor("7"));
    assert_eq!(assigned.as_deref(), Some("A"));
    assert_eq!(drain(&mut rx), vec!["FLOOR 3"]);
}

/// S2: no registered car covers the call's range.
#[test]
fn dispatch_call_returns_none_when_no_car_covers_the_range() {
    let mut fleet = Fleet::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("1"), floor("5"), tx);

    assert_eq!(fleet.dispatch_call(floor("7"), floor("2")), None);
}

#[test]
fn dispatch_call_ignores_disconnected_cars() {
    let mut fleet = Fleet::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx);
    fleet.mark_disconnected("A");

    assert_eq!(fleet.dispatch_call(floor("3"), floor("7")), None);
}

#[test]
fn dispatch_call_breaks_ties_lexicographically_by_name() {
    let mut fleet = Fleet::new();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    fleet.register("B".to_owned(), floor("B1"), floor("10"), tx_b);
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx_a);

    assert_eq!(fleet.dispatch_call(floor("3"), floor("7")).as_deref(), Some("A"));
}

/// Following S1: once the car reports `Opening` at the queue head, that stop
/// pops and the next stop (the destination) is sent.
#[test]
fn update_status_pops_completed_head_and_advances_to_next_stop() {
    let mut fleet = Fleet::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx);
    fleet.dispatch_call(floor("3"), floor("7"));
    drain(&mut rx);

    fleet.update_status("A", CarStatus::Opening, floor("3"), floor("3"));
    assert_eq!(drain(&mut rx), vec!["FLOOR 7"]);
}

#[test]
fn update_status_on_an_unknown_car_is_a_no_op() {
    let mut fleet = Fleet::new();
    fleet.update_status("ghost", CarStatus::Opening, floor("1"), floor("1"));
}

#[test]
fn mark_disconnected_clears_the_queue() {
    let mut fleet = Fleet::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx);
    fleet.dispatch_call(floor("3"), floor("7"));

    fleet.mark_disconnected("A");
    assert_eq!(fleet.dispatch_call(floor("3"), floor("7")), None);
}

#[test]
fn register_twice_resets_the_queue() {
    let mut fleet = Fleet::new();
    let (tx1, _rx1) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx1);
    fleet.dispatch_call(floor("3"), floor("7"));

    let (tx2, mut rx2) = mpsc::unbounded_channel();
    fleet.register("A".to_owned(), floor("B1"), floor("10"), tx2);
    let assigned = fleet.dispatch_call(floor("2"), floor("4"));
    assert_eq!(assigned.as_deref(), Some("A"));
    assert_eq!(drain(&mut rx2), vec!["FLOOR 2"]);
}
