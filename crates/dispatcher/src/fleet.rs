// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher's in-memory car registry: one entry per registered car,
//! each holding its tracked status and its SCAN floor queue. Every mutation
//! happens under the dispatcher-wide mutex guarding a [`Fleet`]; see
//! `handler.rs` for the connection-handling code that calls into it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use elevator_core::queue::{effective_position, eta};
use elevator_core::{CarStatus, Floor, FloorQueue, Message};
use tokio::sync::mpsc::UnboundedSender;

/// One registered car's tracked state and outbound message queue.
struct CarEntry {
    lowest: Floor,
    highest: Floor,
    status: CarStatus,
    current: Floor,
    destination: Floor,
    connected: bool,
    queue: FloorQueue,
    tx: UnboundedSender<String>,
}

/// The dispatcher's car registry. Always accessed through [`lock_fleet`].
#[derive(Default)]
pub struct Fleet {
    cars: HashMap<String, CarEntry>,
}

/// Lock `fleet`, recovering the lock if a prior holder panicked rather than
/// poisoning every later caller — the dispatcher has no in-process state
/// worth protecting from a partially-applied mutation here beyond the map
/// itself, which `std::sync::Mutex` still guards structurally.
pub fn lock_fleet(fleet: &Mutex<Fleet>) -> MutexGuard<'_, Fleet> {
    fleet.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Fleet {
    pub fn new() -> Self {
        Self { cars: HashMap::new() }
    }

    /// Register (or re-register) a car. Re-registration replaces the entry
    /// outright, which resets its queue as required.
    pub fn register(&mut self, name: String, lowest: Floor, highest: Floor, tx: UnboundedSender<String>) {
        self.cars.insert(
            name,
            CarEntry {
                lowest,
                highest,
                status: CarStatus::Closed,
                current: lowest,
                destination: lowest,
                connected: true,
                queue: FloorQueue::new(),
                tx,
            },
        );
    }

    /// Apply a `STATUS` update from a registered car. If the car just
    /// reported `Opening` at the queue's head, that stop is complete: pop it
    /// and, if another stop follows, push `FLOOR` for the new head.
    pub fn update_status(&mut self, name: &str, status: CarStatus, current: Floor, destination: Floor) {
        let Some(car) = self.cars.get_mut(name) else { return };
        car.status = status;
        car.current = current;
        car.destination = destination;
        if status == CarStatus::Opening && car.queue.front() == Some(current) {
            car.queue.pop_front();
            if let Some(next) = car.queue.front() {
                let _ = car.tx.send(Message::Floor { label: next.to_string() }.to_wire());
            }
        }
    }

    /// Mark a car disconnected (emergency, individual service, or transport
    /// failure) and drop its pending stops: the dispatcher can no longer
    /// direct a car it isn't talking to.
    pub fn mark_disconnected(&mut self, name: &str) {
        if let Some(car) = self.cars.get_mut(name) {
            car.connected = false;
            car.queue.clear();
        }
    }

    /// Select a car for `source -> destination`, splice both floors into its
    /// queue, and push a `FLOOR` directive if the head changed. Returns the
    /// assigned car's name, or `None` if no connected car's range covers
    /// both floors.
    pub fn dispatch_call(&mut self, source: Floor, destination: Floor) -> Option<String> {
        let mut best: Option<(&str, i64)> = None;
        for (name, car) in self.cars.iter() {
            if !car.connected {
                continue;
            }
            if !source.in_range(car.lowest, car.highest) || !destination.in_range(car.lowest, car.highest) {
                continue;
            }
            let position = effective_position(car.status, car.current, car.destination);
            let score = eta(position, car.queue.len(), source);
            let better = match best {
                None => true,
                Some((best_name, best_score)) => score < best_score || (score == best_score && name.as_str() < best_name),
            };
            if better {
                best = Some((name.as_str(), score));
            }
        }
        let name = best?.0.to_owned();
        let car = self.cars.get_mut(&name)?;
        let car_pos = effective_position(car.status, car.current, car.destination);
        let had_head = car.queue.front();
        car.queue.push(source, car_pos, car.current, car.destination);
        car.queue.push(destination, car_pos, car.current, car.destination);
        if car.queue.front() != had_head {
            if let Some(floor) = car.queue.front() {
                let _ = car.tx.send(Message::Floor { label: floor.to_string() }.to_wire());
            }
        }
        Some(name)
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
