// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The five-state door/motion automaton (§4.4). Runs on a dedicated blocking
//! thread (via `tokio::task::spawn_blocking`) because it takes the real
//! process-shared mutex and sleeps/condvar-waits for real wall-clock time,
//! neither of which belongs on the cooperative Tokio reactor the network
//! agent shares the process with.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use elevator_core::shared::SharedCarRegion;
use elevator_core::{CarStatus, Floor};
use tracing::debug;

/// Longest single sleep slice, so a shutdown request or a button change is
/// never more than this far from being noticed.
const SLICE: Duration = Duration::from_millis(10);
/// Deadline for the `Closed` state's condvar wait when there's nothing to do.
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Sleep for `total`, in `SLICE`-sized increments, returning early if
/// `shutdown` is set.
fn sleep_responsive(total: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + total;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        std::thread::sleep(remaining.min(SLICE));
    }
}

/// Drive `region` through the door/motion automaton until `shutdown` is set.
pub fn run(region: Arc<SharedCarRegion>, lowest: Floor, highest: Floor, delay_ms: u64, shutdown: Arc<AtomicBool>) {
    let delay = Duration::from_millis(delay_ms);
    let mut open_start: Option<Instant> = None;

    while !shutdown.load(Ordering::Relaxed) {
        let status = {
            let mut guard = region.lock();
            apply_button_edges(&mut guard, &mut open_start);
            guard.status()
        };

        match status {
            Ok(CarStatus::Opening) => {
                sleep_responsive(delay, &shutdown);
                let mut guard = region.lock();
                if matches!(guard.status(), Ok(CarStatus::Opening)) {
                    guard.set_status(CarStatus::Open);
                    open_start = Some(Instant::now());
                    guard.notify_all();
                }
            }
            Ok(CarStatus::Open) => {
                sleep_responsive(SLICE, &shutdown);
                let held_long_enough = open_start.map(|t| t.elapsed() >= delay).unwrap_or(true);
                if held_long_enough {
                    let mut guard = region.lock();
                    if matches!(guard.status(), Ok(CarStatus::Open)) && !guard.individual_service_mode() {
                        guard.set_status(CarStatus::Closing);
                        guard.notify_all();
                    }
                }
            }
            Ok(CarStatus::Closing) => {
                sleep_responsive(delay, &shutdown);
                let mut guard = region.lock();
                if matches!(guard.status(), Ok(CarStatus::Closing)) {
                    guard.set_status(CarStatus::Closed);
                    guard.notify_all();
                }
            }
            Ok(CarStatus::Closed) => {
                let mut guard = region.lock();
                let ready_to_move = !guard.emergency_mode()
                    && guard
                        .current_floor()
                        .and_then(|current| guard.destination_floor().map(|dest| (current, dest)))
                        .map(|(current, dest)| current != dest)
                        .unwrap_or(false);
                if ready_to_move {
                    match guard.destination_floor() {
                        Ok(dest) if dest.in_range(lowest, highest) => {
                            guard.set_status(CarStatus::Between);
                            guard.notify_all();
                        }
                        Ok(_) => {
                            if let Ok(current) = guard.current_floor() {
                                guard.set_destination_floor(current);
                                guard.notify_all();
                            }
                        }
                        Err(_) => {}
                    }
                } else {
                    guard.wait_timeout(IDLE_WAIT);
                }
            }
            Ok(CarStatus::Between) => {
                sleep_responsive(delay, &shutdown);
                let mut guard = region.lock();
                if matches!(guard.status(), Ok(CarStatus::Between)) {
                    advance_between(&mut guard, lowest, highest);
                }
            }
            Err(_) => {
                debug!("shared record holds an invalid status; waiting for the safety monitor");
                sleep_responsive(IDLE_WAIT, &shutdown);
            }
        }
    }
}

/// Consume the edge-triggered button flags. `open_button` either opens a
/// closed/closing car or, while already `Open`, resets the hold timer;
/// `close_button` closes an open car.
fn apply_button_edges(guard: &mut elevator_core::shared::CarGuard<'_>, open_start: &mut Option<Instant>) {
    if guard.take_open_button() {
        match guard.status() {
            Ok(CarStatus::Closed) | Ok(CarStatus::Closing) => {
                guard.set_status(CarStatus::Opening);
                guard.notify_all();
            }
            Ok(CarStatus::Open) => {
                *open_start = Some(Instant::now());
            }
            _ => {}
        }
    }
    if guard.take_close_button() && matches!(guard.status(), Ok(CarStatus::Open)) {
        guard.set_status(CarStatus::Closing);
        guard.notify_all();
    }
}

/// Step `current_floor` one unit towards `destination_floor`; on arrival,
/// transition to `Opening` (or straight to `Closed` under individual
/// service mode, per §4.4's `Between` row).
fn advance_between(guard: &mut elevator_core::shared::CarGuard<'_>, lowest: Floor, highest: Floor) {
    let (Ok(current), Ok(destination)) = (guard.current_floor(), guard.destination_floor()) else {
        return;
    };
    let Some(next) = current.step_towards(destination, lowest, highest) else {
        return;
    };
    guard.set_current_floor(next);
    if next == destination {
        if guard.individual_service_mode() {
            guard.set_status(CarStatus::Closed);
        } else {
            guard.set_status(CarStatus::Opening);
        }
    }
    guard.notify_all();
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
