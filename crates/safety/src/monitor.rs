// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The heartbeat/validation/failsafe loop (§4.5). Runs synchronously on its
//! own thread, taking the real process-shared mutex and condvar; the only
//! asynchronous thing in the `safety` binary is the signal watcher that sets
//! `shutdown`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use elevator_core::shared::{CarGuard, SharedCarRegion};
use elevator_core::CarStatus;

/// Deadline for each condvar wait; bounds how long a shutdown request can
/// wait behind an idle pass.
const TIMEOUT: Duration = Duration::from_secs(1);

/// Drive one region's safety monitor until `shutdown` is set.
pub fn run(region: &SharedCarRegion, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Relaxed) {
        let mut guard = region.lock();
        guard.wait_timeout(TIMEOUT);
        process(&mut guard);
    }
}

/// One pass: heartbeat, failsafes, violation detection. Broadcasts the
/// condvar if anything changed.
fn process(guard: &mut CarGuard<'_>) {
    let mut changed = false;

    if guard.safety_system() == 0 {
        guard.set_safety_system(1);
        changed = true;
    }

    if guard.door_obstruction() && matches!(guard.status(), Ok(CarStatus::Closing)) {
        guard.set_status(CarStatus::Opening);
        changed = true;
    }

    if guard.emergency_stop() && !guard.emergency_mode() {
        raise_violation(guard, "The emergency stop button has been pressed!");
        guard.set_emergency_stop(false);
        changed = true;
    }

    if guard.overload() && !guard.emergency_mode() {
        raise_violation(guard, "The overload sensor has been tripped!");
        changed = true;
    }

    if !guard.emergency_mode() && !is_valid(guard) {
        raise_violation(guard, "Data consistency error!");
        changed = true;
    }

    if changed {
        guard.notify_all();
    }
}

/// §3's invariants, to the extent the shared record exposes them: valid
/// floor labels, a valid status, the obstruction/status coherence rule, and
/// the heartbeat counter's bound. Flag fields are always 0/1 by
/// construction of [`CarGuard`]'s bool accessors, so that part of the
/// original validation has no Rust counterpart to check.
fn is_valid(guard: &CarGuard<'_>) -> bool {
    guard.current_floor().is_ok()
        && guard.destination_floor().is_ok()
        && guard.status().is_ok()
        && guard.safety_system() <= 3
        && (!guard.door_obstruction() || matches!(guard.status(), Ok(CarStatus::Opening) | Ok(CarStatus::Closing)))
}

fn raise_violation(guard: &mut CarGuard<'_>, message: &str) {
    write_diagnostic(message);
    guard.set_emergency_mode(true);
}

/// Write `message` followed by a newline directly to stdout via `write(2)`,
/// bypassing buffered I/O so this never re-enters allocator or stdio-lock
/// internals the process's `SIGINT` handling must stay clear of.
#[allow(unsafe_code)]
fn write_diagnostic(message: &str) {
    let bytes = message.as_bytes();
    // SAFETY: `bytes` and the newline literal are valid for their stated
    // lengths for the duration of each call; fd 1 is open for the life of
    // the process.
    unsafe {
        nix::libc::write(1, bytes.as_ptr().cast(), bytes.len());
        nix::libc::write(1, b"\n".as_ptr().cast(), 1);
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
