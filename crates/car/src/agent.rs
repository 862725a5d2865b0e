// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The car's network agent (§4.6): shadows the shared-state region over a
//! single TCP session to the dispatcher, on a Tokio task that runs
//! alongside the blocking state-machine thread.

use std::sync::Arc;
use std::time::Duration;

use elevator_core::shared::SharedCarRegion;
use elevator_core::{framed, CarStatus, ElevatorError, Floor, Message};
use tokio::io::AsyncRead;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

struct Connection {
    read_half: OwnedReadHalf,
    write_half: OwnedWriteHalf,
}

/// Run the agent's tick loop until `shutdown` is cancelled.
pub async fn run(
    region: Arc<SharedCarRegion>,
    name: String,
    lowest: Floor,
    highest: Floor,
    delay_ms: u64,
    shutdown: CancellationToken,
    dispatcher_addr: String,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(delay_ms.max(1)));
    let mut conn: Option<Connection> = None;
    let mut last_sent_status: Option<String> = None;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        let (safety_system, individual_service, emergency, status, current, destination) = {
            let guard = region.lock();
            (
                guard.safety_system(),
                guard.individual_service_mode(),
                guard.emergency_mode(),
                guard.status(),
                guard.current_floor(),
                guard.destination_floor(),
            )
        };

        let should_connect = (1..3).contains(&safety_system) && !individual_service && !emergency;

        if !should_connect {
            if let Some(mut dropped) = conn.take() {
                if individual_service {
                    let _ = framed::send_frame(&mut dropped.write_half, &Message::IndividualService.to_wire()).await;
                }
                last_sent_status = None;
                info!(car = %name, "disconnecting from dispatcher");
            }
            continue;
        }

        if conn.is_none() {
            match connect(&dispatcher_addr, &name, lowest, highest).await {
                Ok(established) => {
                    conn = Some(established);
                    last_sent_status = None;
                    info!(car = %name, "registered with dispatcher");
                }
                Err(e) => {
                    warn!(car = %name, error = %e, "failed to connect to dispatcher");
                    continue;
                }
            }
        }

        let Some(active) = conn.as_mut() else { continue };

        if let (Ok(status), Ok(current), Ok(destination)) = (status, current, destination) {
            let line = Message::Status {
                status: status.to_string(),
                current: current.to_string(),
                destination: destination.to_string(),
            }
            .to_wire();
            if last_sent_status.as_deref() != Some(line.as_str()) {
                if framed::send_frame(&mut active.write_half, &line).await.is_err() {
                    conn = None;
                    continue;
                }
                last_sent_status = Some(line);
            }
        }

        if let Some(active) = conn.as_mut() {
            match poll_for_floor(&mut active.read_half).await {
                PollResult::Directive(label) => apply_floor_directive(&region, &label),
                PollResult::Closed | PollResult::Error => {
                    conn = None;
                    continue;
                }
                PollResult::Nothing | PollResult::Unrecognised => {}
            }
        }

        if conn.is_some() {
            let became_emergency = tick_heartbeat(&region);
            if became_emergency {
                if let Some(mut active) = conn.take() {
                    let _ = framed::send_frame(&mut active.write_half, &Message::Emergency.to_wire()).await;
                }
                warn!(car = %name, "safety heartbeat expired; entering emergency mode");
            }
        }
    }
}

async fn connect(dispatcher_addr: &str, name: &str, lowest: Floor, highest: Floor) -> Result<Connection, ElevatorError> {
    let stream = TcpStream::connect(dispatcher_addr)
        .await
        .map_err(|e| ElevatorError::transport(format!("connecting to {dispatcher_addr}: {e}")))?;
    stream.set_nodelay(true).ok();
    let (read_half, mut write_half) = stream.into_split();
    let register = Message::Register {
        name: name.to_owned(),
        lowest: lowest.to_string(),
        highest: highest.to_string(),
    };
    framed::send_frame(&mut write_half, &register.to_wire()).await?;
    Ok(Connection { read_half, write_half })
}

enum PollResult {
    Directive(String),
    Nothing,
    Unrecognised,
    Closed,
    Error,
}

/// Poll the connection for an incoming `FLOOR` directive with a short
/// timeout, so a tick never blocks waiting on the dispatcher.
async fn poll_for_floor<R: AsyncRead + Unpin>(read_half: &mut R) -> PollResult {
    match tokio::time::timeout(Duration::from_millis(10), framed::recv_frame(read_half)).await {
        Ok(Ok(Some(line))) => match Message::parse_to_car(&line) {
            Ok(Message::Floor { label }) => PollResult::Directive(label),
            _ => PollResult::Unrecognised,
        },
        Ok(Ok(None)) => PollResult::Closed,
        Ok(Err(_)) => PollResult::Error,
        Err(_) => PollResult::Nothing,
    }
}

/// Apply a dispatcher `FLOOR` directive (§4.6): while not `Between`, either
/// mark the car `Opening` if it's already sitting at that floor with the
/// doors closed, or retarget `destination_floor`.
fn apply_floor_directive(region: &SharedCarRegion, label: &str) {
    let Ok(floor) = label.parse::<Floor>() else { return };
    let mut guard = region.lock();
    if matches!(guard.status(), Ok(CarStatus::Between)) {
        return;
    }
    let arrived_with_doors_closed =
        matches!(guard.status(), Ok(CarStatus::Closed)) && guard.current_floor().map(|c| c == floor).unwrap_or(false);
    if arrived_with_doors_closed {
        guard.set_status(CarStatus::Opening);
    } else {
        guard.set_destination_floor(floor);
    }
    guard.notify_all();
}

/// Increment the heartbeat counter; if it reaches 3 (no safety monitor
/// pass observed between two agent ticks), enter emergency mode. Returns
/// whether this tick triggered that transition.
fn tick_heartbeat(region: &SharedCarRegion) -> bool {
    let mut guard = region.lock();
    let next = guard.safety_system().saturating_add(1).min(3);
    guard.set_safety_system(next);
    if next >= 3 && !guard.emergency_mode() {
        guard.set_emergency_mode(true);
        guard.notify_all();
        true
    } else {
        false
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
