// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection handling: the first frame on a connection picks its role
//! (`CAR` registration or a one-shot `CALL`), after which the connection is
//! driven by its own read/write loop.

use std::sync::{Arc, Mutex};

use elevator_core::{framed, ElevatorError, Message};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::fleet::{lock_fleet, Fleet};

/// Accept one connection and dispatch on its first message.
pub async fn handle_connection(stream: TcpStream, fleet: Arc<Mutex<Fleet>>) -> Result<(), ElevatorError> {
    stream.set_nodelay(true).ok();
    let (mut read_half, write_half) = stream.into_split();

    let first = match framed::recv_frame(&mut read_half).await? {
        Some(line) => line,
        None => return Ok(()),
    };

    match Message::parse_from_car(&first) {
        Ok(Message::Register { name, lowest, highest }) => {
            handle_car(name, lowest, highest, read_half, write_half, fleet).await
        }
        Ok(Message::Call { source, destination }) => {
            handle_call(source, destination, write_half, fleet).await
        }
        _ => {
            warn!(line = %first, "first message was neither a registration nor a call");
            Ok(())
        }
    }
}

async fn handle_call<W>(
    source: String,
    destination: String,
    mut write_half: W,
    fleet: Arc<Mutex<Fleet>>,
) -> Result<(), ElevatorError>
where
    W: AsyncWrite + Unpin,
{
    let reply = match (source.parse(), destination.parse()) {
        (Ok(source), Ok(destination)) => {
            let assigned = lock_fleet(&fleet).dispatch_call(source, destination);
            match assigned {
                Some(name) => Message::CarAssigned { name },
                None => Message::Unavailable,
            }
        }
        _ => Message::Unavailable,
    };
    framed::send_frame(&mut write_half, &reply.to_wire()).await
}

async fn handle_car<R, W>(
    name: String,
    lowest: String,
    highest: String,
    mut read_half: R,
    write_half: W,
    fleet: Arc<Mutex<Fleet>>,
) -> Result<(), ElevatorError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (lowest, highest) = match (lowest.parse(), highest.parse()) {
        (Ok(lowest), Ok(highest)) => (lowest, highest),
        _ => {
            warn!(car = %name, lowest, highest, "registration carried an invalid floor range");
            return Ok(());
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    lock_fleet(&fleet).register(name.clone(), lowest, highest, tx);
    info!(car = %name, %lowest, %highest, "car registered");

    let writer_name = name.clone();
    let writer = tokio::spawn(async move {
        let mut write_half = write_half;
        while let Some(line) = rx.recv().await {
            if framed::send_frame(&mut write_half, &line).await.is_err() {
                warn!(car = %writer_name, "failed to write to car connection");
                break;
            }
        }
    });

    loop {
        match framed::recv_frame(&mut read_half).await {
            Ok(Some(line)) => match Message::parse_from_car(&line) {
                Ok(Message::Status { status, current, destination }) => {
                    if let (Ok(status), Ok(current), Ok(destination)) =
                        (status.parse(), current.parse(), destination.parse())
                    {
                        lock_fleet(&fleet).update_status(&name, status, current, destination);
                    } else {
                        debug!(car = %name, line = %line, "status update carried unparsable fields");
                    }
                }
                Ok(Message::Emergency) => {
                    info!(car = %name, "car entered emergency mode");
                    break;
                }
                Ok(Message::IndividualService) => {
                    info!(car = %name, "car entered individual service mode");
                    break;
                }
                _ => debug!(car = %name, line = %line, "ignoring unrecognised message from car"),
            },
            Ok(None) => break,
            Err(e) => {
                warn!(car = %name, error = %e, "car connection failed");
                break;
            }
        }
    }

    lock_fleet(&fleet).mark_disconnected(&name);
    writer.abort();
    info!(car = %name, "car disconnected");
    Ok(())
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
