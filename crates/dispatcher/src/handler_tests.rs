// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::{Arc, Mutex};

use elevator_core::{framed, Message};
use tokio::net::{TcpListener, TcpStream};

use super::handle_connection;
use crate::fleet::Fleet;

/// Accepts connections on `listener` forever, handing each one to
/// [`handle_connection`] against the shared `fleet`, mirroring `dispatcher`'s
/// own accept loop in `lib.rs`.
async fn serve(listener: TcpListener, fleet: Arc<Mutex<Fleet>>) {
    loop {
        let (stream, _) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(_) => return,
        };
        let fleet = Arc::clone(&fleet);
        tokio::spawn(async move {
            let _ = handle_connection(stream, fleet).await;
        });
    }
}

/// Drives a registered car and a passenger call through the real connection
/// handler: registration is recorded in the fleet, the call is routed and
/// `FLOOR` is written back over the car's own socket, and a completed stop
/// advances the queue to the next one.
#[tokio::test]
async fn handle_connection_routes_a_call_to_a_registered_car() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let fleet = Arc::new(Mutex::new(Fleet::new()));
    tokio::spawn(serve(listener, fleet));

    let car_conn = TcpStream::connect(addr).await.unwrap();
    let (mut car_read, mut car_write) = car_conn.into_split();
    framed::send_frame(&mut car_write, &Message::Register { name: "A".into(), lowest: "B1".into(), highest: "10".into() }.to_wire())
        .await
        .unwrap();

    let client_conn = TcpStream::connect(addr).await.unwrap();
    let (mut client_read, mut client_write) = client_conn.into_split();
    framed::send_frame(&mut client_write, &Message::Call { source: "3".into(), destination: "7".into() }.to_wire()).await.unwrap();

    let reply = framed::recv_frame(&mut client_read).await.unwrap().unwrap();
    assert_eq!(Message::parse_call_response(&reply).unwrap(), Message::CarAssigned { name: "A".into() });

    let directive = framed::recv_frame(&mut car_read).await.unwrap().unwrap();
    assert_eq!(Message::parse_to_car(&directive).unwrap(), Message::Floor { label: "3".into() });

    framed::send_frame(&mut car_write, &Message::Status { status: "Opening".into(), current: "3".into(), destination: "3".into() }.to_wire())
        .await
        .unwrap();

    let next_directive = framed::recv_frame(&mut car_read).await.unwrap().unwrap();
    assert_eq!(Message::parse_to_car(&next_directive).unwrap(), Message::Floor { label: "7".into() });
}

/// A car sending `EMERGENCY` ends its own connection handler and the fleet
/// sees it as disconnected, so a later call can no longer be routed to it.
#[tokio::test]
async fn handle_connection_disconnects_car_on_emergency() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let fleet = Arc::new(Mutex::new(Fleet::new()));
    let fleet_for_serve = Arc::clone(&fleet);
    tokio::spawn(serve(listener, fleet_for_serve));

    let car_conn = TcpStream::connect(addr).await.unwrap();
    let (_car_read, mut car_write) = car_conn.into_split();
    framed::send_frame(&mut car_write, &Message::Register { name: "A".into(), lowest: "1".into(), highest: "10".into() }.to_wire())
        .await
        .unwrap();
    framed::send_frame(&mut car_write, &Message::Emergency.to_wire()).await.unwrap();

    let client_conn = TcpStream::connect(addr).await.unwrap();
    let (mut client_read, mut client_write) = client_conn.into_split();

    // Wait for the handler to process EMERGENCY and mark the car disconnected
    // before routing the call; a few retries absorb the scheduling race.
    let mut assigned = Message::Unavailable;
    for _ in 0..20 {
        framed::send_frame(&mut client_write, &Message::Call { source: "3".into(), destination: "7".into() }.to_wire()).await.unwrap();
        let reply = framed::recv_frame(&mut client_read).await.unwrap().unwrap();
        assigned = Message::parse_call_response(&reply).unwrap();
        if assigned == Message::Unavailable {
            break;
        }
        let new_client = TcpStream::connect(addr).await.unwrap();
        let (new_read, new_write) = new_client.into_split();
        client_read = new_read;
        client_write = new_write;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(assigned, Message::Unavailable);
}
