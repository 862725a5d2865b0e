// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot passenger call client: connects to the dispatcher, sends a
//! single `CALL`, prints the outcome, and exits.

use clap::Parser;
use elevator_core::{framed, Floor, Message};
use tokio::net::TcpStream;
use tracing::warn;

#[derive(Parser)]
#[command(name = "call", about = "Request a ride from the elevator dispatcher.")]
struct Cli {
    /// Floor to be picked up at.
    source: String,
    /// Floor to be carried to.
    destination: String,

    /// Dispatcher host.
    #[arg(long, default_value = "127.0.0.1", env = "ELEVATOR_DISPATCHER_HOST")]
    host: String,
    /// Dispatcher port.
    #[arg(long, default_value_t = 3000, env = "ELEVATOR_DISPATCHER_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let source: Floor = match cli.source.parse() {
        Ok(f) => f,
        Err(_) => {
            println!("Invalid floor(s) specified.");
            return 1;
        }
    };
    let destination: Floor = match cli.destination.parse() {
        Ok(f) => f,
        Err(_) => {
            println!("Invalid floor(s) specified.");
            return 1;
        }
    };
    if source == destination {
        println!("You are already on that floor!");
        return 1;
    }

    let addr = format!("{}:{}", cli.host, cli.port);
    let mut stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(%addr, error = %e, "failed to connect to dispatcher");
            println!("Unable to connect to elevator system.");
            return 1;
        }
    };

    let request = Message::Call { source: cli.source, destination: cli.destination };
    if framed::send_frame(&mut stream, &request.to_wire()).await.is_err() {
        println!("Unable to connect to elevator system.");
        return 1;
    }

    match framed::recv_frame(&mut stream).await {
        Ok(Some(line)) => match Message::parse_call_response(&line) {
            Ok(Message::CarAssigned { name }) => {
                println!("Car {name} is arriving.");
                0
            }
            Ok(Message::Unavailable) => {
                println!("Sorry, no car is available to take this request.");
                0
            }
            _ => {
                println!("Unable to connect to elevator system.");
                1
            }
        },
        _ => {
            println!("Unable to connect to elevator system.");
            1
        }
    }
}
