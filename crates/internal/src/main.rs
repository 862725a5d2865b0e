// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manual-service tool: a short-lived writer into a car's shared-state
//! region, for the `open`/`close`/`stop`/`service_on`/`service_off`/`up`/
//! `down` operator actions.

use clap::Parser;
use elevator_core::shared::SharedCarRegion;
use elevator_core::status::CarStatus;

#[derive(Parser)]
#[command(name = "internal", about = "Manual service control for one elevator car.")]
struct Cli {
    /// Name of the car to control.
    car: String,
    /// Operation to perform.
    op: Op,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "snake_case")]
enum Op {
    Open,
    Close,
    Stop,
    ServiceOn,
    ServiceOff,
    Up,
    Down,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let region = match SharedCarRegion::open(&cli.car) {
        Ok(region) => region,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };
    let mut guard = region.lock();

    match cli.op {
        Op::Open => {
            guard.set_open_button(true);
            guard.notify_all();
        }
        Op::Close => {
            guard.set_close_button(true);
            guard.notify_all();
        }
        Op::Stop => {
            guard.set_emergency_stop(true);
            guard.notify_all();
        }
        Op::ServiceOn => {
            guard.set_individual_service_mode(true);
            guard.set_emergency_mode(false);
            guard.notify_all();
        }
        Op::ServiceOff => {
            guard.set_individual_service_mode(false);
            guard.notify_all();
        }
        Op::Up | Op::Down => return run_motion(&mut guard, matches!(cli.op, Op::Up)),
    }

    0
}

fn run_motion(guard: &mut elevator_core::shared::CarGuard<'_>, up: bool) -> i32 {
    if !guard.individual_service_mode() {
        println!("Operation only allowed in service mode.");
        return 0;
    }
    match guard.status() {
        Ok(CarStatus::Closed) => {}
        Ok(CarStatus::Open | CarStatus::Opening | CarStatus::Closing) => {
            println!("Operation not allowed while doors are open.");
            return 0;
        }
        Ok(CarStatus::Between) => {
            println!("Operation not allowed while elevator is moving.");
            return 0;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    }
    let current = match guard.current_floor() {
        Ok(floor) => floor,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };
    match current.step_one(up) {
        Some(next) => {
            guard.set_destination_floor(next);
            guard.notify_all();
            0
        }
        None => {
            println!("Car cannot move further in that direction.");
            0
        }
    }
}
