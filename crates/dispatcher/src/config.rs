// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Listen address for the dispatcher, overridable for testability; the
/// documented default reproduces the original fixed `127.0.0.1:3000`.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "dispatcher", about = "Elevator dispatcher: routes calls to the best-placed car.")]
pub struct Config {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "ELEVATOR_DISPATCHER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "ELEVATOR_DISPATCHER_PORT")]
    pub port: u16,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
