// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// `car <name> <lowest> <highest> <delay_ms>`, matching the original
/// positional contract; the dispatcher address is an additional override
/// for testability.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "car", about = "Run one elevator car process.")]
pub struct Config {
    /// This car's name, used for shared-memory naming and dispatcher registration.
    pub name: String,
    /// Lowest floor label this car serves.
    pub lowest: String,
    /// Highest floor label this car serves.
    pub highest: String,
    /// Milliseconds spent in each door/motion phase.
    pub delay_ms: u64,

    /// Dispatcher host to register with.
    #[arg(long, default_value = "127.0.0.1", env = "ELEVATOR_DISPATCHER_HOST")]
    pub dispatcher_host: String,
    /// Dispatcher port to register with.
    #[arg(long, default_value_t = 3000, env = "ELEVATOR_DISPATCHER_PORT")]
    pub dispatcher_port: u16,
}

impl Config {
    pub fn dispatcher_addr(&self) -> String {
        format!("{}:{}", self.dispatcher_host, self.dispatcher_port)
    }
}
