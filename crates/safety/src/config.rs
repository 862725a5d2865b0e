// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// `safety <car>`, matching the original positional contract.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "safety", about = "Run the safety monitor for one elevator car.")]
pub struct Config {
    /// Name of the car to monitor.
    pub car: String,
}
