// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safety monitor process: opens a car's shared-state region and validates,
//! heartbeats, and enforces failsafes against it until shut down.

pub mod config;
pub mod monitor;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use elevator_core::shared::SharedCarRegion;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;

/// Open the named car's region and run its monitor loop until `shutdown` is
/// cancelled. The monitor loop itself is synchronous; `shutdown` is bridged
/// to a plain [`AtomicBool`] it can poll between condvar waits, the same
/// pattern the `car` binary uses to hand its blocking state-machine thread a
/// shutdown signal.
pub async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    let region = SharedCarRegion::open(&config.car).with_context(|| format!("opening shared region for {:?}", config.car))?;
    info!(car = %config.car, "safety monitor starting");

    let blocking_shutdown = Arc::new(AtomicBool::new(false));
    let bridge_shutdown = Arc::clone(&blocking_shutdown);
    let bridge_token = shutdown.clone();
    tokio::spawn(async move {
        bridge_token.cancelled().await;
        bridge_shutdown.store(true, Ordering::Relaxed);
    });

    tokio::task::spawn_blocking(move || monitor::run(&region, &blocking_shutdown))
        .await
        .context("safety monitor thread panicked")?;

    info!(car = %config.car, "safety monitor shut down");
    Ok(())
}
