// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Car process: owns one [`elevator_core::shared::SharedCarRegion`], driving
//! it with a blocking state-machine thread while a Tokio task shadows it
//! over the network to the dispatcher.

pub mod agent;
pub mod config;
pub mod state_machine;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use elevator_core::shared::SharedCarRegion;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;

/// Run one car until `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    let lowest: elevator_core::Floor = config.lowest.parse().with_context(|| format!("parsing lowest floor {:?}", config.lowest))?;
    let highest: elevator_core::Floor = config.highest.parse().with_context(|| format!("parsing highest floor {:?}", config.highest))?;

    let region = Arc::new(SharedCarRegion::create(&config.name, lowest).with_context(|| format!("creating shared region for {:?}", config.name))?);
    info!(car = %config.name, lowest = %lowest, highest = %highest, "car starting");

    let blocking_shutdown = Arc::new(AtomicBool::new(false));
    let bridge_shutdown = Arc::clone(&blocking_shutdown);
    let bridge_token = shutdown.clone();
    tokio::spawn(async move {
        bridge_token.cancelled().await;
        bridge_shutdown.store(true, Ordering::Relaxed);
    });

    let sm_region = Arc::clone(&region);
    let sm_shutdown = Arc::clone(&blocking_shutdown);
    let delay_ms = config.delay_ms;
    let state_machine = tokio::task::spawn_blocking(move || {
        state_machine::run(sm_region, lowest, highest, delay_ms, sm_shutdown);
    });

    agent::run(Arc::clone(&region), config.name.clone(), lowest, highest, config.delay_ms, shutdown, config.dispatcher_addr()).await;

    blocking_shutdown.store(true, Ordering::Relaxed);
    state_machine.await.context("state machine thread panicked")?;

    info!(car = %config.name, "car shut down");
    Ok(())
}
