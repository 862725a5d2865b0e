// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: a multi-client TCP server tracking a fleet of cars and
//! routing passenger calls into each car's SCAN-discipline floor queue.

pub mod config;
pub mod fleet;
pub mod handler;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::fleet::Fleet;

/// Run the dispatcher until `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    info!("dispatcher listening on {addr}");

    let fleet = Arc::new(Mutex::new(Fleet::new()));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("dispatcher shutting down");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("accepting connection")?;
                let fleet = Arc::clone(&fleet);
                tokio::spawn(async move {
                    if let Err(e) = handler::handle_connection(stream, fleet).await {
                        warn!(%peer, error = %e, "connection handler error");
                    }
                });
            }
        }
    }

    Ok(())
}
