// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fetch Gate Service
//!
//! Runs the pre-fetch policy gate as a sidecar so that crawlers in other
//! processes share one allowlist and one set of per-domain politeness
//! delays.
//!
//! ## Endpoints
//!
//! - `POST /check` with `{"url": "...", "dry_run": false}`: validates and
//!   allowlists the URL, then holds the response until its domain may be
//!   fetched
//! - `POST /sanitize`: returns the posted markup with scripts, styles and
//!   inline event handlers removed
//! - `GET /metrics`: Prometheus counters
//! - `GET /health`
//!
//! ## Configuration
//!
//! - `BIND_ADDR`: Server bind address (default: 127.0.0.1:8080)
//! - `MIN_INTERVAL_MS`: Minimum spacing per domain (default: 1000)
//! - `PRUNE_INTERVAL_SECS`: Idle-domain prune period (default: 60)
//! - `ALLOWLIST`: Comma-separated permitted domains (default: all)
//! - `ALLOWLIST_MATCH`: `suffix` or `substring` (default: suffix)
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polite_fetch_gate::{
    config::Config,
    gate::FetchGate,
    handlers::{router, AppState},
    metrics::GateMetrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        min_interval_ms = config.rate_limit.min_interval_ms,
        allowlist = ?config.allowlist.domains,
        match_mode = %config.allowlist.match_mode,
        "Starting fetch gate"
    );
    if config.allowlist.domains.is_empty() {
        warn!("Allowlist is empty, every domain is permitted");
    }

    let mut gate = FetchGate::new(&config);
    if config.metrics.enabled {
        gate = gate.with_metrics(GateMetrics::new()?);
    }

    let state = Arc::new(AppState {
        gate,
        config: config.clone(),
    });

    // Spawn prune task
    let prune_state = state.clone();
    let prune_every = config.rate_limit.prune_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(prune_every);
        loop {
            interval.tick().await;
            prune_state.gate.limiter().prune_idle().await;
        }
    });

    let app = router(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
