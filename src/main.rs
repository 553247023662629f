// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Service
//!
//! Serves the portfolio contact form and the admin inbox.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `STORE_LOCATION`: `memory` or a JSON file path (default: memory)
//! - `ADMIN_TOKEN`: Bearer token for the admin routes (unset: admin disabled)
//! - `RATE_LIMIT_MAX_TOKENS`: Submissions per interval per client (default: 5)
//! - `RATE_LIMIT_INTERVAL_MS`: Refill interval (default: 60000)
//! - `CSRF_REQUIRED`: Require the `X-CSRF-Token` header (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::{
    config::Config,
    handlers::{router, AppState},
    store::open_store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        store = %config.store.location,
        max_tokens = config.rate_limit.max_tokens,
        interval_ms = config.rate_limit.interval_ms,
        csrf_required = config.contact.csrf_required,
        metrics_enabled = config.metrics.enabled,
        "Starting contact intake service"
    );
    if config.admin.token.is_none() {
        warn!("ADMIN_TOKEN is not set; admin routes will reject every request");
    }

    let store = open_store(&config.store.location).await?;
    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = Arc::new(AppState::new(config, store)?);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
