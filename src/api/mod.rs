//! HTTP surface for the grade aggregator.
//!
//! Stateless JSON endpoints: every request carries its own grade table, which
//! is dropped once the response is written.

pub mod error;
pub mod request;
pub mod routes;

pub use error::ApiError;
pub use routes::{Endpoint, router};

use crate::config::InvalidGrades;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Per-process settings handed to every handler. Never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    pub invalid_grades: InvalidGrades,
}

/// Binds `addr` and serves until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;

    info!(addr = %local, invalid_grades = ?state.invalid_grades, "Server listening");
    info!("Health check: http://{}/ping", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
