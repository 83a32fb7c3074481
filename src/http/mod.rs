//! HTTP API.
//!
//! - `GET  /api/health/live`          liveness
//! - `GET  /api/health/ready`         readiness and scoring mode
//! - `POST /api/v1/sentiment`         score one text
//! - `POST /api/v1/sentiment/batch`   score several texts
//! - `GET  /api/v1/metrics/sentiment` rolling metrics

pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::init::AppContext;

pub use error::{ApiError, ErrorBody};

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/health/live", get(handlers::live))
        .route("/api/health/ready", get(handlers::ready))
        .route("/api/v1/sentiment", post(handlers::predict))
        .route("/api/v1/sentiment/batch", post(handlers::predict_batch))
        .route("/api/v1/metrics/sentiment", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(ctx: AppContext) -> Result<()> {
    let address = format!("{}:{}", ctx.settings.server.host, ctx.settings.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(
        "{} listening on http://{} (mode: {})",
        ctx.settings.app_name,
        listener.local_addr()?,
        ctx.prediction_service.mode()
    );

    axum::serve(listener, router(Arc::new(ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl-C: {}. Running until killed.", e);
            std::future::pending::<()>().await;
        }
    }
}
