//! Shared initialization logic for the HTTP server and CLI modes.

use std::sync::Arc;

use anyhow::Result;

use crate::config::Settings;
use crate::services::{PredictionService, StatsTracker};

/// Application context holding the long-lived services.
///
/// Built once at startup and shared by `Arc` with every request handler.
pub struct AppContext {
    pub settings: Settings,
    pub prediction_service: Arc<PredictionService>,
    pub stats: Arc<StatsTracker>,
}

impl AppContext {
    /// Initialize application context from validated settings.
    ///
    /// Fails only when the model artifact is missing, or when loading fails
    /// with `model.strict` enabled.
    pub fn new(settings: Settings) -> Result<Self> {
        tracing::info!(
            "Initializing {} ({}) with artifact {}",
            settings.app_name,
            settings.environment,
            settings.model.imdb_weights_path.display()
        );

        let prediction_service = Arc::new(PredictionService::new(&settings.model)?);
        if let Some(reason) = prediction_service.degradation_reason() {
            tracing::warn!("Serving keyword-based predictions: {}", reason);
        }

        let stats = Arc::new(StatsTracker::new(settings.metrics.history));

        Ok(Self::from_parts(settings, prediction_service, stats))
    }

    /// Assemble a context from pre-built services.
    pub fn from_parts(
        settings: Settings,
        prediction_service: Arc<PredictionService>,
        stats: Arc<StatsTracker>,
    ) -> Self {
        Self {
            settings,
            prediction_service,
            stats,
        }
    }
}
