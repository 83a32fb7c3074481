//! Request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::init::AppContext;
use crate::models::prediction::PredictionResult;
use crate::services::{MetricsSnapshot, ServiceMode};
use crate::SentimentError;

/// Minimum number of characters in a scored text.
pub const MIN_TEXT_CHARS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentBatchRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentBatchResponse {
    pub predictions: Vec<PredictionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveResponse {
    pub status: String,
    pub service: String,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub mode: ServiceMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn validate_text(text: &str) -> Result<(), SentimentError> {
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(SentimentError::Validation(format!(
            "text must be at least {} characters",
            MIN_TEXT_CHARS
        )));
    }
    Ok(())
}

/// Run scoring on the blocking pool and record every result.
async fn score(ctx: Arc<AppContext>, texts: Vec<String>) -> Result<Vec<PredictionResult>, ApiError> {
    let service = ctx.prediction_service.clone();
    let results = tokio::task::spawn_blocking(move || service.predict_batch(texts.as_slice()))
        .await
        .map_err(|e| ApiError::Internal(format!("Prediction task failed: {}", e)))??;

    for result in &results {
        ctx.stats.record(result);
    }
    Ok(results)
}

pub async fn live(State(ctx): State<Arc<AppContext>>) -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "ok".to_string(),
        service: ctx.settings.app_name.clone(),
        environment: ctx.settings.environment.clone(),
    })
}

pub async fn ready(State(ctx): State<Arc<AppContext>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready".to_string(),
        mode: ctx.prediction_service.mode(),
        detail: ctx
            .prediction_service
            .degradation_reason()
            .map(str::to_string),
    })
}

pub async fn predict(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(request) = payload?;
    validate_text(&request.text)?;

    let mut results = score(ctx, vec![request.text]).await?;
    results
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::Internal("No prediction produced".to_string()))
}

pub async fn predict_batch(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<SentimentBatchRequest>, JsonRejection>,
) -> Result<Json<SentimentBatchResponse>, ApiError> {
    let Json(request) = payload?;
    if request.texts.is_empty() {
        return Err(ApiError::Validation(
            "texts must contain at least one item".to_string(),
        ));
    }
    for (i, text) in request.texts.iter().enumerate() {
        validate_text(text).map_err(|e| ApiError::Validation(format!("texts[{}]: {}", i, e)))?;
    }

    let predictions = score(ctx, request.texts).await?;
    Ok(Json(SentimentBatchResponse { predictions }))
}

pub async fn metrics(State(ctx): State<Arc<AppContext>>) -> Json<MetricsSnapshot> {
    Json(ctx.stats.snapshot())
}
