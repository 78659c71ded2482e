//! Admin trigger handlers (§6): these fire a background worker and respond
//! immediately rather than waiting for the run to finish. `ApplicationError::Busy`
//! from a worker already running is the only way these calls fail.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::presentation::http::errors::ApiError;
use crate::presentation::http::state::AppState;

/// `GET /rescan_broken` — triggers C5 in the background with `skip_completed = false`.
pub async fn rescan_broken(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    spawn_scan(state)?;
    Ok(Json(json!({ "status": "ok", "message": "scan started" })))
}

/// `GET /rematch_metadata` — triggers C7, leaving previously-failed series alone.
pub async fn rematch_metadata(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    spawn_enrich(state, false)?;
    Ok(Json(json!({ "status": "ok", "message": "enrichment started" })))
}

/// `GET /retry_failed_metadata` — triggers C7 with `force_all = true`, clearing
/// the failed bit on every previously-rejected series before re-resolving.
pub async fn retry_failed_metadata(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    spawn_enrich(state, true)?;
    Ok(Json(json!({ "status": "ok", "message": "retry started" })))
}

fn spawn_scan(state: Arc<AppState>) -> Result<(), ApiError> {
    if state.progress.is_running() {
        return Err(ApiError(crate::shared::error::ApplicationError::Busy(
            "a background task is already running".into(),
        )));
    }
    let crawler = state.crawler.clone();
    tokio::spawn(async move {
        if let Err(err) = crawler.scan_all(false).await {
            tracing::warn!("rescan_broken failed to start: {err}");
        }
    });
    Ok(())
}

fn spawn_enrich(state: Arc<AppState>, force_all: bool) -> Result<(), ApiError> {
    if state.progress.is_running() {
        return Err(ApiError(crate::shared::error::ApplicationError::Busy(
            "a background task is already running".into(),
        )));
    }
    let enrichment = state.enrichment.clone();
    tokio::spawn(async move {
        if let Err(err) = enrichment.enrich(force_all).await {
            tracing::warn!("enrichment trigger failed to start: {err}");
        }
    });
    Ok(())
}
