//! Status handlers (`/api/updater/status`, `/api/status`, §6).

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::domain::value_objects::Category;
use crate::presentation::http::errors::ApiError;
use crate::presentation::http::state::AppState;

/// `GET /api/updater/status` — a snapshot of whichever background worker
/// (C5 or C7) is currently running, or the idle state.
pub async fn updater_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.progress.snapshot())
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CatalogStatus {
    pub total_series: i64,
    pub by_category: Vec<CategoryCount>,
    pub pending: usize,
    pub failed: usize,
    pub resolved: i64,
    pub total_episodes: i64,
}

/// `GET /api/status` — aggregate counts from C6, for the admin event log's
/// "how big is this library" question.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let total_series = state.series_repo.count().await?;

    let mut by_category = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let count = state.series_repo.count_by_category(category).await?;
        by_category.push(CategoryCount { category, count });
    }

    let pending = state.series_repo.find_unresolved(false).await?.len();
    let unresolved_including_failed = state.series_repo.find_unresolved(true).await?.len();
    let failed = unresolved_including_failed.saturating_sub(pending);
    let resolved = total_series - unresolved_including_failed as i64;

    let mut total_episodes: i64 = 0;
    for series in state.series_repo.find_all().await? {
        total_episodes += state.episode_repo.count_by_series(&series.path).await?;
    }

    Ok(Json(CatalogStatus {
        total_series,
        by_category,
        pending,
        failed,
        resolved,
        total_episodes,
    }))
}
