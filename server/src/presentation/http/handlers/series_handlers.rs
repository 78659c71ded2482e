//! Series detail and search handlers (`/api/series_detail`, `/search`, §6).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Episode, Series};
use crate::presentation::http::errors::ApiError;
use crate::presentation::http::state::AppState;
use crate::shared::error::{ApplicationError, DomainError};
use crate::shared::text::sort_by_natural_key;

#[derive(Debug, Deserialize)]
pub struct SeriesDetailQuery {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    50
}

/// A Series joined with its full episode list, as returned by
/// `/api/series_detail`. Named `episodes` — the shape is otherwise the same
/// fan-out as [`crate::application::services::GroupedSeries`].
#[derive(Debug, Serialize)]
pub struct SeriesDetail {
    pub key: String,
    #[serde(flatten)]
    pub series: Series,
    pub member_paths: Vec<String>,
    pub episodes: Vec<Episode>,
}

/// `GET /api/series_detail?path=` — joins episodes globally by `tmdbId`
/// when the requested Series has one, ignoring category (SPEC_FULL §D).
pub async fn series_detail(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesDetailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let requested = state
        .series_repo
        .find_by_path(&query.path)
        .await?
        .ok_or_else(|| {
            ApiError(ApplicationError::Domain(DomainError::NotFound(format!(
                "series {} not found",
                query.path
            ))))
        })?;

    let key = requested.grouping_key();
    let all = state.series_repo.find_all().await?;
    let members: Vec<Series> = all.into_iter().filter(|s| s.grouping_key() == key).collect();
    let member_paths: Vec<String> = members.iter().map(|s| s.path.clone()).collect();

    let mut episodes = Vec::new();
    for path in &member_paths {
        episodes.extend(state.episode_repo.find_by_series(path).await?);
    }
    sort_by_natural_key(&mut episodes, |e| e.title.clone());

    Ok(Json(SeriesDetail {
        key,
        series: requested,
        member_paths,
        episodes,
    }))
}

/// `GET /search?q=` — series whose name or path contains `q`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.series_repo.search(&query.q, query.limit).await?;
    Ok(Json(results))
}
