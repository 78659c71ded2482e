//! Catalog read handlers (`/home`, `/category_sections`, `/list`, §6).
//!
//! All three read exclusively from C8's in-memory projection; none of them
//! touch the store directly.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::domain::value_objects::Category;
use crate::presentation::http::errors::ApiError;
use crate::presentation::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategorySectionsQuery {
    pub cat: String,
    pub kw: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub path: String,
    pub keyword: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

fn parse_category(label: &str) -> Result<Category, ApiError> {
    Category::from_str(label)
        .map_err(|err| ApiError(crate::shared::error::ApplicationError::Domain(err)))
}

/// `GET /home` — union of movies+domestic-tv deduped, plus airing not already sampled.
pub async fn home(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.projection.home())
}

/// `GET /category_sections?cat=&kw=`
pub async fn category_sections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategorySectionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&query.cat)?;
    Ok(Json(state.projection.sections(category, query.kw.as_deref())))
}

/// `GET /list?path=&keyword=&limit=&offset=`
///
/// `path` names a category label (`movies`, `foreign-tv`, ...), carried over
/// from the original API's naming rather than a filesystem path.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_category(&query.path)?;
    let items = state
        .projection
        .list(category, query.keyword.as_deref(), query.limit, query.offset);
    Ok(Json(items))
}
