//! HTTP surface (C10, §6): router assembly, handlers, and the middleware
//! stack wired around them.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;

use handlers::{admin_handlers, catalog_handlers, health_handlers, media_handlers, series_handlers, status_handlers};
use middleware::{cors_layer, logging_middleware};
use state::AppState;

/// Builds the full application router. JSON API routes are gzip-compressed
/// (§6 "all responses gzipped JSON unless noted"); the binary media routes
/// are not.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/home", get(catalog_handlers::home))
        .route("/category_sections", get(catalog_handlers::category_sections))
        .route("/list", get(catalog_handlers::list))
        .route("/api/series_detail", get(series_handlers::series_detail))
        .route("/search", get(series_handlers::search))
        .route("/rescan_broken", get(admin_handlers::rescan_broken))
        .route("/rematch_metadata", get(admin_handlers::rematch_metadata))
        .route("/retry_failed_metadata", get(admin_handlers::retry_failed_metadata))
        .route("/api/updater/status", get(status_handlers::updater_status))
        .route("/api/status", get(status_handlers::status))
        .route("/health", get(health_handlers::health_check))
        .layer(CompressionLayer::new());

    let media_routes = Router::new()
        .route("/video_serve", get(media_handlers::video_serve))
        .route("/thumb_serve", get(media_handlers::thumb_serve));

    api_routes
        .merge(media_routes)
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(cors_layer())
        .with_state(state)
}
