//! Shared application state handed to every HTTP handler.

use std::sync::Arc;

use crate::application::services::{Crawler, EnrichmentWorker, ProgressMonitor, ProjectionCache};
use crate::domain::repositories::{EpisodeRepository, SeriesRepository, ServerConfigRepository};
use crate::interfaces::external_services::TmdbService;
use crate::shared::config::AppConfig;

/// Cloned into every handler via axum's `State` extractor. Every field is an
/// `Arc`, so cloning `AppState` is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub series_repo: Arc<dyn SeriesRepository>,
    pub episode_repo: Arc<dyn EpisodeRepository>,
    pub server_config_repo: Arc<dyn ServerConfigRepository>,
    pub projection: Arc<ProjectionCache>,
    pub progress: Arc<ProgressMonitor>,
    pub crawler: Arc<Crawler>,
    pub enrichment: Arc<EnrichmentWorker<dyn TmdbService>>,
}
