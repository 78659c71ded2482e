mod application;
mod domain;
mod infrastructure;
mod interfaces;
mod presentation;
mod shared;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::{Crawler, EnrichmentWorker, MetadataCache, ProgressMonitor, ProjectionCache};
use crate::domain::repositories::{EpisodeRepository, SeriesRepository, ServerConfigRepository};
use crate::domain::services::resolver::ResolverService;
use crate::infrastructure::database::{ConnectionPool, ConnectionPoolConfig};
use crate::infrastructure::external::tmdb::{NullTmdbClient, TmdbClient};
use crate::infrastructure::persistence::sqlite::{
    SqliteCacheRepository, SqliteEpisodeRepository, SqliteSeriesRepository, SqliteServerConfigRepository,
};
use crate::interfaces::external_services::TmdbService;
use crate::presentation::http::state::AppState;
use crate::shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homeflixd=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env());

    std::fs::create_dir_all(&config.thumbnail_cache_dir)?;
    std::fs::create_dir_all(&config.subtitle_cache_dir)?;
    std::fs::create_dir_all(&config.hls_cache_dir)?;

    let pool = ConnectionPool::create(ConnectionPoolConfig::new(config.database_url.clone()))
        .await
        .map_err(anyhow::Error::msg)?;
    crate::infrastructure::database::initialize_schema(pool.inner()).await?;

    let series_repo: Arc<dyn SeriesRepository> = Arc::new(SqliteSeriesRepository::new(pool.inner().clone()));
    let episode_repo: Arc<dyn EpisodeRepository> = Arc::new(SqliteEpisodeRepository::new(pool.inner().clone()));
    let server_config_repo: Arc<dyn ServerConfigRepository> =
        Arc::new(SqliteServerConfigRepository::new(pool.inner().clone()));
    let cache_repo = Arc::new(SqliteCacheRepository::new(pool.inner().clone()));

    let progress = Arc::new(ProgressMonitor::new());
    let projection = Arc::new(ProjectionCache::new(0));
    let metadata_cache = Arc::new(MetadataCache::new(cache_repo.clone()));

    let tmdb: Arc<dyn TmdbService> = if config.tmdb_api_key.is_empty() {
        warn!("TMDB_API_KEY not set; external metadata resolution is disabled");
        Arc::new(NullTmdbClient)
    } else {
        Arc::new(TmdbClient::new(&config.tmdb_api_key, cache_repo)?)
    };
    let resolver = Arc::new(ResolverService::new(tmdb));

    let crawler = Arc::new(Crawler::new(
        config.clone(),
        series_repo.clone(),
        episode_repo.clone(),
        server_config_repo.clone(),
        progress.clone(),
    ));
    let enrichment = Arc::new(EnrichmentWorker::new(
        series_repo.clone(),
        episode_repo.clone(),
        resolver,
        metadata_cache,
        projection.clone(),
        progress.clone(),
    ));

    info!("running resumable first scan");
    if let Err(err) = crawler.scan_all(true).await {
        warn!("first scan failed to start: {err}");
    }
    projection.rebuild(series_repo.as_ref(), episode_repo.as_ref()).await?;

    let series_count = series_repo.count().await?;
    let mut episode_count: i64 = 0;
    for series in series_repo.find_all().await? {
        episode_count += episode_repo.count_by_series(&series.path).await?;
    }
    let matched = series_count - series_repo.find_unresolved(true).await?.len() as i64;
    info!(
        "catalog ready: {series_count} series, {episode_count} episodes, {matched} matched to external metadata"
    );

    if let Err(err) = enrichment.enrich(false).await {
        warn!("initial enrichment failed to start: {err}");
    }
    projection.rebuild(series_repo.as_ref(), episode_repo.as_ref()).await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        series_repo: series_repo.clone(),
        episode_repo: episode_repo.clone(),
        server_config_repo,
        projection: projection.clone(),
        progress,
        crawler: crawler.clone(),
        enrichment: enrichment.clone(),
    });

    if config.scan_interval_secs > 0 {
        spawn_periodic_rescan(
            crawler,
            enrichment,
            projection,
            series_repo,
            episode_repo,
            config.scan_interval_secs,
        );
    }

    let app = crate::presentation::http::router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("homeflixd listening on {addr}");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn spawn_periodic_rescan(
    crawler: Arc<Crawler>,
    enrichment: Arc<EnrichmentWorker<dyn TmdbService>>,
    projection: Arc<ProjectionCache>,
    series_repo: Arc<dyn SeriesRepository>,
    episode_repo: Arc<dyn EpisodeRepository>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.tick().await; // first tick fires immediately; skip it, startup already scanned
        loop {
            ticker.tick().await;
            if let Err(err) = crawler.scan_all(false).await {
                warn!("periodic scan failed to start: {err}");
                continue;
            }
            if let Err(err) = projection.rebuild(series_repo.as_ref(), episode_repo.as_ref()).await {
                warn!("projection rebuild failed: {err}");
            }
            if let Err(err) = enrichment.enrich(false).await {
                warn!("periodic enrichment failed to start: {err}");
            }
            if let Err(err) = projection.rebuild(series_repo.as_ref(), episode_repo.as_ref()).await {
                warn!("projection rebuild failed: {err}");
            }
        }
    });
}
