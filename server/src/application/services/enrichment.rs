//! Enrichment worker (C7, §4.6).
//!
//! Groups unresolved series by `(cleanedName, yearVal, category)`, fans out a
//! bounded-parallel pool of resolver calls, and writes results back to C6 one
//! batch-transaction at a time. C4's resolver is pure business logic — this
//! worker is what actually talks to C3 (the memoization cache) and C9 (the
//! diagnostics log), per the resolver module's own doc comment.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::application::services::metadata_cache::MetadataCache;
use crate::application::services::progress_monitor::{ProgressMonitor, Severity};
use crate::application::services::projection_cache::ProjectionCache;
use crate::domain::entities::{Episode, ResolveOutcome, ResolvedMetadata, Series};
use crate::domain::repositories::{EpisodeRepository, PendingGroup, SeriesRepository};
use crate::domain::services::resolver::ResolverService;
use crate::domain::value_objects::Category;
use crate::interfaces::external_services::TmdbService;
use crate::shared::error::ApplicationError;

const BATCH_SIZE: usize = 50;
const RESOLVER_CONCURRENCY: usize = 10;
const REBUILD_EVERY_N_BATCHES: u64 = 1;

/// Guarded by [`ProgressMonitor::try_start`], same as the crawler: at most
/// one enrichment pass runs at a time.
pub struct EnrichmentWorker<T: TmdbService + ?Sized> {
    series_repo: Arc<dyn SeriesRepository>,
    episode_repo: Arc<dyn EpisodeRepository>,
    resolver: Arc<ResolverService<T>>,
    cache: Arc<MetadataCache>,
    projection: Arc<ProjectionCache>,
    progress: Arc<ProgressMonitor>,
}

impl<T: TmdbService + ?Sized> EnrichmentWorker<T> {
    pub fn new(
        series_repo: Arc<dyn SeriesRepository>,
        episode_repo: Arc<dyn EpisodeRepository>,
        resolver: Arc<ResolverService<T>>,
        cache: Arc<MetadataCache>,
        projection: Arc<ProjectionCache>,
        progress: Arc<ProgressMonitor>,
    ) -> Self {
        Self {
            series_repo,
            episode_repo,
            resolver,
            cache,
            projection,
            progress,
        }
    }

    /// Runs one enrichment pass. `force_all` also retries previously-failed
    /// series (the `/rematch_metadata` / `/retry_failed_metadata` path).
    pub async fn enrich(&self, force_all: bool) -> Result<(), ApplicationError> {
        if !self.progress.try_start("enrich", 0) {
            return Err(ApplicationError::Busy("enrichment is already running".into()));
        }
        self.progress.log(Severity::Info, "enrichment started");

        if let Err(err) = self.run(force_all).await {
            self.progress
                .log(Severity::Error, format!("enrichment failed: {err}"));
            self.progress.finish();
            return Err(err);
        }

        self.progress.log(Severity::Info, "enrichment finished");
        self.progress.finish();
        Ok(())
    }

    async fn run(&self, force_all: bool) -> Result<(), ApplicationError> {
        self.clean_uncleaned().await?;

        let groups = self.series_repo.group_pending_by_identity(force_all).await?;
        self.progress.update(0, None);

        let mut processed: u64 = 0;
        let mut batch_index: u64 = 0;

        for batch in groups.chunks(BATCH_SIZE) {
            let resolved = self.resolve_batch(batch, force_all).await;
            self.write_batch(batch, resolved).await?;

            processed += batch.len() as u64;
            self.progress.update(processed, None);
            batch_index += 1;

            if batch_index % REBUILD_EVERY_N_BATCHES == 0 {
                self.projection
                    .rebuild(self.series_repo.as_ref(), self.episode_repo.as_ref())
                    .await?;
            }
        }

        self.projection
            .rebuild(self.series_repo.as_ref(), self.episode_repo.as_ref())
            .await?;

        Ok(())
    }

    /// Step 1: assign `cleanedName`/`yearVal` to every Series still missing
    /// it, independent of resolution — `group_pending_by_identity` groups by
    /// these stored columns, not by an ad-hoc clean at resolve time.
    async fn clean_uncleaned(&self) -> Result<(), ApplicationError> {
        let uncleaned = self.series_repo.find_uncleaned().await?;
        for mut series in uncleaned {
            let cleaned = media_identifier::clean(&series.name);
            series.set_cleaned(cleaned.title, cleaned.year);
            self.series_repo.update(&series).await?;
        }
        Ok(())
    }

    /// Resolves every group in `batch` through C4, at most
    /// [`RESOLVER_CONCURRENCY`] at a time, checking C3 before each call and
    /// storing the outcome after. `force_all` bypasses the C3 lookup so a
    /// retry of previously-failed groups never re-reads a stale negative
    /// cache entry (§3/§4.4).
    async fn resolve_batch(
        &self,
        batch: &[PendingGroup],
        force_all: bool,
    ) -> Vec<Result<ResolveOutcome, ApplicationError>> {
        let semaphore = Arc::new(Semaphore::new(RESOLVER_CONCURRENCY));
        let futures = batch.iter().map(|group| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                self.resolve_group(group, force_all).await
            }
        });
        join_all(futures).await
    }

    async fn resolve_group(&self, group: &PendingGroup, force_all: bool) -> Result<ResolveOutcome, ApplicationError> {
        let raw_name = group
            .member_paths
            .first()
            .map(|p| representative_name(p))
            .unwrap_or_else(|| group.cleaned_name.clone());

        let key = MetadataCache::key(&group.cleaned_name, group.year_val, group.category);
        if let Some(cached) = self.cache.lookup(&key, force_all).await {
            return Ok(cached);
        }

        let result = self.resolver.resolve_for_category(&raw_name, group.category).await;

        if let Some(diagnostics) = &result.diagnostics {
            self.progress.log(
                Severity::Warn,
                format!(
                    "no match for \"{}\" (cleaned \"{}\", year {:?}): {} candidates considered",
                    diagnostics.raw_name,
                    diagnostics.cleaned_title,
                    diagnostics.year,
                    diagnostics.top_candidates.len()
                ),
            );
        }

        self.cache.store(&key, result.outcome.clone()).await?;
        Ok(result.outcome)
    }

    /// Step 5: one write transaction's worth of work per group — either a
    /// group-wide failure mark or a group-wide resolution write plus
    /// per-episode backfill.
    async fn write_batch(
        &self,
        batch: &[PendingGroup],
        resolved: Vec<Result<ResolveOutcome, ApplicationError>>,
    ) -> Result<(), ApplicationError> {
        for (group, outcome) in batch.iter().zip(resolved.into_iter()) {
            match outcome {
                Ok(ResolveOutcome::Resolved(metadata)) => {
                    self.progress.record_success();
                    self.apply_success(group, metadata).await?;
                }
                Ok(ResolveOutcome::Failed { forbidden }) => {
                    self.progress.record_failure();
                    if forbidden {
                        self.progress.log(
                            Severity::Info,
                            format!("\"{}\" rejected as forbidden content", group.cleaned_name),
                        );
                    }
                    self.series_repo.mark_group_failed(&group.member_paths).await?;
                }
                Err(err) => {
                    self.progress.record_failure();
                    self.progress
                        .log(Severity::Error, format!("resolving \"{}\" errored: {err}", group.cleaned_name));
                    self.series_repo.mark_group_failed(&group.member_paths).await?;
                }
            }
        }
        Ok(())
    }

    async fn apply_success(
        &self,
        group: &PendingGroup,
        metadata: ResolvedMetadata,
    ) -> Result<(), ApplicationError> {
        let mut resolved = Series::new(
            group.member_paths[0].clone(),
            group.category,
            group.cleaned_name.clone(),
        )?;
        resolved.set_cleaned(group.cleaned_name.clone(), group.year_val);
        resolved.apply_resolution(metadata.tmdb_id.clone());
        resolved.poster_path = metadata.poster_path.clone();
        resolved.year = metadata.year;
        resolved.overview = metadata.overview.clone();
        resolved.rating = metadata.rating;
        resolved.season_count = metadata.season_count;
        resolved.genre_ids = metadata.genre_ids.clone();
        resolved.genre_names = metadata.genre_names.clone();
        resolved.director = metadata.director.clone();
        resolved.actors = metadata.actors.clone();

        self.series_repo
            .apply_resolution_to_group(&group.member_paths, &resolved)
            .await?;

        if metadata.episodes.is_empty() {
            return Ok(());
        }

        for series_path in &group.member_paths {
            self.backfill_episodes(series_path, &metadata.episodes).await?;
        }
        Ok(())
    }

    /// Looks up every Episode in `series_path` still missing a season
    /// number, derives its `(season, episode)` via C2, and backfills
    /// `overview`/`air_date`/`thumbnailUrl` from the matching per-episode
    /// record when one exists.
    async fn backfill_episodes(
        &self,
        series_path: &str,
        episodes: &HashMap<String, crate::domain::entities::EpisodeMetadata>,
    ) -> Result<(), ApplicationError> {
        let missing = self.episode_repo.find_missing_episode_numbers(series_path).await?;
        for mut episode in missing {
            let (season, ep_number) = media_identifier::extract_episode_numbers(&episode.title);
            let key = ep_number.map(|e| ResolvedMetadata::episode_key(season, e));
            let detail = key.and_then(|k| episodes.get(&k));
            let still_url = detail
                .and_then(|d| d.still_path.clone())
                .map(|p| episode_still_url(&episode.id, &p));

            episode.apply_backfill(
                season,
                ep_number,
                detail.and_then(|d| d.overview.clone()),
                detail.and_then(|d| d.air_date.clone()),
                still_url,
            );
            self.episode_repo.upsert(&episode).await?;
        }
        Ok(())
    }
}

/// §9 Open Question resolution: never rewrite `thumbnailUrl` to an external
/// host. The still path is recorded as a query parameter on the self-proxied
/// route instead of a bare external URL (SPEC_FULL §D).
fn episode_still_url(episode_id: &str, still_path: &str) -> String {
    format!(
        "/thumb_serve?type=episode&id={}&still={}",
        episode_id,
        urlencoding::encode(still_path)
    )
}

/// The last path component, used as the raw name fed to C4 (the folder or
/// file name the crawler originally admitted).
fn representative_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::schema::initialize_schema;
    use crate::infrastructure::persistence::sqlite::{
        SqliteCacheRepository, SqliteEpisodeRepository, SqliteSeriesRepository,
    };
    use crate::interfaces::external_services::{Credits, Genre, MovieDetail, SeasonDetail, TvDetail};
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;

    struct FakeTmdb;

    #[async_trait]
    impl crate::interfaces::external_services::TmdbSearcher for FakeTmdb {
        async fn search_movie(
            &self,
            _query: &str,
            _year: Option<i32>,
        ) -> Result<Vec<crate::interfaces::external_services::TmdbCandidate>, crate::shared::error::TmdbError>
        {
            Ok(vec![crate::interfaces::external_services::TmdbCandidate {
                tmdb_id: 603,
                title: "Matrix".to_string(),
                year: Some(1999),
                kind: "movie".to_string(),
                popularity: 80.0,
                poster_path: Some("/p.jpg".to_string()),
            }])
        }

        async fn search_tv(
            &self,
            _query: &str,
            _year: Option<i32>,
        ) -> Result<Vec<crate::interfaces::external_services::TmdbCandidate>, crate::shared::error::TmdbError>
        {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl crate::interfaces::external_services::TmdbFetcher for FakeTmdb {
        async fn fetch_movie_details(&self, id: i64) -> Result<Option<MovieDetail>, crate::shared::error::TmdbError> {
            Ok(Some(MovieDetail {
                id,
                title: "Matrix".to_string(),
                overview: "A movie.".to_string(),
                release_date: "1999-03-31".to_string(),
                poster_path: Some("/p.jpg".to_string()),
                backdrop_path: None,
                genres: vec![Genre {
                    id: 28,
                    name: "Action".to_string(),
                }],
                vote_average: 8.7,
                popularity: 80.0,
            }))
        }

        async fn fetch_tv_details(&self, _id: i64) -> Result<Option<TvDetail>, crate::shared::error::TmdbError> {
            Ok(None)
        }

        async fn fetch_season(
            &self,
            _tv_id: i64,
            _season_number: i32,
        ) -> Result<Option<SeasonDetail>, crate::shared::error::TmdbError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl crate::interfaces::external_services::TmdbCreditsFetcher for FakeTmdb {
        async fn fetch_movie_credits(&self, _tmdb_id: i64) -> Result<Credits, crate::shared::error::TmdbError> {
            Ok(Credits::default())
        }

        async fn fetch_tv_credits(&self, _tmdb_id: i64) -> Result<Credits, crate::shared::error::TmdbError> {
            Ok(Credits::default())
        }
    }

    async fn worker() -> (
        EnrichmentWorker<FakeTmdb>,
        Arc<dyn SeriesRepository>,
        Arc<dyn EpisodeRepository>,
    ) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();

        let series_repo: Arc<dyn SeriesRepository> = Arc::new(SqliteSeriesRepository::new(pool.clone()));
        let episode_repo: Arc<dyn EpisodeRepository> = Arc::new(SqliteEpisodeRepository::new(pool.clone()));
        let cache_repo = Arc::new(SqliteCacheRepository::new(pool));
        let cache = Arc::new(MetadataCache::new(cache_repo));
        let resolver = Arc::new(ResolverService::new(Arc::new(FakeTmdb)));
        let projection = Arc::new(ProjectionCache::new(1));
        let progress = Arc::new(ProgressMonitor::new());

        let worker = EnrichmentWorker::new(
            series_repo.clone(),
            episode_repo.clone(),
            resolver,
            cache,
            projection,
            progress,
        );
        (worker, series_repo, episode_repo)
    }

    /// §8 scenario 1: two Series folders for the same movie collapse into
    /// one resolved identity once enrichment runs.
    #[tokio::test]
    async fn enrichment_resolves_pending_series_and_groups_by_identity() {
        let (worker, series_repo, _) = worker().await;
        let mut a = Series::new("movies/The.Matrix.1999".into(), Category::Movies, "The.Matrix.1999".into()).unwrap();
        a.set_cleaned("The Matrix".into(), Some(1999));
        series_repo.insert_if_absent(&a).await.unwrap();

        worker.enrich(false).await.unwrap();

        let updated = series_repo.find_by_path("movies/The.Matrix.1999").await.unwrap().unwrap();
        assert_eq!(updated.tmdb_id.as_deref(), Some("movie:603"));
        assert!(!updated.failed);
    }

    /// §8 P7: a second pass with `force_all=false` finds no pending
    /// candidates left and performs no resolver calls or writes.
    #[tokio::test]
    async fn second_pass_is_a_fixed_point() {
        let (worker, series_repo, _) = worker().await;
        let mut a = Series::new("movies/X".into(), Category::Movies, "X".into()).unwrap();
        a.set_cleaned("X".into(), None);
        series_repo.insert_if_absent(&a).await.unwrap();

        worker.enrich(false).await.unwrap();
        let after_first = series_repo.find_by_path("movies/X").await.unwrap().unwrap();

        worker.enrich(false).await.unwrap();
        let after_second = series_repo.find_by_path("movies/X").await.unwrap().unwrap();
        assert_eq!(after_first, after_second);
    }

    /// §3/§4.4: `force_all` must bypass a stale negative cache entry, not
    /// just re-select previously-failed groups — otherwise `retry_failed_metadata`
    /// would re-fail every group without ever calling the resolver again.
    #[tokio::test]
    async fn force_all_bypasses_a_cached_failure() {
        let (worker, series_repo, _) = worker().await;
        let mut a = Series::new("movies/The.Matrix.1999".into(), Category::Movies, "The.Matrix.1999".into()).unwrap();
        a.set_cleaned("The Matrix".into(), Some(1999));
        series_repo.insert_if_absent(&a).await.unwrap();

        let key = MetadataCache::key("The Matrix", Some(1999), Category::Movies);
        worker
            .cache
            .store(&key, ResolveOutcome::Failed { forbidden: false })
            .await
            .unwrap();
        series_repo.mark_group_failed(&["movies/The.Matrix.1999".to_string()]).await.unwrap();

        worker.enrich(true).await.unwrap();

        let updated = series_repo.find_by_path("movies/The.Matrix.1999").await.unwrap().unwrap();
        assert_eq!(updated.tmdb_id.as_deref(), Some("movie:603"));
        assert!(!updated.failed);
    }

    #[tokio::test]
    async fn concurrent_enrichment_is_rejected() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();
        let progress = Arc::new(ProgressMonitor::new());
        assert!(progress.try_start("enrich", 0));
        assert!(!progress.try_start("enrich", 0));
    }
}
