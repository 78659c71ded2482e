//! SeriesRepository trait
//!
//! Repository interface for series data access, keyed by `path` (I2: a
//! Series with no remaining Episodes is deleted, not merely marked).

use async_trait::async_trait;

use crate::domain::entities::Series;
use crate::domain::value_objects::Category;
use crate::shared::error::RepositoryError;

/// One enrichment candidate group, as produced by C7 step 3's grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGroup {
    pub cleaned_name: String,
    pub year_val: Option<i32>,
    pub category: Category,
    /// Every Series path sharing this group's key.
    pub member_paths: Vec<String>,
}

/// Repository for series data access.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    async fn find_by_path(&self, path: &str) -> Result<Option<Series>, RepositoryError>;

    async fn find_by_category(&self, category: Category) -> Result<Vec<Series>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Series>, RepositoryError>;

    /// Series still missing `cleanedName` (C7 step 1 candidates).
    async fn find_uncleaned(&self) -> Result<Vec<Series>, RepositoryError>;

    /// Series where `tmdbId IS NULL AND failed = 0`, plus failed ones when
    /// `include_failed` is set (C7 step 2).
    async fn find_unresolved(&self, include_failed: bool) -> Result<Vec<Series>, RepositoryError>;

    /// Already-resolved series that still have an episode missing a season
    /// number (C7 step 2's backfill-reuse inclusion).
    async fn find_resolved_missing_episode_numbers(&self) -> Result<Vec<Series>, RepositoryError>;

    /// Groups unresolved (and optionally failed) series by
    /// `(cleanedName, yearVal, category)` (C7 step 3).
    async fn group_pending_by_identity(
        &self,
        include_failed: bool,
    ) -> Result<Vec<PendingGroup>, RepositoryError>;

    /// Inserts if absent, otherwise leaves the row untouched (C5's
    /// `INSERT OR IGNORE` on first sight of a folder).
    async fn insert_if_absent(&self, series: &Series) -> Result<(), RepositoryError>;

    async fn update(&self, series: &Series) -> Result<(), RepositoryError>;

    /// Writes the same enriched fields to every path in `paths` in one
    /// statement batch (C7 step 5's group-wide write).
    async fn apply_resolution_to_group(
        &self,
        paths: &[String],
        resolved: &Series,
    ) -> Result<(), RepositoryError>;

    /// Sets `failed = 1` for every path in `paths` (C7 step 5's group-wide
    /// failure write).
    async fn mark_group_failed(&self, paths: &[String]) -> Result<(), RepositoryError>;

    async fn delete(&self, path: &str) -> Result<(), RepositoryError>;

    /// Deletes every Series in `category` with zero remaining Episodes (I2,
    /// run at the end of C5's reconciliation).
    async fn delete_orphans(&self, category: Category) -> Result<u64, RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;

    async fn count_by_category(&self, category: Category) -> Result<i64, RepositoryError>;

    /// Substring match on `name` or `path` (§6 `/search`).
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Series>, RepositoryError>;
}
