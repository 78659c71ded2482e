//! EpisodeRepository trait
//!
//! Repository interface for episode data access, keyed by `id` (I4: stable
//! across ancestor-directory renames as long as the absolute path bytes are
//! unchanged).

use async_trait::async_trait;

use crate::domain::entities::Episode;
use crate::shared::error::RepositoryError;

/// Repository for episode data access.
#[async_trait]
pub trait EpisodeRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Episode>, RepositoryError>;

    async fn find_by_series(&self, series_path: &str) -> Result<Vec<Episode>, RepositoryError>;

    /// All episode ids currently recorded under a category prefix, for C5's
    /// post-walk vanished-file reconciliation (P4).
    async fn find_ids_by_category_prefix(
        &self,
        category_prefix: &str,
    ) -> Result<Vec<String>, RepositoryError>;

    /// `INSERT OR REPLACE` semantics (C5 reconciliation).
    async fn upsert(&self, episode: &Episode) -> Result<(), RepositoryError>;

    /// Rewrites `series_path` for every episode currently under `from_path`
    /// (ancestor-folder rename detected mid-walk).
    async fn rebind_series_path(
        &self,
        from_path: &str,
        to_path: &str,
    ) -> Result<u64, RepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Deletes every episode in `ids` (C5: files no longer seen on disk).
    async fn delete_many(&self, ids: &[String]) -> Result<u64, RepositoryError>;

    /// Episodes under `series_path` still missing a season number, for C7's
    /// per-episode backfill pass.
    async fn find_missing_episode_numbers(
        &self,
        series_path: &str,
    ) -> Result<Vec<Episode>, RepositoryError>;

    async fn count_by_series(&self, series_path: &str) -> Result<i64, RepositoryError>;
}
