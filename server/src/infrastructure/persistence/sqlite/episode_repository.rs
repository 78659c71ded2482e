//! SQLite episode repository implementation
//!
//! Backs C6's `episodes` table, keyed by `id` (a stable hash of the real
//! absolute path, per I4).

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::entities::Episode;
use crate::domain::repositories::EpisodeRepository;
use crate::shared::error::RepositoryError;

/// SQLite implementation of EpisodeRepository
pub struct SqliteEpisodeRepository {
    pool: Pool<Sqlite>,
}

impl SqliteEpisodeRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, series_path, title, video_url, thumbnail_url, \
    season_number, episode_number, overview, air_date";

fn row_to_episode(row: &sqlx::sqlite::SqliteRow) -> Result<Episode, RepositoryError> {
    Ok(Episode {
        id: row.try_get("id")?,
        series_path: row.try_get("series_path")?,
        title: row.try_get("title")?,
        video_url: row.try_get("video_url")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        season_number: row.try_get("season_number")?,
        episode_number: row.try_get("episode_number")?,
        overview: row.try_get("overview")?,
        air_date: row.try_get("air_date")?,
    })
}

#[async_trait]
impl EpisodeRepository for SqliteEpisodeRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Episode>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM episodes WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_episode).transpose()
    }

    async fn find_by_series(&self, series_path: &str) -> Result<Vec<Episode>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM episodes WHERE series_path = ?"
        ))
        .bind(series_path)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_episode).collect()
    }

    async fn find_ids_by_category_prefix(
        &self,
        category_prefix: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        let pattern = format!("{category_prefix}/%");
        let rows = sqlx::query("SELECT id FROM episodes WHERE series_path LIKE ?")
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| Ok(r.try_get("id")?)).collect()
    }

    async fn upsert(&self, episode: &Episode) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO episodes (id, series_path, title, video_url, thumbnail_url, \
             season_number, episode_number, overview, air_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             series_path = excluded.series_path, title = excluded.title, \
             video_url = excluded.video_url, thumbnail_url = excluded.thumbnail_url, \
             season_number = excluded.season_number, episode_number = excluded.episode_number, \
             overview = excluded.overview, air_date = excluded.air_date",
        )
        .bind(&episode.id)
        .bind(&episode.series_path)
        .bind(&episode.title)
        .bind(&episode.video_url)
        .bind(&episode.thumbnail_url)
        .bind(episode.season_number)
        .bind(episode.episode_number)
        .bind(&episode.overview)
        .bind(&episode.air_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn rebind_series_path(
        &self,
        from_path: &str,
        to_path: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE episodes SET series_path = ? WHERE series_path = ?")
            .bind(to_path)
            .bind(from_path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM episodes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0u64;
        for id in ids {
            let result = sqlx::query("DELETE FROM episodes WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected();
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn find_missing_episode_numbers(
        &self,
        series_path: &str,
    ) -> Result<Vec<Episode>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM episodes WHERE series_path = ? AND season_number IS NULL"
        ))
        .bind(series_path)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_episode).collect()
    }

    async fn count_by_series(&self, series_path: &str) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM episodes WHERE series_path = ?")
            .bind(series_path)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::schema::initialize_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteEpisodeRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();
        SqliteEpisodeRepository::new(pool)
    }

    #[tokio::test]
    async fn upsert_then_find_by_id_round_trips() {
        let repo = setup().await;
        let episode = Episode::new(
            "abc".into(),
            "domestic-tv/Show".into(),
            "file.mkv".into(),
            "/video_serve?...".into(),
        );
        repo.upsert(&episode).await.unwrap();
        let found = repo.find_by_id("abc").await.unwrap().unwrap();
        assert_eq!(found.series_path, "domestic-tv/Show");
    }

    #[tokio::test]
    async fn rebind_series_path_moves_every_matching_row() {
        let repo = setup().await;
        for id in ["a", "b"] {
            let e = Episode::new(
                id.into(),
                "domestic-tv/Old".into(),
                "f.mkv".into(),
                "u".into(),
            );
            repo.upsert(&e).await.unwrap();
        }
        let moved = repo.rebind_series_path("domestic-tv/Old", "domestic-tv/New").await.unwrap();
        assert_eq!(moved, 2);
        assert_eq!(repo.find_by_series("domestic-tv/New").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_many_removes_vanished_files() {
        let repo = setup().await;
        let e = Episode::new("a".into(), "movies/X".into(), "f.mkv".into(), "u".into());
        repo.upsert(&e).await.unwrap();
        let deleted = repo.delete_many(&["a".to_string(), "missing".to_string()]).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.find_by_id("a").await.unwrap().is_none());
    }
}
