//! SQLite series repository implementation
//!
//! Backs C6's `series` table, keyed by `path`. Array-shaped fields
//! (`genre_ids`, `genre_names`, `actors`) round-trip through JSON text
//! columns since SQLite has no native array type.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::entities::Series;
use crate::domain::repositories::{PendingGroup, SeriesRepository};
use crate::domain::value_objects::{ActorCredit, Category};
use crate::shared::error::RepositoryError;

/// SQLite implementation of SeriesRepository
pub struct SqliteSeriesRepository {
    pool: Pool<Sqlite>,
}

impl SqliteSeriesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "path, category, name, cleaned_name, year_val, tmdb_id, failed, \
    poster_path, year, overview, rating, season_count, genre_ids, genre_names, director, actors";

fn row_to_series(row: &sqlx::sqlite::SqliteRow) -> Result<Series, RepositoryError> {
    let category_str: String = row.try_get("category")?;
    let category = Category::from_str(&category_str)
        .map_err(|e| RepositoryError::Deserialization(e.to_string()))?;

    let genre_ids_json: String = row.try_get("genre_ids")?;
    let genre_names_json: String = row.try_get("genre_names")?;
    let actors_json: String = row.try_get("actors")?;

    let genre_ids: Vec<i64> = serde_json::from_str(&genre_ids_json)
        .map_err(|e| RepositoryError::Deserialization(e.to_string()))?;
    let genre_names: Vec<String> = serde_json::from_str(&genre_names_json)
        .map_err(|e| RepositoryError::Deserialization(e.to_string()))?;
    let actors: Vec<ActorCredit> = serde_json::from_str(&actors_json)
        .map_err(|e| RepositoryError::Deserialization(e.to_string()))?;

    let failed: i64 = row.try_get("failed")?;

    Ok(Series {
        path: row.try_get("path")?,
        category,
        name: row.try_get("name")?,
        cleaned_name: row.try_get("cleaned_name")?,
        year_val: row.try_get("year_val")?,
        tmdb_id: row.try_get("tmdb_id")?,
        failed: failed != 0,
        poster_path: row.try_get("poster_path")?,
        year: row.try_get("year")?,
        overview: row.try_get("overview")?,
        rating: row.try_get("rating")?,
        season_count: row.try_get("season_count")?,
        genre_ids,
        genre_names,
        director: row.try_get("director")?,
        actors,
    })
}

#[async_trait]
impl SeriesRepository for SqliteSeriesRepository {
    async fn find_by_path(&self, path: &str) -> Result<Option<Series>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM series WHERE path = ?"))
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_series).transpose()
    }

    async fn find_by_category(&self, category: Category) -> Result<Vec<Series>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM series WHERE category = ?"
        ))
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_series).collect()
    }

    async fn find_all(&self) -> Result<Vec<Series>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM series"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_series).collect()
    }

    async fn find_uncleaned(&self) -> Result<Vec<Series>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM series WHERE cleaned_name IS NULL"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_series).collect()
    }

    async fn find_unresolved(&self, include_failed: bool) -> Result<Vec<Series>, RepositoryError> {
        let sql = if include_failed {
            format!("SELECT {SELECT_COLUMNS} FROM series WHERE tmdb_id IS NULL")
        } else {
            format!("SELECT {SELECT_COLUMNS} FROM series WHERE tmdb_id IS NULL AND failed = 0")
        };
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_series).collect()
    }

    async fn find_resolved_missing_episode_numbers(&self) -> Result<Vec<Series>, RepositoryError> {
        let cols: Vec<String> = SELECT_COLUMNS
            .split(", ")
            .map(|c| format!("s.{c}"))
            .collect();
        let rows = sqlx::query(&format!(
            "SELECT DISTINCT {cols} FROM series s \
             JOIN episodes e ON e.series_path = s.path \
             WHERE s.tmdb_id IS NOT NULL AND e.season_number IS NULL",
            cols = cols.join(", "),
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_series).collect()
    }

    async fn group_pending_by_identity(
        &self,
        include_failed: bool,
    ) -> Result<Vec<PendingGroup>, RepositoryError> {
        let pending = self.find_unresolved(include_failed).await?;
        let mut groups: HashMap<(String, Option<i32>, Category), Vec<String>> = HashMap::new();
        let mut order: Vec<(String, Option<i32>, Category)> = Vec::new();

        for series in pending {
            let cleaned_name = match series.cleaned_name {
                Some(name) => name,
                None => continue,
            };
            let key = (cleaned_name, series.year_val, series.category);
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(series.path);
        }

        Ok(order
            .into_iter()
            .map(|key| {
                let member_paths = groups.remove(&key).unwrap_or_default();
                PendingGroup {
                    cleaned_name: key.0,
                    year_val: key.1,
                    category: key.2,
                    member_paths,
                }
            })
            .collect())
    }

    async fn insert_if_absent(&self, series: &Series) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR IGNORE INTO series (path, category, name, genre_ids, genre_names, actors) \
             VALUES (?, ?, ?, '[]', '[]', '[]')",
        )
        .bind(&series.path)
        .bind(series.category.as_str())
        .bind(&series.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, series: &Series) -> Result<(), RepositoryError> {
        let genre_ids_json = serde_json::to_string(&series.genre_ids)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let genre_names_json = serde_json::to_string(&series.genre_names)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let actors_json = serde_json::to_string(&series.actors)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            "UPDATE series SET category = ?, name = ?, cleaned_name = ?, year_val = ?, \
             tmdb_id = ?, failed = ?, poster_path = ?, year = ?, overview = ?, rating = ?, \
             season_count = ?, genre_ids = ?, genre_names = ?, director = ?, actors = ? \
             WHERE path = ?",
        )
        .bind(series.category.as_str())
        .bind(&series.name)
        .bind(&series.cleaned_name)
        .bind(series.year_val)
        .bind(&series.tmdb_id)
        .bind(series.failed as i64)
        .bind(&series.poster_path)
        .bind(series.year)
        .bind(&series.overview)
        .bind(series.rating)
        .bind(series.season_count)
        .bind(genre_ids_json)
        .bind(genre_names_json)
        .bind(&series.director)
        .bind(actors_json)
        .bind(&series.path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_resolution_to_group(
        &self,
        paths: &[String],
        resolved: &Series,
    ) -> Result<(), RepositoryError> {
        let genre_ids_json = serde_json::to_string(&resolved.genre_ids)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let genre_names_json = serde_json::to_string(&resolved.genre_names)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let actors_json = serde_json::to_string(&resolved.actors)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let mut tx = self.pool.begin().await?;
        for path in paths {
            sqlx::query(
                "UPDATE series SET cleaned_name = ?, year_val = ?, tmdb_id = ?, failed = 0, \
                 poster_path = ?, year = ?, overview = ?, rating = ?, season_count = ?, \
                 genre_ids = ?, genre_names = ?, director = ?, actors = ? WHERE path = ?",
            )
            .bind(&resolved.cleaned_name)
            .bind(resolved.year_val)
            .bind(&resolved.tmdb_id)
            .bind(&resolved.poster_path)
            .bind(resolved.year)
            .bind(&resolved.overview)
            .bind(resolved.rating)
            .bind(resolved.season_count)
            .bind(&genre_ids_json)
            .bind(&genre_names_json)
            .bind(&resolved.director)
            .bind(&actors_json)
            .bind(path)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn mark_group_failed(&self, paths: &[String]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for path in paths {
            sqlx::query("UPDATE series SET tmdb_id = NULL, failed = 1 WHERE path = ?")
                .bind(path)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM series WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_orphans(&self, category: Category) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM series WHERE category = ? AND path NOT IN \
             (SELECT DISTINCT series_path FROM episodes)",
        )
        .bind(category.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM series")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn count_by_category(&self, category: Category) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM series WHERE category = ?")
            .bind(category.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Series>, RepositoryError> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM series WHERE name LIKE ? OR path LIKE ? \
             ORDER BY name ASC LIMIT ?"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_series).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::schema::initialize_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteSeriesRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();
        SqliteSeriesRepository::new(pool)
    }

    #[tokio::test]
    async fn insert_if_absent_does_not_clobber_existing_row() {
        let repo = setup().await;
        let mut series = Series::new("movies/X".into(), Category::Movies, "X".into()).unwrap();
        repo.insert_if_absent(&series).await.unwrap();

        series.apply_resolution("movie:1".into());
        repo.update(&series).await.unwrap();

        let reinserted = Series::new("movies/X".into(), Category::Movies, "X renamed".into()).unwrap();
        repo.insert_if_absent(&reinserted).await.unwrap();

        let found = repo.find_by_path("movies/X").await.unwrap().unwrap();
        assert_eq!(found.tmdb_id.as_deref(), Some("movie:1"));
        assert_eq!(found.name, "X");
    }

    #[tokio::test]
    async fn group_pending_by_identity_groups_matching_cleaned_names() {
        let repo = setup().await;
        for (path, name) in [("movies/A", "A"), ("movies/B", "A")] {
            let mut s = Series::new(path.into(), Category::Movies, name.into()).unwrap();
            repo.insert_if_absent(&s).await.unwrap();
            s.set_cleaned("A".into(), Some(2020));
            repo.update(&s).await.unwrap();
        }

        let groups = repo.group_pending_by_identity(false).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].member_paths.len(), 2);
    }

    #[tokio::test]
    async fn delete_orphans_removes_series_with_no_episodes() {
        let repo = setup().await;
        let series = Series::new("movies/X".into(), Category::Movies, "X".into()).unwrap();
        repo.insert_if_absent(&series).await.unwrap();

        let removed = repo.delete_orphans(Category::Movies).await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.find_by_path("movies/X").await.unwrap().is_none());
    }
}
