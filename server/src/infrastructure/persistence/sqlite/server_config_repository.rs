//! SQLite server-config repository implementation
//!
//! Backs the `server_config` key/value table used by C5's resumable-first-scan
//! marker (SPEC_FULL §C.1).

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::repositories::ServerConfigRepository;
use crate::shared::error::RepositoryError;

/// SQLite implementation of ServerConfigRepository
pub struct SqliteServerConfigRepository {
    pool: Pool<Sqlite>,
}

impl SqliteServerConfigRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServerConfigRepository for SqliteServerConfigRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM server_config WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get("value")).transpose().map_err(Into::into)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO server_config (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM server_config WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::schema::initialize_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteServerConfigRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();
        SqliteServerConfigRepository::new(pool)
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let repo = setup().await;
        repo.set("scan_done_movies", "1").await.unwrap();
        assert_eq!(repo.get("scan_done_movies").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let repo = setup().await;
        assert_eq!(repo.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_prior_value() {
        let repo = setup().await;
        repo.set("k", "1").await.unwrap();
        repo.set("k", "2").await.unwrap();
        assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("2"));
    }
}
