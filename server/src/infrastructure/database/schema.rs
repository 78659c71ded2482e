//! Database schema management (C6, §4.7).
//!
//! Three tables back the catalog store — `series`, `episodes`,
//! `resolver_cache` — plus a fourth, `server_config`, for the resumable-scan
//! marker recovered in SPEC_FULL §C.1. Startup introspects each table's
//! columns via `PRAGMA table_info` and issues additive `ADD COLUMN`
//! statements for anything missing; existing rows keep their data and no
//! column is ever dropped or renamed (§4.7). Safe to call on every startup.

use sqlx::{Pool, Row, Sqlite};
use tracing::info;

/// Creates all tables if absent, then brings each one's columns up to date.
pub async fn initialize_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    info!("initializing database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS series (
            path TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            name TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS episodes (
            id TEXT PRIMARY KEY,
            series_path TEXT NOT NULL,
            title TEXT NOT NULL,
            video_url TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resolver_cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            expires_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS server_config (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    apply_column_migrations(pool).await?;
    create_indices(pool).await?;

    info!("database schema initialized");
    Ok(())
}

/// One column this version of the schema expects to exist, with the SQL
/// fragment used to add it when `PRAGMA table_info` doesn't find it.
struct ExpectedColumn {
    name: &'static str,
    add_sql: &'static str,
}

const SERIES_COLUMNS: &[ExpectedColumn] = &[
    ExpectedColumn { name: "cleaned_name", add_sql: "ALTER TABLE series ADD COLUMN cleaned_name TEXT" },
    ExpectedColumn { name: "year_val", add_sql: "ALTER TABLE series ADD COLUMN year_val INTEGER" },
    ExpectedColumn { name: "tmdb_id", add_sql: "ALTER TABLE series ADD COLUMN tmdb_id TEXT" },
    ExpectedColumn { name: "failed", add_sql: "ALTER TABLE series ADD COLUMN failed INTEGER NOT NULL DEFAULT 0" },
    ExpectedColumn { name: "poster_path", add_sql: "ALTER TABLE series ADD COLUMN poster_path TEXT" },
    ExpectedColumn { name: "year", add_sql: "ALTER TABLE series ADD COLUMN year INTEGER" },
    ExpectedColumn { name: "overview", add_sql: "ALTER TABLE series ADD COLUMN overview TEXT" },
    ExpectedColumn { name: "rating", add_sql: "ALTER TABLE series ADD COLUMN rating REAL" },
    ExpectedColumn { name: "season_count", add_sql: "ALTER TABLE series ADD COLUMN season_count INTEGER" },
    ExpectedColumn { name: "genre_ids", add_sql: "ALTER TABLE series ADD COLUMN genre_ids TEXT NOT NULL DEFAULT '[]'" },
    ExpectedColumn { name: "genre_names", add_sql: "ALTER TABLE series ADD COLUMN genre_names TEXT NOT NULL DEFAULT '[]'" },
    ExpectedColumn { name: "director", add_sql: "ALTER TABLE series ADD COLUMN director TEXT" },
    ExpectedColumn { name: "actors", add_sql: "ALTER TABLE series ADD COLUMN actors TEXT NOT NULL DEFAULT '[]'" },
];

const EPISODES_COLUMNS: &[ExpectedColumn] = &[
    ExpectedColumn { name: "thumbnail_url", add_sql: "ALTER TABLE episodes ADD COLUMN thumbnail_url TEXT" },
    ExpectedColumn { name: "season_number", add_sql: "ALTER TABLE episodes ADD COLUMN season_number INTEGER" },
    ExpectedColumn { name: "episode_number", add_sql: "ALTER TABLE episodes ADD COLUMN episode_number INTEGER" },
    ExpectedColumn { name: "overview", add_sql: "ALTER TABLE episodes ADD COLUMN overview TEXT" },
    ExpectedColumn { name: "air_date", add_sql: "ALTER TABLE episodes ADD COLUMN air_date TEXT" },
];

async fn apply_column_migrations(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    migrate_table(pool, "series", SERIES_COLUMNS).await?;
    migrate_table(pool, "episodes", EPISODES_COLUMNS).await?;
    Ok(())
}

async fn migrate_table(
    pool: &Pool<Sqlite>,
    table: &str,
    expected: &[ExpectedColumn],
) -> Result<(), sqlx::Error> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;
    let existing: Vec<String> = rows
        .iter()
        .map(|row| row.try_get::<String, _>("name"))
        .collect::<Result<_, _>>()?;

    for column in expected {
        if !existing.iter().any(|name| name == column.name) {
            sqlx::query(column.add_sql).execute(pool).await?;
        }
    }
    Ok(())
}

async fn create_indices(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_series_category ON series(category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_series_name ON series(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_series_tmdb_id ON series(tmdb_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_series_cleaned_name ON series(cleaned_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_episodes_series_path ON episodes(series_path)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cache_expires ON resolver_cache(expires_at)")
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> Pool<Sqlite> {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to create in-memory pool")
    }

    #[tokio::test]
    async fn creates_all_four_tables() {
        let pool = memory_pool().await;
        initialize_schema(&pool).await.unwrap();

        for table in ["series", "episodes", "resolver_cache", "server_config"] {
            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn is_idempotent() {
        let pool = memory_pool().await;
        initialize_schema(&pool).await.unwrap();
        initialize_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn additive_migration_preserves_existing_rows() {
        let pool = memory_pool().await;
        // Simulate an older schema: the bare series table with no enrichment columns.
        sqlx::query("CREATE TABLE series (path TEXT PRIMARY KEY, category TEXT NOT NULL, name TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO series (path, category, name) VALUES ('movies/X', 'movies', 'X')")
            .execute(&pool)
            .await
            .unwrap();

        initialize_schema(&pool).await.unwrap();

        let (name,): (String,) = sqlx::query_as("SELECT name FROM series WHERE path = 'movies/X'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, "X");

        let (failed,): (i64,) = sqlx::query_as("SELECT failed FROM series WHERE path = 'movies/X'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(failed, 0);
    }
}
