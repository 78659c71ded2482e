//! ServerConfigRepository trait
//!
//! Backs the resumable-first-scan marker table recovered from the original
//! implementation (SPEC_FULL §C.1): a small key/value table the crawler
//! writes a `scan_done_<category>` row to as each category finishes, read
//! once at startup so a crash mid-scan does not force a full re-walk of
//! every category on restart.

use async_trait::async_trait;

use crate::shared::error::RepositoryError;

/// Repository for the `server_config` key/value table.
#[async_trait]
pub trait ServerConfigRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;

    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;
}
