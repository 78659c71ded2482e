// Infrastructure Layer
//
// This module contains all infrastructure implementations including:
// - Persistence (SQLite repositories)
// - External service adapters (the metadata database client)
// - Filesystem adapters (path resolution, crawling)
// - Caching layer
// - Database connection pooling

pub mod persistence;
pub mod external;
pub mod filesystem;
pub mod cache;
pub mod database;

pub use persistence::sqlite::*;
pub use external::tmdb::*;
pub use filesystem::*;
pub use cache::InMemoryCache;
pub use database::*;
