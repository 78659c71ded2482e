// SQLite Repository Implementations
//
// This module contains SQLite-based implementations of the repository interfaces.

pub mod cache_repository;
pub mod episode_repository;
pub mod series_repository;
pub mod server_config_repository;

pub use cache_repository::SqliteCacheRepository;
pub use episode_repository::SqliteEpisodeRepository;
pub use series_repository::SqliteSeriesRepository;
pub use server_config_repository::SqliteServerConfigRepository;
