//! Repository Interfaces - Abstractions for data access
//!
//! Repository interfaces define the contract for data access implementations.
//! They use domain entities and return domain errors.

pub mod cache_repository;
pub mod episode_repository;
pub mod series_repository;
pub mod server_config_repository;

pub use cache_repository::{CacheRepository, CacheStats};
pub use episode_repository::EpisodeRepository;
pub use series_repository::{PendingGroup, SeriesRepository};
pub use server_config_repository::ServerConfigRepository;
