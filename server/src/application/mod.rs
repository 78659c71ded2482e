//! Application Layer
//!
//! Coordinates domain services and repositories into the background workers
//! and read-side caches the HTTP layer depends on.

pub mod services;

pub use services::{Crawler, EnrichmentWorker, MetadataCache, ProgressMonitor, ProjectionCache};
