//! Application Services
//!
//! Application services coordinate multiple repositories and domain services
//! into the long-running background workers (C5, C7, C9) and the read-side
//! cache (C3, C8) the HTTP layer reads from.

pub mod crawler;
pub mod enrichment;
pub mod metadata_cache;
pub mod progress_monitor;
pub mod projection_cache;

pub use crawler::Crawler;
pub use enrichment::EnrichmentWorker;
pub use metadata_cache::MetadataCache;
pub use progress_monitor::{ProgressMonitor, ProgressSnapshot, Severity};
pub use projection_cache::{GroupedSeries, ProjectionCache, Section};
