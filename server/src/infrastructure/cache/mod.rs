// Caching Layer
//
// In-process memoization tier backing C3's metadata cache (§4.3). The
// persistent tier lives in infrastructure::persistence::sqlite::cache_repository.

pub mod in_memory_cache;

pub use in_memory_cache::InMemoryCache;
