//! Metadata cache (C3, §4.3).
//!
//! Two tiers: an unbounded in-process map keyed by hash, and C6's durable
//! `resolver_cache` table behind [`CacheRepository`]. Resolver-cache rows are
//! write-once (§3 Lifecycles) — the only way to overwrite one is the
//! explicit "ignore cache" bypass an admin retry takes.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::Arc;

use md5::{Digest, Md5};
use unicode_normalization::UnicodeNormalization;

use crate::domain::entities::ResolveOutcome;
use crate::domain::repositories::CacheRepository;
use crate::domain::value_objects::Category;
use crate::infrastructure::persistence::sqlite::cache_repository::NEVER_EXPIRE_TTL;
use crate::shared::error::RepositoryError;

/// Tiered memoization in front of C6's resolver-cache table.
pub struct MetadataCache {
    persistent: Arc<dyn CacheRepository>,
    memo: RwLock<HashMap<String, ResolveOutcome>>,
}

impl MetadataCache {
    pub fn new(persistent: Arc<dyn CacheRepository>) -> Self {
        Self {
            persistent,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// The MD5 cache key (§4.3): `MD5(NFC(cleaned "_" year "_" category))`.
    /// Category participates so the same raw title resolves differently as
    /// movie vs. TV depending on the caller's categorization hint.
    pub fn key(cleaned_title: &str, year: Option<i32>, category: Category) -> String {
        let year_part = year.map(|y| y.to_string()).unwrap_or_default();
        let raw = format!("{cleaned_title}_{year_part}_{}", category.as_str());
        let normalized: String = raw.nfc().collect();

        let mut hasher = Md5::new();
        hasher.update(normalized.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Looks up `key`, checking the in-process memo before the durable
    /// tier. `ignore_cache` forces a miss regardless of what is stored, so
    /// the caller re-invokes the resolver pipeline.
    pub async fn lookup(&self, key: &str, ignore_cache: bool) -> Option<ResolveOutcome> {
        if ignore_cache {
            return None;
        }

        if let Some(hit) = self.memo.read().unwrap().get(key).cloned() {
            return Some(hit);
        }

        let stored = self.persistent.get(key).await.ok().flatten()?;
        let outcome: ResolveOutcome = serde_json::from_str(&stored).ok()?;
        self.memo
            .write()
            .unwrap()
            .insert(key.to_string(), outcome.clone());
        Some(outcome)
    }

    /// Persists `outcome` under `key` in both tiers. Both successful and
    /// negative (failure) records are cached — negative caching prevents
    /// hammering the external database on a systemic outage (§4.4).
    pub async fn store(&self, key: &str, outcome: ResolveOutcome) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(&outcome)?;
        self.persistent.set(key, &json, NEVER_EXPIRE_TTL).await?;
        self.memo.write().unwrap().insert(key.to_string(), outcome);
        Ok(())
    }

    /// Drops a cached entry so the next lookup misses (used by the explicit
    /// retry endpoint before re-invoking the resolver).
    pub async fn evict(&self, key: &str) -> Result<(), RepositoryError> {
        self.memo.write().unwrap().remove(key);
        self.persistent.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::InMemoryCache;
    use std::time::Duration;

    fn test_cache() -> InMemoryCache {
        InMemoryCache::new(1000, Duration::from_secs(3600))
    }

    #[test]
    fn key_depends_on_title_year_and_category() {
        let a = MetadataCache::key("Inception", Some(2010), Category::Movies);
        let b = MetadataCache::key("Inception", Some(2010), Category::DomesticTv);
        let c = MetadataCache::key("Inception", None, Category::Movies);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, MetadataCache::key("Inception", Some(2010), Category::Movies));
    }

    #[tokio::test]
    async fn stores_and_looks_up_through_both_tiers() {
        let cache = MetadataCache::new(Arc::new(test_cache()));
        let key = MetadataCache::key("Inception", Some(2010), Category::Movies);
        assert!(cache.lookup(&key, false).await.is_none());

        cache.store(&key, ResolveOutcome::miss()).await.unwrap();
        assert_eq!(cache.lookup(&key, false).await, Some(ResolveOutcome::miss()));
        assert!(cache.lookup(&key, true).await.is_none());
    }

    #[tokio::test]
    async fn evict_clears_both_tiers() {
        let cache = MetadataCache::new(Arc::new(test_cache()));
        let key = MetadataCache::key("X", None, Category::Animation);
        cache.store(&key, ResolveOutcome::forbidden()).await.unwrap();
        cache.evict(&key).await.unwrap();
        assert!(cache.lookup(&key, false).await.is_none());
    }
}
