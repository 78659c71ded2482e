//! Resolver-cache row
//!
//! One memoized external lookup (§3, §4.3, §4.4). The cache key (`h`) is a
//! hash computed by the metadata cache; the value (`data`) is either a full
//! enriched record or a typed failure marker, round-tripped as JSON through
//! [`crate::domain::repositories::CacheRepository`].

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ActorCredit;

/// Per-episode metadata the resolver backfills from a TV season's episode list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
}

/// A fully enriched external-database record (§4.4 "full detail record").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    /// Opaque `{kind}:{id}` string.
    pub tmdb_id: String,
    pub poster_path: Option<String>,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub rating: Option<f32>,
    pub season_count: Option<i32>,
    pub genre_ids: Vec<i64>,
    pub genre_names: Vec<String>,
    pub director: Option<String>,
    pub actors: Vec<ActorCredit>,
    /// `"{season}_{episode}"` → per-episode metadata; empty for movies.
    pub episodes: std::collections::HashMap<String, EpisodeMetadata>,
}

impl ResolvedMetadata {
    pub fn episode_key(season: i32, episode: i32) -> String {
        format!("{season}_{episode}")
    }

    pub fn episode_metadata(&self, season: i32, episode: i32) -> Option<&EpisodeMetadata> {
        self.episodes.get(&Self::episode_key(season, episode))
    }
}

/// What the external resolver returns, and what is stored under a cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum ResolveOutcome {
    Resolved(ResolvedMetadata),
    Failed { forbidden: bool },
}

impl ResolveOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolveOutcome::Resolved(_))
    }

    pub fn forbidden() -> Self {
        ResolveOutcome::Failed { forbidden: true }
    }

    pub fn miss() -> Self {
        ResolveOutcome::Failed { forbidden: false }
    }
}
