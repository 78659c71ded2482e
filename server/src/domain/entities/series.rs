//! Series entity
//!
//! One logical work (a movie or a TV show), keyed by the category-prefixed
//! relative path of its containing folder. Series are artifacts of their
//! files: a Series with no remaining Episodes is deleted during the next
//! reconciliation (I2).

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ActorCredit, Category};
use crate::shared::error::DomainError;

/// Series entity — one logical work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    /// Stable primary identifier: `"{category}/{relative-path}"`.
    pub path: String,
    pub category: Category,
    /// Raw folder/file name as discovered.
    pub name: String,
    /// Output of the title cleaner; null until first computed.
    pub cleaned_name: Option<String>,
    /// Output of the title cleaner; null until first computed.
    pub year_val: Option<i32>,
    /// Opaque `{kind}:{id}` string; null until resolved.
    pub tmdb_id: Option<String>,
    /// Set true when the resolver definitively rejected this series.
    pub failed: bool,
    pub poster_path: Option<String>,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub rating: Option<f32>,
    pub season_count: Option<i32>,
    pub genre_ids: Vec<i64>,
    pub genre_names: Vec<String>,
    pub director: Option<String>,
    pub actors: Vec<ActorCredit>,
}

impl Series {
    /// Creates a newly-discovered, unenriched series (I3: pending state).
    pub fn new(path: String, category: Category, name: String) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Err(DomainError::InvalidInput("path cannot be empty".into()));
        }
        if name.is_empty() {
            return Err(DomainError::InvalidInput("name cannot be empty".into()));
        }

        Ok(Self {
            path,
            category,
            name,
            cleaned_name: None,
            year_val: None,
            tmdb_id: None,
            failed: false,
            poster_path: None,
            year: None,
            overview: None,
            rating: None,
            season_count: None,
            genre_ids: Vec::new(),
            genre_names: Vec::new(),
            director: None,
            actors: Vec::new(),
        })
    }

    /// True once C2 has run on this series, regardless of resolver outcome.
    pub fn is_cleaned(&self) -> bool {
        self.cleaned_name.is_some()
    }

    /// True if this series is still waiting on the resolver (I3 pending state).
    pub fn is_pending(&self) -> bool {
        self.tmdb_id.is_none() && !self.failed
    }

    /// Records the C2 output.
    pub fn set_cleaned(&mut self, cleaned_name: String, year_val: Option<i32>) {
        self.cleaned_name = Some(cleaned_name);
        self.year_val = year_val;
    }

    /// Marks this series as definitively rejected by the resolver (I3).
    pub fn mark_failed(&mut self) {
        self.tmdb_id = None;
        self.failed = true;
    }

    /// Clears a prior failure so the resolver is retried (explicit retry endpoint).
    pub fn clear_failed(&mut self) {
        self.failed = false;
    }

    /// Applies a successful resolver result (I3: resolved state).
    pub fn apply_resolution(&mut self, tmdb_id: String) {
        self.tmdb_id = Some(tmdb_id);
        self.failed = false;
    }

    /// The grouping key used by the projection cache (§4.8): `"tmdb:{id}"`
    /// when resolved, otherwise `"name:{cleanedName}_{year}"`.
    pub fn grouping_key(&self) -> String {
        if let Some(id) = &self.tmdb_id {
            format!("tmdb:{id}")
        } else {
            let name = self.cleaned_name.as_deref().unwrap_or(&self.name);
            let year = self
                .year_val
                .map(|y| y.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            format!("name:{name}_{year}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_series_is_pending() {
        let s = Series::new("movies/Inception".into(), Category::Movies, "Inception".into()).unwrap();
        assert!(s.is_pending());
        assert!(!s.is_cleaned());
    }

    #[test]
    fn resolved_and_failed_are_mutually_exclusive() {
        let mut s = Series::new("movies/X".into(), Category::Movies, "X".into()).unwrap();
        s.apply_resolution("movie:603".into());
        assert!(!s.failed);
        assert!(s.tmdb_id.is_some());

        s.mark_failed();
        assert!(s.failed);
        assert!(s.tmdb_id.is_none());
    }

    #[test]
    fn grouping_key_prefers_tmdb_id() {
        let mut s = Series::new("movies/X".into(), Category::Movies, "X".into()).unwrap();
        s.set_cleaned("X".into(), Some(2020));
        assert_eq!(s.grouping_key(), "name:X_2020");
        s.apply_resolution("movie:42".into());
        assert_eq!(s.grouping_key(), "tmdb:42");
    }

    #[test]
    fn rejects_empty_path_or_name() {
        assert!(Series::new("".into(), Category::Movies, "X".into()).is_err());
        assert!(Series::new("movies/X".into(), Category::Movies, "".into()).is_err());
    }
}
