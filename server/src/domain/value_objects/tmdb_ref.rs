//! TmdbRef value object
//!
//! Wraps the opaque `{kind}:{id}` string stored in `Series.tmdbId` so call
//! sites never hand-roll the format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The external-database "kind" half of a `tmdbId` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TmdbKind {
    Movie,
    Tv,
}

impl TmdbKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TmdbKind::Movie => "movie",
            TmdbKind::Tv => "tv",
        }
    }
}

/// A resolved reference into the external database, e.g. `movie:603`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmdbRef {
    pub kind: TmdbKind,
    pub id: i64,
}

impl TmdbRef {
    pub fn movie(id: i64) -> Self {
        Self {
            kind: TmdbKind::Movie,
            id,
        }
    }

    pub fn tv(id: i64) -> Self {
        Self {
            kind: TmdbKind::Tv,
            id,
        }
    }

    /// Parses a stored `"{kind}:{id}"` string back into a `TmdbRef`.
    pub fn parse(s: &str) -> Option<Self> {
        let (kind_str, id_str) = s.split_once(':')?;
        let kind = match kind_str {
            "movie" => TmdbKind::Movie,
            "tv" => TmdbKind::Tv,
            _ => return None,
        };
        let id = id_str.parse().ok()?;
        Some(Self { kind, id })
    }
}

impl fmt::Display for TmdbRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses_movie_ref() {
        let r = TmdbRef::movie(603);
        assert_eq!(r.to_string(), "movie:603");
        assert_eq!(TmdbRef::parse("movie:603"), Some(r));
    }

    #[test]
    fn formats_and_parses_tv_ref() {
        let r = TmdbRef::tv(1399);
        assert_eq!(r.to_string(), "tv:1399");
        assert_eq!(TmdbRef::parse("tv:1399"), Some(r));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!(TmdbRef::parse("bogus"), None);
        assert_eq!(TmdbRef::parse("movie:notanumber"), None);
    }
}
