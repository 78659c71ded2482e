//! Category value object
//!
//! The five fixed top-level classifications a Series folder can live under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::DomainError;

/// One of the five fixed library categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Movies,
    ForeignTv,
    DomesticTv,
    Animation,
    Airing,
}

impl Category {
    /// All five categories, in a stable order (used for scan order and home projection union).
    pub const ALL: [Category; 5] = [
        Category::Movies,
        Category::ForeignTv,
        Category::DomesticTv,
        Category::Animation,
        Category::Airing,
    ];

    /// The label used as the path prefix and in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "movies",
            Category::ForeignTv => "foreign-tv",
            Category::DomesticTv => "domestic-tv",
            Category::Animation => "animation",
            Category::Airing => "airing",
        }
    }

    /// Whether the external resolver should prefer TV-shaped results for this category.
    pub fn prefers_tv(&self) -> bool {
        !matches!(self, Category::Movies)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movies" => Ok(Category::Movies),
            "foreign-tv" => Ok(Category::ForeignTv),
            "domestic-tv" => Ok(Category::DomesticTv),
            "animation" => Ok(Category::Animation),
            "airing" => Ok(Category::Airing),
            _ => Err(DomainError::InvalidInput(format!("unknown category: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
    }

    #[test]
    fn rejects_unknown_label() {
        assert!("not-a-category".parse::<Category>().is_err());
    }

    #[test]
    fn only_movies_prefers_movie_kind() {
        assert!(!Category::Movies.prefers_tv());
        assert!(Category::ForeignTv.prefers_tv());
        assert!(Category::DomesticTv.prefers_tv());
        assert!(Category::Animation.prefers_tv());
        assert!(Category::Airing.prefers_tv());
    }
}
