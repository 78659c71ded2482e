// TMDB Service Interfaces
//
// This module defines interfaces for The Movie Database (TMDB) API.
// Following Interface Segregation Principle (ISP), the service is split into
// focused traits: TmdbSearcher, TmdbFetcher, TmdbCreditsFetcher.
//
// This design allows:
// - Testing with mock implementations
// - Swapping implementations (e.g., caching layer)
// - Implementing only needed methods (ISP compliance)

use async_trait::async_trait;
use crate::shared::error::TmdbError;

/// Search interface for TMDB API
///
/// Provides methods for searching movies and TV shows by query.
#[async_trait]
pub trait TmdbSearcher: Send + Sync {
    /// Search for movies by query and optional year
    async fn search_movie(&self, query: &str, year: Option<i32>) -> Result<Vec<TmdbCandidate>, TmdbError>;

    /// Search for TV shows by query and optional year
    async fn search_tv(&self, query: &str, year: Option<i32>) -> Result<Vec<TmdbCandidate>, TmdbError>;
}

/// Fetch interface for TMDB API
///
/// Provides methods for fetching detailed information about movies, TV shows,
/// seasons, and episodes.
#[async_trait]
pub trait TmdbFetcher: Send + Sync {
    /// Fetch detailed movie information
    async fn fetch_movie_details(&self, id: i64) -> Result<Option<MovieDetail>, TmdbError>;

    /// Fetch detailed TV show information
    async fn fetch_tv_details(&self, id: i64) -> Result<Option<TvDetail>, TmdbError>;

    /// Fetch season details (including its episode list) for a TV show
    async fn fetch_season(&self, tv_id: i64, season_number: i32) -> Result<Option<SeasonDetail>, TmdbError>;
}

/// Credits fetcher interface
///
/// Provides methods for fetching cast and crew information.
#[async_trait]
pub trait TmdbCreditsFetcher: Send + Sync {
    /// Fetch credits (cast and crew) for a movie
    async fn fetch_movie_credits(&self, tmdb_id: i64) -> Result<Credits, TmdbError>;

    /// Fetch credits (cast and crew) for a TV show
    async fn fetch_tv_credits(&self, tmdb_id: i64) -> Result<Credits, TmdbError>;
}

/// Combined TMDB service interface
///
/// Convenience trait that combines the three TMDB interfaces for
/// implementations that provide full TMDB functionality.
pub trait TmdbService: TmdbSearcher + TmdbFetcher + TmdbCreditsFetcher {}

impl<T> TmdbService for T where T: TmdbSearcher + TmdbFetcher + TmdbCreditsFetcher {}

// ============================================================================
// Types used by TMDB interfaces
// ============================================================================

/// A single search hit, as scored by [`crate::domain::services::ResolverService`]
/// (§4.4). Carries only what the scoring function needs; full detail is
/// fetched separately once a candidate is accepted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct TmdbCandidate {
    pub tmdb_id: i64,
    pub title: String,
    pub year: Option<i32>,
    /// "movie" or "tv"
    pub kind: String,
    pub popularity: f32,
    pub poster_path: Option<String>,
}

/// Detailed movie information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub release_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Vec<Genre>,
    pub vote_average: f32,
    pub popularity: f32,
}

/// Detailed TV show information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TvDetail {
    pub id: i64,
    pub name: String,
    pub overview: String,
    pub first_air_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Vec<Genre>,
    pub number_of_seasons: i32,
    pub vote_average: f32,
    pub popularity: f32,
}

/// Season details for a TV show, including its full episode list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SeasonDetail {
    pub season_number: i32,
    #[serde(default)]
    pub episodes: Vec<EpisodeDetail>,
}

/// Episode details for a TV show
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EpisodeDetail {
    pub episode_number: i32,
    pub season_number: i32,
    #[serde(default)]
    pub overview: String,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
}

/// Genre information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Credits information (cast and crew)
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

/// Cast member (actor) information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile_path: Option<String>,
    pub order: i32,
}

/// Crew member information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    pub job: String,
    pub department: String,
    pub profile_path: Option<String>,
}
