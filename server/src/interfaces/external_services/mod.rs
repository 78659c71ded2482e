// External Service Interfaces
//
// This module defines interfaces for external services that HomeFlixD depends on.
// Following Interface Segregation Principle (ISP), services are split into focused traits.
//
// Interfaces:
// - tmdb_service: TMDB API interfaces (TmdbSearcher, TmdbFetcher, TmdbCreditsFetcher)

pub mod tmdb_service;

// Re-export all external service traits and types
pub use tmdb_service::{
    TmdbSearcher, TmdbFetcher, TmdbCreditsFetcher, TmdbService,
    TmdbCandidate, MovieDetail, TvDetail, SeasonDetail, EpisodeDetail,
    Genre, Credits, CastMember, CrewMember,
};
