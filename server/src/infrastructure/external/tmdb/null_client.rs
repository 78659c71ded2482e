//! Null TMDB client.
//!
//! Used when `TMDB_API_KEY` is unset (SPEC_FULL §B): "resolver is
//! feature-disabled with a warning if absent, so the crawler and catalog API
//! still function without external enrichment." Every call fails with
//! [`TmdbError::InvalidApiKey`], which the resolver/enrichment worker treat
//! the same way they treat any other resolver miss.

use async_trait::async_trait;

use crate::interfaces::external_services::{
    Credits, MovieDetail, SeasonDetail, TmdbCandidate, TmdbCreditsFetcher, TmdbFetcher, TmdbSearcher,
    TvDetail,
};
use crate::shared::error::TmdbError;

pub struct NullTmdbClient;

#[async_trait]
impl TmdbSearcher for NullTmdbClient {
    async fn search_movie(&self, _query: &str, _year: Option<i32>) -> Result<Vec<TmdbCandidate>, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }

    async fn search_tv(&self, _query: &str, _year: Option<i32>) -> Result<Vec<TmdbCandidate>, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }
}

#[async_trait]
impl TmdbFetcher for NullTmdbClient {
    async fn fetch_movie_details(&self, _id: i64) -> Result<Option<MovieDetail>, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }

    async fn fetch_tv_details(&self, _id: i64) -> Result<Option<TvDetail>, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }

    async fn fetch_season(&self, _tv_id: i64, _season_number: i32) -> Result<Option<SeasonDetail>, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }
}

#[async_trait]
impl TmdbCreditsFetcher for NullTmdbClient {
    async fn fetch_movie_credits(&self, _tmdb_id: i64) -> Result<Credits, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }

    async fn fetch_tv_credits(&self, _tmdb_id: i64) -> Result<Credits, TmdbError> {
        Err(TmdbError::InvalidApiKey)
    }
}
