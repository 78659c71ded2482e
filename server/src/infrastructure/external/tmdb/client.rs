//! TMDB Client Implementation
//!
//! Provides TMDB API client with caching and rate limiting

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::repositories::CacheRepository;
use crate::interfaces::external_services::{
    TmdbSearcher, TmdbFetcher, TmdbCreditsFetcher,
    TmdbCandidate, MovieDetail, TvDetail, SeasonDetail, Credits, CastMember, CrewMember,
};
use crate::infrastructure::persistence::sqlite::cache_repository::NEVER_EXPIRE_TTL;
use crate::shared::error::TmdbError;

fn to_json(value: &impl serde::Serialize) -> Result<String, TmdbError> {
    serde_json::to_string(value).map_err(|e| TmdbError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, TmdbError> {
    serde_json::from_str(raw).map_err(|e| TmdbError::Deserialization(e.to_string()))
}

/// TMDB API client with caching and rate limiting
pub struct TmdbClient {
    api_key: String,
    http_client: Client,
    cache: Arc<dyn CacheRepository>,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl TmdbClient {
    /// Creates a new TMDB client
    ///
    /// # Arguments
    /// * `api_key` - TMDB API key
    /// * `cache` - Cache repository for caching raw detail responses
    ///
    /// # Errors
    /// Returns error if client creation fails
    pub fn new(api_key: &str, cache: Arc<dyn CacheRepository>) -> Result<Self, TmdbError> {
        if api_key.is_empty() {
            return Err(TmdbError::InvalidApiKey);
        }

        Ok(Self {
            api_key: api_key.to_string(),
            http_client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|e| TmdbError::Network(e.to_string()))?,
            cache,
            base_url: "https://api.themoviedb.org/3".to_string(),
            rate_limiter: Arc::new(RateLimiter::new(4)),
        })
    }

    async fn make_request<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T, TmdbError> {
        self.rate_limiter.acquire().await;

        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}api_key={}", self.base_url, endpoint, separator, self.api_key);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(TmdbError::ApiError(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TmdbSearcher for TmdbClient {
    async fn search_movie(&self, query: &str, year: Option<i32>) -> Result<Vec<TmdbCandidate>, TmdbError> {
        let endpoint = if let Some(y) = year {
            format!("/search/movie?query={}&year={}", urlencoding::encode(query), y)
        } else {
            format!("/search/movie?query={}", urlencoding::encode(query))
        };

        let response: TmdbSearchResponse = self.make_request(&endpoint).await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(|m| {
                Some(TmdbCandidate {
                    tmdb_id: m.id,
                    title: m.title?,
                    year: m.release_date.and_then(|d| d.get(..4).and_then(|s| s.parse().ok())),
                    kind: "movie".to_string(),
                    popularity: m.popularity.unwrap_or(0.0),
                    poster_path: m.poster_path,
                })
            })
            .collect())
    }

    async fn search_tv(&self, query: &str, year: Option<i32>) -> Result<Vec<TmdbCandidate>, TmdbError> {
        let endpoint = if let Some(y) = year {
            format!("/search/tv?query={}&first_air_date_year={}", urlencoding::encode(query), y)
        } else {
            format!("/search/tv?query={}", urlencoding::encode(query))
        };

        let response: TmdbSearchResponse = self.make_request(&endpoint).await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(|m| {
                Some(TmdbCandidate {
                    tmdb_id: m.id,
                    title: m.name?,
                    year: m.first_air_date.and_then(|d| d.get(..4).and_then(|s| s.parse().ok())),
                    kind: "tv".to_string(),
                    popularity: m.popularity.unwrap_or(0.0),
                    poster_path: m.poster_path,
                })
            })
            .collect())
    }
}

#[async_trait]
impl TmdbFetcher for TmdbClient {
    async fn fetch_movie_details(&self, id: i64) -> Result<Option<MovieDetail>, TmdbError> {
        let cache_key = format!("movie:{}", id);
        if let Some(cached) = self.cache.get(&cache_key).await? {
            return Ok(Some(from_json(&cached)?));
        }

        let endpoint = format!("/movie/{}", id);
        let detail: MovieDetail = match self.make_request(&endpoint).await {
            Ok(d) => d,
            Err(TmdbError::ApiError(404)) => return Ok(None),
            Err(e) => return Err(e),
        };

        self.cache.set(&cache_key, &to_json(&detail)?, NEVER_EXPIRE_TTL).await?;
        Ok(Some(detail))
    }

    async fn fetch_tv_details(&self, id: i64) -> Result<Option<TvDetail>, TmdbError> {
        let cache_key = format!("tv:{}", id);
        if let Some(cached) = self.cache.get(&cache_key).await? {
            return Ok(Some(from_json(&cached)?));
        }

        let endpoint = format!("/tv/{}", id);
        let detail: TvDetail = match self.make_request(&endpoint).await {
            Ok(d) => d,
            Err(TmdbError::ApiError(404)) => return Ok(None),
            Err(e) => return Err(e),
        };

        self.cache.set(&cache_key, &to_json(&detail)?, NEVER_EXPIRE_TTL).await?;
        Ok(Some(detail))
    }

    async fn fetch_season(&self, tv_id: i64, season_number: i32) -> Result<Option<SeasonDetail>, TmdbError> {
        let cache_key = format!("season:{}:{}", tv_id, season_number);
        if let Some(cached) = self.cache.get(&cache_key).await? {
            return Ok(Some(from_json(&cached)?));
        }

        let endpoint = format!("/tv/{}/season/{}", tv_id, season_number);
        let detail: SeasonDetail = match self.make_request(&endpoint).await {
            Ok(d) => d,
            Err(TmdbError::ApiError(404)) => return Ok(None),
            Err(e) => return Err(e),
        };

        self.cache.set(&cache_key, &to_json(&detail)?, NEVER_EXPIRE_TTL).await?;
        Ok(Some(detail))
    }
}

#[async_trait]
impl TmdbCreditsFetcher for TmdbClient {
    async fn fetch_movie_credits(&self, tmdb_id: i64) -> Result<Credits, TmdbError> {
        let endpoint = format!("/movie/{}/credits", tmdb_id);
        let response: Result<TmdbCreditsResponse, _> = self.make_request(&endpoint).await;

        match response {
            Ok(body) => Ok(Credits {
                cast: body
                    .cast
                    .into_iter()
                    .take(15)
                    .map(|c| CastMember {
                        id: c.id,
                        name: c.name,
                        character: c.character.unwrap_or_default(),
                        profile_path: c.profile_path,
                        order: c.order.unwrap_or(999),
                    })
                    .collect(),
                crew: body
                    .crew
                    .into_iter()
                    .filter(|c| matches!(c.job.as_str(), "Director" | "Writer" | "Screenplay"))
                    .take(10)
                    .map(|c| CrewMember {
                        id: c.id,
                        name: c.name,
                        job: c.job,
                        department: c.department,
                        profile_path: c.profile_path,
                    })
                    .collect(),
            }),
            Err(e) => {
                debug!("Failed to fetch movie credits for {}: {}", tmdb_id, e);
                Ok(Credits::default())
            }
        }
    }

    async fn fetch_tv_credits(&self, tmdb_id: i64) -> Result<Credits, TmdbError> {
        // Aggregate credits cover every season's billed cast in one call.
        let endpoint = format!("/tv/{}/aggregate_credits", tmdb_id);
        let response: Result<TmdbTvAggregateCreditsResponse, _> = self.make_request(&endpoint).await;

        match response {
            Ok(body) => Ok(Credits {
                cast: body
                    .cast
                    .into_iter()
                    .take(15)
                    .map(|c| {
                        let character = c.roles.first().map(|r| r.character.clone()).unwrap_or_default();
                        CastMember {
                            id: c.id,
                            name: c.name,
                            character,
                            profile_path: c.profile_path,
                            order: c.order.unwrap_or(999),
                        }
                    })
                    .collect(),
                crew: body
                    .crew
                    .into_iter()
                    .filter(|c| c.jobs.iter().any(|j| matches!(j.job.as_str(), "Director" | "Writer" | "Creator")))
                    .take(10)
                    .map(|c| {
                        let job = c.jobs.first().map(|j| j.job.clone()).unwrap_or_default();
                        CrewMember {
                            id: c.id,
                            name: c.name,
                            job,
                            department: c.department,
                            profile_path: c.profile_path,
                        }
                    })
                    .collect(),
            }),
            Err(e) => {
                debug!("Failed to fetch TV credits for {}: {}", tmdb_id, e);
                Ok(Credits::default())
            }
        }
    }
}

/// Rate limiter for TMDB API requests
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    permits_per_second: usize,
}

impl RateLimiter {
    pub fn new(permits_per_second: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits_per_second)),
            permits_per_second,
        }
    }

    pub async fn acquire(&self) {
        let _permit = self.semaphore.acquire().await;
        tokio::time::sleep(Duration::from_millis(1000) / self.permits_per_second as u32).await;
    }
}

// ============================================================================
// TMDB API Response DTOs
// ============================================================================

#[derive(Debug, serde::Deserialize)]
struct TmdbSearchResponse {
    results: Vec<TmdbSearchResult>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbSearchResult {
    id: i64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
    popularity: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbCreditsResponse {
    cast: Vec<TmdbCastMember>,
    crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbCastMember {
    id: i64,
    name: String,
    character: Option<String>,
    profile_path: Option<String>,
    order: Option<i32>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbCrewMember {
    id: i64,
    name: String,
    job: String,
    department: String,
    profile_path: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbTvAggregateCreditsResponse {
    cast: Vec<TmdbTvAggregateCastMember>,
    crew: Vec<TmdbTvAggregateCrewMember>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbTvAggregateCastMember {
    id: i64,
    name: String,
    profile_path: Option<String>,
    order: Option<i32>,
    roles: Vec<TmdbTvRole>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbTvRole {
    character: String,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbTvAggregateCrewMember {
    id: i64,
    name: String,
    department: String,
    profile_path: Option<String>,
    jobs: Vec<TmdbTvJob>,
}

#[derive(Debug, serde::Deserialize)]
struct TmdbTvJob {
    job: String,
}
