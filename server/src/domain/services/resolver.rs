//! External resolver (C4, §4.4).
//!
//! Turns a raw filename into either a [`ResolvedMetadata`] record or a typed
//! failure, by trying a fixed pipeline of search strategies (S0-S6) against
//! [`TmdbService`] until one strategy yields an accepted candidate. Pure
//! business logic: this module only talks to the `TmdbService` trait, never
//! to a concrete HTTP client or the database — callers (C7's enrichment
//! worker) own writing the result to C3 and to the progress monitor's
//! diagnostics log.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::entities::{EpisodeMetadata, ResolveOutcome, ResolvedMetadata};
use crate::domain::value_objects::{ActorCredit, Category, TmdbKind, TmdbRef};
use crate::interfaces::external_services::{TmdbCandidate, TmdbService};
use crate::shared::error::TmdbError;
use crate::shared::text::{FuzzyMatcher, TitleNormalizer};

/// Tunables for the acceptance threshold and scoring caps (§4.4).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// A candidate's weighted score must exceed this to be accepted.
    pub acceptance_threshold: f64,
    /// Ceiling applied to the popularity term before it is added in.
    pub popularity_cap: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 50.0,
            popularity_cap: 10.0,
        }
    }
}

/// A search hit paired with its weighted acceptance score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: TmdbCandidate,
    pub score: f64,
}

/// Diagnostic record for a definitive miss (§4.4 "process-wide bounded
/// mapping"); the caller appends this to C9's event log.
#[derive(Debug, Clone)]
pub struct ResolverDiagnostics {
    pub raw_name: String,
    pub cleaned_title: String,
    pub year: Option<i32>,
    pub top_candidates: Vec<ScoredCandidate>,
}

/// Outcome of a single [`ResolverService::resolve`] call.
#[derive(Debug, Clone)]
pub struct ResolveResult {
    pub outcome: ResolveOutcome,
    /// Populated only on a non-forbidden miss.
    pub diagnostics: Option<ResolverDiagnostics>,
}

static RE_BRACKET_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[(]([^\[\]()]+)[\])]").unwrap());
static RE_HANGUL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Hangul}\s]+").unwrap());
static RE_HAN_KANA_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\s]+").unwrap());

/// The stateless C4 resolver, generic over any `TmdbService` implementation
/// so tests can substitute a fixture-backed fake (§8 P6).
pub struct ResolverService<T: TmdbService + ?Sized> {
    tmdb: Arc<T>,
    config: ResolverConfig,
}

impl<T: TmdbService + ?Sized> ResolverService<T> {
    pub fn new(tmdb: Arc<T>) -> Self {
        Self {
            tmdb,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(tmdb: Arc<T>, config: ResolverConfig) -> Self {
        Self { tmdb, config }
    }

    /// Resolves `raw_name` within `category`, trying strategies S0-S6 in
    /// order and stopping at the first that yields an accepted candidate.
    pub async fn resolve(&self, raw_name: &str) -> ResolveResult {
        self.resolve_for_category(raw_name, Category::Movies).await
    }

    /// Same as [`Self::resolve`] but with an explicit category, which biases
    /// scoring toward movie- or TV-shaped results (§4.4 kind bonus).
    pub async fn resolve_for_category(&self, raw_name: &str, category: Category) -> ResolveResult {
        let cleaned = media_identifier::clean(raw_name);

        if cleaned.title.is_empty() {
            return ResolveResult {
                outcome: ResolveOutcome::forbidden(),
                diagnostics: None,
            };
        }

        if let Some(hint_id) = cleaned.tmdb_hint {
            if let Some((kind, id)) = self.try_tmdb_hint(hint_id).await {
                return self.finalize(kind, id).await;
            }
        }

        let mut best_seen: Vec<ScoredCandidate> = Vec::new();

        macro_rules! try_strategy {
            ($candidates:expr) => {
                match $candidates {
                    Ok(candidates) if !candidates.is_empty() => {
                        let mut scored = self.rank(&candidates, &cleaned, category);
                        if let Some(winner) = scored.first() {
                            if winner.score > self.config.acceptance_threshold {
                                let (kind, id) = candidate_ref(&winner.candidate);
                                return self.finalize(kind, id).await;
                            }
                        }
                        best_seen.append(&mut scored);
                    }
                    Ok(_) => {}
                    Err(_) => {}
                }
            };
        }

        // S1: multi-search, primary language, with year.
        try_strategy!(self.multi_search(&cleaned.title, cleaned.year).await);

        // S2: multi-search without year.
        try_strategy!(self.multi_search(&cleaned.title, None).await);

        // S3: alternative titles from the raw string's bracketed subexpressions.
        for alt in bracketed_alternatives(raw_name) {
            try_strategy!(self.multi_search(&alt, cleaned.year).await);
        }

        // S4: Hangul-only substring of the cleaned title.
        if let Some(hangul) = longest_run(&RE_HANGUL_RUN, &cleaned.title) {
            try_strategy!(self.multi_search(&hangul, None).await);
        }

        // S5: Han/Kana substrings, no language constraint.
        if let Some(han_kana) = longest_run(&RE_HAN_KANA_RUN, &cleaned.title) {
            try_strategy!(self.multi_search(&han_kana, None).await);
        }

        // S6: split on separators and search each segment.
        for segment in split_segments(&cleaned.title) {
            try_strategy!(self.multi_search(&segment, None).await);
        }

        best_seen.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        best_seen.truncate(3);

        ResolveResult {
            outcome: ResolveOutcome::miss(),
            diagnostics: Some(ResolverDiagnostics {
                raw_name: raw_name.to_string(),
                cleaned_title: cleaned.title,
                year: cleaned.year,
                top_candidates: best_seen,
            }),
        }
    }

    async fn try_tmdb_hint(&self, id: i64) -> Option<(TmdbKind, i64)> {
        if let Ok(Some(_)) = self.tmdb.fetch_movie_details(id).await {
            return Some((TmdbKind::Movie, id));
        }
        if let Ok(Some(_)) = self.tmdb.fetch_tv_details(id).await {
            return Some((TmdbKind::Tv, id));
        }
        None
    }

    async fn multi_search(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> Result<Vec<TmdbCandidate>, TmdbError> {
        let (movies, tv) = tokio::try_join!(
            self.tmdb.search_movie(query, year),
            self.tmdb.search_tv(query, year)
        )?;
        Ok(movies.into_iter().chain(tv.into_iter()).collect())
    }

    /// Scores every candidate against the cleaned title per §4.4's weighted
    /// formula and sorts best-first.
    fn rank(
        &self,
        candidates: &[TmdbCandidate],
        cleaned: &media_identifier::CleanedTitle,
        category: Category,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                candidate: candidate.clone(),
                score: self.score(candidate, cleaned, category),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    fn score(
        &self,
        candidate: &TmdbCandidate,
        cleaned: &media_identifier::CleanedTitle,
        category: Category,
    ) -> f64 {
        let title_score = title_similarity_tier(&cleaned.title, &candidate.title) * 60.0;
        let year_score = year_agreement(cleaned.year, candidate.year);
        let popularity_score = (candidate.popularity as f64 / 10.0).min(self.config.popularity_cap);
        let poster_score = if candidate.poster_path.is_some() { 5.0 } else { 0.0 };
        let kind_score = if matches_preferred_kind(category, &candidate.kind) {
            40.0
        } else {
            0.0
        };

        title_score + year_score + popularity_score + poster_score + kind_score
    }

    async fn finalize(&self, kind: TmdbKind, id: i64) -> ResolveResult {
        let metadata = match kind {
            TmdbKind::Movie => self.build_movie_metadata(id).await,
            TmdbKind::Tv => self.build_tv_metadata(id).await,
        };

        match metadata {
            Ok(metadata) => ResolveResult {
                outcome: ResolveOutcome::Resolved(metadata),
                diagnostics: None,
            },
            Err(_) => ResolveResult {
                outcome: ResolveOutcome::miss(),
                diagnostics: None,
            },
        }
    }

    async fn build_movie_metadata(&self, id: i64) -> Result<ResolvedMetadata, TmdbError> {
        let detail = self
            .tmdb
            .fetch_movie_details(id)
            .await?
            .ok_or_else(|| TmdbError::NotFound(id.to_string()))?;
        let credits = self.tmdb.fetch_movie_credits(id).await?;

        Ok(ResolvedMetadata {
            tmdb_id: TmdbRef::movie(id).to_string(),
            poster_path: detail.poster_path,
            year: parse_year(&detail.release_date),
            overview: Some(detail.overview),
            rating: Some(detail.vote_average),
            season_count: None,
            genre_ids: detail.genres.iter().map(|g| g.id as i64).collect(),
            genre_names: detail.genres.into_iter().map(|g| g.name).collect(),
            director: credits
                .crew
                .iter()
                .find(|c| c.job == "Director")
                .map(|c| c.name.clone()),
            actors: credits
                .cast
                .into_iter()
                .take(10)
                .map(|c| {
                    ActorCredit::new(c.name)
                        .with_profile(c.profile_path)
                        .with_role(Some(c.character))
                })
                .collect(),
            episodes: Default::default(),
        })
    }

    async fn build_tv_metadata(&self, id: i64) -> Result<ResolvedMetadata, TmdbError> {
        let detail = self
            .tmdb
            .fetch_tv_details(id)
            .await?
            .ok_or_else(|| TmdbError::NotFound(id.to_string()))?;
        let credits = self.tmdb.fetch_tv_credits(id).await?;

        let mut episodes = std::collections::HashMap::new();
        for season_number in 1..=detail.number_of_seasons {
            if let Ok(Some(season)) = self.tmdb.fetch_season(id, season_number).await {
                for ep in season.episodes {
                    episodes.insert(
                        ResolvedMetadata::episode_key(ep.season_number, ep.episode_number),
                        EpisodeMetadata {
                            overview: if ep.overview.is_empty() {
                                None
                            } else {
                                Some(ep.overview)
                            },
                            air_date: ep.air_date,
                            still_path: ep.still_path,
                        },
                    );
                }
            }
        }

        Ok(ResolvedMetadata {
            tmdb_id: TmdbRef::tv(id).to_string(),
            poster_path: detail.poster_path,
            year: parse_year(&detail.first_air_date),
            overview: Some(detail.overview),
            rating: Some(detail.vote_average),
            season_count: Some(detail.number_of_seasons),
            genre_ids: detail.genres.iter().map(|g| g.id as i64).collect(),
            genre_names: detail.genres.into_iter().map(|g| g.name).collect(),
            director: credits
                .crew
                .iter()
                .find(|c| c.job == "Director" || c.job == "Series Director")
                .map(|c| c.name.clone()),
            actors: credits
                .cast
                .into_iter()
                .take(10)
                .map(|c| {
                    ActorCredit::new(c.name)
                        .with_profile(c.profile_path)
                        .with_role(Some(c.character))
                })
                .collect(),
            episodes,
        })
    }
}

fn candidate_ref(candidate: &TmdbCandidate) -> (TmdbKind, i64) {
    let kind = if candidate.kind == "tv" {
        TmdbKind::Tv
    } else {
        TmdbKind::Movie
    };
    (kind, candidate.tmdb_id)
}

/// §4.4's three-tier title-similarity weight: exact, substring, or neither.
fn title_similarity_tier(cleaned_title: &str, candidate_title: &str) -> f64 {
    let norm_a = TitleNormalizer::normalize_for_comparison(cleaned_title);
    let norm_b = TitleNormalizer::normalize_for_comparison(candidate_title);

    if norm_a == norm_b {
        1.0
    } else if norm_a.contains(&norm_b) || norm_b.contains(&norm_a) {
        35.0 / 60.0
    } else {
        let fuzzy = FuzzyMatcher::combined_similarity(&norm_a, &norm_b);
        // Cap "neither" below the substring tier regardless of how close the
        // fuzzy score runs, so a near-miss never outscores an actual substring.
        (10.0 / 60.0).max(fuzzy.min(10.0 / 60.0))
    }
}

fn year_agreement(cleaned_year: Option<i32>, candidate_year: Option<i32>) -> f64 {
    match (cleaned_year, candidate_year) {
        (Some(a), Some(b)) if a == b => 30.0,
        (Some(a), Some(b)) if (a - b).abs() == 1 => 15.0,
        (None, _) | (_, None) => 10.0,
        _ => 0.0,
    }
}

fn matches_preferred_kind(category: Category, kind: &str) -> bool {
    if category.prefers_tv() {
        kind == "tv"
    } else {
        kind == "movie"
    }
}

fn parse_year(date: &str) -> Option<i32> {
    date.get(0..4).and_then(|y| y.parse().ok())
}

/// Extracts bracketed subexpressions from the raw name (S3): typically the
/// original-language title a release-scene name carries alongside the
/// romanized one.
fn bracketed_alternatives(raw_name: &str) -> Vec<String> {
    RE_BRACKET_CONTENT
        .captures_iter(raw_name)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|s| s.chars().count() >= 2)
        .collect()
}

/// Longest run matched by `pattern`, trimmed, or `None` if nothing qualifies.
fn longest_run(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| s.chars().count() >= 2)
        .max_by_key(|s| s.chars().count())
}

/// S6: split the cleaned title on the separators the original titles often
/// carry between a main title and a subtitle/alternate title.
fn split_segments(cleaned_title: &str) -> Vec<String> {
    cleaned_title
        .split(['-', ':', '～'])
        .map(|s| s.trim().to_string())
        .filter(|s| s.chars().count() >= 2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::interfaces::external_services::{
        Credits, EpisodeDetail, Genre, MovieDetail, SeasonDetail, TvDetail,
    };

    #[derive(Default)]
    struct FakeTmdb {
        movie_results: Mutex<Vec<TmdbCandidate>>,
        tv_results: Mutex<Vec<TmdbCandidate>>,
    }

    #[async_trait]
    impl crate::interfaces::external_services::TmdbSearcher for FakeTmdb {
        async fn search_movie(
            &self,
            _query: &str,
            _year: Option<i32>,
        ) -> Result<Vec<TmdbCandidate>, TmdbError> {
            Ok(self.movie_results.lock().unwrap().clone())
        }

        async fn search_tv(
            &self,
            _query: &str,
            _year: Option<i32>,
        ) -> Result<Vec<TmdbCandidate>, TmdbError> {
            Ok(self.tv_results.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl crate::interfaces::external_services::TmdbFetcher for FakeTmdb {
        async fn fetch_movie_details(&self, id: i64) -> Result<Option<MovieDetail>, TmdbError> {
            Ok(Some(MovieDetail {
                id,
                title: "Taxi Driver".to_string(),
                overview: "A movie.".to_string(),
                release_date: "1976-02-08".to_string(),
                poster_path: Some("/poster.jpg".to_string()),
                backdrop_path: None,
                genres: vec![Genre {
                    id: 18,
                    name: "Drama".to_string(),
                }],
                vote_average: 8.2,
                popularity: 50.0,
            }))
        }

        async fn fetch_tv_details(&self, id: i64) -> Result<Option<TvDetail>, TmdbError> {
            Ok(Some(TvDetail {
                id,
                name: "Taxi Driver".to_string(),
                overview: "A series.".to_string(),
                first_air_date: "2021-04-12".to_string(),
                poster_path: Some("/poster.jpg".to_string()),
                backdrop_path: None,
                genres: vec![],
                number_of_seasons: 0,
                vote_average: 7.5,
                popularity: 120.0,
            }))
        }

        async fn fetch_season(
            &self,
            _tv_id: i64,
            _season_number: i32,
        ) -> Result<Option<SeasonDetail>, TmdbError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl crate::interfaces::external_services::TmdbCreditsFetcher for FakeTmdb {
        async fn fetch_movie_credits(&self, _tmdb_id: i64) -> Result<Credits, TmdbError> {
            Ok(Credits::default())
        }

        async fn fetch_tv_credits(&self, _tmdb_id: i64) -> Result<Credits, TmdbError> {
            Ok(Credits::default())
        }
    }

    fn candidate(id: i64, title: &str, year: i32, kind: &str, popularity: f32) -> TmdbCandidate {
        TmdbCandidate {
            tmdb_id: id,
            title: title.to_string(),
            year: Some(year),
            kind: kind.to_string(),
            popularity,
            poster_path: Some("/p.jpg".to_string()),
        }
    }

    /// §8 scenario 5: same three candidates, opposite category verdicts.
    #[tokio::test]
    async fn ranks_movie_winner_for_movies_category() {
        let fake = FakeTmdb {
            movie_results: Mutex::new(vec![candidate(1, "Taxi Driver", 1976, "movie", 50.0)]),
            tv_results: Mutex::new(vec![
                candidate(2, "Taxi Driver", 2021, "tv", 120.0),
                candidate(3, "Taxi Driver", 2017, "tv", 30.0),
            ]),
        };
        let resolver = ResolverService::new(Arc::new(fake));
        let result = resolver
            .resolve_for_category("Taxi Driver (1976).mkv", Category::Movies)
            .await;
        assert!(matches!(result.outcome, ResolveOutcome::Resolved(_)));
        if let ResolveOutcome::Resolved(meta) = result.outcome {
            assert_eq!(meta.tmdb_id, "movie:1");
        }
    }

    #[tokio::test]
    async fn ranks_tv_winner_for_tv_category() {
        let fake = FakeTmdb {
            movie_results: Mutex::new(vec![candidate(1, "Taxi Driver", 1976, "movie", 50.0)]),
            tv_results: Mutex::new(vec![
                candidate(2, "Taxi Driver", 2021, "tv", 120.0),
                candidate(3, "Taxi Driver", 2017, "tv", 30.0),
            ]),
        };
        let resolver = ResolverService::new(Arc::new(fake));
        let result = resolver
            .resolve_for_category("Taxi Driver.mkv", Category::DomesticTv)
            .await;
        assert!(matches!(result.outcome, ResolveOutcome::Resolved(_)));
        if let ResolveOutcome::Resolved(meta) = result.outcome {
            assert_eq!(meta.tmdb_id, "tv:2");
        }
    }

    #[tokio::test]
    async fn forbidden_input_short_circuits_without_any_search() {
        let fake = FakeTmdb::default();
        let resolver = ResolverService::new(Arc::new(fake));
        let result = resolver
            .resolve_for_category("Inception Behind the Scenes.mkv", Category::Movies)
            .await;
        assert_eq!(result.outcome, ResolveOutcome::forbidden());
    }

    #[test]
    fn exact_title_outranks_substring_which_outranks_neither() {
        assert!(title_similarity_tier("Matrix", "Matrix") > title_similarity_tier("Matrix", "The Matrix Reloaded"));
        assert!(title_similarity_tier("Matrix", "The Matrix Reloaded") > title_similarity_tier("Matrix", "Unrelated Show"));
    }

    #[test]
    fn year_bonus_tiers_descend_with_distance() {
        assert!(year_agreement(Some(1999), Some(1999)) > year_agreement(Some(1999), Some(2000)));
        assert!(year_agreement(Some(1999), Some(2000)) > year_agreement(Some(1999), Some(2010)));
    }
}
