//! Projection cache (C8, §4.8).
//!
//! A read-optimized in-memory snapshot of the catalog, rebuilt wholesale
//! from C6 after a scan and after each enrichment batch (I5: a pure function
//! of the store, lagging a write by at most one rebuild cycle). `/home`,
//! `/category_sections`, and `/list` read exclusively from here.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Datelike;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::domain::entities::{Episode, Series};
use crate::domain::repositories::{EpisodeRepository, SeriesRepository};
use crate::domain::value_objects::Category;
use crate::shared::error::RepositoryError;
use crate::shared::text::sort_by_natural_key;

/// One client-visible card: every Series folder sharing a grouping key,
/// collapsed to a single representative plus the member paths it came from.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedSeries {
    pub key: String,
    #[serde(flatten)]
    pub series: Series,
    pub member_paths: Vec<String>,
    /// Populated on demand by the series-detail read path; empty here.
    #[serde(skip)]
    pub episodes: Vec<Episode>,
}

/// A named list of cards, as returned by `/home` and `/category_sections`.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<GroupedSeries>,
}

#[derive(Hash, Eq, PartialEq, Clone)]
struct SectionCacheKey {
    category: Category,
    keyword: Option<String>,
}

/// In-memory snapshot, rebuilt from the store on a `rebuild()` call.
pub struct ProjectionCache {
    by_category: RwLock<HashMap<Category, Vec<GroupedSeries>>>,
    section_cache: RwLock<HashMap<SectionCacheKey, Vec<Section>>>,
    home_cache: RwLock<Option<Vec<Section>>>,
    seed: u64,
}

impl ProjectionCache {
    /// `seed` drives every random sample in this instance; pass a fixed seed
    /// in tests for deterministic section output (§8 P5).
    pub fn new(seed: u64) -> Self {
        Self {
            by_category: RwLock::new(HashMap::new()),
            section_cache: RwLock::new(HashMap::new()),
            home_cache: RwLock::new(None),
            seed,
        }
    }

    /// Rebuilds the whole snapshot from the store. Called after a scan
    /// completes and after every enrichment batch (§4.6 step 6).
    pub async fn rebuild(
        &self,
        series_repo: &dyn SeriesRepository,
        _episode_repo: &dyn EpisodeRepository,
    ) -> Result<(), RepositoryError> {
        let mut by_category = HashMap::new();

        for category in Category::ALL {
            let all = series_repo.find_by_category(category).await?;
            by_category.insert(category, group(all));
        }

        *self.by_category.write().unwrap() = by_category;
        self.section_cache.write().unwrap().clear();
        *self.home_cache.write().unwrap() = None;
        Ok(())
    }

    pub fn category_items(&self, category: Category) -> Vec<GroupedSeries> {
        self.by_category
            .read()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    /// `/list`: items in `category`, optionally filtered by a path-substring
    /// keyword, paginated.
    pub fn list(
        &self,
        category: Category,
        keyword: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Vec<GroupedSeries> {
        let items = self.filtered(category, keyword);
        items.into_iter().skip(offset).take(limit).collect()
    }

    /// `/category_sections`: up to four named lists, cached by
    /// `(category, keyword)` and invalidated on rebuild.
    pub fn sections(&self, category: Category, keyword: Option<&str>) -> Vec<Section> {
        let cache_key = SectionCacheKey {
            category,
            keyword: keyword.map(|k| k.to_string()),
        };

        if let Some(hit) = self.section_cache.read().unwrap().get(&cache_key) {
            return hit.clone();
        }

        let items = self.filtered(category, keyword);
        let sections = self.build_sections(&items, &cache_key);
        self.section_cache
            .write()
            .unwrap()
            .insert(cache_key, sections.clone());
        sections
    }

    /// `/home`: union of movies+domestic-tv deduped, then airing items not
    /// already sampled.
    pub fn home(&self) -> Vec<Section> {
        if let Some(hit) = self.home_cache.read().unwrap().clone() {
            return hit;
        }

        let mut union = self.category_items(Category::Movies);
        union.extend(self.category_items(Category::DomesticTv));
        dedup_by_key(&mut union);

        let mut rng = self.rng_for("home::hottest");
        let hottest = sample(&union, 100, &mut rng);
        let seen: std::collections::HashSet<&str> =
            hottest.iter().map(|g| g.key.as_str()).collect();

        let airing: Vec<GroupedSeries> = self
            .category_items(Category::Airing)
            .into_iter()
            .filter(|g| !seen.contains(g.key.as_str()))
            .collect();
        let mut rng = self.rng_for("home::airing");
        let live_airing = sample(&airing, 100, &mut rng);

        let sections = vec![
            Section {
                title: "Hottest right now".to_string(),
                items: hottest,
            },
            Section {
                title: "Live airing".to_string(),
                items: live_airing,
            },
        ];

        *self.home_cache.write().unwrap() = Some(sections.clone());
        sections
    }

    fn filtered(&self, category: Category, keyword: Option<&str>) -> Vec<GroupedSeries> {
        let items = self.category_items(category);
        match keyword {
            Some(kw) if !kw.is_empty() => items
                .into_iter()
                .filter(|g| g.series.path.to_lowercase().contains(&kw.to_lowercase()))
                .collect(),
            _ => items,
        }
    }

    fn build_sections(&self, items: &[GroupedSeries], cache_key: &SectionCacheKey) -> Vec<Section> {
        let mut sections = Vec::new();

        let mut rng = self.rng_for(&format!(
            "today::{:?}::{:?}",
            cache_key.category, cache_key.keyword
        ));
        sections.push(Section {
            title: "Today's picks".to_string(),
            items: sample(items, 40, &mut rng),
        });

        let current_year = chrono::Utc::now().year();
        let recent: Vec<GroupedSeries> = items
            .iter()
            .filter(|g| g.series.year.map(|y| y >= current_year - 1).unwrap_or(false))
            .take(100)
            .cloned()
            .collect();
        sections.push(Section {
            title: "Recently released".to_string(),
            items: recent,
        });

        for genre in top_genres(items, 3) {
            let genre_items: Vec<GroupedSeries> = items
                .iter()
                .filter(|g| g.series.genre_names.iter().any(|g2| g2 == &genre))
                .cloned()
                .collect();
            if genre_items.len() >= 5 {
                let mut rng = self.rng_for(&format!(
                    "genre::{:?}::{:?}::{genre}",
                    cache_key.category, cache_key.keyword
                ));
                sections.push(Section {
                    title: genre.clone(),
                    items: sample(&genre_items, 60, &mut rng),
                });
            }
        }

        let mut entire = items.to_vec();
        sort_by_natural_key(&mut entire, |g| {
            g.series.cleaned_name.clone().unwrap_or_else(|| g.series.name.clone())
        });
        entire.truncate(800);
        sections.push(Section {
            title: "Entire list".to_string(),
            items: entire,
        });

        sections
    }

    fn rng_for(&self, label: &str) -> StdRng {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.seed.hash(&mut hasher);
        label.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }
}

/// Collapses a flat list of Series into grouped cards, by `grouping_key()`.
/// The representative is the first resolved member, falling back to the
/// first member seen if none are resolved yet.
fn group(all: Vec<Series>) -> Vec<GroupedSeries> {
    let mut groups: HashMap<String, GroupedSeries> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for series in all {
        let key = series.grouping_key();
        match groups.get_mut(&key) {
            Some(existing) => {
                existing.member_paths.push(series.path.clone());
                if existing.series.tmdb_id.is_none() && series.tmdb_id.is_some() {
                    let member_paths = std::mem::take(&mut existing.member_paths);
                    *existing = GroupedSeries {
                        key: key.clone(),
                        series,
                        member_paths,
                        episodes: Vec::new(),
                    };
                }
            }
            None => {
                order.push(key.clone());
                groups.insert(
                    key.clone(),
                    GroupedSeries {
                        key,
                        member_paths: vec![series.path.clone()],
                        series,
                        episodes: Vec::new(),
                    },
                );
            }
        }
    }

    order.into_iter().filter_map(|key| groups.remove(&key)).collect()
}

fn dedup_by_key(items: &mut Vec<GroupedSeries>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|g| seen.insert(g.key.clone()));
}

fn sample(items: &[GroupedSeries], n: usize, rng: &mut StdRng) -> Vec<GroupedSeries> {
    let mut pool: Vec<GroupedSeries> = items.to_vec();
    pool.shuffle(rng);
    pool.truncate(n);
    pool
}

/// The three most populous `genreNames` across `items`, most-populous first.
fn top_genres(items: &[GroupedSeries], n: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        for genre in &item.series.genre_names {
            *counts.entry(genre.clone()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(n).map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(path: &str, tmdb_id: Option<&str>, cleaned: &str, year: Option<i32>) -> Series {
        let mut s = Series::new(path.to_string(), Category::Movies, path.to_string()).unwrap();
        s.set_cleaned(cleaned.to_string(), year);
        if let Some(id) = tmdb_id {
            s.apply_resolution(id.to_string());
        }
        s
    }

    #[test]
    fn group_collapses_same_tmdb_id() {
        let all = vec![
            series("movies/A", Some("movie:1"), "Inception", Some(2010)),
            series("movies/B", Some("movie:1"), "Inception", Some(2010)),
        ];
        let grouped = group(all);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].member_paths.len(), 2);
    }

    #[test]
    fn group_collapses_same_name_and_year_when_unresolved() {
        let all = vec![
            series("movies/A", None, "Inception", Some(2010)),
            series("movies/B", None, "Inception", Some(2010)),
        ];
        let grouped = group(all);
        assert_eq!(grouped.len(), 1);
    }

    #[test]
    fn same_seed_produces_same_sample() {
        let items: Vec<GroupedSeries> = (0..20)
            .map(|i| GroupedSeries {
                key: format!("k{i}"),
                series: series(&format!("movies/{i}"), None, &format!("Title {i}"), Some(2020)),
                member_paths: vec![],
                episodes: vec![],
            })
            .collect();

        let cache = ProjectionCache::new(42);
        let mut rng_a = cache.rng_for("label");
        let mut rng_b = cache.rng_for("label");
        let sample_a = sample(&items, 5, &mut rng_a);
        let sample_b = sample(&items, 5, &mut rng_b);
        let keys_a: Vec<&str> = sample_a.iter().map(|g| g.key.as_str()).collect();
        let keys_b: Vec<&str> = sample_b.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys_a, keys_b);
    }
}
