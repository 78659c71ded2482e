//! Episode entity
//!
//! One video file on disk, always belonging to exactly one Series (I1).

use serde::{Deserialize, Serialize};

/// Episode entity — one file on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    /// Stable hash of the real absolute path (I4: stable across ancestor renames).
    pub id: String,
    /// Foreign key to `Series.path`.
    pub series_path: String,
    /// Original base filename.
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
}

impl Episode {
    pub fn new(id: String, series_path: String, title: String, video_url: String) -> Self {
        Self {
            id,
            series_path,
            title,
            video_url,
            thumbnail_url: None,
            season_number: None,
            episode_number: None,
            overview: None,
            air_date: None,
        }
    }

    pub fn with_thumbnail_url(mut self, thumbnail_url: Option<String>) -> Self {
        self.thumbnail_url = thumbnail_url;
        self
    }

    pub fn with_episode_numbers(mut self, season_number: i32, episode_number: Option<i32>) -> Self {
        self.season_number = Some(season_number);
        self.episode_number = episode_number;
        self
    }

    /// Rewrites the owning Series when an ancestor folder is re-categorized.
    pub fn rebind_series(&mut self, series_path: String) {
        self.series_path = series_path;
    }

    /// Backfills per-episode metadata from the external resolver (C7 step 5).
    pub fn apply_backfill(
        &mut self,
        season_number: i32,
        episode_number: Option<i32>,
        overview: Option<String>,
        air_date: Option<String>,
        still_thumbnail_url: Option<String>,
    ) {
        self.season_number = Some(season_number);
        self.episode_number = episode_number;
        if overview.is_some() {
            self.overview = overview;
        }
        if air_date.is_some() {
            self.air_date = air_date;
        }
        if let Some(url) = still_thumbnail_url {
            self.thumbnail_url = Some(url);
        }
    }

    pub fn season_episode_display(&self) -> Option<String> {
        let season = self.season_number?;
        match self.episode_number {
            Some(episode) => Some(format!("S{season:02}E{episode:02}")),
            None => Some(format!("S{season:02}")),
        }
    }
}
