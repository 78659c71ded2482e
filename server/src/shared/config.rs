//! Application configuration surface (§6).
//!
//! Everything here is read once at startup from the environment. There is no
//! config file format: this mirrors the donor's `main.rs`, which also reads
//! its settings straight from `std::env::var` rather than through a
//! deserialized file.

use std::path::PathBuf;

use crate::domain::value_objects::Category;

/// One category's library root on disk, paired with its path-prefix label.
#[derive(Debug, Clone)]
pub struct CategoryRoot {
    pub category: Category,
    pub root: PathBuf,
}

/// Process-wide configuration, assembled once in `main` and handed around as
/// `Arc<AppConfig>`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root video directory; each category root is resolved under this
    /// unless `*_DIR` overrides it individually.
    pub media_root: PathBuf,
    /// The five category subdirectories, in `Category::ALL` order.
    pub category_roots: Vec<CategoryRoot>,
    /// Basenames that prune a directory from the crawl regardless of case
    /// (§4.1): the two Korean/English adult-content folder names and the
    /// vendor metadata folders the donor NAS software drops into a share.
    pub excluded_names: Vec<String>,
    /// Lowercased container extensions admitted by the crawler (§4.5).
    pub video_extensions: Vec<String>,
    /// External metadata database API key; empty disables real lookups and
    /// callers fall back to cache-only behavior.
    pub tmdb_api_key: String,
    /// Directory for generated JPEG thumbnails (§6 persisted state layout).
    pub thumbnail_cache_dir: PathBuf,
    /// Directory for subtitle caches, keyed by MD5 of the episode's relative
    /// path plus a language suffix.
    pub subtitle_cache_dir: PathBuf,
    /// Directory for transcoded HLS segments; wiped on each process start.
    pub hls_cache_dir: PathBuf,
    /// SQLite connection string.
    pub database_url: String,
    /// HTTP listen address, e.g. `0.0.0.0:3000`.
    pub listen_addr: String,
    /// Interval between automatic background rescans, if any (0 disables).
    pub scan_interval_secs: u64,
}

impl AppConfig {
    /// Reads configuration from the environment, applying the same
    /// defaults the donor's `main()` used for the fields it shared.
    pub fn from_env() -> Self {
        let media_root: PathBuf = std::env::var("MEDIA_DIR")
            .unwrap_or_else(|_| "/storage/media".to_string())
            .into();

        let category_roots = vec![
            CategoryRoot {
                category: Category::Movies,
                root: category_dir(&media_root, "MOVIES_DIR", "movies"),
            },
            CategoryRoot {
                category: Category::ForeignTv,
                root: category_dir(&media_root, "FOREIGN_TV_DIR", "foreign-tv"),
            },
            CategoryRoot {
                category: Category::DomesticTv,
                root: category_dir(&media_root, "DOMESTIC_TV_DIR", "domestic-tv"),
            },
            CategoryRoot {
                category: Category::Animation,
                root: category_dir(&media_root, "ANIMATION_DIR", "animation"),
            },
            CategoryRoot {
                category: Category::Airing,
                root: category_dir(&media_root, "AIRING_DIR", "airing"),
            },
        ];

        let excluded_names = std::env::var("EXCLUDED_NAMES")
            .ok()
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| {
                vec![
                    "성인".to_string(),
                    "19금".to_string(),
                    "Adult".to_string(),
                    "@eaDir".to_string(),
                    "#recycle".to_string(),
                ]
            });

        let video_extensions = std::env::var("VIDEO_EXTENSIONS")
            .ok()
            .map(|raw| raw.split(',').map(|s| s.trim().to_lowercase()).collect())
            .unwrap_or_else(|| {
                [
                    "mp4", "mkv", "avi", "ts", "mov", "m4v", "wmv", "flv", "webm", "m2ts",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect()
            });

        let cache_root: PathBuf = std::env::var("CACHE_DIR")
            .unwrap_or_else(|_| "cache".to_string())
            .into();

        Self {
            media_root,
            category_roots,
            excluded_names,
            video_extensions,
            tmdb_api_key: std::env::var("TMDB_API_KEY").unwrap_or_default(),
            thumbnail_cache_dir: cache_root.join("thumbnails"),
            subtitle_cache_dir: cache_root.join("subtitles"),
            hls_cache_dir: cache_root.join("hls"),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data.db?mode=rwc".to_string()),
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            scan_interval_secs: std::env::var("SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        }
    }

    /// Whether `name` (a single path component) is excluded from the crawl
    /// (§4.1): a fixed excluded name, or anything starting with a dot.
    pub fn is_excluded_name(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded_names.iter().any(|n| n == name)
    }

    /// Whether `extension` (lowercased, no leading dot) is an admitted
    /// container extension (§4.5).
    pub fn is_video_extension(&self, extension: &str) -> bool {
        self.video_extensions.iter().any(|e| e == extension)
    }

    pub fn root_for(&self, category: Category) -> Option<&PathBuf> {
        self.category_roots
            .iter()
            .find(|c| c.category == category)
            .map(|c| &c.root)
    }
}

fn category_dir(media_root: &PathBuf, env_var: &str, subdir: &str) -> PathBuf {
    std::env::var(env_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| media_root.join(subdir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_dotfiles_and_fixed_names() {
        let config = AppConfig {
            media_root: "/media".into(),
            category_roots: vec![],
            excluded_names: vec!["성인".to_string(), "Adult".to_string()],
            video_extensions: vec!["mkv".to_string()],
            tmdb_api_key: String::new(),
            thumbnail_cache_dir: "/tmp/t".into(),
            subtitle_cache_dir: "/tmp/s".into(),
            hls_cache_dir: "/tmp/h".into(),
            database_url: "sqlite::memory:".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            scan_interval_secs: 0,
        };

        assert!(config.is_excluded_name(".hidden"));
        assert!(config.is_excluded_name("Adult"));
        assert!(config.is_excluded_name("성인"));
        assert!(!config.is_excluded_name("Movies"));
    }

    #[test]
    fn recognizes_configured_video_extensions_case_insensitively() {
        let config = AppConfig {
            media_root: "/media".into(),
            category_roots: vec![],
            excluded_names: vec![],
            video_extensions: vec!["mkv".to_string(), "mp4".to_string()],
            tmdb_api_key: String::new(),
            thumbnail_cache_dir: "/tmp/t".into(),
            subtitle_cache_dir: "/tmp/s".into(),
            hls_cache_dir: "/tmp/h".into(),
            database_url: "sqlite::memory:".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            scan_interval_secs: 0,
        };

        assert!(config.is_video_extension("mkv"));
        assert!(!config.is_video_extension("txt"));
    }
}
