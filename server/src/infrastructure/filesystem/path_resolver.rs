//! Path resolver (C1, §4.1).
//!
//! Resolves a logical `<category-label>/<relative>` path — the primary key
//! stored on Series and embedded in Episode video/thumbnail URLs — to an
//! absolute path that actually exists on disk, tolerating a mismatch between
//! whichever Unicode normalization form the store holds and whichever form
//! the filesystem happens to return for its directory entries.

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::shared::config::AppConfig;
use crate::shared::error::FilesystemError;

/// Resolves logical category-prefixed paths to real filesystem paths.
pub struct PathResolver<'a> {
    config: &'a AppConfig,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// Resolves `logical` (`"<category-label>/<relative>"`) to an absolute,
    /// existing path. Tries, in order: the exact path, its NFC form, its NFD
    /// form, and finally a parent-directory scan comparing NFC(entry) to
    /// NFC(target) component by component.
    pub fn resolve(&self, logical: &str) -> Result<PathBuf, FilesystemError> {
        let (category_label, relative) = logical
            .split_once('/')
            .ok_or_else(|| FilesystemError::InvalidPath(logical.to_string()))?;

        let category = category_label
            .parse()
            .map_err(|_| FilesystemError::InvalidPath(logical.to_string()))?;

        let root = self
            .config
            .root_for(category)
            .ok_or_else(|| FilesystemError::InvalidPath(logical.to_string()))?;

        if is_excluded_path(self.config, Path::new(relative)) {
            return Err(FilesystemError::PathNotFound(logical.to_string()));
        }

        self.resolve_under(root, relative)
    }

    /// Resolves `relative` under an already-known `root`, trying the
    /// exact/NFC/NFD cascade before falling back to a directory scan.
    fn resolve_under(&self, root: &Path, relative: &str) -> Result<PathBuf, FilesystemError> {
        let exact = root.join(relative);
        if exact.exists() {
            return Ok(exact);
        }

        let nfc_path = root.join(nfc(relative));
        if nfc_path.exists() {
            return Ok(nfc_path);
        }

        let nfd_path = root.join(nfd(relative));
        if nfd_path.exists() {
            return Ok(nfd_path);
        }

        self.resolve_by_scan(root, relative)
    }

    /// Walks `relative` component by component, at each level reading the
    /// parent directory and matching by NFC-normalized name when no direct
    /// entry exists. Last resort for a store/filesystem normalization split.
    fn resolve_by_scan(&self, root: &Path, relative: &str) -> Result<PathBuf, FilesystemError> {
        let mut current = root.to_path_buf();

        for component in Path::new(relative).components() {
            let wanted = component.as_os_str().to_string_lossy().to_string();
            let direct = current.join(&wanted);
            if direct.exists() {
                current = direct;
                continue;
            }

            let wanted_nfc = nfc(&wanted);
            let entries = std::fs::read_dir(&current).map_err(FilesystemError::Io)?;
            let mut matched = None;
            for entry in entries {
                let entry = entry.map_err(FilesystemError::Io)?;
                let name = entry.file_name().to_string_lossy().to_string();
                if nfc(&name) == wanted_nfc {
                    matched = Some(entry.path());
                    break;
                }
            }

            current = matched.ok_or_else(|| {
                FilesystemError::PathNotFound(format!("{}/{}", root.display(), relative))
            })?;
        }

        Ok(current)
    }
}

/// Whether any path component equals a fixed excluded name or starts with a
/// dot (§4.1), regardless of Unicode normalization form.
pub fn is_excluded_path(config: &AppConfig, relative: &Path) -> bool {
    relative
        .components()
        .any(|c| config.is_excluded_name(&c.as_os_str().to_string_lossy()))
}

fn nfc(s: &str) -> String {
    s.nfc().collect()
}

fn nfd(s: &str) -> String {
    s.nfd().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Category;
    use tempfile::tempdir;

    fn config_with_root(root: PathBuf) -> AppConfig {
        AppConfig {
            media_root: root.clone(),
            category_roots: vec![crate::shared::config::CategoryRoot {
                category: Category::Movies,
                root,
            }],
            excluded_names: vec!["Adult".to_string()],
            video_extensions: vec!["mkv".to_string()],
            tmdb_api_key: String::new(),
            thumbnail_cache_dir: "/tmp/t".into(),
            subtitle_cache_dir: "/tmp/s".into(),
            hls_cache_dir: "/tmp/h".into(),
            database_url: "sqlite::memory:".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            scan_interval_secs: 0,
        }
    }

    #[test]
    fn resolves_exact_path() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Inception")).unwrap();
        let config = config_with_root(dir.path().to_path_buf());
        let resolver = PathResolver::new(&config);

        let resolved = resolver.resolve("movies/Inception").unwrap();
        assert_eq!(resolved, dir.path().join("Inception"));
    }

    #[test]
    fn resolves_across_normalization_mismatch() {
        let dir = tempdir().unwrap();
        // NFD-decomposed "café" on disk.
        let nfd_name: String = "café".nfd().collect();
        std::fs::create_dir(dir.path().join(&nfd_name)).unwrap();
        let config = config_with_root(dir.path().to_path_buf());
        let resolver = PathResolver::new(&config);

        // Lookup with the NFC-composed form, as the store would hold it.
        let nfc_name: String = "café".nfc().collect();
        let resolved = resolver.resolve(&format!("movies/{nfc_name}")).unwrap();
        assert_eq!(resolved, dir.path().join(&nfd_name));
    }

    #[test]
    fn rejects_excluded_component() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Adult")).unwrap();
        let config = config_with_root(dir.path().to_path_buf());
        let resolver = PathResolver::new(&config);

        assert!(resolver.resolve("movies/Adult").is_err());
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let config = config_with_root(dir.path().to_path_buf());
        let resolver = PathResolver::new(&config);

        assert!(resolver.resolve("movies/Nonexistent").is_err());
    }
}
