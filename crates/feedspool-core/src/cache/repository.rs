//! Cache file storage.

use super::model::CacheRecord;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Loads and persists the per-feed cache file.
///
/// The on-disk format is a single pretty-printed JSON object keyed by
/// feed url, versionless by design: an absent or garbled file is simply
/// an empty cache (the next run refetches more than necessary, which is
/// safe), while persisting is atomic so no crash can leave a truncated
/// or mixed-version file behind.
#[derive(Debug)]
pub struct CacheRepository {
    path: PathBuf,
}

impl CacheRepository {
    /// Creates a repository backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the cache, failing soft: a missing or unreadable or
    /// unparsable file yields an empty mapping.
    #[must_use]
    pub fn load(&self) -> BTreeMap<String, CacheRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache file, starting empty");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache unreadable, starting empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache unparsable, starting empty");
                BTreeMap::new()
            }
        }
    }

    /// Atomically replaces the persisted cache with `cache`.
    ///
    /// Writes the full serialized mapping to a sibling temp file, forces
    /// it to disk, then renames it over the target in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails;
    /// the previous cache file is left intact in that case.
    pub fn persist(&self, cache: &BTreeMap<String, CacheRecord>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(cache)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staged = self.path.with_extension("tmp");
        let mut file = File::create(&staged)?;
        if let Err(e) = file
            .write_all(serialized.as_bytes())
            .and_then(|()| file.sync_all())
        {
            drop(file);
            let _ = fs::remove_file(&staged);
            return Err(e.into());
        }
        drop(file);

        if let Err(e) = fs::rename(&staged, &self.path) {
            let _ = fs::remove_file(&staged);
            return Err(e.into());
        }
        debug!(path = %self.path.display(), feeds = cache.len(), "cache persisted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = CacheRepository::new(dir.path().join("cache.json"));
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_load_garbled_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();
        let repo = CacheRepository::new(path);
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_persist_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = CacheRepository::new(dir.path().join("cache.json"));

        let mut cache = BTreeMap::new();
        let record = CacheRecord {
            etag: Some("\"v1\"".to_string()),
            modified: None,
            entries: BTreeMap::from([("uid-1".to_string(), "<p>body</p>".to_string())]),
        };
        cache.insert("https://example.org/feed".to_string(), record);

        repo.persist(&cache).unwrap();
        assert_eq!(repo.load(), cache);
        // No staging file left behind.
        assert!(!dir.path().join("cache.tmp").exists());
    }

    #[test]
    fn test_persist_is_human_inspectable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let repo = CacheRepository::new(&path);

        let mut cache = BTreeMap::new();
        cache.insert("https://example.org/feed".to_string(), CacheRecord::default());
        repo.persist(&cache).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("https://example.org/feed"));
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_persist_replaces_previous_version_completely() {
        let dir = TempDir::new().unwrap();
        let repo = CacheRepository::new(dir.path().join("cache.json"));

        let mut first = BTreeMap::new();
        first.insert("https://old.example/feed".to_string(), CacheRecord::default());
        repo.persist(&first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("https://new.example/feed".to_string(), CacheRecord::default());
        repo.persist(&second).unwrap();

        let loaded = repo.load();
        assert!(!loaded.contains_key("https://old.example/feed"));
        assert!(loaded.contains_key("https://new.example/feed"));
    }
}
