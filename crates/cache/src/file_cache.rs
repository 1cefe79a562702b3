//! JSON file cache of precompiled build results

use crate::entry::{CacheDocument, CacheEntry};
use packbridge_core::{Error, Result};
use packbridge_utils::atomic_file::write_atomic_json;
use packbridge_utils::tracing::cache_event;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Lazily loaded cache files, keyed by path.
///
/// Each file is parsed once, on first access, and kept in memory afterwards.
/// Writing through [`FileCache::write_entries`] refreshes the in-memory copy.
#[derive(Debug, Default)]
pub struct FileCache {
    documents: Mutex<HashMap<PathBuf, Arc<CacheDocument>>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `key` in the cache file at `path`.
    ///
    /// The first lookup for a path reads it with blocking `std::fs` on the
    /// caller's thread, including from async code. Cache files are small and
    /// later lookups are served from memory.
    pub fn get(&self, path: &Path, key: &str) -> Result<CacheEntry> {
        let document = self.document(path)?;

        match document.get(key) {
            Some(entry) => {
                cache_event("file-cache", key, true);
                Ok(entry.clone())
            }
            None => {
                cache_event("file-cache", key, false);
                Err(Error::cache_key_missing(path, key))
            }
        }
    }

    /// Parsed contents of the cache file at `path`, loading it if needed
    pub fn document(&self, path: &Path) -> Result<Arc<CacheDocument>> {
        if let Some(document) = self.documents.lock().get(path) {
            return Ok(Arc::clone(document));
        }

        let document = Arc::new(load_document(path)?);
        debug!(path = %path.display(), entries = document.len(), "loaded cache file");

        self.documents
            .lock()
            .insert(path.to_path_buf(), Arc::clone(&document));
        Ok(document)
    }

    /// Merge `entries` into the cache file at `path` and rewrite it.
    ///
    /// Existing entries whose keys are not in `entries` are kept. Returns the
    /// full document as written.
    pub fn write_entries(
        &self,
        path: &Path,
        entries: impl IntoIterator<Item = (String, CacheEntry)>,
    ) -> Result<Arc<CacheDocument>> {
        let mut document = if path.exists() {
            load_document(path)?
        } else {
            CacheDocument::new()
        };

        let mut written = 0usize;
        for (key, entry) in entries {
            document.insert(key, entry);
            written += 1;
        }

        write_atomic_json(path, &document)?;
        info!(
            path = %path.display(),
            written,
            total = document.len(),
            "wrote cache file"
        );

        let document = Arc::new(document);
        self.documents
            .lock()
            .insert(path.to_path_buf(), Arc::clone(&document));
        Ok(document)
    }

    /// Drop every parsed document so the next access re-reads from disk
    pub fn clear(&self) {
        self.documents.lock().clear();
    }
}

/// Blocking read and parse of one cache file
pub(crate) fn load_document(path: &Path) -> Result<CacheDocument> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read cache file", e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::json(format!("failed to parse '{}'", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use packbridge_core::{BuildData, ErrorKind};
    use std::fs;
    use tempfile::TempDir;

    fn entry(config: &str, marker: &str) -> CacheEntry {
        let data: BuildData = serde_json::from_value(serde_json::json!({
            "stats": {"errors": [], "warnings": [], "hash": marker},
            "fileDependencies": [format!("{config}/entry.js")]
        }))
        .unwrap();
        CacheEntry::new(config, data)
    }

    #[test]
    fn test_missing_key_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        let cache = FileCache::new();
        cache
            .write_entries(&path, vec![("a".to_string(), entry("/a", "1"))])
            .unwrap();

        let err = cache.get(&path, "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CacheKeyMissing);
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new();
        let err = cache
            .get(&temp_dir.path().join("absent.json"), "a")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_write_merges_with_existing_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        let cache = FileCache::new();

        cache
            .write_entries(
                &path,
                vec![
                    ("a".to_string(), entry("/a", "1")),
                    ("b".to_string(), entry("/b", "1")),
                ],
            )
            .unwrap();

        let document = cache
            .write_entries(&path, vec![("b".to_string(), entry("/b", "2"))])
            .unwrap();

        assert_eq!(document.len(), 2);
        assert_eq!(document["a"], entry("/a", "1"));
        assert_eq!(document["b"], entry("/b", "2"));

        let on_disk: CacheDocument =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(&on_disk, document.as_ref());
    }

    #[test]
    fn test_document_is_parsed_once_per_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        let cache = FileCache::new();
        cache
            .write_entries(&path, vec![("a".to_string(), entry("/a", "1"))])
            .unwrap();

        // Changes made behind the cache's back are not seen until cleared
        fs::write(&path, "{}").unwrap();
        assert!(cache.get(&path, "a").is_ok());

        cache.clear();
        assert_eq!(
            cache.get(&path, "a").unwrap_err().kind(),
            ErrorKind::CacheKeyMissing
        );
    }

    #[test]
    fn test_paths_are_cached_independently() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.json");
        let second = temp_dir.path().join("second.json");
        let cache = FileCache::new();

        cache
            .write_entries(&first, vec![("a".to_string(), entry("/a", "1"))])
            .unwrap();
        cache
            .write_entries(&second, vec![("b".to_string(), entry("/b", "1"))])
            .unwrap();

        assert!(cache.get(&first, "a").is_ok());
        assert!(cache.get(&first, "b").is_err());
        assert!(cache.get(&second, "b").is_ok());
    }
}
