//! Offline-generated manifest of build results
//!
//! A manifest has the same layout as a cache file. When manifest mode is on
//! it is the only place results come from, so a missing key is fatal rather
//! than a reason to build.

use crate::entry::{CacheDocument, CacheEntry};
use crate::file_cache::load_document;
use packbridge_core::{Error, Result};
use packbridge_utils::atomic_file::write_atomic_json;
use packbridge_utils::tracing::cache_event;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// `cache_key` to precompiled result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: CacheDocument,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Add or replace the entry for `key`
    pub fn insert(&mut self, key: impl Into<String>, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(key.into(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> &CacheDocument {
        &self.entries
    }
}

impl From<CacheDocument> for Manifest {
    fn from(entries: CacheDocument) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, CacheEntry)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, CacheEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Read a manifest from disk
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    load_document(path).map(Manifest::from)
}

/// Write `manifest` to `path`, replacing any earlier file atomically
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    write_atomic_json(path, manifest)?;
    info!(path = %path.display(), entries = manifest.len(), "wrote manifest");
    Ok(())
}

/// Lazily loaded manifest file.
///
/// The file is read on the first lookup and never re-read for the lifetime
/// of the reader.
#[derive(Debug)]
pub struct ManifestReader {
    path: PathBuf,
    loaded: Mutex<Option<Arc<Manifest>>>,
}

impl ManifestReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole manifest, reading it on first use
    pub fn manifest(&self) -> Result<Arc<Manifest>> {
        let mut loaded = self.loaded.lock();
        if let Some(manifest) = loaded.as_ref() {
            return Ok(Arc::clone(manifest));
        }

        let manifest = Arc::new(read_manifest(&self.path)?);
        debug!(path = %self.path.display(), entries = manifest.len(), "loaded manifest");
        *loaded = Some(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// Entry for `key`, failing when the manifest does not list it
    pub fn read(&self, key: &str) -> Result<CacheEntry> {
        let manifest = self.manifest()?;
        match manifest.get(key) {
            Some(entry) => {
                cache_event("manifest", key, true);
                Ok(entry.clone())
            }
            None => {
                cache_event("manifest", key, false);
                Err(Error::manifest_missing_entry(&self.path, key))
            }
        }
    }
}
