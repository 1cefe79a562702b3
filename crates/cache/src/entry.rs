//! Persisted build results

use packbridge_core::{BuildData, BuildStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One precompiled build result, as stored in a cache file or manifest.
///
/// Serialized as the build data with the resolved config path alongside it:
/// `{"config": ..., "stats": ..., "assets": ..., "fileDependencies": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub config: PathBuf,
    #[serde(flatten)]
    pub data: BuildData,
}

impl CacheEntry {
    pub fn new(config: impl Into<PathBuf>, data: BuildData) -> Self {
        Self {
            config: config.into(),
            data,
        }
    }

    pub fn stats(&self) -> &BuildStats {
        &self.data.stats
    }

    pub fn file_dependencies(&self) -> &[PathBuf] {
        &self.data.file_dependencies
    }

    pub fn config(&self) -> &Path {
        &self.config
    }
}

/// Whole cache file or manifest: `cache_key` to entry, written in key order
pub type CacheDocument = BTreeMap<String, CacheEntry>;
