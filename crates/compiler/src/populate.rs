//! Offline precompilation into the cache file and the manifest

use crate::compiler::Compiler;
use indexmap::IndexMap;
use packbridge_cache::{write_manifest, CacheDocument, CacheEntry, Manifest};
use packbridge_config::SettingOverrides;
use packbridge_core::{Context, Result};
use std::fmt;
use tracing::{debug, info};

/// One item of the cache list
pub enum CacheListItem {
    /// A bundle identifier
    Id(String),
    /// Called at population time, yielding any number of identifiers
    Generator(Box<dyn Fn() -> Vec<String> + Send + Sync>),
}

impl CacheListItem {
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        CacheListItem::Generator(Box::new(f))
    }

    fn expand(&self) -> Vec<String> {
        match self {
            CacheListItem::Id(id) => vec![id.clone()],
            CacheListItem::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for CacheListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheListItem::Id(id) => f.debug_tuple("Id").field(id).finish(),
            CacheListItem::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

impl From<&str> for CacheListItem {
    fn from(id: &str) -> Self {
        CacheListItem::Id(id.to_string())
    }
}

impl From<String> for CacheListItem {
    fn from(id: String) -> Self {
        CacheListItem::Id(id)
    }
}

impl Compiler {
    /// Build every listed bundle and merge the results into the cache file.
    ///
    /// Builds always go to the service, whatever the configured cache mode.
    /// Returns the whole cache file as written.
    pub async fn populate_cache<I>(&self, items: I) -> Result<CacheDocument>
    where
        I: IntoIterator<Item = CacheListItem>,
    {
        let path = self.settings.cache_file_path()?;
        let live = SettingOverrides::live_build();

        let mut entries = Vec::new();
        for item in items {
            for bundle_id in item.expand() {
                let result = self.webpack(&bundle_id, None, Some(&live)).await?;
                let request = result.request();
                info!(bundle = %bundle_id, cache_key = %request.cache_key, "precompiled bundle");
                entries.push((
                    request.cache_key.clone(),
                    CacheEntry::new(request.config_path.clone(), result.data().clone()),
                ));
            }
        }

        let document = self.file_cache.write_entries(&path, entries)?;
        self.log_memo_stats("populated cache file");
        Ok(document.as_ref().clone())
    }

    /// [`Compiler::populate_cache`] over the `CACHE` setting
    pub async fn populate_cache_from_settings(&self) -> Result<CacheDocument> {
        let items: Vec<CacheListItem> = self
            .settings
            .cache_list
            .iter()
            .map(|id| CacheListItem::from(id.as_str()))
            .collect();
        self.populate_cache(items).await
    }

    /// Build every bundle and context combination into a manifest.
    ///
    /// A bundle with no contexts is built once without one. `overrides` apply
    /// to every build, with the cache modes forced off.
    pub async fn generate_manifest(
        &self,
        entries: &IndexMap<String, Vec<Context>>,
        overrides: Option<&SettingOverrides>,
    ) -> Result<Manifest> {
        let overrides = match overrides {
            Some(overrides) => overrides.merged_with(&SettingOverrides::live_build()),
            None => SettingOverrides::live_build(),
        };

        let mut manifest = Manifest::new();
        for (bundle_id, contexts) in entries {
            let contexts: Vec<Option<&Context>> = if contexts.is_empty() {
                vec![None]
            } else {
                contexts.iter().map(Some).collect()
            };

            for context in contexts {
                let result = self.webpack(bundle_id, context, Some(&overrides)).await?;
                let request = result.request();
                manifest.insert(
                    request.cache_key.clone(),
                    CacheEntry::new(request.config_path.clone(), result.data().clone()),
                );
            }
        }

        self.log_memo_stats("generated manifest");
        Ok(manifest)
    }

    /// Generate the manifest from the `MANIFEST` setting and write it to
    /// `MANIFEST_PATH`
    pub async fn populate_manifest(&self) -> Result<Manifest> {
        let path = self.settings.manifest_file_path()?;
        let manifest = self.generate_manifest(&self.settings.manifest, None).await?;
        write_manifest(&path, &manifest)?;
        Ok(manifest)
    }

    fn log_memo_stats(&self, message: &str) {
        let stats = self.memo_stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            hit_rate = stats.hit_rate(),
            "{message}"
        );
    }
}
