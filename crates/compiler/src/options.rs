//! Turns a bundle identifier into a canonical [`BuildRequest`]

use packbridge_config::{ConfigLocator, SettingOverrides, Settings};
use packbridge_core::{BuildRequest, Context, Result, CACHE_KEY_SEPARATOR, TOOL_VERSION};
use packbridge_utils::hashing::ContentHasher;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The request fields that identify a build, in the shape they are hashed.
///
/// Derived locations and keys are left out so the hash never depends on
/// itself.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashedOptions<'a> {
    config: &'a Path,
    context: &'a Context,
    watch_config: bool,
    watch_source: bool,
    hmr: bool,
    aggregate_timeout: u64,
    poll: Option<bool>,
    output_root: &'a Path,
    output_url: &'a str,
    output_dir: &'a str,
}

/// Resolves build requests against a fixed set of settings
#[derive(Debug, Clone)]
pub struct OptionsResolver {
    settings: Arc<Settings>,
    locator: ConfigLocator,
}

impl OptionsResolver {
    pub fn new(settings: Arc<Settings>) -> Self {
        let locator = ConfigLocator::from_settings(&settings);
        Self { settings, locator }
    }

    /// Resolver using a custom config locator
    pub fn with_locator(settings: Arc<Settings>, locator: ConfigLocator) -> Self {
        Self { settings, locator }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build the canonical request for `bundle_id`.
    ///
    /// `context` is merged over the default context, replacing values key by
    /// key. Output settings are checked after `overrides` are applied. Only
    /// the filesystem is consulted.
    pub fn resolve(
        &self,
        bundle_id: &str,
        context: Option<&Context>,
        overrides: Option<&SettingOverrides>,
    ) -> Result<BuildRequest> {
        let settings = self.settings.with_overrides(overrides);
        let (output_root, output_url) = settings.output_locations()?;
        let config_path = self.locator.locate(bundle_id)?;

        let mut merged = settings.default_context.clone();
        if let Some(context) = context {
            for (key, value) in context {
                merged.insert(key.clone(), value.clone());
            }
        }

        let options = HashedOptions {
            config: &config_path,
            context: &merged,
            watch_config: settings.watch_config_files,
            watch_source: settings.watch_source_files,
            hmr: settings.hmr,
            aggregate_timeout: settings.watch_delay,
            poll: settings.poll,
            output_root: &output_root,
            output_url: &output_url,
            output_dir: &settings.output_dir,
        };
        let options_hash = options_hash(&options)?;

        let output_path = output_root.join(&settings.output_dir).join(&options_hash);
        let public_path = format!("{output_url}{}/{options_hash}", settings.output_dir);
        let cache_key = cache_key(&config_path, &options_hash);

        debug!(
            bundle = %bundle_id,
            config = %config_path.display(),
            cache_key = %cache_key,
            "resolved build options"
        );

        Ok(BuildRequest {
            watch_config: options.watch_config,
            watch_source: options.watch_source,
            hmr: options.hmr,
            aggregate_timeout: options.aggregate_timeout,
            poll: options.poll,
            context: merged,
            config_path,
            output_root,
            output_url,
            output_path,
            public_path,
            options_hash,
            cache_key,
        })
    }
}

fn options_hash(options: &HashedOptions<'_>) -> Result<String> {
    let mut hasher = ContentHasher::new("build-options");
    hasher.hash_content(options)?;
    hasher.hash_str(CACHE_KEY_SEPARATOR);
    hasher.hash_str(TOOL_VERSION);
    debug!(label = %hasher.label, inputs = ?hasher.inputs, "hashed build options");
    Ok(hasher.finalize())
}

/// Key shared by the memo, the cache file and the manifest
pub fn cache_key(config_path: &Path, options_hash: &str) -> String {
    format!(
        "{}{CACHE_KEY_SEPARATOR}{options_hash}",
        config_path.display()
    )
}

/// Whether a request asks the service to keep watching its inputs
pub fn is_watching(request: &BuildRequest) -> bool {
    request.watch_config || request.watch_source
}
