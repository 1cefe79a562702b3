//! Settings value with per-call overrides and validation
use indexmap::IndexMap;
use packbridge_core::{
    Context, Error, Result, DEFAULT_BUILD_URL, DEFAULT_OUTPUT_DIR, DEFAULT_WATCH_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the compiler needs to know about its environment.
///
/// Constructed once and handed to the compiler; never mutated afterwards.
/// Per-call variations go through [`SettingOverrides`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Directory bundles are written under
    pub output_root: Option<PathBuf>,
    /// URL `output_root` is served from; must end with `/`
    pub output_url: Option<String>,
    /// Sub-directory of `output_root` reserved for bundles
    pub output_dir: String,
    /// Endpoint of the build service
    pub build_url: String,
    /// Directories searched, in order, for relative config references
    pub config_dirs: Vec<PathBuf>,
    /// Static asset directories consulted after `config_dirs`
    pub static_dirs: Vec<PathBuf>,
    pub watch_config_files: bool,
    pub watch_source_files: bool,
    /// Milliseconds the service waits before rebuilding a watched bundle
    pub watch_delay: u64,
    pub hmr: bool,
    pub poll: Option<bool>,
    pub cache_file: Option<PathBuf>,
    pub use_cache_file: bool,
    /// Bundle identifiers precompiled by `populate-cache`
    #[serde(rename = "CACHE")]
    pub cache_list: Vec<String>,
    pub manifest_path: Option<PathBuf>,
    pub use_manifest: bool,
    /// Bundle identifiers and the contexts to precompile them with
    pub manifest: IndexMap<String, Vec<Context>>,
    /// Merged into every request's context
    pub default_context: Context,
    pub tag_templates: TagTemplates,
    /// Seconds before a build request is abandoned; unbounded when unset
    pub request_timeout: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_root: None,
            output_url: None,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            build_url: DEFAULT_BUILD_URL.to_string(),
            config_dirs: Vec::new(),
            static_dirs: Vec::new(),
            watch_config_files: false,
            watch_source_files: false,
            watch_delay: DEFAULT_WATCH_DELAY_MS,
            hmr: false,
            poll: None,
            cache_file: None,
            use_cache_file: false,
            cache_list: Vec::new(),
            manifest_path: None,
            use_manifest: false,
            manifest: IndexMap::new(),
            default_context: Context::new(),
            tag_templates: TagTemplates::default(),
            request_timeout: None,
        }
    }
}

/// HTML templates used when rendering bundles; `{url}` is replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagTemplates {
    pub css: String,
    pub js: String,
}

impl Default for TagTemplates {
    fn default() -> Self {
        Self {
            css: r#"<link rel="stylesheet" href="{url}">"#.to_string(),
            js: r#"<script src="{url}"></script>"#.to_string(),
        }
    }
}

impl TagTemplates {
    #[must_use]
    pub fn render_css(&self, url: &str) -> String {
        self.css.replace("{url}", url)
    }

    #[must_use]
    pub fn render_js(&self, url: &str) -> String {
        self.js.replace("{url}", url)
    }
}

/// Per-call replacements for individual settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingOverrides {
    pub output_root: Option<PathBuf>,
    pub output_url: Option<String>,
    pub watch_config_files: Option<bool>,
    pub watch_source_files: Option<bool>,
    pub watch_delay: Option<u64>,
    pub hmr: Option<bool>,
    pub poll: Option<bool>,
    pub cache_file: Option<PathBuf>,
    pub use_cache_file: Option<bool>,
    pub use_manifest: Option<bool>,
}

impl SettingOverrides {
    /// Overrides that force a live build, used when precompiling
    #[must_use]
    pub fn live_build() -> Self {
        Self {
            use_cache_file: Some(false),
            use_manifest: Some(false),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Layer `other` on top of `self`; values set in `other` win
    #[must_use]
    pub fn merged_with(&self, other: &SettingOverrides) -> SettingOverrides {
        SettingOverrides {
            output_root: other.output_root.clone().or_else(|| self.output_root.clone()),
            output_url: other.output_url.clone().or_else(|| self.output_url.clone()),
            watch_config_files: other.watch_config_files.or(self.watch_config_files),
            watch_source_files: other.watch_source_files.or(self.watch_source_files),
            watch_delay: other.watch_delay.or(self.watch_delay),
            hmr: other.hmr.or(self.hmr),
            poll: other.poll.or(self.poll),
            cache_file: other.cache_file.clone().or_else(|| self.cache_file.clone()),
            use_cache_file: other.use_cache_file.or(self.use_cache_file),
            use_manifest: other.use_manifest.or(self.use_manifest),
        }
    }
}

impl Settings {
    /// Settings with `overrides` applied, borrowing when there is nothing to apply
    #[must_use]
    pub fn with_overrides(&self, overrides: Option<&SettingOverrides>) -> Cow<'_, Settings> {
        let overrides = match overrides {
            Some(overrides) if !overrides.is_empty() => overrides,
            _ => return Cow::Borrowed(self),
        };

        let mut settings = self.clone();
        if let Some(output_root) = &overrides.output_root {
            settings.output_root = Some(output_root.clone());
        }
        if let Some(output_url) = &overrides.output_url {
            settings.output_url = Some(output_url.clone());
        }
        if let Some(watch) = overrides.watch_config_files {
            settings.watch_config_files = watch;
        }
        if let Some(watch) = overrides.watch_source_files {
            settings.watch_source_files = watch;
        }
        if let Some(delay) = overrides.watch_delay {
            settings.watch_delay = delay;
        }
        if let Some(hmr) = overrides.hmr {
            settings.hmr = hmr;
        }
        if let Some(poll) = overrides.poll {
            settings.poll = Some(poll);
        }
        if let Some(cache_file) = &overrides.cache_file {
            settings.cache_file = Some(cache_file.clone());
        }
        if let Some(use_cache_file) = overrides.use_cache_file {
            settings.use_cache_file = use_cache_file;
        }
        if let Some(use_manifest) = overrides.use_manifest {
            settings.use_manifest = use_manifest;
        }
        Cow::Owned(settings)
    }

    /// The output root and URL, checked for presence and shape
    pub fn output_locations(&self) -> Result<(PathBuf, String)> {
        let root = self
            .output_root
            .clone()
            .ok_or_else(|| Error::configuration("OUTPUT_ROOT has not been defined"))?;
        let url = self
            .output_url
            .clone()
            .ok_or_else(|| Error::configuration("OUTPUT_URL has not been defined"))?;
        check_trailing_slash(&url)?;
        Ok((root, url))
    }

    /// Path of the file cache, required when file-cache mode is used
    pub fn cache_file_path(&self) -> Result<PathBuf> {
        self.cache_file
            .clone()
            .ok_or_else(|| Error::configuration("CACHE_FILE has not been defined"))
    }

    /// Path of the manifest, required when manifest mode is used
    pub fn manifest_file_path(&self) -> Result<PathBuf> {
        self.manifest_path
            .clone()
            .ok_or_else(|| Error::configuration("MANIFEST_PATH has not been defined"))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }

    /// Check the settings for values that can never work
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.build_url).map_err(|e| {
            Error::configuration(format!("BUILD_URL '{}' is not a valid URL: {e}", self.build_url))
        })?;

        if let Some(output_url) = &self.output_url {
            check_trailing_slash(output_url)?;
        }

        if self.output_dir.is_empty() {
            return Err(Error::configuration("OUTPUT_DIR must not be empty"));
        }

        if self.use_manifest {
            self.manifest_file_path()?;
        }

        if self.use_cache_file {
            self.cache_file_path()?;
        }

        if self.request_timeout == Some(0) {
            return Err(Error::configuration("REQUEST_TIMEOUT must be greater than zero"));
        }

        Ok(())
    }
}

fn check_trailing_slash(url: &str) -> Result<()> {
    if url.ends_with('/') {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "OUTPUT_URL '{url}' must have a trailing slash"
        )))
    }
}

/// Builder for creating settings
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
        }
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.settings.output_root = Some(root.into());
        self
    }

    pub fn output_url(mut self, url: impl Into<String>) -> Self {
        self.settings.output_url = Some(url.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.settings.output_dir = dir.into();
        self
    }

    pub fn build_url(mut self, url: impl Into<String>) -> Self {
        self.settings.build_url = url.into();
        self
    }

    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.config_dirs.push(dir.into());
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.static_dirs.push(dir.into());
        self
    }

    pub fn watch(mut self, config_files: bool, source_files: bool) -> Self {
        self.settings.watch_config_files = config_files;
        self.settings.watch_source_files = source_files;
        self
    }

    pub fn cache_file(mut self, path: impl Into<PathBuf>, use_cache_file: bool) -> Self {
        self.settings.cache_file = Some(path.into());
        self.settings.use_cache_file = use_cache_file;
        self
    }

    pub fn cache_entry(mut self, bundle_id: impl Into<String>) -> Self {
        self.settings.cache_list.push(bundle_id.into());
        self
    }

    pub fn manifest_path(mut self, path: impl Into<PathBuf>, use_manifest: bool) -> Self {
        self.settings.manifest_path = Some(path.into());
        self.settings.use_manifest = use_manifest;
        self
    }

    /// Add a bundle to precompile into the manifest with the given contexts
    pub fn manifest_entry(mut self, bundle_id: impl Into<String>, contexts: Vec<Context>) -> Self {
        self.settings.manifest.insert(bundle_id.into(), contexts);
        self
    }

    pub fn default_context(mut self, context: Context) -> Self {
        self.settings.default_context = context;
        self
    }

    pub fn tag_templates(mut self, templates: TagTemplates) -> Self {
        self.settings.tag_templates = templates;
        self
    }

    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.settings.request_timeout = Some(seconds);
        self
    }

    /// Validate and return the settings
    pub fn build(self) -> Result<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
