//! Build orchestration: resolve, consult caches, build, wrap

use crate::bundle::BundleResult;
use crate::options::{is_watching, OptionsResolver};
use packbridge_cache::{
    CacheEntry, CacheStrategy, FileCache, ManifestReader, MemoStats, ProcessMemo,
};
use packbridge_client::{BuildService, HttpBuildClient};
use packbridge_config::{SettingOverrides, Settings};
use packbridge_core::{
    BuildData, BuildDiagnostic, BuildRequest, BuildResponse, BuildWarning, Context, Error, Result,
};
use packbridge_utils::tracing::{build_span, cache_event};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Entry point for builds.
///
/// A compiler owns its settings, its build service connection and every
/// cache. It is `Send + Sync` and meant to be shared behind an `Arc`.
pub struct Compiler {
    pub(crate) settings: Arc<Settings>,
    pub(crate) resolver: OptionsResolver,
    pub(crate) service: Arc<dyn BuildService>,
    pub(crate) memo: ProcessMemo<Arc<BundleResult>>,
    pub(crate) file_cache: FileCache,
    manifest: Option<ManifestReader>,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("build_url", &self.service.endpoint())
            .field("memo", &self.memo.stats())
            .finish_non_exhaustive()
    }
}

impl Compiler {
    /// Compiler talking to the build service at `settings.build_url`
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let client = HttpBuildClient::new(settings.build_url.clone(), settings.request_timeout())?;
        Self::with_service(settings, Arc::new(client))
    }

    /// Compiler using `service` for every live build
    pub fn with_service(settings: Settings, service: Arc<dyn BuildService>) -> Result<Self> {
        settings.validate()?;
        let settings = Arc::new(settings);
        let manifest = settings.manifest_path.clone().map(ManifestReader::new);

        Ok(Self {
            resolver: OptionsResolver::new(Arc::clone(&settings)),
            settings,
            service,
            memo: ProcessMemo::new(),
            file_cache: FileCache::new(),
            manifest,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolver(&self) -> &OptionsResolver {
        &self.resolver
    }

    /// Build `bundle_id`, or fetch its precompiled result.
    ///
    /// With the manifest or the file cache enabled the result comes from that
    /// file alone and the build service is never contacted. Otherwise results
    /// are remembered for the lifetime of this compiler, except for watched
    /// builds which always go to the service.
    pub async fn webpack(
        &self,
        bundle_id: &str,
        context: Option<&Context>,
        overrides: Option<&SettingOverrides>,
    ) -> Result<Arc<BundleResult>> {
        self.run(bundle_id, context, overrides)
            .instrument(build_span(bundle_id))
            .await
    }

    async fn run(
        &self,
        bundle_id: &str,
        context: Option<&Context>,
        overrides: Option<&SettingOverrides>,
    ) -> Result<Arc<BundleResult>> {
        let request = self.resolver.resolve(bundle_id, context, overrides)?;
        let settings = self.settings.with_overrides(overrides);

        let strategy = CacheStrategy::select(settings.use_manifest, settings.use_cache_file);
        debug!(strategy = %strategy, cache_key = %request.cache_key, "selected cache strategy");

        match strategy {
            CacheStrategy::Manifest => {
                let entry = self.manifest_reader()?.read(&request.cache_key)?;
                Ok(Arc::new(self.from_entry(request, entry)))
            }
            CacheStrategy::FileCache => {
                let path = settings.cache_file_path()?;
                let entry = self.file_cache.get(&path, &request.cache_key)?;
                Ok(Arc::new(self.from_entry(request, entry)))
            }
            CacheStrategy::Live => self.build_live(request).await,
        }
    }

    async fn build_live(&self, request: BuildRequest) -> Result<Arc<BundleResult>> {
        let watching = is_watching(&request);

        if !watching {
            if let Some(result) = self.memo.get(&request.cache_key) {
                cache_event("memo", &request.cache_key, true);
                return Ok(result);
            }
            cache_event("memo", &request.cache_key, false);
        }

        let response = self.service.build(&request).await?;
        let data = check_response(&request, self.service.endpoint(), response)?;

        let warnings = data
            .stats
            .warnings
            .iter()
            .map(|diagnostic| {
                let warning = BuildWarning(diagnostic.describe());
                warn!(config = %request.config_path.display(), "{warning}");
                warning
            })
            .collect();

        info!(
            config = %request.config_path.display(),
            cache_key = %request.cache_key,
            "build completed"
        );

        let cache_key = request.cache_key.clone();
        let result = Arc::new(BundleResult::new(
            request,
            data,
            warnings,
            self.settings.tag_templates.clone(),
        ));

        if !watching {
            self.memo.insert(cache_key, Arc::clone(&result));
        }
        Ok(result)
    }

    fn manifest_reader(&self) -> Result<&ManifestReader> {
        self.manifest
            .as_ref()
            .ok_or_else(|| Error::configuration("MANIFEST_PATH has not been defined"))
    }

    fn from_entry(&self, request: BuildRequest, entry: CacheEntry) -> BundleResult {
        let warnings = entry
            .data
            .stats
            .warnings
            .iter()
            .map(|diagnostic| BuildWarning(diagnostic.describe()))
            .collect();
        BundleResult::new(
            request,
            entry.data,
            warnings,
            self.settings.tag_templates.clone(),
        )
    }

    /// Forget every result built by this compiler
    pub fn clear_memo(&self) {
        self.memo.clear();
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Memo lookups served and missed since this compiler was created
    pub fn memo_stats(&self) -> MemoStats {
        self.memo.stats()
    }
}

/// Turn a raw envelope into build data, raising bundler errors.
///
/// The structured `stats.errors` list is preferred over the top-level error
/// string since the latter only carries the first failure.
fn check_response(
    request: &BuildRequest,
    endpoint: &str,
    response: BuildResponse,
) -> Result<BuildData> {
    let BuildResponse { error, data } = response;
    let stat_errors = data
        .as_ref()
        .map(|data| data.stats.errors.as_slice())
        .unwrap_or_default();

    if error.is_some() || !stat_errors.is_empty() {
        let diagnostics: Vec<String> = if stat_errors.is_empty() {
            error.into_iter().collect()
        } else {
            stat_errors.iter().map(BuildDiagnostic::describe).collect()
        };
        return Err(bundling_error(request, &diagnostics));
    }

    data.ok_or_else(|| {
        Error::build_service_protocol(
            endpoint,
            Some(200),
            "response carried neither data nor an error",
        )
    })
}

fn bundling_error(request: &BuildRequest, diagnostics: &[String]) -> Error {
    let mut message = format!("Tried to build {}", request.config_path.display());
    if !diagnostics.is_empty() {
        message.push_str("\n\n");
        message.push_str(&diagnostics.join("\n\n"));
    }
    Error::bundling(&request.config_path, message)
}
