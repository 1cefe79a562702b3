//! Resolution of bundle identifiers to absolute config file paths

use crate::settings::Settings;
use packbridge_core::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Fallback lookup for config files that live among static assets
pub trait StaticAssetResolver: Send + Sync + fmt::Debug {
    /// Absolute path of `reference`, if this resolver can find it
    fn find(&self, reference: &str) -> Option<PathBuf>;

    /// Every location `find` would look at, for error reporting
    fn candidates(&self, reference: &str) -> Vec<PathBuf>;
}

/// Looks for config files under a list of static asset directories
#[derive(Debug, Clone, Default)]
pub struct StaticDirsResolver {
    dirs: Vec<PathBuf>,
}

impl StaticDirsResolver {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl StaticAssetResolver for StaticDirsResolver {
    fn find(&self, reference: &str) -> Option<PathBuf> {
        self.candidates(reference)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    fn candidates(&self, reference: &str) -> Vec<PathBuf> {
        self.dirs.iter().map(|dir| dir.join(reference)).collect()
    }
}

/// Turns a possibly relative config reference into an absolute path
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    config_dirs: Vec<PathBuf>,
    static_resolver: Option<Arc<dyn StaticAssetResolver>>,
}

impl ConfigLocator {
    pub fn new(config_dirs: Vec<PathBuf>) -> Self {
        Self {
            config_dirs,
            static_resolver: None,
        }
    }

    /// Locator searching the settings' config dirs, then its static dirs
    pub fn from_settings(settings: &Settings) -> Self {
        let locator = Self::new(settings.config_dirs.clone());
        if settings.static_dirs.is_empty() {
            locator
        } else {
            locator.with_static_resolver(Arc::new(StaticDirsResolver::new(
                settings.static_dirs.clone(),
            )))
        }
    }

    pub fn with_static_resolver(mut self, resolver: Arc<dyn StaticAssetResolver>) -> Self {
        self.static_resolver = Some(resolver);
        self
    }

    /// Resolve `reference` to an absolute path of an existing file.
    ///
    /// Only metadata lookups are made, synchronously on the caller's thread.
    pub fn locate(&self, reference: &str) -> Result<PathBuf> {
        let path = Path::new(reference);

        if path.is_absolute() {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(Error::config_not_found(reference, vec![path.to_path_buf()]));
        }

        let mut tried = Vec::new();

        for dir in &self.config_dirs {
            let candidate = dir.join(path);
            if candidate.is_file() {
                debug!(reference = %reference, path = %candidate.display(), "located config file");
                return absolute(candidate);
            }
            tried.push(candidate);
        }

        if let Some(resolver) = &self.static_resolver {
            if let Some(found) = resolver.find(reference) {
                debug!(reference = %reference, path = %found.display(), "located config file among static assets");
                return absolute(found);
            }
            tried.extend(resolver.candidates(reference));
        }

        Err(Error::config_not_found(reference, tried))
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::file_system(&path, "resolve current directory", e))?;
    Ok(cwd.join(path))
}
