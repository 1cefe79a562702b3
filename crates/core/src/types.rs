use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Values exposed to a bundler config file, in insertion order
pub type Context = IndexMap<String, Value>;

/// Canonical description of one build, as sent to the build service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// Absolute path to the bundler config file
    #[serde(rename = "config")]
    pub config_path: PathBuf,
    /// Default context with the per-call context merged on top
    pub context: Context,
    /// Ask the service to rebuild when the config file changes
    pub watch_config: bool,
    /// Ask the service to rebuild when source files change
    pub watch_source: bool,
    pub hmr: bool,
    /// Milliseconds the watcher waits before rebuilding
    pub aggregate_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<bool>,
    pub output_root: PathBuf,
    pub output_url: String,
    /// Unique output directory for this request
    pub output_path: PathBuf,
    /// URL prefix matching `output_path`
    pub public_path: String,
    pub options_hash: String,
    pub cache_key: String,
}

/// Raw envelope returned by the build service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<BuildData>,
}

/// Build output as reported by the build service.
///
/// Fields the service sends that are not modelled here are kept in `extra`, so
/// a payload written to a cache file reads back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildData {
    #[serde(default)]
    pub stats: BuildStats,
    #[serde(default, skip_serializing_if = "RawAssets::is_empty")]
    pub assets: RawAssets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<IndexMap<String, EntryUrls>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpack_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_dependencies: Vec<PathBuf>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors and warnings collected by the bundler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    #[serde(default)]
    pub errors: Vec<BuildDiagnostic>,
    #[serde(default)]
    pub warnings: Vec<BuildDiagnostic>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single error or warning reported by the bundler.
///
/// The service sends either a plain string or an object carrying a message
/// and a stack trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildDiagnostic {
    Message(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl BuildDiagnostic {
    /// Human readable text, favouring the stack trace when one is present
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            BuildDiagnostic::Message(message) => message.clone(),
            BuildDiagnostic::Detailed { message, stack, .. } => match (message, stack) {
                (Some(message), Some(stack)) => {
                    format!("Message: {message}\n\nStack trace: {stack}")
                }
                (None, Some(stack)) => stack.clone(),
                (Some(message), None) => message.clone(),
                (None, None) => String::new(),
            },
        }
    }
}

impl From<&str> for BuildDiagnostic {
    fn from(message: &str) -> Self {
        BuildDiagnostic::Message(message.to_string())
    }
}

/// Non-fatal diagnostic from a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildWarning(pub String);

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One emitted file, as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAsset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The shapes the service uses for its asset listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAssets {
    /// Entry point name to the assets it produced
    ByEntry(IndexMap<String, Vec<RawAsset>>),
    /// Asset name to output path
    Paths(IndexMap<String, PathBuf>),
    /// Absolute output paths, as webpack-build reports them
    Files(Vec<PathBuf>),
    Flat(Vec<RawAsset>),
}

impl Default for RawAssets {
    fn default() -> Self {
        RawAssets::Flat(Vec::new())
    }
}

impl RawAssets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            RawAssets::ByEntry(entries) => entries.is_empty(),
            RawAssets::Paths(paths) => paths.is_empty(),
            RawAssets::Files(files) => files.is_empty(),
            RawAssets::Flat(assets) => assets.is_empty(),
        }
    }

    /// Assets grouped by entry point, preserving the order the service used.
    ///
    /// Listings without entry information are grouped under `main`.
    #[must_use]
    pub fn by_entry(&self) -> Vec<(String, Vec<RawAsset>)> {
        match self {
            RawAssets::ByEntry(entries) => entries
                .iter()
                .map(|(entry, assets)| (entry.clone(), assets.clone()))
                .collect(),
            RawAssets::Paths(paths) => {
                let assets = paths
                    .iter()
                    .map(|(name, path)| RawAsset {
                        name: name.clone(),
                        path: Some(path.clone()),
                        url: None,
                    })
                    .collect();
                vec![("main".to_string(), assets)]
            }
            RawAssets::Files(files) => {
                let assets = files
                    .iter()
                    .map(|path| RawAsset {
                        name: path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        path: Some(path.clone()),
                        url: None,
                    })
                    .collect();
                vec![("main".to_string(), assets)]
            }
            RawAssets::Flat(assets) => vec![("main".to_string(), assets.clone())],
        }
    }
}

/// URLs for one entry point, split by asset type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUrls {
    #[serde(default)]
    pub js: Vec<String>,
    #[serde(default)]
    pub css: Vec<String>,
}
