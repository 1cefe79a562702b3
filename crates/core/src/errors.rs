use std::path::PathBuf;

/// Result type alias for packbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for packbridge operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting is missing or malformed
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A bundle identifier could not be resolved to a config file
    #[error("{}", format_config_not_found(.reference, .tried))]
    ConfigNotFound { reference: String, tried: Vec<PathBuf> },

    /// The build service could not be reached
    #[error("build service at '{url}' is unavailable: {message}")]
    BuildServiceUnavailable { url: String, message: String },

    /// The build service answered with an unexpected status or body
    #[error("unexpected response from {url} - {}: {body}", format_status(.status))]
    BuildServiceProtocol {
        url: String,
        status: Option<u16>,
        body: String,
    },

    /// The bundler reported errors while building
    #[error("{message}")]
    Bundling { config: PathBuf, message: String },

    /// File-cache mode is active but the cache has no entry for the key
    #[error(
        "cache file '{path}' has no entry for '{key}'. Ensure the bundle is listed in the \
         CACHE setting, then repopulate the cache"
    )]
    CacheKeyMissing { path: PathBuf, key: String },

    /// Manifest mode is active but the manifest has no entry for the key
    #[error(
        "manifest '{path}' has no entry for '{key}'. Ensure the bundle and context are listed \
         in the MANIFEST setting, then regenerate the manifest"
    )]
    ManifestMissingEntry { path: PathBuf, key: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of [`Error`], for callers that only need to decide
/// whether to degrade (render nothing) or fail loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    ConfigNotFound,
    BuildServiceUnavailable,
    BuildServiceProtocol,
    Bundling,
    CacheKeyMissing,
    ManifestMissingEntry,
    Io,
}

fn format_config_not_found(reference: &str, tried: &[PathBuf]) -> String {
    if tried.is_empty() {
        format!("config file not found: {reference}")
    } else {
        let tried = tried
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("config file not found: {reference} (tried: {tried})")
    }
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "invalid body".to_string(),
    }
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a config-not-found error listing every location that was tried
    #[must_use]
    pub fn config_not_found(reference: impl Into<String>, tried: Vec<PathBuf>) -> Self {
        Error::ConfigNotFound {
            reference: reference.into(),
            tried,
        }
    }

    /// Create a build-service-unavailable error
    #[must_use]
    pub fn build_service_unavailable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::BuildServiceUnavailable {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a protocol error carrying the raw response body
    #[must_use]
    pub fn build_service_protocol(
        url: impl Into<String>,
        status: Option<u16>,
        body: impl Into<String>,
    ) -> Self {
        Error::BuildServiceProtocol {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a bundling error for the given config
    #[must_use]
    pub fn bundling(config: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Bundling {
            config: config.into(),
            message: message.into(),
        }
    }

    /// Create a cache-key-missing error
    #[must_use]
    pub fn cache_key_missing(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Error::CacheKeyMissing {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Create a manifest-missing-entry error
    #[must_use]
    pub fn manifest_missing_entry(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Error::ManifestMissingEntry {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a JSON error with a custom message
    #[must_use]
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            message: message.into(),
            source,
        }
    }

    /// The failure kind, for callers choosing between degrading and failing
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::ConfigNotFound { .. } => ErrorKind::ConfigNotFound,
            Error::BuildServiceUnavailable { .. } => ErrorKind::BuildServiceUnavailable,
            Error::BuildServiceProtocol { .. } => ErrorKind::BuildServiceProtocol,
            Error::Bundling { .. } => ErrorKind::Bundling,
            Error::CacheKeyMissing { .. } => ErrorKind::CacheKeyMissing,
            Error::ManifestMissingEntry { .. } => ErrorKind::ManifestMissingEntry,
            Error::FileSystem { .. } | Error::Json { .. } => ErrorKind::Io,
        }
    }

    /// Whether this error means a precompilation step was skipped
    #[must_use]
    pub fn is_missing_precompiled(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CacheKeyMissing | ErrorKind::ManifestMissingEntry
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_lists_tried_locations() {
        let err = Error::config_not_found(
            "app/webpack.config.js",
            vec![
                PathBuf::from("/srv/a/app/webpack.config.js"),
                PathBuf::from("/srv/b/app/webpack.config.js"),
            ],
        );

        let message = err.to_string();
        assert!(message.contains("app/webpack.config.js"));
        assert!(message.contains("/srv/a/app/webpack.config.js"));
        assert!(message.contains("/srv/b/app/webpack.config.js"));
        assert_eq!(err.kind(), ErrorKind::ConfigNotFound);
    }

    #[test]
    fn test_protocol_error_carries_body() {
        let err = Error::build_service_protocol("http://localhost:9009", Some(500), "boom");
        assert_eq!(
            err.to_string(),
            "unexpected response from http://localhost:9009 - 500: boom"
        );

        let err = Error::build_service_protocol("http://localhost:9009", None, "<html>");
        assert!(err.to_string().contains("invalid body"));
    }

    #[test]
    fn test_missing_precompiled_kinds() {
        assert!(Error::cache_key_missing("/tmp/cache.json", "k").is_missing_precompiled());
        assert!(Error::manifest_missing_entry("/tmp/manifest.json", "k").is_missing_precompiled());
        assert!(!Error::configuration("nope").is_missing_precompiled());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
