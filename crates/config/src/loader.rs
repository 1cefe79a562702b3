//! Settings loader that handles precedence
//!
//! Settings are assembled from three layers, later layers winning:
//! built-in defaults, an optional JSON settings file, and `PACKBRIDGE_*`
//! environment variables.

use crate::settings::Settings;
use packbridge_core::{Error, Result, ENV_PREFIX};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of a settings layer, for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// JSON settings file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
}

/// Settings together with the layers they were assembled from
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub sources: Vec<ConfigSource>,
}

/// Loader applying defaults, then a settings file, then the environment
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings with full precedence handling
    pub fn load(path: Option<&Path>) -> Result<LoadedSettings> {
        Self::load_with_env(path, std::env::vars())
    }

    /// Load settings using the given environment instead of the process one
    pub fn load_with_env<I>(path: Option<&Path>, vars: I) -> Result<LoadedSettings>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut sources = vec![ConfigSource::Default];

        let mut document = Map::new();
        if let Some(path) = path {
            document = Self::read_file(path)?;
            sources.push(ConfigSource::ConfigFile(path.to_path_buf()));
        }

        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if let Some(parsed) = Self::parse_env_value(key, &value)? {
                debug!(variable = %name, "settings override from environment");
                document.insert(key.to_string(), parsed);
                sources.push(ConfigSource::EnvironmentVariable(name));
            }
        }

        let settings: Settings = serde_json::from_value(Value::Object(document))
            .map_err(|e| Error::json("invalid settings", e))?;
        settings.validate()?;

        Ok(LoadedSettings { settings, sources })
    }

    fn read_file(path: &Path) -> Result<Map<String, Value>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read settings file", e))?;

        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::configuration(format!(
                "settings file '{}' must contain a JSON object",
                path.display()
            ))),
            Err(e) => Err(Error::json(
                format!("failed to parse settings file '{}'", path.display()),
                e,
            )),
        }
    }

    /// Convert one environment variable into the JSON value its setting expects.
    ///
    /// Unknown keys are ignored so unrelated `PACKBRIDGE_*` variables do not
    /// break loading.
    fn parse_env_value(key: &str, raw: &str) -> Result<Option<Value>> {
        let value = match key {
            "BUILD_URL" | "OUTPUT_ROOT" | "OUTPUT_URL" | "OUTPUT_DIR" | "CACHE_FILE"
            | "MANIFEST_PATH" => Value::String(raw.to_string()),
            "USE_MANIFEST" | "USE_CACHE_FILE" | "WATCH_CONFIG_FILES" | "WATCH_SOURCE_FILES"
            | "HMR" => Value::Bool(parse_bool(key, raw)?),
            "WATCH_DELAY" | "REQUEST_TIMEOUT" => {
                let number: u64 = raw.parse().map_err(|_| {
                    Error::configuration(format!(
                        "{ENV_PREFIX}{key} must be a whole number, got '{raw}'"
                    ))
                })?;
                Value::from(number)
            }
            "CONFIG_DIRS" | "STATIC_DIRS" => Value::Array(
                std::env::split_paths(raw)
                    .map(|path| Value::String(path.to_string_lossy().into_owned()))
                    .collect(),
            ),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "{ENV_PREFIX}{key} must be a boolean, got '{raw}'"
        ))),
    }
}
