/// Constants used throughout the packbridge codebase

// Mixed into every options hash so a new release never reuses stale output
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

// Build service defaults
pub const DEFAULT_BUILD_URL: &str = "http://127.0.0.1:9009/build";
pub const BUILD_SERVICE_SIGNATURE: &str = "webpack-build";

// Output layout
pub const DEFAULT_OUTPUT_DIR: &str = "webpack";
pub const DEFAULT_WATCH_DELAY_MS: u64 = 200;

// Separator between the config path and the options hash in cache keys
pub const CACHE_KEY_SEPARATOR: &str = "__";

// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "PACKBRIDGE_";
