//! Cache system for packbridge build results
//!
//! Three strategies share the same `cache_key`:
//! - [`ProcessMemo`]: results already built by this process
//! - [`FileCache`]: a JSON document of precompiled results, read lazily
//! - [`ManifestReader`]: an offline-generated document that is the only
//!   source of results when enabled
//!
//! Exactly one of the file-backed strategies is consulted per call, as picked
//! by [`CacheStrategy::select`].

pub mod entry;
pub mod file_cache;
pub mod manifest;
pub mod memo;
pub mod mode;

pub use entry::{CacheDocument, CacheEntry};
pub use file_cache::FileCache;
pub use manifest::{read_manifest, write_manifest, Manifest, ManifestReader};
pub use memo::{MemoStats, ProcessMemo};
pub use mode::CacheStrategy;
