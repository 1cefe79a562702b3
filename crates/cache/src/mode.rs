use std::fmt;

/// Where a call looks for its build result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Build through the service, remembering results for this process
    #[default]
    Live,
    /// Read precompiled results from the cache file; never build
    FileCache,
    /// Read precompiled results from the manifest; never build
    Manifest,
}

impl CacheStrategy {
    /// Pick the strategy for a call. The manifest wins when both are enabled.
    pub fn select(use_manifest: bool, use_cache_file: bool) -> Self {
        if use_manifest {
            CacheStrategy::Manifest
        } else if use_cache_file {
            CacheStrategy::FileCache
        } else {
            CacheStrategy::Live
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheStrategy::Live => "live",
            CacheStrategy::FileCache => "file-cache",
            CacheStrategy::Manifest => "manifest",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_takes_precedence() {
        assert_eq!(CacheStrategy::select(true, true), CacheStrategy::Manifest);
        assert_eq!(CacheStrategy::select(false, true), CacheStrategy::FileCache);
        assert_eq!(CacheStrategy::select(false, false), CacheStrategy::Live);
    }
}
