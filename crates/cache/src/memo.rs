//! Per-process memo of build results

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory `cache_key` to value mapping, shared by concurrent callers.
///
/// Values are expected to be immutable once inserted (typically `Arc`s), so
/// the lock is only held for the map operation itself.
#[derive(Debug)]
pub struct ProcessMemo<V> {
    entries: Mutex<HashMap<String, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Hit and miss counters for a [`ProcessMemo`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl MemoStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl<V: Clone> Default for ProcessMemo<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ProcessMemo<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let found = self.entries.lock().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store `value`, replacing any earlier value for `key`
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.lock().insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget every remembered result
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
