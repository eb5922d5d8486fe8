use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::{result::WalkshedResult, selection::CacheKey};

/// Session-lifetime memo of walkshed results. Entries are never evicted or
/// replaced: the first result stored under a key wins.
#[derive(Debug, Default)]
pub struct WalkshedCache {
    entries: Mutex<AHashMap<CacheKey, Arc<WalkshedResult>>>,
}

impl WalkshedCache {
    pub fn new() -> Self { Self::default() }

    /// Look up a stored result.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<WalkshedResult>> {
        self.entries.lock().get(key).cloned()
    }

    /// Store `result` under `key` unless a result is already there, and return
    /// whichever result the cache now holds.
    pub fn insert(&self, key: CacheKey, result: impl Into<Arc<WalkshedResult>>) -> Arc<WalkshedResult> {
        self.entries.lock()
            .entry(key)
            .or_insert_with(|| result.into())
            .clone()
    }

    #[inline] pub fn contains(&self, key: &CacheKey) -> bool { self.entries.lock().contains_key(key) }

    #[inline] pub fn len(&self) -> usize { self.entries.lock().len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.lock().is_empty() }
}
