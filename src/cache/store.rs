//! Cache Store Module
//!
//! Owner of the server's [`LruStore`]: validates input, counts hits, misses
//! and evictions, and turns lookups into `Result`s for the HTTP layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::cache::{ByteView, CacheStats, LruStore, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Byte-bounded cache of [`ByteView`] values with statistics.
#[derive(Debug)]
pub struct CacheStore {
    lru: LruStore<ByteView>,
    stats: CacheStats,
    /// Shared with the eviction callback installed in `lru`
    evictions: Arc<AtomicU64>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store that holds at most `max_bytes` of keys and values.
    pub fn new(max_bytes: usize) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let lru = LruStore::with_evict_callback(max_bytes, move |key: String, value: ByteView| {
            counter.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, bytes = value.len(), "evicted entry");
        });

        Self {
            lru,
            stats: CacheStats::new(max_bytes),
            evictions,
        }
    }

    // == Set ==
    /// Stores a value, evicting least recently used entries as needed.
    ///
    /// An entry larger than the whole budget is accepted and immediately
    /// evicted along with everything else.
    pub fn set(&mut self, key: String, value: ByteView) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        self.lru.add(key, value);
        Ok(())
    }

    // == Get ==
    /// Retrieves a value and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Result<ByteView> {
        match self.lru.get(key) {
            Some(value) => {
                let value = value.clone();
                self.stats.record_hit();
                Ok(value)
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Not counted as an eviction.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.lru
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Evict Oldest ==
    /// Evicts the least recently used entry and returns its key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (key, _) = self.lru.peek_oldest()?;
        let key = key.to_string();
        self.lru.remove_oldest();
        Some(key)
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.evictions = self.evictions.load(Ordering::Relaxed);
        stats.total_entries = self.lru.len();
        stats.used_bytes = self.lru.used_bytes();
        stats
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }
}
