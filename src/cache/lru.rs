//! LRU Store Module
//!
//! Byte-bounded least-recently-used store. Entries are kept in a
//! [`RecencyList`] (front = most recently used) and indexed by key, so lookup,
//! promotion, insertion and eviction are all O(1).
//!
//! The store is not synchronized. Callers sharing it across tasks must wrap it
//! in their own lock.

use std::collections::HashMap;
use std::fmt;

use crate::cache::list::{RecencyList, SlotId};
use crate::cache::ByteLen;

/// Callback invoked with each entry evicted under capacity pressure.
///
/// It runs synchronously inside [`LruStore::add`] / [`LruStore::remove_oldest`],
/// after the store's accounting already excludes the entry. The callback is
/// owned by the store and receives owned data, so it cannot call back into
/// the store.
pub type EvictCallback<V> = Box<dyn FnMut(String, V) + Send + Sync>;

#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
}

/// Bytes an entry charges against the budget: key length plus value length.
pub fn entry_size<V: ByteLen>(key: &str, value: &V) -> usize {
    key.len() + value.byte_len()
}

// == LRU Store ==
/// Least-recently-used store bounded by the total byte size of its entries.
///
/// Once `used_bytes` exceeds `max_bytes`, entries are evicted from the
/// least-recently-used end until the store fits again. An entry that alone
/// exceeds the budget is evicted as well, leaving the store empty.
pub struct LruStore<V: ByteLen> {
    /// Recency order, sole owner of the entries
    order: RecencyList<Entry<V>>,
    /// Key -> slot of its node in `order`
    index: HashMap<String, SlotId>,
    max_bytes: usize,
    /// Sum of `entry_size` over live entries
    used_bytes: usize,
    on_evict: Option<EvictCallback<V>>,
}

impl<V: ByteLen> LruStore<V> {
    // == Constructors ==
    /// Creates an empty store with a byte budget and no eviction callback.
    ///
    /// A budget of `0` is honoured literally: any non-empty entry is evicted
    /// by the same `add` that inserted it.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            order: RecencyList::new(),
            index: HashMap::new(),
            max_bytes,
            used_bytes: 0,
            on_evict: None,
        }
    }

    /// Creates an empty store that reports capacity evictions to `on_evict`.
    pub fn with_evict_callback<F>(max_bytes: usize, on_evict: F) -> Self
    where
        F: FnMut(String, V) + Send + Sync + 'static,
    {
        let mut store = Self::new(max_bytes);
        store.on_evict = Some(Box::new(on_evict));
        store
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    ///
    /// A miss has no side effects.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.move_to_front(id);
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Looks up a key without touching its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Returns the next eviction candidate without removing it.
    pub fn peek_oldest(&self) -> Option<(&str, &V)> {
        let entry = self.order.get(self.order.back_id()?)?;
        Some((entry.key.as_str(), &entry.value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Add ==
    /// Inserts or updates an entry, then evicts until the budget holds.
    ///
    /// An existing key keeps its node: the value is replaced in place, the
    /// byte count is adjusted by the size difference and the entry is
    /// promoted to most recently used.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                let old_len = entry.value.byte_len();
                let new_len = value.byte_len();
                entry.value = value;
                self.used_bytes = self.used_bytes - old_len + new_len;
            }
            self.order.move_to_front(id);
        } else {
            self.used_bytes += entry_size(&key, &value);
            let id = self.order.push_front(Entry {
                key: key.clone(),
                value,
            });
            self.index.insert(key, id);
        }

        while self.used_bytes > self.max_bytes && !self.order.is_empty() {
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, if any, and reports it to the
    /// eviction callback.
    pub fn remove_oldest(&mut self) {
        if let Some((key, value)) = self.pop_oldest() {
            if let Some(on_evict) = self.on_evict.as_mut() {
                on_evict(key, value);
            }
        }
    }

    /// Detaches the least recently used entry and hands it to the caller.
    ///
    /// Unlike [`remove_oldest`](Self::remove_oldest) this does not invoke the
    /// eviction callback.
    pub fn pop_oldest(&mut self) -> Option<(String, V)> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        self.used_bytes -= entry_size(&entry.key, &entry.value);
        Some((entry.key, entry.value))
    }

    // == Remove ==
    /// Removes a single key. The eviction callback is not invoked.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.order.remove(id)?;
        self.used_bytes -= entry_size(&entry.key, &entry.value);
        Some(entry.value)
    }

    // == Accessors ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|entry| entry.key.as_str())
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        self.order.debug_validate_invariants();
        assert_eq!(self.index.len(), self.order.len());

        let mut total = 0;
        for entry in self.order.iter() {
            let id = self.index.get(&entry.key).expect("key missing from index");
            assert_eq!(
                self.order.get(*id).map(|e| e.key.as_str()),
                Some(entry.key.as_str())
            );
            total += entry_size(&entry.key, &entry.value);
        }
        assert_eq!(total, self.used_bytes);
    }
}

impl<V: ByteLen> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("has_evict_callback", &self.on_evict.is_some())
            .finish()
    }
}
