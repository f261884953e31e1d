//! Bounded insertion-ordered cache.
//!
//! Eviction removes the entry inserted earliest, regardless of how recently it was read.
//! Re-inserting an existing key replaces its value but keeps its original position.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::trace;

use super::types::CacheEntry;

struct FifoState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    order: VecDeque<K>,
    next_order: u64,
}

impl<K, V> FifoState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_order: 0,
        }
    }

    /// Stores `value` unless `key` is present. Returns the evicted key, if any.
    fn store(&mut self, capacity: usize, key: K, value: V) -> Option<K> {
        if capacity == 0 || self.entries.contains_key(&key) {
            return None;
        }

        let evicted = if self.entries.len() >= capacity {
            self.order.pop_front().inspect(|oldest| {
                self.entries.remove(oldest);
            })
        } else {
            None
        };

        let insertion_order = self.next_order;
        self.next_order += 1;
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                value,
                insertion_order,
            },
        );

        evicted
    }
}

pub struct FifoCache<K, V> {
    capacity: usize,
    state: Mutex<FifoState<K, V>>,
}

impl<K, V> FifoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries. Capacity 0 stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(FifoState::new()),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    pub fn entry(&self, key: &K) -> Option<CacheEntry<V>> {
        self.state.lock().entries.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Inserts or replaces `key`. Returns the key evicted to make room, if any.
    pub fn insert(&self, key: K, value: V) -> Option<K> {
        let mut state = self.state.lock();
        if let Some(existing) = state.entries.get_mut(&key) {
            existing.value = value;
            return None;
        }
        state.store(self.capacity, key, value)
    }

    /// Returns the cached value or computes, stores and returns it under one lock.
    ///
    /// `compute` runs with the lock held; keep it short.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut state = self.state.lock();
        if let Some(entry) = state.entries.get(&key) {
            return entry.value.clone();
        }

        let value = compute();
        state.store(self.capacity, key, value.clone());
        value
    }

    /// Async, fallible variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// The lookup and the insert each take the lock, the computation does not. Concurrent
    /// misses on one key may both compute; the first value stored wins and is returned to
    /// both. Errors are returned as-is and never stored.
    ///
    /// Returns the value and whether it came from the cache.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok((value, true));
        }

        let computed = compute().await?;

        let mut state = self.state.lock();
        if let Some(entry) = state.entries.get(&key) {
            trace!("Concurrent computation already stored this key");
            return Ok((entry.value.clone(), false));
        }
        state.store(self.capacity, key, computed.clone());
        Ok((computed, false))
    }

    /// Empties the cache and returns how many entries were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.entries.len();
        state.entries.clear();
        state.order.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current keys, earliest inserted first.
    pub fn keys(&self) -> Vec<K> {
        self.state.lock().order.iter().cloned().collect()
    }
}

impl<K, V> std::fmt::Debug for FifoCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.state.lock().entries.len())
            .finish()
    }
}
