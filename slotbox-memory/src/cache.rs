//! DashMap-backed cache implementation.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use slotbox_core::{CacheEntry, KeyedCache, Label};
use tracing::trace;

/// Unbounded in-memory cache.
///
/// Cloning is cheap: every clone shares the same underlying map, which makes
/// a single `MemoryCache` suitable as the shared store of several
/// orchestrators.
///
/// # Examples
///
/// ```
/// use slotbox_core::KeyedCache;
/// use slotbox_memory::MemoryCache;
///
/// let cache = MemoryCache::new();
/// cache.set("pikachu".to_string(), 25u32);
///
/// assert_eq!(cache.get(&"pikachu".to_string()), Some(25));
/// assert_eq!(cache.keys(), vec!["pikachu".to_string()]);
/// ```
///
/// # Caveats
///
/// - Data is **not persisted** and is lost on process exit
/// - Memory grows with the number of distinct keys; there is no eviction
#[derive(Debug)]
pub struct MemoryCache<K, T>
where
    K: Eq + Hash,
{
    store: Arc<DashMap<K, CacheEntry<T>>>,
    label: Label,
}

impl<K, T> Clone for MemoryCache<K, T>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            label: self.label.clone(),
        }
    }
}

impl<K, T> MemoryCache<K, T>
where
    K: Eq + Hash,
{
    /// Creates an empty cache labelled `"memory"`.
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            label: Label::new_static("memory"),
        }
    }

    /// Sets the label reported in logs and metrics.
    pub fn with_label(self, label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }
}

impl<K, T> MemoryCache<K, T>
where
    K: Eq + Hash,
    T: Clone,
{
    /// Returns the full entry, including its insertion time.
    pub fn entry(&self, key: &K) -> Option<CacheEntry<T>> {
        self.store.get(key).map(|entry| entry.clone())
    }
}

impl<K, T> Default for MemoryCache<K, T>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> KeyedCache<K, T> for MemoryCache<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync,
    T: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<T> {
        self.store.get(key).map(|entry| entry.value().value().clone())
    }

    fn set(&self, key: K, value: T) {
        trace!(cache = %self.label, ?key, "storing entry");
        self.store.insert(key, CacheEntry::new(value));
    }

    fn keys(&self) -> Vec<K> {
        self.store.iter().map(|entry| entry.key().clone()).collect()
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn contains(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    fn label(&self) -> Label {
        self.label.clone()
    }
}
