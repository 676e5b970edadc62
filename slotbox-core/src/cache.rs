//! Keyed cache trait and entry type.
//!
//! A [`KeyedCache`] maps keys to values that an operation already produced,
//! so a repeated request for a known key resolves without issuing new work.
//!
//! The cache is deliberately simple:
//!
//! - **No eviction** - entries live as long as the cache itself
//! - **No TTL** - a stored value never goes stale
//! - **Last write wins** - writing an existing key replaces its value
//!
//! Deciding *which* results may be written is the orchestrator's job; the
//! cache only stores what it is given.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::label::Label;

/// A value stored in a cache together with its insertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    value: T,
    inserted_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Wraps `value`, stamping it with the current time.
    pub fn new(value: T) -> Self {
        Self {
            value,
            inserted_at: Utc::now(),
        }
    }

    /// Returns a reference to the stored value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns when the value was written.
    #[inline]
    pub fn inserted_at(&self) -> DateTime<Utc> {
        self.inserted_at
    }

    /// Consumes the entry and returns the value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Key-addressed store of resolved values.
///
/// Implementations must be safe to share between several orchestrators.
/// Lookups are expected to be O(1).
pub trait KeyedCache<K, T>: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &K) -> Option<T>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: K, value: T);

    /// Returns every key currently stored, in no particular order.
    fn keys(&self) -> Vec<K>;

    /// Returns the number of stored entries.
    fn len(&self) -> usize {
        self.keys().len()
    }

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is stored.
    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the label of this cache used in logs and metrics.
    fn label(&self) -> Label {
        Label::new_static("cache")
    }
}

impl<K, T, C> KeyedCache<K, T> for &C
where
    C: KeyedCache<K, T> + ?Sized,
{
    fn get(&self, key: &K) -> Option<T> {
        (**self).get(key)
    }

    fn set(&self, key: K, value: T) {
        (**self).set(key, value)
    }

    fn keys(&self) -> Vec<K> {
        (**self).keys()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }

    fn label(&self) -> Label {
        (**self).label()
    }
}

impl<K, T, C> KeyedCache<K, T> for Box<C>
where
    C: KeyedCache<K, T> + ?Sized,
{
    fn get(&self, key: &K) -> Option<T> {
        (**self).get(key)
    }

    fn set(&self, key: K, value: T) {
        (**self).set(key, value)
    }

    fn keys(&self) -> Vec<K> {
        (**self).keys()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }

    fn label(&self) -> Label {
        (**self).label()
    }
}

impl<K, T, C> KeyedCache<K, T> for Arc<C>
where
    C: KeyedCache<K, T> + ?Sized,
{
    fn get(&self, key: &K) -> Option<T> {
        (**self).get(key)
    }

    fn set(&self, key: K, value: T) {
        (**self).set(key, value)
    }

    fn keys(&self) -> Vec<K> {
        (**self).keys()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }

    fn label(&self) -> Label {
        (**self).label()
    }
}
