//! Shared cache scope.
//!
//! A [`CacheScope`] wraps a [`KeyedCache`] so that several orchestrators can
//! share it. Besides the cache itself, the scope remembers which operation was
//! issued last for every key. A successful operation only writes its value if
//! it is still that operation, so an older duplicate request finishing late
//! never overwrites the value of a newer one.
//!
//! Outside of this crate the scope is read-only.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use slotbox_core::{KeyedCache, Label, RequestToken, SlotKey};
use tracing::{debug, trace};

struct ScopeInner<K, T> {
    cache: Box<dyn KeyedCache<K, T>>,
    issued: DashMap<K, RequestToken>,
}

/// Cache shared by a group of orchestrators.
///
/// Cloning is cheap and yields a handle to the same scope.
///
/// ```
/// use slotbox::CacheScope;
/// use slotbox_memory::MemoryCache;
///
/// let scope: CacheScope<String, u32> = CacheScope::new(MemoryCache::new());
/// assert!(scope.is_empty());
/// assert_eq!(scope.label().as_str(), "memory");
/// ```
pub struct CacheScope<K, T> {
    inner: Arc<ScopeInner<K, T>>,
}

impl<K, T> CacheScope<K, T>
where
    K: SlotKey,
{
    /// Creates a scope around `cache`.
    pub fn new(cache: impl KeyedCache<K, T> + 'static) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                cache: Box::new(cache),
                issued: DashMap::new(),
            }),
        }
    }

    /// Returns the value cached for `key`.
    pub fn get(&self, key: &K) -> Option<T> {
        self.inner.cache.get(key)
    }

    /// Returns `true` if a value is cached for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.cache.contains(key)
    }

    /// Every key with a cached value, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.inner.cache.keys()
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.inner.cache.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.cache.is_empty()
    }

    /// Label of the underlying cache.
    pub fn label(&self) -> Label {
        self.inner.cache.label()
    }

    /// Number of keys with an operation still in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.issued.len()
    }

    /// Records `token` as the latest operation issued for `key`.
    pub(crate) fn claim(&self, key: &K, token: RequestToken) {
        trace!(?key, %token, "claiming cache key");
        self.inner.issued.insert(key.clone(), token);
    }

    /// Stores `value` if `token` is still the latest claim for `key`, then
    /// releases the claim.
    ///
    /// Returns `true` if the value was written.
    pub(crate) fn commit(&self, key: K, token: RequestToken, value: T) -> bool {
        let written = {
            // The claim stays read-locked during the write so that a concurrent
            // claim for the same key lands strictly before or after it.
            let Some(latest) = self.inner.issued.get(&key) else {
                return false;
            };
            if *latest == token {
                self.inner.cache.set(key.clone(), value);
                true
            } else {
                debug!(?key, %token, latest = %*latest, "skipping cache write of superseded operation");
                false
            }
        };
        self.release(&key, token);
        written
    }

    /// Drops the claim of `token` on `key`, unless a newer one replaced it.
    pub(crate) fn release(&self, key: &K, token: RequestToken) {
        self.inner
            .issued
            .remove_if(key, |_, latest| *latest == token);
    }
}

impl<K, T> Clone for CacheScope<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, T> fmt::Debug for CacheScope<K, T>
where
    K: SlotKey,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheScope")
            .field("cache", &self.inner.cache.label())
            .field("in_flight", &self.inner.issued.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct MapCache(Mutex<HashMap<&'static str, u32>>);

    impl KeyedCache<&'static str, u32> for MapCache {
        fn get(&self, key: &&'static str) -> Option<u32> {
            self.0.lock().unwrap().get(key).copied()
        }

        fn set(&self, key: &'static str, value: u32) {
            self.0.lock().unwrap().insert(key, value);
        }

        fn keys(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().keys().copied().collect()
        }
    }

    #[test]
    fn commit_without_claim_is_rejected() {
        let scope = CacheScope::new(MapCache::default());
        assert!(!scope.commit("eevee", RequestToken::mint(), 133));
        assert!(scope.is_empty());
    }

    #[test]
    fn latest_claim_wins() {
        let scope = CacheScope::new(MapCache::default());
        let older = RequestToken::mint();
        let newer = RequestToken::mint();

        scope.claim(&"eevee", older);
        scope.claim(&"eevee", newer);

        assert!(!scope.commit("eevee", older, 0));
        assert_eq!(scope.in_flight(), 1);
        assert!(scope.commit("eevee", newer, 133));
        assert_eq!(scope.get(&"eevee"), Some(133));
        assert_eq!(scope.in_flight(), 0);
    }

    #[test]
    fn release_keeps_newer_claim() {
        let scope = CacheScope::new(MapCache::default());
        let older = RequestToken::mint();
        let newer = RequestToken::mint();

        scope.claim(&"eevee", older);
        scope.claim(&"eevee", newer);
        scope.release(&"eevee", older);
        assert_eq!(scope.in_flight(), 1);

        scope.release(&"eevee", newer);
        assert_eq!(scope.in_flight(), 0);
        assert!(!scope.commit("eevee", newer, 133));
    }

    #[test]
    fn claims_are_per_key() {
        let scope = CacheScope::new(MapCache::default());
        let first = RequestToken::mint();
        let second = RequestToken::mint();

        scope.claim(&"eevee", first);
        scope.claim(&"mew", second);

        assert!(scope.commit("eevee", first, 133));
        assert!(scope.commit("mew", second, 151));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn clones_share_claims() {
        let scope = CacheScope::new(MapCache::default());
        let other = scope.clone();
        let token = RequestToken::mint();

        scope.claim(&"mew", token);
        assert!(other.commit("mew", token, 151));
        assert!(scope.contains(&"mew"));
    }

    #[test]
    fn debug_reports_in_flight_claims() {
        let scope = CacheScope::new(MapCache::default());
        scope.claim(&"mew", RequestToken::mint());
        assert_eq!(
            format!("{scope:?}"),
            r#"CacheScope { cache: Label("cache"), in_flight: 1 }"#
        );
    }
}
