//! Cache-aware orchestrator.
//!
//! An [`Orchestrator`] turns a stream of keys into slot states. For every key
//! it either serves the value from its [`CacheScope`] or issues the operation
//! through its [`RequestTracker`]. A successful operation stores its value in
//! the scope before the tracker sees the result, so by the time a consumer
//! observes `Resolved` the value is already cached.

use std::fmt;
use std::sync::Arc;

use slotbox_core::{AsyncState, Operation, RequestToken, SlotKey, Spawner};
use tokio::sync::watch;
use tracing::debug;

use crate::config::{CachePolicy, SlotConfig};
use crate::metrics;
use crate::observer::Observer;
use crate::scope::CacheScope;
use crate::spawner::TokioSpawner;
use crate::tracker::RequestTracker;

/// What [`Orchestrator::observe`] did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// No usable key; the slot was reset.
    Idle,
    /// The value was served from the cache.
    Hit,
    /// The operation was issued under this token.
    Issued(RequestToken),
}

impl Observed {
    /// Token of the issued operation, if one was issued.
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Observed::Issued(token) => Some(*token),
            Observed::Idle | Observed::Hit => None,
        }
    }
}

/// Drives a slot from keys, with a shared cache in front of the operation.
///
/// ```
/// use slotbox::{CacheScope, Observed, Orchestrator};
/// use slotbox_memory::MemoryCache;
///
/// async fn lookup(name: String) -> Result<usize, String> {
///     Ok(name.len())
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scope = CacheScope::new(MemoryCache::new());
/// let orchestrator = Orchestrator::new(scope, lookup);
///
/// assert!(matches!(orchestrator.observe("ditto".to_string()), Observed::Issued(_)));
/// assert_eq!(orchestrator.settled().await.data(), Some(&5));
///
/// assert_eq!(orchestrator.observe("ditto".to_string()), Observed::Hit);
/// # }
/// ```
pub struct Orchestrator<K, O, S = TokioSpawner>
where
    O: Operation<K>,
{
    tracker: RequestTracker<O::Output, O::Error, S>,
    scope: CacheScope<K, O::Output>,
    operation: Arc<O>,
    cache_policy: CachePolicy,
}

impl<K, O> Orchestrator<K, O, TokioSpawner>
where
    K: SlotKey,
    O: Operation<K>,
    O::Output: Clone + Send + Sync + 'static,
    O::Error: Send + Sync + 'static,
{
    /// Creates an orchestrator with default configuration.
    pub fn new(scope: CacheScope<K, O::Output>, operation: O) -> Self {
        Self::with_config(&SlotConfig::default(), scope, operation)
    }

    /// Creates an orchestrator from `config`.
    pub fn with_config(config: &SlotConfig, scope: CacheScope<K, O::Output>, operation: O) -> Self {
        Self::with_spawner(config, scope, operation, TokioSpawner::default())
    }
}

impl<K, O, S> Orchestrator<K, O, S>
where
    K: SlotKey,
    O: Operation<K>,
    O::Output: Clone + Send + Sync + 'static,
    O::Error: Send + Sync + 'static,
    S: Spawner,
{
    /// Creates an orchestrator running its operations on `spawner`.
    pub fn with_spawner(
        config: &SlotConfig,
        scope: CacheScope<K, O::Output>,
        operation: O,
        spawner: S,
    ) -> Self {
        Self {
            tracker: RequestTracker::with_spawner(config, spawner),
            scope,
            operation: Arc::new(operation),
            cache_policy: config.cache,
        }
    }

    /// Moves the slot to the state for `key`.
    ///
    /// - no key, or an empty one: the slot is reset to `Idle`
    /// - a cached key: the slot resolves immediately and no operation runs;
    ///   this is reported as a change even if the slot already held the value
    /// - otherwise the operation is issued and the slot becomes `Pending`
    ///
    /// In every case a previously outstanding operation is superseded.
    pub fn observe(&self, key: impl Into<Option<K>>) -> Observed {
        let label = self.tracker.label();
        let Some(key) = key.into().filter(|key| !key.is_empty()) else {
            debug!(slot = %label, "no key, resetting slot");
            self.tracker.reset();
            return Observed::Idle;
        };

        if !self.cache_policy.is_enabled() {
            let token = RequestToken::mint();
            debug!(slot = %label, ?key, %token, "cache disabled, issuing operation");
            self.tracker.issue(token, self.operation.call(key));
            return Observed::Issued(token);
        }

        let cached = self.scope.get(&key);
        metrics::record_cache_lookup(label, cached.is_some());
        if let Some(data) = cached {
            debug!(slot = %label, ?key, "cache hit");
            self.tracker.set_data(data);
            return Observed::Hit;
        }

        let token = RequestToken::mint();
        debug!(slot = %label, ?key, %token, "cache miss, issuing operation");
        self.scope.claim(&key, token);

        let future = self.operation.call(key.clone());
        let scope = self.scope.clone();
        self.tracker.issue(token, async move {
            let result = future.await;
            match &result {
                Ok(data) => {
                    scope.commit(key, token, data.clone());
                }
                Err(_) => scope.release(&key, token),
            }
            result
        });
        Observed::Issued(token)
    }

    /// Returns the slot to `Idle`, superseding any outstanding operation.
    pub fn reset(&self) {
        self.tracker.reset();
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AsyncState<O::Output, O::Error> {
        self.tracker.state()
    }

    /// Receiver notified of every state change.
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<O::Output, O::Error>> {
        self.tracker.subscribe()
    }

    /// Registers an observer called on every state change.
    pub fn add_observer(&self, observer: impl Observer<O::Output, O::Error>) {
        self.tracker.add_observer(observer);
    }

    /// Waits until no operation is outstanding and returns the state.
    pub async fn settled(&self) -> AsyncState<O::Output, O::Error> {
        self.tracker.settled().await
    }

    /// Read-only view of the shared cache.
    pub fn cache(&self) -> &CacheScope<K, O::Output> {
        &self.scope
    }

    /// The tracker owning the slot.
    pub fn tracker(&self) -> &RequestTracker<O::Output, O::Error, S> {
        &self.tracker
    }
}

impl<K, O, S> Clone for Orchestrator<K, O, S>
where
    O: Operation<K>,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
            scope: self.scope.clone(),
            operation: Arc::clone(&self.operation),
            cache_policy: self.cache_policy,
        }
    }
}

impl<K, O, S> fmt::Debug for Orchestrator<K, O, S>
where
    K: SlotKey,
    O: Operation<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tracker", &self.tracker)
            .field("scope", &self.scope)
            .field("cache_policy", &self.cache_policy)
            .finish_non_exhaustive()
    }
}
