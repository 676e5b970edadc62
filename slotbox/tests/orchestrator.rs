//! Tests for the orchestrator: cache fast path, cache population and
//! staleness across shared scopes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use slotbox::{
    AsyncState, CachePolicy, CacheScope, Observed, Operation, Orchestrator, SlotConfig, Status,
};
use slotbox_memory::MemoryCache;
use tokio::time::sleep;

/// Looks pokemon up by name and counts how often it was asked.
#[derive(Clone, Default)]
struct Pokedex {
    calls: Arc<AtomicUsize>,
}

impl Pokedex {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Operation<String> for Pokedex {
    type Output = u32;
    type Error = String;
    type Future = BoxFuture<'static, Result<u32, String>>;

    fn call(&self, name: String) -> Self::Future {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let (delay, result) = match name.as_str() {
                "bulbasaur" => (50, Ok(1)),
                "pikachu" => (50, Ok(25)),
                "slowpoke" => (300, Ok(79)),
                "ditto" => (50, Ok(132)),
                "eevee" => (50, Ok(133)),
                other => (10, Err(format!("{other} is not in the pokedex"))),
            };
            sleep(Duration::from_millis(delay)).await;
            result
        }
        .boxed()
    }
}

/// Returns the call number as value; the first call is the slowest.
#[derive(Clone, Default)]
struct Versioned {
    calls: Arc<AtomicUsize>,
}

impl Operation<String> for Versioned {
    type Output = usize;
    type Error = String;
    type Future = BoxFuture<'static, Result<usize, String>>;

    fn call(&self, _key: String) -> Self::Future {
        let version = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = if version == 1 { 300 } else { 50 };
        async move {
            sleep(Duration::from_millis(delay)).await;
            Ok(version)
        }
        .boxed()
    }
}

fn scope<T>() -> CacheScope<String, T>
where
    T: Clone + Send + Sync + 'static,
{
    CacheScope::new(MemoryCache::new())
}

fn key(name: &str) -> String {
    name.to_string()
}

#[tokio::test(start_paused = true)]
async fn miss_issues_exactly_once() {
    let pokedex = Pokedex::default();
    let orchestrator = Orchestrator::new(scope(), pokedex.clone());

    let observed = orchestrator.observe(key("bulbasaur"));
    assert!(matches!(observed, Observed::Issued(_)));
    assert_eq!(orchestrator.state().token(), observed.token());

    assert_eq!(orchestrator.settled().await, AsyncState::Resolved { data: 1 });
    assert_eq!(pokedex.calls(), 1);
    assert_eq!(orchestrator.cache().get(&key("bulbasaur")), Some(1));
}

#[tokio::test(start_paused = true)]
async fn hit_skips_operation() {
    let pokedex = Pokedex::default();
    let orchestrator = Orchestrator::new(scope(), pokedex.clone());

    orchestrator.observe(key("pikachu"));
    orchestrator.settled().await;
    orchestrator.reset();

    assert_eq!(orchestrator.observe(key("pikachu")), Observed::Hit);
    // Resolved synchronously, without a pending phase.
    assert_eq!(orchestrator.state(), AsyncState::Resolved { data: 25 });
    assert_eq!(pokedex.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn ditto_resolves_then_hits() {
    let pokedex = Pokedex::default();
    let orchestrator = Orchestrator::new(scope(), pokedex.clone());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    orchestrator.add_observer(move |state: &AsyncState<u32, String>| {
        sink.lock().unwrap().push(state.clone());
    });

    let token = orchestrator.observe(key("ditto")).token().unwrap();
    orchestrator.settled().await;
    assert_eq!(orchestrator.observe(key("ditto")), Observed::Hit);

    // The hit is reported again although the value did not change.
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            AsyncState::Pending { token },
            AsyncState::Resolved { data: 132 },
            AsyncState::Resolved { data: 132 },
        ]
    );
    assert_eq!(pokedex.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn cache_is_written_before_success_is_signalled() {
    let orchestrator = Orchestrator::new(scope(), Pokedex::default());
    let cache = orchestrator.cache().clone();
    let cached_on_resolve = Arc::new(Mutex::new(Vec::new()));
    let sink = cached_on_resolve.clone();
    orchestrator.add_observer(move |state: &AsyncState<u32, String>| {
        if state.is_resolved() {
            sink.lock().unwrap().push(cache.contains(&key("eevee")));
        }
    });

    orchestrator.observe(key("eevee"));
    orchestrator.settled().await;

    assert_eq!(*cached_on_resolve.lock().unwrap(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn failure_leaves_key_uncached() {
    let pokedex = Pokedex::default();
    let orchestrator = Orchestrator::new(scope(), pokedex.clone());

    orchestrator.observe(key("missingno"));
    let state = orchestrator.settled().await;

    assert_eq!(state.status(), Status::Rejected);
    assert_eq!(
        state.error().map(|error| error.as_str()),
        Some("missingno is not in the pokedex")
    );
    assert!(orchestrator.cache().is_empty());

    // Still cacheable on the next attempt.
    assert!(matches!(
        orchestrator.observe(key("missingno")),
        Observed::Issued(_)
    ));
    assert_eq!(pokedex.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn empty_key_resets_without_issuing() {
    let pokedex = Pokedex::default();
    let orchestrator = Orchestrator::new(scope(), pokedex.clone());

    assert_eq!(orchestrator.observe(String::new()), Observed::Idle);
    assert_eq!(orchestrator.observe(None::<String>), Observed::Idle);

    assert_eq!(orchestrator.state(), AsyncState::Idle);
    assert_eq!(pokedex.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn clearing_the_key_discards_outstanding_operation() {
    let orchestrator = Orchestrator::new(scope(), Pokedex::default());

    orchestrator.observe(key("slowpoke"));
    assert_eq!(orchestrator.observe(None::<String>), Observed::Idle);

    sleep(Duration::from_millis(400)).await;

    assert_eq!(orchestrator.state(), AsyncState::Idle);
    // The value itself is still valid for its key.
    assert_eq!(orchestrator.cache().get(&key("slowpoke")), Some(79));
}

#[tokio::test(start_paused = true)]
async fn switching_keys_applies_latest_and_caches_both() {
    let orchestrator = Orchestrator::new(scope(), Pokedex::default());

    orchestrator.observe(key("slowpoke"));
    orchestrator.observe(key("pikachu"));

    assert_eq!(orchestrator.settled().await.data(), Some(&25));

    sleep(Duration::from_millis(400)).await;

    assert_eq!(orchestrator.state(), AsyncState::Resolved { data: 25 });
    let mut keys = orchestrator.cache().keys();
    keys.sort();
    assert_eq!(keys, vec![key("pikachu"), key("slowpoke")]);
}

#[tokio::test(start_paused = true)]
async fn shared_scope_serves_other_orchestrators() {
    let shared = scope();
    let first_pokedex = Pokedex::default();
    let second_pokedex = Pokedex::default();
    let first = Orchestrator::new(shared.clone(), first_pokedex.clone());
    let second = Orchestrator::new(shared.clone(), second_pokedex.clone());

    first.observe(key("pikachu"));
    first.settled().await;

    assert_eq!(second.observe(key("pikachu")), Observed::Hit);
    assert_eq!(second.state().data(), Some(&25));
    assert_eq!(first_pokedex.calls(), 1);
    assert_eq!(second_pokedex.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn stale_duplicate_does_not_overwrite_cache() {
    let shared = scope();
    let operation = Versioned::default();
    let first = Orchestrator::new(shared.clone(), operation.clone());
    let second = Orchestrator::new(shared.clone(), operation.clone());

    // Version 1 is slow, version 2 was issued later for the same key.
    first.observe(key("eevee"));
    second.observe(key("eevee"));

    assert_eq!(second.settled().await.data(), Some(&2));
    assert_eq!(shared.get(&key("eevee")), Some(2));

    assert_eq!(first.settled().await.data(), Some(&1));
    assert_eq!(shared.get(&key("eevee")), Some(2));
}

#[tokio::test(start_paused = true)]
async fn disabled_cache_always_issues() {
    let pokedex = Pokedex::default();
    let shared = scope();
    let config = SlotConfig::builder()
        .label("uncached")
        .cache(CachePolicy::Disabled)
        .build();
    let orchestrator = Orchestrator::with_config(&config, shared.clone(), pokedex.clone());

    orchestrator.observe(key("pikachu"));
    orchestrator.settled().await;
    assert!(matches!(
        orchestrator.observe(key("pikachu")),
        Observed::Issued(_)
    ));
    orchestrator.settled().await;

    assert_eq!(pokedex.calls(), 2);
    assert!(shared.is_empty());
    assert_eq!(orchestrator.tracker().label().as_str(), "uncached");
}

#[tokio::test(start_paused = true)]
async fn previously_seen_keys_are_listed() {
    let orchestrator = Orchestrator::new(scope(), Pokedex::default());

    for name in ["pikachu", "ditto", "missingno", "bulbasaur"] {
        orchestrator.observe(key(name));
        orchestrator.settled().await;
    }

    let mut keys = orchestrator.cache().keys();
    keys.sort();
    assert_eq!(keys, vec![key("bulbasaur"), key("ditto"), key("pikachu")]);
    assert_eq!(orchestrator.cache().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn subscribers_follow_orchestrated_state() {
    let orchestrator = Orchestrator::new(scope(), Pokedex::default());
    let mut receiver = orchestrator.subscribe();

    orchestrator.observe(key("bulbasaur"));
    let state = receiver
        .wait_for(|state| state.is_resolved())
        .await
        .unwrap()
        .clone();

    assert_eq!(state, AsyncState::Resolved { data: 1 });
}

#[tokio::test(start_paused = true)]
async fn claims_are_released_once_operations_finish() {
    let orchestrator = Orchestrator::new(scope(), Pokedex::default());

    for i in 0..100 {
        orchestrator.observe(format!("typo{i}"));
    }
    orchestrator.observe(key("pikachu"));
    orchestrator.observe(key("slowpoke"));
    assert_eq!(orchestrator.cache().in_flight(), 102);

    sleep(Duration::from_millis(400)).await;

    assert_eq!(orchestrator.cache().in_flight(), 0);
    let mut keys = orchestrator.cache().keys();
    keys.sort();
    assert_eq!(keys, vec![key("pikachu"), key("slowpoke")]);
}

#[tokio::test(start_paused = true)]
async fn observer_can_clear_the_key_on_failure() {
    let pokedex = Pokedex::default();
    let orchestrator = Orchestrator::new(scope(), pokedex.clone());
    let handle = orchestrator.clone();
    orchestrator.add_observer(move |state: &AsyncState<u32, String>| {
        if state.is_rejected() {
            handle.observe(String::new());
        }
    });

    orchestrator.observe(key("missingno"));
    sleep(Duration::from_millis(50)).await;

    assert_eq!(orchestrator.state(), AsyncState::Idle);
    assert_eq!(pokedex.calls(), 1);
    assert_eq!(orchestrator.cache().in_flight(), 0);
}
