//! Request tracker.
//!
//! A [`RequestTracker`] owns one slot: an [`AsyncState`] plus the machinery
//! that drives it from spawned operations. Every call to
//! [`run`](RequestTracker::run) mints a fresh [`RequestToken`] and moves the
//! slot to `Pending`. When the operation finishes, its result is applied only
//! if its token is still the pending one; anything else is a stale completion
//! and is discarded.
//!
//! Spawned operations hold a weak reference to the slot. Once every handle to
//! the tracker has been dropped, completions arriving later do nothing.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use slotbox_core::{AsyncState, Event, Label, Outcome, RequestToken, Spawner, Status};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{Instrument, debug, info_span, trace, warn};

use crate::config::SlotConfig;
use crate::metrics;
use crate::observer::Observer;
use crate::spawner::TokioSpawner;

type Observers<T, E> = Vec<Arc<dyn Observer<T, E>>>;

struct Slot<T, E> {
    label: Label,
    slow_threshold: Option<Duration>,
    state: watch::Sender<AsyncState<T, E>>,
    observers: Mutex<Observers<T, E>>,
    outbox: Mutex<Outbox<T, E>>,
}

/// Changed states waiting to be reported to observers.
///
/// States are queued in transition order while the state lock is held and
/// delivered by a single drainer at a time, with no lock held. A transition
/// caused from inside an observer is queued behind the one being reported.
struct Outbox<T, E> {
    queue: VecDeque<AsyncState<T, E>>,
    draining: bool,
}

impl<T, E> Slot<T, E>
where
    T: Clone + 'static,
    E: 'static,
{
    fn dispatch(&self, event: Event<T, E>) -> Outcome {
        let name = event.name();
        let token = event.token();
        let observed = !self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty();

        let mut outcome = Outcome::Unchanged;
        self.state.send_if_modified(|state| {
            outcome = state.apply(event);
            if outcome.is_changed() && observed {
                self.outbox
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .queue
                    .push_back(state.clone());
            }
            outcome.is_changed()
        });

        match outcome {
            Outcome::Changed => {
                debug!(slot = %self.label, event = name, ?token, "slot transition");
            }
            Outcome::Unchanged => {
                trace!(slot = %self.label, event = name, "slot unchanged");
            }
            Outcome::Stale => {
                trace!(slot = %self.label, event = name, ?token, "discarding stale completion");
                metrics::record_stale(&self.label);
            }
        }

        if outcome.is_changed() && observed {
            self.notify();
        }
        outcome
    }

    /// Reports queued states unless another call is already doing so.
    fn notify(&self) {
        {
            let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }
        let mut guard = DrainGuard {
            outbox: &self.outbox,
            armed: true,
        };

        loop {
            let state = {
                let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
                match outbox.queue.pop_front() {
                    Some(state) => state,
                    None => {
                        outbox.draining = false;
                        guard.armed = false;
                        return;
                    }
                }
            };
            let observers = self
                .observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for observer in &observers {
                observer.on_change(&self.label, &state);
            }
        }
    }
}

/// Hands draining back if an observer panics.
struct DrainGuard<'a, T, E> {
    outbox: &'a Mutex<Outbox<T, E>>,
    armed: bool,
}

impl<T, E> Drop for DrainGuard<'_, T, E> {
    fn drop(&mut self) {
        if self.armed {
            self.outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .draining = false;
        }
    }
}

/// Tracks the single outstanding operation of a slot.
///
/// Cloning a tracker is cheap and yields another handle to the same slot.
///
/// ```
/// use slotbox::RequestTracker;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tracker: RequestTracker<&str, String> = RequestTracker::new("greeting");
///
/// tracker.run(async { Ok("hello") });
/// assert!(tracker.state().is_pending());
///
/// let state = tracker.settled().await;
/// assert_eq!(state.data(), Some(&"hello"));
/// # }
/// ```
pub struct RequestTracker<T, E, S = TokioSpawner> {
    inner: Arc<Slot<T, E>>,
    spawner: S,
}

impl<T, E> RequestTracker<T, E, TokioSpawner>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates an idle tracker with default configuration.
    pub fn new(label: impl Into<Label>) -> Self {
        let config = SlotConfig::builder().label(label).build();
        Self::with_config(&config)
    }

    /// Creates an idle tracker from `config`.
    pub fn with_config(config: &SlotConfig) -> Self {
        Self::with_spawner(config, TokioSpawner::default())
    }
}

impl<T, E, S> RequestTracker<T, E, S>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
    S: Spawner,
{
    /// Creates an idle tracker running its operations on `spawner`.
    pub fn with_spawner(config: &SlotConfig, spawner: S) -> Self {
        let (state, _) = watch::channel(AsyncState::Idle);
        Self {
            inner: Arc::new(Slot {
                label: config.label.clone(),
                slow_threshold: config.slow_threshold,
                state,
                observers: Mutex::new(Vec::new()),
                outbox: Mutex::new(Outbox {
                    queue: VecDeque::new(),
                    draining: false,
                }),
            }),
            spawner,
        }
    }

    /// Starts `future` as the slot's operation and returns its token.
    ///
    /// Any operation still outstanding is superseded: its completion will be
    /// discarded.
    pub fn run<F>(&self, future: F) -> RequestToken
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let token = RequestToken::mint();
        self.issue(token, future);
        token
    }

    /// Moves the slot to `Pending { token }` and spawns `future`.
    pub(crate) fn issue<F>(&self, token: RequestToken, future: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let _ = self.inner.dispatch(Event::Begin(token));
        metrics::record_issued(&self.inner.label);

        let slot = Arc::downgrade(&self.inner);
        let label = self.inner.label.clone();
        let slow_threshold = self.inner.slow_threshold;
        let span = info_span!("slot_operation", slot = %label, token = token.as_u64());

        self.spawner.spawn(
            "operation",
            complete(slot, label, slow_threshold, token, future).instrument(span),
        );
    }

    /// Returns the slot to `Idle`, superseding any outstanding operation.
    pub fn reset(&self) {
        let _ = self.inner.dispatch(Event::Reset);
    }

    /// Resolves the slot with `data` without running an operation.
    ///
    /// Any outstanding operation is superseded. Observers and subscribers are
    /// notified even if the slot already held an equal value.
    pub fn set_data(&self, data: T) {
        let _ = self.inner.dispatch(Event::Set(data));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AsyncState<T, E> {
        self.inner.state.borrow().clone()
    }

    /// Variant of the current state.
    pub fn status(&self) -> Status {
        self.inner.state.borrow().status()
    }

    /// Receiver notified of every state change.
    ///
    /// Like any watch channel, a slow receiver only sees the latest state.
    /// Use [`add_observer`](Self::add_observer) to see every transition.
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<T, E>> {
        self.inner.state.subscribe()
    }

    /// Registers an observer called on every state change.
    ///
    /// Observers may drive the slot themselves, e.g. reset it on failure. The
    /// resulting transition is reported after the current one has reached
    /// every observer.
    pub fn add_observer(&self, observer: impl Observer<T, E>) {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    /// Waits until no operation is outstanding and returns the state.
    pub async fn settled(&self) -> AsyncState<T, E> {
        let mut receiver = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        match receiver.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Name of the slot.
    pub fn label(&self) -> &Label {
        &self.inner.label
    }
}

async fn complete<T, E, F>(
    slot: Weak<Slot<T, E>>,
    label: Label,
    slow_threshold: Option<Duration>,
    token: RequestToken,
    future: F,
) where
    T: Clone + 'static,
    E: 'static,
    F: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let result = future.await;
    let elapsed = started.elapsed();
    metrics::record_operation_duration(&label, elapsed);

    if let Some(threshold) = slow_threshold
        && elapsed > threshold
    {
        warn!(?elapsed, ?threshold, "slow operation");
    }

    let Some(slot) = slot.upgrade() else {
        trace!("slot dropped, discarding completion");
        return;
    };
    let event = match result {
        Ok(data) => Event::Succeed(token, data),
        Err(error) => Event::Fail(token, error),
    };
    let _ = slot.dispatch(event);
}

impl<T, E, S> Clone for RequestTracker<T, E, S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            spawner: self.spawner.clone(),
        }
    }
}

impl<T, E, S> fmt::Debug for RequestTracker<T, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTracker")
            .field("label", &self.inner.label)
            .field("status", &self.inner.state.borrow().status())
            .finish_non_exhaustive()
    }
}
