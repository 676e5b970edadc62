//! Synchronous state-change observers.
//!
//! Observers are the callback counterpart of
//! [`RequestTracker::subscribe`](crate::RequestTracker::subscribe): they are
//! invoked once per transition that actually changes the state, in the order
//! the transitions were applied. Stale completions and no-op resets never
//! reach them.
//!
//! Any `Fn(&AsyncState<T, E>)` closure is an observer:
//!
//! ```
//! use slotbox::{AsyncState, RequestTracker};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tracker: RequestTracker<u32, String> = RequestTracker::new("counter");
//! tracker.add_observer(|state: &AsyncState<u32, String>| {
//!     println!("now {}", state.status());
//! });
//! tracker.set_data(1);
//! # }
//! ```

use slotbox_core::{AsyncState, Label};

/// Receives every state change of a slot.
///
/// Called synchronously from the task that applied the transition, after the
/// new state is published. Keep it short and non-blocking.
pub trait Observer<T, E>: Send + Sync + 'static {
    /// Called with the slot label and its new state.
    fn on_change(&self, slot: &Label, state: &AsyncState<T, E>);
}

impl<T, E, F> Observer<T, E> for F
where
    F: Fn(&AsyncState<T, E>) + Send + Sync + 'static,
{
    fn on_change(&self, _slot: &Label, state: &AsyncState<T, E>) {
        self(state)
    }
}
