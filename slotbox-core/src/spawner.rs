//! Spawner trait for running operations in the background.
//!
//! The tracker never awaits an operation inline: it hands the operation to a
//! [`Spawner`] and learns about completion through the spawned task. This
//! keeps the state machine free of suspension points and lets the caller pick
//! the executor.

use std::future::Future;

use smol_str::SmolStr;

/// Trait for spawning background tasks.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally (or be zero-sized) so that all
/// clones share the same executor.
///
/// # Example
///
/// ```ignore
/// use slotbox_core::Spawner;
///
/// fn fire<S: Spawner>(spawner: &S) {
///     spawner.spawn("operation", async {
///         // do the work
///     });
/// }
/// ```
pub trait Spawner: Send + Sync + Clone + 'static {
    /// Spawns `future` to run to completion in the background.
    ///
    /// * `kind` - a label categorizing the task, used for tracing.
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
