//! Tokio implementation of [`Spawner`].

use std::future::Future;

use slotbox_core::Spawner;
use smol_str::SmolStr;
use tokio::runtime::Handle;
use tracing::trace;

/// Spawns operations on a Tokio runtime.
///
/// The default spawner uses the runtime of the calling context, so
/// operations must be issued from inside a runtime. [`TokioSpawner::on`]
/// pins the spawner to a specific runtime handle instead, which allows
/// issuing from plain threads.
#[derive(Debug, Clone, Default)]
pub struct TokioSpawner {
    handle: Option<Handle>,
}

impl TokioSpawner {
    /// Spawner bound to the given runtime.
    pub fn on(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl Spawner for TokioSpawner {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let kind = kind.into();
        trace!(%kind, "spawning background task");
        match &self.handle {
            Some(handle) => drop(handle.spawn(future)),
            None => drop(tokio::spawn(future)),
        }
    }
}
