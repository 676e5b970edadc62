#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Slot configuration.
///
/// [`SlotConfig`](config::SlotConfig) carries the slot label, the
/// [`CachePolicy`](config::CachePolicy) and the slow-operation threshold. It is
/// built in code or loaded from YAML.
pub mod config;

/// Error types.
///
/// - [`ConfigError`] for configuration loading
/// - [`TimeoutError`] for operations wrapped with a timeout
pub mod error;

/// Metrics collection for slot observability.
///
/// When the `metrics` feature is enabled, this module provides counters and
/// histograms for issued operations, stale completions, cache lookups and
/// operation latency.
pub mod metrics;

/// Synchronous observers of state changes.
pub mod observer;

/// Cache-aware orchestration of a slot.
///
/// [`Orchestrator`] serves known keys from a [`CacheScope`] and issues the
/// operation for everything else.
pub mod orchestrator;

/// Cache shared by several orchestrators.
pub mod scope;

/// Tokio implementation of the [`Spawner`] trait.
pub mod spawner;

/// Timeout combinator for operations.
pub mod timeout;

/// Race-safe tracking of a single outstanding operation.
///
/// [`RequestTracker`] applies the result of an operation only if no newer
/// operation was issued in the meantime.
pub mod tracker;

pub use config::{CachePolicy, SlotConfig, SlotConfigBuilder};
pub use error::{ConfigError, TimeoutError};
pub use observer::Observer;
pub use orchestrator::{Observed, Orchestrator};
pub use scope::CacheScope;
pub use spawner::TokioSpawner;
pub use timeout::OperationExt;
pub use tracker::RequestTracker;

pub use slotbox_core::{
    AsyncState, CacheEntry, Event, KeyedCache, Label, Operation, Outcome, RequestToken, SlotKey,
    Spawner, Status,
};

/// The `slotbox` prelude.
///
/// ```rust
/// use slotbox::prelude::*;
/// ```
///
/// This imports:
/// - [`AsyncState`] and [`Status`] for reading slot state
/// - [`Orchestrator`], [`CacheScope`] and [`RequestTracker`]
/// - [`Operation`] and [`OperationExt`] for defining operations
pub mod prelude {
    pub use crate::{
        AsyncState, CacheScope, Operation, OperationExt, Orchestrator, RequestTracker, Status,
    };
}
