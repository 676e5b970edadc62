//! Error types.
//!
//! Operation failures are not errors of the runtime: they are captured into
//! `AsyncState::Rejected` and handed to the consumer as data. The types here
//! cover configuration loading and the [`timeout`](crate::timeout) combinator.

use std::time::Duration;

use thiserror::Error;

/// Error loading a [`SlotConfig`](crate::SlotConfig).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.
    #[error("failed to parse slot configuration: {0}")]
    Parse(String),
    /// `slow_threshold` was set to zero.
    #[error("slow_threshold must be greater than zero")]
    ZeroSlowThreshold,
}

/// Failure of an operation wrapped with a timeout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The operation did not finish in time and was dropped.
    #[error("operation timed out after {after:?}")]
    Elapsed {
        /// The configured timeout.
        after: Duration,
    },
    /// The operation finished with its own error.
    #[error("{0}")]
    Operation(E),
}

impl<E> TimeoutError<E> {
    /// Returns `true` if the operation ran out of time.
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed { .. })
    }

    /// Returns the operation error, if the operation failed on its own.
    pub fn into_operation(self) -> Option<E> {
        match self {
            TimeoutError::Operation(error) => Some(error),
            TimeoutError::Elapsed { .. } => None,
        }
    }
}
