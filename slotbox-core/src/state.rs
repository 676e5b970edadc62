//! Async state machine.
//!
//! [`AsyncState`] is the state of a single slot and [`Event`] is everything
//! that can happen to it. [`AsyncState::apply`] is the transition function:
//!
//! | Event                  | Rule                                                        |
//! |------------------------|-------------------------------------------------------------|
//! | `Reset`                | `Idle`, unconditionally                                     |
//! | `Begin(token)`         | `Pending { token }`, replacing any earlier pending token    |
//! | `Succeed(token, data)` | `Resolved { data }` if `token` is the pending token         |
//! | `Fail(token, error)`   | `Rejected { error }` if `token` is the pending token        |
//! | `Set(data)`            | `Resolved { data }`, unconditionally                        |
//!
//! A completion whose token does not match the pending one is *stale*: the
//! state is left untouched, so a slow superseded operation can never clobber
//! a state that a later operation already advanced.
//!
//! ```
//! use slotbox_core::{AsyncState, Event, Outcome, RequestToken};
//!
//! let first = RequestToken::mint();
//! let second = RequestToken::mint();
//!
//! let mut state = AsyncState::<&str, ()>::Idle;
//! let _ = state.apply(Event::Begin(first));
//! let _ = state.apply(Event::Begin(second));
//!
//! assert_eq!(state.apply(Event::Succeed(second, "fresh")), Outcome::Changed);
//! assert_eq!(state.apply(Event::Succeed(first, "late")), Outcome::Stale);
//! assert_eq!(state.data(), Some(&"fresh"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::token::RequestToken;

/// State of a slot.
///
/// Exactly one variant is active; data and error never exist outside their
/// variant. The error is kept behind an [`Arc`] so the whole state is cheap to
/// clone without requiring `E: Clone`.
pub enum AsyncState<T, E> {
    /// Nothing requested yet, or reset.
    Idle,
    /// An operation is outstanding.
    Pending {
        /// Identity of the outstanding operation.
        token: RequestToken,
    },
    /// Last applied result was a success.
    Resolved {
        /// The resolved value.
        data: T,
    },
    /// Last applied result was a failure.
    Rejected {
        /// The operation error.
        error: Arc<E>,
    },
}

/// Field-less mirror of [`AsyncState`] for logging and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// See [`AsyncState::Idle`].
    Idle,
    /// See [`AsyncState::Pending`].
    Pending,
    /// See [`AsyncState::Resolved`].
    Resolved,
    /// See [`AsyncState::Rejected`].
    Rejected,
}

impl Status {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Pending => "pending",
            Status::Resolved => "resolved",
            Status::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to the state machine.
pub enum Event<T, E> {
    /// Return to `Idle`.
    Reset,
    /// An operation identified by the token was issued.
    Begin(RequestToken),
    /// The operation identified by the token succeeded.
    Succeed(RequestToken, T),
    /// The operation identified by the token failed.
    Fail(RequestToken, E),
    /// Resolve directly with a known value, without issuing an operation.
    ///
    /// Any outstanding pending token is retired, so its completion becomes
    /// stale. Always reported as `Changed`, even when the slot already holds
    /// an equal value; values are not compared.
    Set(T),
}

impl<T, E> Event<T, E> {
    /// Short name of the event for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Event::Reset => "reset",
            Event::Begin(_) => "begin",
            Event::Succeed(..) => "succeed",
            Event::Fail(..) => "fail",
            Event::Set(_) => "set",
        }
    }

    /// Token carried by the event, if any.
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Event::Begin(token) | Event::Succeed(token, _) | Event::Fail(token, _) => Some(*token),
            Event::Reset | Event::Set(_) => None,
        }
    }
}

impl<T, E> fmt::Debug for Event<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token() {
            Some(token) => write!(f, "Event::{}({})", self.name(), token),
            None => write!(f, "Event::{}", self.name()),
        }
    }
}

/// Result of applying an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The state changed.
    Changed,
    /// The event was valid but left the state as it was (`Reset` on `Idle`).
    Unchanged,
    /// The completion belonged to a superseded operation and was discarded.
    Stale,
}

impl Outcome {
    /// Returns `true` if the state changed.
    #[inline]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed)
    }
}

impl<T, E> AsyncState<T, E> {
    /// Applies an event in place.
    pub fn apply(&mut self, event: Event<T, E>) -> Outcome {
        match event {
            Event::Reset => {
                if self.is_idle() {
                    Outcome::Unchanged
                } else {
                    *self = AsyncState::Idle;
                    Outcome::Changed
                }
            }
            Event::Begin(token) => {
                *self = AsyncState::Pending { token };
                Outcome::Changed
            }
            Event::Succeed(token, data) => {
                if self.is_current(token) {
                    *self = AsyncState::Resolved { data };
                    Outcome::Changed
                } else {
                    Outcome::Stale
                }
            }
            Event::Fail(token, error) => {
                if self.is_current(token) {
                    *self = AsyncState::Rejected {
                        error: Arc::new(error),
                    };
                    Outcome::Changed
                } else {
                    Outcome::Stale
                }
            }
            Event::Set(data) => {
                *self = AsyncState::Resolved { data };
                Outcome::Changed
            }
        }
    }

    /// Pure form of [`apply`](Self::apply): consumes the state and returns the
    /// next one.
    pub fn transition(mut self, event: Event<T, E>) -> Self {
        let _ = self.apply(event);
        self
    }

    /// Returns `true` if `token` identifies the outstanding operation.
    #[inline]
    pub fn is_current(&self, token: RequestToken) -> bool {
        matches!(self, AsyncState::Pending { token: pending } if *pending == token)
    }

    /// Returns the status of this state.
    pub fn status(&self) -> Status {
        match self {
            AsyncState::Idle => Status::Idle,
            AsyncState::Pending { .. } => Status::Pending,
            AsyncState::Resolved { .. } => Status::Resolved,
            AsyncState::Rejected { .. } => Status::Rejected,
        }
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncState::Idle)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncState::Pending { .. })
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, AsyncState::Resolved { .. })
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, AsyncState::Rejected { .. })
    }

    /// Token of the outstanding operation, if pending.
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            AsyncState::Pending { token } => Some(*token),
            _ => None,
        }
    }

    /// Resolved value, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncState::Resolved { data } => Some(data),
            _ => None,
        }
    }

    /// Rejection error, if any.
    pub fn error(&self) -> Option<&Arc<E>> {
        match self {
            AsyncState::Rejected { error } => Some(error),
            _ => None,
        }
    }

    /// Converts a settled state into a `Result`.
    ///
    /// Returns `None` for `Idle` and `Pending`.
    pub fn into_result(self) -> Option<Result<T, Arc<E>>> {
        match self {
            AsyncState::Resolved { data } => Some(Ok(data)),
            AsyncState::Rejected { error } => Some(Err(error)),
            AsyncState::Idle | AsyncState::Pending { .. } => None,
        }
    }
}

impl<T, E> Default for AsyncState<T, E> {
    fn default() -> Self {
        AsyncState::Idle
    }
}

impl<T: Clone, E> Clone for AsyncState<T, E> {
    fn clone(&self) -> Self {
        match self {
            AsyncState::Idle => AsyncState::Idle,
            AsyncState::Pending { token } => AsyncState::Pending { token: *token },
            AsyncState::Resolved { data } => AsyncState::Resolved { data: data.clone() },
            AsyncState::Rejected { error } => AsyncState::Rejected {
                error: Arc::clone(error),
            },
        }
    }
}

impl<T: PartialEq, E: PartialEq> PartialEq for AsyncState<T, E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AsyncState::Idle, AsyncState::Idle) => true,
            (AsyncState::Pending { token: a }, AsyncState::Pending { token: b }) => a == b,
            (AsyncState::Resolved { data: a }, AsyncState::Resolved { data: b }) => a == b,
            (AsyncState::Rejected { error: a }, AsyncState::Rejected { error: b }) => {
                Arc::ptr_eq(a, b) || **a == **b
            }
            _ => false,
        }
    }
}

impl<T: Eq, E: Eq> Eq for AsyncState<T, E> {}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for AsyncState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncState::Idle => f.write_str("Idle"),
            AsyncState::Pending { token } => f.debug_struct("Pending").field("token", token).finish(),
            AsyncState::Resolved { data } => f.debug_struct("Resolved").field("data", data).finish(),
            AsyncState::Rejected { error } => {
                f.debug_struct("Rejected").field("error", error).finish()
            }
        }
    }
}
