//! Request identity tokens.
//!
//! A [`RequestToken`] is minted once for every issued operation and travels
//! with its completion. The state machine compares it against the token held
//! by the pending state to decide whether the completion is still current.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of an issued operation.
///
/// Tokens come from a process-wide counter, so they are unique across every
/// tracker and orchestrator and strictly increase in issue order. Two tokens
/// are equal iff they identify the same issued operation.
///
/// ```
/// use slotbox_core::RequestToken;
///
/// let first = RequestToken::mint();
/// let second = RequestToken::mint();
/// assert_ne!(first, second);
/// assert!(second > first);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Mints a fresh token.
    pub fn mint() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_increasing() {
        let tokens: Vec<_> = (0..16).map(|_| RequestToken::mint()).collect();
        for pair in tokens.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn display_uses_hash_prefix() {
        let token = RequestToken::mint();
        assert_eq!(token.to_string(), format!("#{}", token.as_u64()));
    }
}
