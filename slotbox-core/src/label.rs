//! Label type naming slots and caches.
//!
//! `Label` is a newtype around `SmolStr` used in logs, spans and metrics.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// A short name identifying a slot or a cache.
///
/// # Example
/// ```
/// use slotbox_core::Label;
///
/// let label = Label::new("pokemon");
/// let nested = label.compose(&Label::new("info"));
/// assert_eq!(nested.as_str(), "pokemon.info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(SmolStr);

impl Label {
    /// Creates a new label.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a label from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Composes two labels with a dot separator: "self.other".
    #[inline]
    pub fn compose(&self, other: &Label) -> Self {
        Self(SmolStr::from(format!("{}.{}", self.0, other.0)))
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new_static("slot")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Label {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for Label {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl From<SmolStr> for Label {
    #[inline]
    fn from(s: SmolStr) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Label {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}
