//! Slot configuration.
//!
//! [`SlotConfig`] is plain data: it can be built in code through
//! [`SlotConfigBuilder`] or deserialized from YAML.
//!
//! ```
//! use std::time::Duration;
//! use slotbox::config::{CachePolicy, SlotConfig};
//!
//! let config = SlotConfig::from_yaml(
//!     r#"
//! label: pokemon
//! cache: enabled
//! slow_threshold: 250ms
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.label.as_str(), "pokemon");
//! assert_eq!(config.cache, CachePolicy::Enabled);
//! assert_eq!(config.slow_threshold, Some(Duration::from_millis(250)));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotbox_core::Label;

use crate::error::ConfigError;

/// Whether an orchestrator consults the shared cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Serve known keys from the cache and store successful results.
    #[default]
    Enabled,
    /// Always issue the operation; never read or write the cache.
    Disabled,
}

impl CachePolicy {
    /// Returns `true` if the cache is consulted.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        matches!(self, CachePolicy::Enabled)
    }
}

/// Configuration of a single slot.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
pub struct SlotConfig {
    /// Name of the slot in logs and metrics.
    #[serde(default)]
    pub label: Label,
    /// Cache behaviour of the orchestrator owning the slot.
    #[serde(default)]
    pub cache: CachePolicy,
    /// Operations slower than this are logged at warn level (e.g. "250ms", "2s").
    #[serde(default, with = "humantime_serde")]
    pub slow_threshold: Option<Duration>,
}

impl SlotConfig {
    /// Create a new builder for SlotConfig.
    pub fn builder() -> SlotConfigBuilder {
        SlotConfigBuilder::default()
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: SlotConfig =
            serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.slow_threshold {
            Some(threshold) if threshold.is_zero() => Err(ConfigError::ZeroSlowThreshold),
            _ => Ok(()),
        }
    }
}

/// Builder for SlotConfig.
#[derive(Debug, Clone, Default)]
pub struct SlotConfigBuilder {
    label: Label,
    cache: CachePolicy,
    slow_threshold: Option<Duration>,
}

impl SlotConfigBuilder {
    /// Set the slot label.
    pub fn label(self, label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }

    /// Set the cache policy.
    pub fn cache(self, cache: CachePolicy) -> Self {
        Self { cache, ..self }
    }

    /// Warn about operations slower than `threshold`.
    pub fn slow_threshold(self, threshold: Duration) -> Self {
        Self {
            slow_threshold: Some(threshold),
            ..self
        }
    }

    /// Build the SlotConfig.
    pub fn build(self) -> SlotConfig {
        SlotConfig {
            label: self.label,
            cache: self.cache,
            slow_threshold: self.slow_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let config = SlotConfig::default();
        assert_eq!(config.label.as_str(), "slot");
        assert!(config.cache.is_enabled());
        assert_eq!(config.slow_threshold, None);
    }

    #[test]
    fn empty_mapping_uses_defaults() {
        let config = SlotConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SlotConfig::default());
    }

    #[test]
    fn parses_disabled_cache_and_humantime_threshold() {
        let config = SlotConfig::from_yaml(
            r#"
label: search
cache: disabled
slow_threshold: 2s
"#,
        )
        .unwrap();

        assert_eq!(
            config,
            SlotConfig::builder()
                .label("search")
                .cache(CachePolicy::Disabled)
                .slow_threshold(Duration::from_secs(2))
                .build()
        );
    }

    #[test]
    fn rejects_zero_threshold() {
        let err = SlotConfig::from_yaml("slow_threshold: 0s").unwrap_err();
        assert_eq!(err, ConfigError::ZeroSlowThreshold);
    }

    #[test]
    fn rejects_unknown_cache_policy() {
        let err = SlotConfig::from_yaml("cache: sometimes").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
