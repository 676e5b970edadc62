//! Metrics declaration and recording helpers.
//!
//! With the `metrics` feature disabled every helper is an empty inline
//! function the compiler removes.

use std::time::Duration;

use slotbox_core::Label;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of operations issued by trackers.
    pub static ref OPERATIONS_ISSUED: &'static str = {
        metrics::describe_counter!(
            "slotbox_operations_issued_total",
            "Total number of operations issued."
        );
        "slotbox_operations_issued_total"
    };
    /// Track number of completions discarded as stale.
    pub static ref COMPLETIONS_STALE: &'static str = {
        metrics::describe_counter!(
            "slotbox_completions_stale_total",
            "Total number of completions discarded because a newer operation superseded them."
        );
        "slotbox_completions_stale_total"
    };
    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "slotbox_cache_hit_total",
            "Total number of cache hit events."
        );
        "slotbox_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "slotbox_cache_miss_total",
            "Total number of cache miss events."
        );
        "slotbox_cache_miss_total"
    };
    /// Histogram of operation duration.
    pub static ref OPERATION_DURATION: &'static str = {
        metrics::describe_histogram!(
            "slotbox_operation_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of operations in seconds, including superseded ones."
        );
        "slotbox_operation_duration_seconds"
    };
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_issued(slot: &Label) {
    metrics::counter!(*OPERATIONS_ISSUED, "slot" => slot.to_string()).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_issued(_slot: &Label) {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_stale(slot: &Label) {
    metrics::counter!(*COMPLETIONS_STALE, "slot" => slot.to_string()).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_stale(_slot: &Label) {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_cache_lookup(slot: &Label, hit: bool) {
    let counter = if hit {
        *CACHE_HIT_COUNTER
    } else {
        *CACHE_MISS_COUNTER
    };
    metrics::counter!(counter, "slot" => slot.to_string()).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_cache_lookup(_slot: &Label, _hit: bool) {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_operation_duration(slot: &Label, duration: Duration) {
    metrics::histogram!(*OPERATION_DURATION, "slot" => slot.to_string())
        .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_operation_duration(_slot: &Label, _duration: Duration) {}
