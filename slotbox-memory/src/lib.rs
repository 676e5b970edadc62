#![warn(missing_docs)]
//! In-memory [`KeyedCache`](slotbox_core::KeyedCache) for slotbox.
//!
//! [`MemoryCache`] keeps every value an operation produced for the lifetime
//! of the process. It never evicts and never expires entries.

mod cache;

pub use cache::MemoryCache;
