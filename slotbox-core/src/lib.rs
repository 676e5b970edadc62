#![warn(missing_docs)]
//! # slotbox-core
//!
//! Core types and traits for the slotbox data-fetching runtime.
//!
//! A *slot* tracks one logical asynchronous operation at a time. Operations
//! may be re-issued before earlier ones finish; only the result of the most
//! recently issued operation is ever applied. This crate holds the pieces that
//! carry no runtime dependency:
//!
//! - **State** - [`AsyncState`] and the [`Event`] transition function
//! - **Identity** - [`RequestToken`], minted once per issued operation
//! - **Work** - the [`Operation`] trait implemented by data suppliers
//! - **Storage** - the [`KeyedCache`] trait and [`CacheEntry`]
//! - **Execution** - the [`Spawner`] trait used to run operations
//!
//! The `slotbox` crate composes these into a tracker and a cache-aware
//! orchestrator.

pub mod cache;
pub mod key;
pub mod label;
pub mod operation;
pub mod spawner;
pub mod state;
pub mod token;

pub use cache::{CacheEntry, KeyedCache};
pub use key::SlotKey;
pub use label::Label;
pub use operation::Operation;
pub use spawner::Spawner;
pub use state::{AsyncState, Event, Outcome, Status};
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use token::RequestToken;
