//! Keys addressing slots and cache entries.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use smol_str::SmolStr;

/// A key supplied by the consumer to select what a slot should fetch.
///
/// An *empty* key means "nothing selected": the orchestrator maps it to
/// `Idle` instead of issuing an operation.
pub trait SlotKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Returns `true` if the key selects nothing.
    fn is_empty(&self) -> bool;
}

impl SlotKey for String {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl SlotKey for &'static str {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl SlotKey for SmolStr {
    fn is_empty(&self) -> bool {
        SmolStr::is_empty(self)
    }
}

impl SlotKey for Arc<str> {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl SlotKey for Box<str> {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

macro_rules! never_empty {
    ($($ty:ty),*) => {
        $(
            impl SlotKey for $ty {
                fn is_empty(&self) -> bool {
                    false
                }
            }
        )*
    };
}

never_empty!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
