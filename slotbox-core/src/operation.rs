//! Operation trait implemented by data suppliers.

use std::future::Future;

/// Supplier of the asynchronous unit of work behind a key.
///
/// The runtime treats the operation as opaque: it only observes whether the
/// returned future succeeds or fails, and when. Operations are never
/// cancelled; a superseded operation runs to completion and its result is
/// discarded.
///
/// Any `Fn(K) -> impl Future<Output = Result<T, E>>` is an operation:
///
/// ```
/// use slotbox_core::Operation;
///
/// async fn fetch(name: String) -> Result<usize, std::io::Error> {
///     Ok(name.len())
/// }
///
/// fn assert_operation<O: Operation<String>>(_: &O) {}
/// assert_operation(&fetch);
/// ```
pub trait Operation<K>: Send + Sync + 'static {
    /// Value produced on success.
    type Output;

    /// Error produced on failure.
    type Error;

    /// The future performing the work.
    type Future: Future<Output = Result<Self::Output, Self::Error>> + Send + 'static;

    /// Starts the work for `key`.
    fn call(&self, key: K) -> Self::Future;
}

impl<K, F, Fut, T, E> Operation<K> for F
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    type Output = T;
    type Error = E;
    type Future = Fut;

    fn call(&self, key: K) -> Self::Future {
        self(key)
    }
}
