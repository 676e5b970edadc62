//! Timeout combinator for operations.
//!
//! The runtime has no built-in timeouts. A caller that wants one wraps the
//! operation before handing it over; the wrapped future races the operation
//! against a timer and fails with [`TimeoutError::Elapsed`] if the timer wins.
//! The losing operation future is dropped.
//!
//! ```
//! use std::time::Duration;
//! use slotbox::timeout::OperationExt;
//!
//! async fn fetch(name: String) -> Result<String, std::io::Error> {
//!     Ok(name)
//! }
//!
//! let operation = fetch.timeout(Duration::from_secs(3));
//! # let _ = operation;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use pin_project::pin_project;
use slotbox_core::Operation;
use tokio::time::Sleep;

pub use crate::error::TimeoutError;

/// Extension methods for [`Operation`].
pub trait OperationExt<K>: Operation<K> + Sized {
    /// Fails every call that takes longer than `after`.
    fn timeout(
        self,
        after: Duration,
    ) -> impl Operation<K, Output = Self::Output, Error = TimeoutError<Self::Error>> {
        move |key: K| Timeout::new(self.call(key), after)
    }
}

impl<K, O> OperationExt<K> for O where O: Operation<K> {}

/// Future racing an operation against a timer.
///
/// The timer starts on first poll, not on construction, so the future may be
/// created outside of a runtime.
#[pin_project]
#[derive(Debug)]
pub struct Timeout<F> {
    #[pin]
    future: F,
    sleep: Option<Pin<Box<Sleep>>>,
    after: Duration,
}

impl<F> Timeout<F> {
    /// Wraps `future` with a timeout of `after`.
    pub fn new(future: F, after: Duration) -> Self {
        Self {
            future,
            sleep: None,
            after,
        }
    }
}

impl<F, T, E> Future for Timeout<F>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Result<T, TimeoutError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if let Poll::Ready(result) = this.future.poll(cx) {
            return Poll::Ready(result.map_err(TimeoutError::Operation));
        }

        let after = *this.after;
        let sleep = this
            .sleep
            .get_or_insert_with(|| Box::pin(tokio::time::sleep(after)));
        match sleep.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(Err(TimeoutError::Elapsed { after })),
            Poll::Pending => Poll::Pending,
        }
    }
}
