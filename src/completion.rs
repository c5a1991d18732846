//! Single-resolution bridge from completion callbacks to futures
//!
//! A callback-style primitive reports `(error, result)` through a callback.
//! [`completion`] returns the two halves of a bridge:
//!
//! - [`Completion`] is handed to the primitive as its callback;
//! - [`CompletionFuture`] is awaited by the caller.
//!
//! The future settles exactly once. The first [`Completion::complete`] wins;
//! later calls are ignored and logged. If the callback half is dropped
//! without ever completing, the future rejects instead of hanging.

use futures::channel::oneshot;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

/// Callback half of a bridge
pub struct Completion<T> {
    sender: Mutex<Option<oneshot::Sender<io::Result<T>>>>,
}

/// Future half of a bridge
#[must_use = "futures do nothing unless awaited"]
pub struct CompletionFuture<T> {
    receiver: oneshot::Receiver<io::Result<T>>,
}

/// Create a connected callback/future pair
pub fn completion<T>() -> (Completion<T>, CompletionFuture<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion {
            sender: Mutex::new(Some(sender)),
        },
        CompletionFuture { receiver },
    )
}

/// Issue a callback-style operation and return the future for its result
///
/// ```rust,no_run
/// use fslib::completion::bridge;
/// use std::path::PathBuf;
///
/// # async fn example() -> std::io::Result<()> {
/// let meta = bridge(|done| {
///     compio_fs_callback::callback::stat(PathBuf::from("/etc"), done.into_callback())
/// })
/// .await?;
/// assert!(meta.is_dir());
/// # Ok(())
/// # }
/// ```
pub fn bridge<T, F>(issue: F) -> CompletionFuture<T>
where
    F: FnOnce(Completion<T>),
{
    let (done, future) = completion();
    issue(done);
    future
}

impl<T> Completion<T> {
    /// Settle the future with `result`
    ///
    /// Returns `true` if this call settled the future, `false` if it had
    /// already been settled.
    pub fn complete(&self, result: io::Result<T>) -> bool {
        let sender = match self.sender.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(sender) => {
                // If the future was dropped the value is dropped here, releasing
                // whatever it owns; the operation still counts as settled
                let _ = sender.send(result);
                true
            }
            None => {
                tracing::warn!("completion invoked after the operation already settled; ignoring");
                false
            }
        }
    }

    /// Whether the future has already been settled
    #[must_use]
    pub fn is_settled(&self) -> bool {
        match self.sender.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Adapt into a plain `FnOnce` callback
    pub fn into_callback(self) -> impl FnOnce(io::Result<T>) + Send + 'static
    where
        T: Send + 'static,
    {
        move |result| {
            self.complete(result);
        }
    }
}

impl<T> Future for CompletionFuture<T> {
    type Output = io::Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(io::Error::other(
                "operation completion dropped without a result",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}
