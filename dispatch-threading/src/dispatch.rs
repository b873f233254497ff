use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by consumer callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A registered consumer callback.
///
/// Every consumer registered with a dispatch is an independent subscriber:
/// the pool invokes each of them with a reference to the item's payload,
/// regardless of what another consumer did with the same item.
pub type Consumer<T> = Arc<dyn Fn(&T) -> Result<(), BoxError> + Send + Sync>;

/// The dispatch facade consumed by the worker pool.
///
/// The pool performs no locking around calls into this trait; implementations
/// must be independently thread-safe. All three operations are invoked from
/// worker threads while the pool is running.
pub trait Dispatch: Send + Sync {
    /// The payload type passed to consumers.
    type Payload;

    /// Returns a fresh snapshot of the registered consumer callbacks.
    ///
    /// The pool takes one snapshot per claimed item; consumers registered
    /// after a snapshot is taken are not seen until the next item.
    fn consumers(&self) -> Vec<Consumer<Self::Payload>>;

    /// Returns the maximum number of worker threads allowed to drain
    /// concurrently.
    ///
    /// This is read fresh on every outer loop iteration, so it can be tuned
    /// at runtime. Note that it throttles threads entering their drain loop,
    /// not the number of items in flight: a single thread holding a slot may
    /// still process arbitrarily many items back-to-back.
    fn max_inflight(&self) -> usize;

    /// Sink for consumer-level failures.
    ///
    /// Invoked once per failed consumer invocation. Must not panic: a
    /// panicking sink is a collaborator failure and kills the worker thread.
    fn on_error(&self, error: ConsumerError);
}

/// A failure of a single consumer invocation.
///
/// Forwarded to [`Dispatch::on_error`] after the affected item has been
/// cancelled. The worker continues with the next consumer against the same
/// item, so one failing consumer never hides the item from the others.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The consumer returned an error.
    #[error("consumer failed")]
    Failed(#[source] BoxError),

    /// The consumer panicked.
    ///
    /// The panic is caught at the invocation; the payload is rendered
    /// best-effort into the contained message.
    #[error("consumer panicked: {0}")]
    Panicked(String),
}

impl ConsumerError {
    /// Builds a [`ConsumerError::Panicked`] from a caught panic payload.
    pub fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = panic.downcast_ref::<&str>() {
            (*message).to_owned()
        } else if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic".to_owned()
        };

        Self::Panicked(message)
    }
}
