/// A unit of work claimed from a [`WorkQueue`].
///
/// A claimed item stays owned by the worker that dequeued it until it is
/// dropped. The worker acknowledges each consumer invocation it performs on
/// the item with exactly one terminal call, [`finish`](Self::finish) on
/// success or [`cancel`](Self::cancel) on failure. Because every registered
/// consumer sees the item independently, a single claim can legitimately
/// receive several terminal calls in sequence; the queue observes all of them
/// and the last one wins.
pub trait WorkItem {
    /// The payload type wrapped by this item.
    type Payload;

    /// Returns a reference to the wrapped payload.
    fn payload(&self) -> &Self::Payload;

    /// Acknowledges a successful consumer invocation against this item.
    fn finish(&mut self);

    /// Acknowledges a failed consumer invocation against this item.
    ///
    /// Whether a cancelled item is discarded, requeued or dead-lettered is
    /// the queue's policy, not the caller's.
    fn cancel(&mut self);
}

/// A thread-safe source of work for the worker pool.
///
/// Implementations must hand each item to at most one caller of
/// [`try_dequeue`](Self::try_dequeue); the pool performs no locking around
/// queue calls and relies on this invariant.
pub trait WorkQueue: Send + Sync {
    /// The payload type transported by this queue.
    type Payload;

    /// The claimed item type handed out by [`try_dequeue`](Self::try_dequeue).
    type Item: WorkItem<Payload = Self::Payload>;

    /// Inserts a new payload into the queue.
    ///
    /// This is the producer-side operation; the worker pool never enqueues.
    fn enqueue(&self, payload: Self::Payload);

    /// Claims the next item, or returns `None` when the queue is empty.
    ///
    /// Must not block. The pool calls this in a tight drain loop and relies
    /// on an immediate `None` to stay responsive to its inflight throttle.
    fn try_dequeue(&self) -> Option<Self::Item>;
}
