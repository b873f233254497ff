use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::queue::{WorkItem, WorkQueue};

/// Counters shared between a queue and its claimed items.
#[derive(Debug, Default)]
struct QueueCounts {
    finished: AtomicUsize,
    cancelled: AtomicUsize,
}

/// An unbounded in-process work queue.
///
/// Payloads are handed out in FIFO order. The queue records the final
/// disposition of every claimed item: when a claim is dropped, its last
/// terminal call decides whether it counts as finished or cancelled. A claim
/// dropped without any terminal call counts as neither.
///
/// Cancelled items are discarded. Retry and dead-letter policies belong to
/// the embedding application, which can implement its own [`WorkQueue`] if it
/// needs them.
#[derive(Debug)]
pub struct InMemoryQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    counts: Arc<QueueCounts>,
}

impl<T> InMemoryQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();

        Self {
            tx,
            rx,
            counts: Arc::default(),
        }
    }

    /// Returns the number of payloads currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no payloads are waiting in the queue.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Returns the number of claims whose final disposition was a finish.
    pub fn finished_count(&self) -> usize {
        self.counts.finished.load(Ordering::Relaxed)
    }

    /// Returns the number of claims whose final disposition was a cancel.
    pub fn cancelled_count(&self) -> usize {
        self.counts.cancelled.load(Ordering::Relaxed)
    }
}

impl<T> Default for InMemoryQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> WorkQueue for InMemoryQueue<T> {
    type Payload = T;
    type Item = InMemoryItem<T>;

    fn enqueue(&self, payload: T) {
        // The queue owns both halves of the channel, so the receiver cannot
        // disconnect while `self` is alive.
        assert!(
            self.tx.send(payload).is_ok(),
            "queue holds its own receiver"
        );
    }

    fn try_dequeue(&self) -> Option<InMemoryItem<T>> {
        let payload = self.rx.try_recv().ok()?;

        Some(InMemoryItem {
            payload,
            disposition: None,
            counts: Arc::clone(&self.counts),
        })
    }
}

/// The final disposition of a claimed item.
#[derive(Clone, Copy, Debug)]
enum Disposition {
    Finished,
    Cancelled,
}

/// An item claimed from an [`InMemoryQueue`].
///
/// The item tracks the most recent terminal call and records it into the
/// queue's counters when dropped, so repeated [`finish`](WorkItem::finish)
/// and [`cancel`](WorkItem::cancel) calls resolve to a single last-call-wins
/// disposition per claim.
#[derive(Debug)]
pub struct InMemoryItem<T> {
    payload: T,
    disposition: Option<Disposition>,
    counts: Arc<QueueCounts>,
}

impl<T> WorkItem for InMemoryItem<T> {
    type Payload = T;

    fn payload(&self) -> &T {
        &self.payload
    }

    fn finish(&mut self) {
        self.disposition = Some(Disposition::Finished);
    }

    fn cancel(&mut self) {
        self.disposition = Some(Disposition::Cancelled);
    }
}

impl<T> Drop for InMemoryItem<T> {
    fn drop(&mut self) {
        match self.disposition {
            Some(Disposition::Finished) => {
                self.counts.finished.fetch_add(1, Ordering::Relaxed);
            }
            Some(Disposition::Cancelled) => {
                self.counts.cancelled.fetch_add(1, Ordering::Relaxed);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dequeue_preserves_fifo_order() {
        let queue = InMemoryQueue::new();
        for i in 0..5 {
            queue.enqueue(i);
        }

        for expected in 0..5 {
            let item = queue.try_dequeue().unwrap();
            assert_eq!(*item.payload(), expected);
        }

        assert!(queue.try_dequeue().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_finish_records_final_disposition() {
        let queue = InMemoryQueue::new();
        queue.enqueue("work");

        let mut item = queue.try_dequeue().unwrap();
        item.finish();
        drop(item);

        assert_eq!(queue.finished_count(), 1);
        assert_eq!(queue.cancelled_count(), 0);
    }

    #[test]
    fn test_cancel_discards_item() {
        let queue = InMemoryQueue::new();
        queue.enqueue("work");

        let mut item = queue.try_dequeue().unwrap();
        item.cancel();
        drop(item);

        assert_eq!(queue.cancelled_count(), 1);
        // Cancelled items are not requeued.
        assert!(queue.is_empty());
    }

    #[test]
    fn test_last_terminal_call_wins() {
        let queue = InMemoryQueue::new();
        queue.enqueue("work");

        let mut item = queue.try_dequeue().unwrap();
        item.finish();
        item.cancel();
        item.finish();
        drop(item);

        assert_eq!(queue.finished_count(), 1);
        assert_eq!(queue.cancelled_count(), 0);
    }

    #[test]
    fn test_unacknowledged_claim_counts_as_neither() {
        let queue = InMemoryQueue::new();
        queue.enqueue("work");

        let item = queue.try_dequeue().unwrap();
        drop(item);

        assert_eq!(queue.finished_count(), 0);
        assert_eq!(queue.cancelled_count(), 0);
    }

    #[test]
    fn test_len_tracks_pending_payloads() {
        let queue = InMemoryQueue::new();
        assert_eq!(queue.len(), 0);

        queue.enqueue(1);
        queue.enqueue(2);
        assert_eq!(queue.len(), 2);

        let _item = queue.try_dequeue().unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_is_shared_across_threads() {
        let queue = Arc::new(InMemoryQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        queue.enqueue(i * 25 + j);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 100);
    }
}
