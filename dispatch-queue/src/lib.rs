//! Work transport contracts for the dispatch worker pool.
//!
//! This crate defines the boundary between work producers and the worker pool
//! in the `dispatch-threading` crate: the [`WorkQueue`] trait for claiming
//! work and the [`WorkItem`] trait for acknowledging it, plus
//! [`InMemoryQueue`], an unbounded in-process queue that implements both.
//!
//! The pool never blocks on the queue. [`WorkQueue::try_dequeue`] returns
//! `None` when no work is available, and the claimed [`WorkItem`] carries the
//! two terminal acknowledgments, [`finish`](WorkItem::finish) for success and
//! [`cancel`](WorkItem::cancel) for failure. What a queue does with a
//! cancelled item (discard, requeue, dead-letter) is entirely its own policy.
//!
//! # Example
//!
//! ```
//! use dispatch_queue::{InMemoryQueue, WorkItem, WorkQueue};
//!
//! let queue = InMemoryQueue::new();
//! queue.enqueue(42u32);
//!
//! let mut item = queue.try_dequeue().expect("queue is not empty");
//! assert_eq!(*item.payload(), 42);
//! item.finish();
//! drop(item);
//!
//! assert_eq!(queue.finished_count(), 1);
//! assert!(queue.is_empty());
//! ```

#![warn(missing_docs)]

mod memory;
mod queue;

pub use self::memory::*;
pub use self::queue::*;
