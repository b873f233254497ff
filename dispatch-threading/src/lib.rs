//! # Dispatch Threading
//!
//! This crate provides the threading framework for dispatch, designed to drain work queues
//! against registered consumers on dedicated threads. At its core is a blocking worker pool
//! that offers:
//!
//! - **Flexible Configuration**: Fine-tune the pool name, thread counts, naming patterns and
//!   panic handling strategies through a builder pattern.
//! - **Signalled Wakeups**: Workers block on an [`AvailabilityGate`] and are released by
//!   [`ThreadedPool::trigger_available`] when producers announce new work.
//! - **Inflight Throttling**: A runtime-tunable ceiling bounds how many workers drain the
//!   queue simultaneously.
//! - **Panic Recovery**: Consumer panics are caught per invocation and reported through the
//!   dispatch error sink; thread-level panics can be routed to a custom handler.
//!
//! ## Concurrency Model
//!
//! Each call to [`ThreadedPool::start`] installs a fresh generation token and spawns one
//! worker per configured thread. A worker loops over four phases: wait on the gate, re-check
//! that its generation is still current, compare the pool's inflight count against the
//! dispatch's ceiling, and finally drain. Draining claims items one at a time and feeds each
//! claimed item to a snapshot of the registered consumers before claiming the next.
//!
//! The inflight count tracks workers inside their drain phase, not items. The ceiling is
//! checked before a worker enters the drain phase, so it bounds concurrent drains rather
//! than the number of items a single drain may process. [`ThreadedPool::stop`] clears the
//! generation and blocks until the inflight count reaches zero, which guarantees that no
//! consumer invocation is in progress when it returns.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dispatch_queue::{InMemoryQueue, WorkQueue};
//! use dispatch_threading::{Consumer, ConsumerError, Dispatch, ThreadedPoolBuilder};
//!
//! struct Broadcast;
//!
//! impl Dispatch for Broadcast {
//!     type Payload = String;
//!
//!     fn consumers(&self) -> Vec<Consumer<String>> {
//!         vec![Arc::new(|_payload: &String| {
//!             // Place your consumer logic here
//!             Ok(())
//!         })]
//!     }
//!
//!     fn max_inflight(&self) -> usize {
//!         4
//!     }
//!
//!     fn on_error(&self, _error: ConsumerError) {}
//! }
//!
//! let queue = Arc::new(InMemoryQueue::new());
//!
//! // Build a pool with 2 dedicated worker threads
//! let pool = ThreadedPoolBuilder::new()
//!     .pool_name("example")
//!     .num_threads(2)
//!     .build();
//!
//! pool.set_source(Arc::new(Broadcast), Arc::clone(&queue));
//! pool.start().expect("failed to start worker pool");
//!
//! // Announce new work so a blocked worker picks it up promptly
//! queue.enqueue("hello".to_owned());
//! pool.trigger_available();
//!
//! // Blocks until no worker is mid-drain
//! pool.stop();
//! ```
//!
//! ## Error Handling
//!
//! A consumer that returns an error or panics cancels the current work item; the pool keeps
//! running and the failure is forwarded to [`Dispatch::on_error`]. Panics raised by the
//! queue or the dispatch itself terminate the affected worker thread and are routed to the
//! pool's thread panic handler, if one is configured.

mod builder;
mod dispatch;
mod gate;
mod metrics;
mod pool;
mod worker;

pub use self::builder::*;
pub use self::dispatch::*;
pub use self::gate::*;
pub use self::metrics::*;
pub use self::pool::*;
