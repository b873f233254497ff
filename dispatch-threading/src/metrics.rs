use std::sync::atomic::AtomicU64;

/// The raw metrics of a worker pool.
///
/// Retrieved through [`metrics`](crate::ThreadedPool::metrics). The pool
/// emits nothing itself; embedders poll these counters and forward them to
/// their own telemetry. All access outside the pool must be *read* only.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Number of consumer invocations that finished an item.
    ///
    /// Counts invocations, not items: an item finished by several consumers
    /// contributes once per consumer.
    pub finished_invocations: AtomicU64,
    /// Number of consumer invocations that cancelled an item.
    pub cancelled_invocations: AtomicU64,
    /// Number of errors forwarded to the dispatch's error sink.
    pub consumer_errors: AtomicU64,
}
