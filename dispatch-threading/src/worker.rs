use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dispatch_queue::{WorkItem, WorkQueue};
use parking_lot::{Condvar, Mutex, RwLock};

use crate::dispatch::{ConsumerError, Dispatch};
use crate::gate::AvailabilityGate;
use crate::metrics::PoolMetrics;

/// Generation value meaning "no generation active".
pub(crate) const NO_GENERATION: u64 = 0;

/// State shared between a pool handle and its worker threads.
pub(crate) struct PoolState {
    /// The current generation token, [`NO_GENERATION`] while stopped.
    pub(crate) generation: AtomicU64,
    /// Monotonic source of fresh generation tokens.
    pub(crate) generations: AtomicU64,
    /// Number of workers currently inside their drain loop.
    pub(crate) inflight: AtomicUsize,
    /// Serializes slot claims against [`wait_idle`](Self::wait_idle), which
    /// blocks on `idle_cvar` until `inflight` reaches zero.
    idle_mutex: Mutex<()>,
    idle_cvar: Condvar,
    /// The current availability gate; replaceable at runtime.
    pub(crate) gate: RwLock<Arc<dyn AvailabilityGate>>,
    pub(crate) metrics: Arc<PoolMetrics>,
}

impl PoolState {
    pub(crate) fn new(gate: Arc<dyn AvailabilityGate>) -> Self {
        Self {
            generation: AtomicU64::new(NO_GENERATION),
            generations: AtomicU64::new(NO_GENERATION),
            inflight: AtomicUsize::new(0),
            idle_mutex: Mutex::new(()),
            idle_cvar: Condvar::new(),
            gate: RwLock::new(gate),
            metrics: Arc::new(PoolMetrics::default()),
        }
    }

    /// Blocks the calling thread until no worker is inside its drain loop.
    pub(crate) fn wait_idle(&self) {
        let mut idle = self.idle_mutex.lock();
        while self.inflight.load(Ordering::SeqCst) > 0 {
            self.idle_cvar.wait(&mut idle);
        }
    }
}

/// Holds one inflight slot for the duration of a drain loop.
///
/// The decrement runs on drop, so the slot is released and a stopping thread
/// is woken even when a collaborator panic unwinds the drain loop.
struct DrainGuard<'a> {
    state: &'a PoolState,
}

impl<'a> DrainGuard<'a> {
    /// Claims an inflight slot, or returns `None` if `generation` is no
    /// longer current.
    ///
    /// The generation check and the increment run under the idle mutex.
    /// Once a stopping thread has observed zero inflight workers under that
    /// mutex, no worker of the stopped generation can claim a slot anymore.
    fn enter(state: &'a PoolState, generation: u64) -> Option<Self> {
        let _idle = state.idle_mutex.lock();
        if state.generation.load(Ordering::SeqCst) != generation {
            return None;
        }

        state.inflight.fetch_add(1, Ordering::SeqCst);
        Some(Self { state })
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.state.inflight.fetch_sub(1, Ordering::SeqCst);
        // Serializes with a stopping thread between its inflight check and
        // its wait, so the notification cannot be lost.
        drop(self.state.idle_mutex.lock());
        self.state.idle_cvar.notify_all();
    }
}

/// A worker bound to one generation of a pool.
///
/// Runs the claim-drain loop until the pool's current generation no longer
/// matches the one this worker was spawned under.
pub(crate) struct Worker<Q, D> {
    state: Arc<PoolState>,
    queue: Arc<Q>,
    dispatch: Arc<D>,
    generation: u64,
}

impl<Q, D> Worker<Q, D>
where
    Q: WorkQueue,
    D: Dispatch<Payload = Q::Payload>,
{
    pub(crate) fn new(
        state: Arc<PoolState>,
        queue: Arc<Q>,
        dispatch: Arc<D>,
        generation: u64,
    ) -> Self {
        Self {
            state,
            queue,
            dispatch,
            generation,
        }
    }

    /// Returns `true` while this worker's generation is still current.
    fn running(&self) -> bool {
        self.state.generation.load(Ordering::SeqCst) == self.generation
    }

    /// The worker loop: gate, throttle, drain, repeat.
    pub(crate) fn run(self) {
        while self.running() {
            let gate = Arc::clone(&*self.state.gate.read());
            if !gate.wait_one() {
                continue;
            }

            if !self.running() {
                break;
            }

            // Soft throttle: claiming is skipped while the ceiling is
            // reached, and with an open gate this iteration spins rather
            // than sleeps.
            if self.state.inflight.load(Ordering::SeqCst) >= self.dispatch.max_inflight() {
                continue;
            }

            self.drain();
        }
    }

    /// Claims and processes items until the queue is empty or the pool
    /// stops.
    fn drain(&self) {
        let Some(_slot) = DrainGuard::enter(&self.state, self.generation) else {
            return;
        };

        while self.running() {
            let Some(mut item) = self.queue.try_dequeue() else {
                break;
            };

            for consumer in self.dispatch.consumers() {
                let result =
                    std::panic::catch_unwind(AssertUnwindSafe(|| consumer(item.payload())));

                match result {
                    Ok(Ok(())) => {
                        item.finish();
                        self.state
                            .metrics
                            .finished_invocations
                            .fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Err(error)) => {
                        item.cancel();
                        self.state
                            .metrics
                            .cancelled_invocations
                            .fetch_add(1, Ordering::Relaxed);
                        dispatch_log::debug!(
                            error = &*error as &dyn std::error::Error,
                            "consumer failed, work item cancelled"
                        );
                        self.forward_error(ConsumerError::Failed(error));
                    }
                    Err(panic) => {
                        item.cancel();
                        self.state
                            .metrics
                            .cancelled_invocations
                            .fetch_add(1, Ordering::Relaxed);
                        self.forward_error(ConsumerError::from_panic(panic));
                    }
                }
            }
        }
    }

    fn forward_error(&self, error: ConsumerError) {
        self.state
            .metrics
            .consumer_errors
            .fetch_add(1, Ordering::Relaxed);
        self.dispatch.on_error(error);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::time::{Duration, Instant};

    use crate::gate::CrossThreadGate;

    use super::*;

    #[test]
    fn test_drain_guard_releases_slot_on_panic() {
        let state = PoolState::new(Arc::new(CrossThreadGate::open()));
        state.generation.store(1, Ordering::SeqCst);

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _slot = DrainGuard::enter(&state, 1).unwrap();
            assert_eq!(state.inflight.load(Ordering::SeqCst), 1);
            panic!("queue exploded");
        }));

        assert!(result.is_err());
        assert_eq!(state.inflight.load(Ordering::SeqCst), 0);
        // Must not block once the slot is released.
        state.wait_idle();
    }

    #[test]
    fn test_enter_refuses_stale_generation() {
        let state = PoolState::new(Arc::new(CrossThreadGate::open()));
        state.generation.store(2, Ordering::SeqCst);

        assert!(DrainGuard::enter(&state, 1).is_none());

        state.generation.store(NO_GENERATION, Ordering::SeqCst);
        assert!(DrainGuard::enter(&state, 2).is_none());
        assert_eq!(state.inflight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wait_idle_blocks_until_slot_released() {
        let state = Arc::new(PoolState::new(Arc::new(CrossThreadGate::open())));
        state.generation.store(1, Ordering::SeqCst);
        let entered = Arc::new(AtomicBool::new(false));

        let handle = {
            let state = Arc::clone(&state);
            let entered = Arc::clone(&entered);
            std::thread::spawn(move || {
                let _slot = DrainGuard::enter(&state, 1).unwrap();
                entered.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(50));
            })
        };

        while !entered.load(Ordering::SeqCst) {
            std::hint::spin_loop();
        }

        let start = Instant::now();
        state.wait_idle();

        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(state.inflight.load(Ordering::SeqCst), 0);
        handle.join().unwrap();
    }
}
