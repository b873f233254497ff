use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Interval after which a parked worker re-checks its running condition.
const WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// A cross-thread binary signal with manual-reset semantics.
///
/// Workers block on the gate before attempting to claim work; producers open
/// it after enqueueing so idle workers wake up promptly. Once opened, the
/// gate stays open until something explicitly closes it. The pool itself
/// never closes the gate.
pub trait AvailabilityGate: Send + Sync {
    /// Opens the gate, releasing all blocked waiters.
    ///
    /// The gate remains open for subsequent waiters until it is explicitly
    /// closed again.
    fn set(&self);

    /// Blocks the calling thread until the gate is open.
    ///
    /// Returns `true` once the gate is observed open. A `false` return means
    /// the wait ended without observing an open gate; the caller must
    /// re-check its own running condition and retry instead of treating it
    /// as "work available". Implementations are free to return `false`
    /// spuriously, and the default implementation does so on a fixed
    /// interval so that workers of a stopped pool terminate instead of
    /// parking forever on a gate nobody will open again.
    fn wait_one(&self) -> bool;
}

/// The default manual-reset [`AvailabilityGate`].
///
/// A single boolean guarded by a mutex, with a condition variable to release
/// waiters when the gate opens.
#[derive(Debug)]
pub struct CrossThreadGate {
    open: Mutex<bool>,
    condvar: Condvar,
}

impl CrossThreadGate {
    /// Creates a gate in the open state.
    ///
    /// This is the state a worker pool starts with, so workers poll the
    /// queue freely until something closes the gate.
    pub fn open() -> Self {
        Self {
            open: Mutex::new(true),
            condvar: Condvar::new(),
        }
    }

    /// Creates a gate in the closed state.
    pub fn closed() -> Self {
        Self {
            open: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Closes the gate.
    ///
    /// Waiters already released are unaffected; future waits block until the
    /// next [`set`](AvailabilityGate::set). The pool never calls this, it is
    /// meant for external schedulers that want to pause claiming.
    pub fn reset(&self) {
        *self.open.lock() = false;
    }

    /// Returns `true` if the gate is currently open.
    pub fn is_set(&self) -> bool {
        *self.open.lock()
    }
}

impl AvailabilityGate for CrossThreadGate {
    fn set(&self) {
        *self.open.lock() = true;
        self.condvar.notify_all();
    }

    fn wait_one(&self) -> bool {
        let mut open = self.open.lock();
        if *open {
            return true;
        }

        self.condvar.wait_for(&mut open, WAIT_INTERVAL);
        *open
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_open_gate_does_not_block() {
        let gate = CrossThreadGate::open();

        let start = Instant::now();
        assert!(gate.wait_one());
        assert!(start.elapsed() < WAIT_INTERVAL);
    }

    #[test]
    fn test_closed_gate_reports_no_signal() {
        let gate = CrossThreadGate::closed();

        assert!(!gate.wait_one());
        assert!(!gate.is_set());
    }

    #[test]
    fn test_set_persists_across_waits() {
        let gate = CrossThreadGate::closed();
        gate.set();

        // Manual-reset semantics: waking up does not consume the signal.
        assert!(gate.wait_one());
        assert!(gate.wait_one());
        assert!(gate.is_set());
    }

    #[test]
    fn test_reset_closes_the_gate() {
        let gate = CrossThreadGate::open();
        gate.reset();

        assert!(!gate.is_set());
        assert!(!gate.wait_one());
    }

    #[test]
    fn test_set_releases_blocked_waiter() {
        let gate = Arc::new(CrossThreadGate::closed());
        let released = Arc::new(AtomicBool::new(false));

        let handle = {
            let gate = Arc::clone(&gate);
            let released = Arc::clone(&released);
            std::thread::spawn(move || {
                while !gate.wait_one() {}
                released.store(true, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(10));
        assert!(!released.load(Ordering::SeqCst));

        gate.set();
        handle.join().unwrap();
        assert!(released.load(Ordering::SeqCst));
    }
}
