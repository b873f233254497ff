use std::any::Any;
use std::fmt;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use dispatch_queue::WorkQueue;
use parking_lot::Mutex;
use thiserror::Error;

use crate::builder::{PanicHandler, ThreadedPoolBuilder};
use crate::dispatch::Dispatch;
use crate::gate::{AvailabilityGate, CrossThreadGate};
use crate::metrics::PoolMetrics;
use crate::worker::{NO_GENERATION, PoolState, Worker};

/// An error returned when starting a [`ThreadedPool`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has no collaborators bound.
    #[error("worker pool has no source, call `set_source` before `start`")]
    Unbound,

    /// A worker thread could not be spawned.
    ///
    /// The pool is rolled back to the stopped state; workers spawned before
    /// the failure terminate on their own.
    #[error("failed to spawn a worker thread")]
    Spawn(#[source] io::Error),
}

/// The collaborators a pool drains from and dispatches to.
struct PoolSource<Q, D> {
    dispatch: Arc<D>,
    queue: Arc<Q>,
}

/// Spawn settings that are consulted on every `start`.
struct SpawnConfig<S> {
    handler: S,
    thread_name: Option<Box<dyn FnMut(usize) -> String + Send>>,
}

/// A worker pool that drains a [`WorkQueue`] against the consumers of a
/// [`Dispatch`] on a fixed set of dedicated threads.
///
/// Each `start` installs a fresh generation token and spawns one worker per
/// configured thread; each worker runs a blocking loop that gates on the
/// pool's [`AvailabilityGate`], honors the dispatch's inflight ceiling, and
/// drains the queue one claimed item at a time. `stop` clears the generation
/// so workers self-terminate, then blocks until no worker is mid-drain.
/// Start/stop cycles may be repeated; stale workers from a previous
/// generation exit on their next generation check instead of being joined.
pub struct ThreadedPool<Q, D, S = DefaultSpawn> {
    name: String,
    num_threads: usize,
    panic_handler: Option<Arc<PanicHandler>>,
    source: Mutex<Option<PoolSource<Q, D>>>,
    spawn: Mutex<SpawnConfig<S>>,
    state: Arc<PoolState>,
}

impl<Q, D, S> ThreadedPool<Q, D, S> {
    /// Constructs a new [`ThreadedPool`] using the configuration specified
    /// by [`ThreadedPoolBuilder`].
    ///
    /// No threads are spawned here; that happens in [`start`](Self::start).
    pub fn new(builder: ThreadedPoolBuilder<S>) -> Self {
        let gate = builder
            .gate
            .unwrap_or_else(|| Arc::new(CrossThreadGate::open()));

        Self {
            name: builder.pool_name,
            num_threads: builder.num_threads,
            panic_handler: builder.thread_panic_handler,
            source: Mutex::new(None),
            spawn: Mutex::new(SpawnConfig {
                handler: builder.spawn_handler,
                thread_name: builder.thread_name,
            }),
            state: Arc::new(PoolState::new(gate)),
        }
    }

    /// Binds the dispatch and queue collaborators.
    ///
    /// Must be called before [`start`](Self::start) and is not safe to call
    /// concurrently with it; a rebind takes effect on the next generation.
    pub fn set_source(&self, dispatch: Arc<D>, queue: Arc<Q>) {
        *self.source.lock() = Some(PoolSource { dispatch, queue });
    }

    /// Clears the generation token and blocks until no worker is mid-drain.
    ///
    /// Workers observe the cleared generation on their next check and
    /// self-terminate. An in-progress consumer invocation is not
    /// interrupted; if one hangs, this blocks indefinitely. Once this
    /// returns, no worker of the stopped generation holds an inflight slot
    /// or can claim one. Stopping a pool that was never started returns
    /// immediately.
    pub fn stop(&self) {
        dispatch_log::debug!(pool = self.name.as_str(), "stopping worker pool");
        self.state.generation.store(NO_GENERATION, Ordering::SeqCst);
        self.state.wait_idle();
        dispatch_log::debug!(pool = self.name.as_str(), "worker pool drained");
    }

    /// Opens the current availability gate, releasing blocked workers.
    ///
    /// Producers call this right after enqueueing so a new item is picked up
    /// promptly rather than on the next poll.
    pub fn trigger_available(&self) {
        self.state.gate.read().set();
    }

    /// Returns the number of workers currently inside their drain loop.
    ///
    /// This counts threads, not items: a single worker holding a slot may
    /// process arbitrarily many items back-to-back.
    pub fn workers_inflight(&self) -> usize {
        self.state.inflight.load(Ordering::SeqCst)
    }

    /// Returns the current availability gate.
    pub fn gate(&self) -> Arc<dyn AvailabilityGate> {
        Arc::clone(&*self.state.gate.read())
    }

    /// Replaces the availability gate.
    ///
    /// Lets an external scheduler substitute its own gate implementation.
    /// Workers pick up the replacement on their next loop iteration; a
    /// worker blocked on the previous gate re-reads after its current wait
    /// ends.
    pub fn set_gate(&self, gate: Arc<dyn AvailabilityGate>) {
        *self.state.gate.write() = gate;
    }

    /// Provides access to the raw metrics tracked by this pool.
    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.state.metrics
    }

    /// Returns the name of this pool.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of worker threads spawned per generation.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl<Q, D, S> ThreadedPool<Q, D, S>
where
    Q: WorkQueue + 'static,
    D: Dispatch<Payload = Q::Payload> + 'static,
    S: ThreadSpawn,
{
    /// Installs a fresh generation and spawns the configured number of
    /// worker threads.
    ///
    /// Idempotent: a repeated or concurrent `start` on an already started
    /// pool is an `Ok` no-op. Fails with [`PoolError::Unbound`] if
    /// [`set_source`](Self::set_source) was never called, and with
    /// [`PoolError::Spawn`] if thread creation fails, in which case the
    /// generation is rolled back and the pool is left stopped.
    pub fn start(&self) -> Result<(), PoolError> {
        let (dispatch, queue) = {
            let source = self.source.lock();
            let Some(source) = source.as_ref() else {
                return Err(PoolError::Unbound);
            };
            (Arc::clone(&source.dispatch), Arc::clone(&source.queue))
        };

        let generation = self.state.generations.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .state
            .generation
            .compare_exchange(NO_GENERATION, generation, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let mut spawn = self.spawn.lock();
        for index in 0..self.num_threads {
            let worker = Worker::new(
                Arc::clone(&self.state),
                Arc::clone(&queue),
                Arc::clone(&dispatch),
                generation,
            );

            let name = match spawn.thread_name.as_mut() {
                Some(thread_name) => thread_name(index),
                None => format!("{}-{index}", self.name),
            };

            let thread = Thread {
                index,
                name: Some(name),
                panic_handler: self.panic_handler.clone(),
                task: Box::new(move || worker.run()),
            };

            if let Err(error) = spawn.handler.spawn(thread) {
                // Stale workers of the rolled-back generation exit on their
                // next generation check.
                self.state.generation.store(NO_GENERATION, Ordering::SeqCst);
                return Err(PoolError::Spawn(error));
            }
        }

        dispatch_log::debug!(
            pool = self.name.as_str(),
            threads = self.num_threads,
            generation,
            "worker pool started"
        );

        Ok(())
    }
}

impl<Q, D, S> Drop for ThreadedPool<Q, D, S> {
    fn drop(&mut self) {
        // Detach: workers self-terminate on their next generation check.
        // An explicit `stop` remains the way to wait for a full drain.
        self.state.generation.store(NO_GENERATION, Ordering::SeqCst);
    }
}

impl<Q, D, S> fmt::Debug for ThreadedPool<Q, D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadedPool")
            .field("name", &self.name)
            .field("num_threads", &self.num_threads)
            .field("workers_inflight", &self.workers_inflight())
            .finish_non_exhaustive()
    }
}

/// Represents a dedicated worker thread of a [`ThreadedPool`].
pub struct Thread {
    index: usize,
    name: Option<String>,
    #[allow(clippy::type_complexity)]
    panic_handler: Option<Arc<dyn Fn(Box<dyn Any + Send>) + Send + Sync>>,
    task: Box<dyn FnOnce() + Send + 'static>,
}

impl Thread {
    /// Returns the identifier assigned to this thread.
    ///
    /// Thread indices restart at zero for every generation.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the name of this thread, if one was provided.
    ///
    /// Thread names can aid in logging and debugging by providing a
    /// human-readable identifier.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Thread {
    /// Runs the worker loop associated with this thread.
    ///
    /// If there is a panic during execution, the `panic_handler` will be
    /// called.
    pub fn run(self) {
        let Self {
            panic_handler,
            task,
            ..
        } = self;

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| task()));

        match (panic_handler, result) {
            // Panic handler and error, we swallow the panic and invoke the callback.
            (Some(panic_handler), Err(error)) => {
                panic_handler(error);
            }
            // No panic handler and error, we propagate the panic.
            (None, Err(error)) => {
                std::panic::resume_unwind(error);
            }
            // Otherwise, we do nothing.
            (_, Ok(())) => {}
        }
    }
}

/// A trait for customizing the spawning of threads in a [`ThreadedPool`].
///
/// Implement [`ThreadSpawn`] to modify thread settings—such as the thread
/// name or stack size—prior to creation, allowing the thread to be tailored
/// for the requirements of your application.
pub trait ThreadSpawn {
    /// Spawns a new thread using the provided configuration.
    fn spawn(&mut self, thread: Thread) -> io::Result<()>;
}

/// A default implementation of [`ThreadSpawn`] that uses system defaults.
///
/// [`DefaultSpawn`] does not alter thread settings and relies on the
/// standard behavior of the operating system.
#[derive(Clone)]
pub struct DefaultSpawn;

impl ThreadSpawn for DefaultSpawn {
    fn spawn(&mut self, thread: Thread) -> io::Result<()> {
        let mut b = std::thread::Builder::new();
        if let Some(name) = thread.name() {
            b = b.name(name.to_owned());
        }
        b.spawn(|| thread.run())?;

        Ok(())
    }
}

/// A flexible [`ThreadSpawn`] implementation that uses a closure for dynamic
/// thread configuration.
///
/// Use [`CustomSpawn`] to provide custom settings for thread creation via a
/// user-supplied closure.
#[derive(Clone)]
pub struct CustomSpawn<B>(B);

impl<B> CustomSpawn<B> {
    /// Creates a new instance of [`CustomSpawn`] with the provided
    /// configuration closure.
    pub fn new(spawn_handler: B) -> Self {
        CustomSpawn(spawn_handler)
    }
}

impl<B> ThreadSpawn for CustomSpawn<B>
where
    B: FnMut(Thread) -> io::Result<()>,
{
    /// Applies the custom configuration closure when spawning a new thread.
    fn spawn(&mut self, thread: Thread) -> io::Result<()> {
        self.0(thread)
    }
}
