use std::any::Any;
use std::io;
use std::sync::Arc;

use crate::gate::AvailabilityGate;
use crate::pool::{CustomSpawn, DefaultSpawn, Thread, ThreadSpawn, ThreadedPool};

/// Type alias for a thread safe closure that is used for panic handling across the code.
pub(crate) type PanicHandler = dyn Fn(Box<dyn Any + Send>) + Send + Sync;

/// [`ThreadedPoolBuilder`] provides a flexible way to configure and build a [`ThreadedPool`] for
/// draining work items concurrently on dedicated threads.
///
/// This builder enables you to customize the pool name, the number of threads, thread naming,
/// the availability gate, and panic handling strategies.
pub struct ThreadedPoolBuilder<S = DefaultSpawn> {
    pub(crate) pool_name: String,
    pub(crate) thread_name: Option<Box<dyn FnMut(usize) -> String + Send>>,
    pub(crate) thread_panic_handler: Option<Arc<PanicHandler>>,
    pub(crate) gate: Option<Arc<dyn AvailabilityGate>>,
    pub(crate) spawn_handler: S,
    pub(crate) num_threads: usize,
}

impl ThreadedPoolBuilder<DefaultSpawn> {
    /// Initializes a new [`ThreadedPoolBuilder`] with default settings.
    ///
    /// The pool starts out unnamed with a single worker thread and an open
    /// [`CrossThreadGate`](crate::CrossThreadGate).
    pub fn new() -> ThreadedPoolBuilder<DefaultSpawn> {
        ThreadedPoolBuilder {
            pool_name: "unnamed-worker-pool".to_owned(),
            thread_name: None,
            thread_panic_handler: None,
            gate: None,
            spawn_handler: DefaultSpawn,
            num_threads: 1,
        }
    }
}

impl Default for ThreadedPoolBuilder<DefaultSpawn> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ThreadedPoolBuilder<S>
where
    S: ThreadSpawn,
{
    /// Sets the name of the [`ThreadedPool`].
    ///
    /// The name shows up in log records and is the prefix for default thread names.
    pub fn pool_name(mut self, pool_name: impl Into<String>) -> Self {
        self.pool_name = pool_name.into();
        self
    }

    /// Specifies a custom naming convention for threads in the [`ThreadedPool`].
    ///
    /// The provided closure receives the thread's index and returns a name,
    /// which can be useful for debugging and logging. Without it, threads are
    /// named after the pool.
    pub fn thread_name<F>(mut self, thread_name: F) -> Self
    where
        F: FnMut(usize) -> String + Send + 'static,
    {
        self.thread_name = Some(Box::new(thread_name));
        self
    }

    /// Sets a custom panic handler for threads in the [`ThreadedPool`].
    ///
    /// If a thread panics, the provided handler will be invoked so that you can perform
    /// custom error handling or cleanup. Consumer panics never reach this handler; they
    /// are caught per invocation and reported through
    /// [`Dispatch::on_error`](crate::Dispatch::on_error).
    pub fn thread_panic_handler<F>(mut self, panic_handler: F) -> Self
    where
        F: Fn(Box<dyn Any + Send>) + Send + Sync + 'static,
    {
        self.thread_panic_handler = Some(Arc::new(panic_handler));
        self
    }

    /// Installs the availability gate workers block on while no work is announced.
    ///
    /// Defaults to an open [`CrossThreadGate`](crate::CrossThreadGate), which makes a
    /// fresh pool poll the queue without waiting for an explicit trigger.
    pub fn gate(mut self, gate: Arc<dyn AvailabilityGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Configures a custom thread spawning procedure for the [`ThreadedPool`].
    ///
    /// This method allows you to adjust thread settings (e.g. naming, stack size) before thread creation,
    /// making it possible to apply application-specific configurations.
    pub fn spawn_handler<F>(self, spawn_handler: F) -> ThreadedPoolBuilder<CustomSpawn<F>>
    where
        F: FnMut(Thread) -> io::Result<()>,
    {
        ThreadedPoolBuilder {
            pool_name: self.pool_name,
            thread_name: self.thread_name,
            thread_panic_handler: self.thread_panic_handler,
            gate: self.gate,
            spawn_handler: CustomSpawn::new(spawn_handler),
            num_threads: self.num_threads,
        }
    }

    /// Sets the number of worker threads for the [`ThreadedPool`].
    ///
    /// This determines how many dedicated threads each generation spawns to drain work.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Constructs a [`ThreadedPool`] based on the configured settings.
    ///
    /// The pool is created stopped and without collaborators; bind them with
    /// [`ThreadedPool::set_source`] and spawn workers with [`ThreadedPool::start`].
    pub fn build<Q, D>(self) -> ThreadedPool<Q, D, S> {
        ThreadedPool::new(self)
    }
}
