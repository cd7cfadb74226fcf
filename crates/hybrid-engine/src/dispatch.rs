//! Dispatchers: run native work on a thread that owns it
//!
//! Some native resources must be torn down on the thread that created them
//! (render thread, loader thread). Bridged wrappers hold an
//! `Arc<dyn Dispatcher>` and hand their teardown to it instead of running it
//! on whichever thread dropped the last reference.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam::channel::{self, Receiver, Sender};
use hybrid_sdk::panic_message;
use parking_lot::Mutex;

use crate::error::{EngineError, EngineResult};
use crate::options::EngineOptions;

/// A unit of work for a dispatcher
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs jobs asynchronously, in submission order.
pub trait Dispatcher: Send + Sync {
    /// Queue `job`; fails if the dispatcher no longer accepts work
    fn run_async(&self, job: Job) -> EngineResult<()>;

    /// Whether the caller is already on the dispatcher's thread
    fn is_dispatcher_thread(&self) -> bool;
}

/// Runs jobs in order on one dedicated, named thread.
pub struct ThreadDispatcher {
    name: String,
    sender: Mutex<Option<Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl ThreadDispatcher {
    /// Spawn the dispatcher thread
    pub fn new(name: impl Into<String>) -> EngineResult<Self> {
        let name = name.into();
        let (sender, receiver) = channel::unbounded::<Job>();

        let worker_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_jobs(&worker_name, receiver))
            .map_err(|source| EngineError::Spawn {
                name: name.clone(),
                source,
            })?;

        tracing::debug!(dispatcher = %name, "dispatcher started");
        Ok(Self {
            thread_id: handle.thread().id(),
            name,
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Spawn using the configured thread name
    pub fn from_options(options: &EngineOptions) -> EngineResult<Self> {
        Self::new(options.dispatcher_thread_name.clone())
    }

    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether jobs are still accepted
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Stop accepting jobs, run the ones already queued and join the thread.
    ///
    /// Idempotent. Called from a job on the dispatcher thread itself, it
    /// only closes the queue; the thread exits once the queue is drained.
    pub fn shutdown(&self) {
        // Dropping the sender disconnects the channel once the queue is empty
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if self.is_dispatcher_thread() {
                return;
            }
            if handle.join().is_err() {
                tracing::error!(dispatcher = %self.name, "dispatcher thread panicked");
            }
        }
        tracing::debug!(dispatcher = %self.name, "dispatcher stopped");
    }
}

fn run_jobs(name: &str, receiver: Receiver<Job>) {
    for job in receiver.iter() {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
            tracing::error!(
                dispatcher = name,
                panic = %panic_message(payload.as_ref()),
                "dispatched job panicked"
            );
        }
    }
}

impl Dispatcher for ThreadDispatcher {
    fn run_async(&self, job: Job) -> EngineResult<()> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(EngineError::Dispatcher(format!("{} is shut down", self.name)));
        };
        sender
            .send(job)
            .map_err(|_| EngineError::Dispatcher(format!("{} thread is gone", self.name)))
    }

    fn is_dispatcher_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ThreadDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadDispatcher")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}
