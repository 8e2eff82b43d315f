//! Interaction-thread executors.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// A unit of work for the interaction thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Interaction thread has stopped")]
    Stopped,
    #[error("Interaction task panicked")]
    TaskPanicked,
    #[error("Failed to spawn interaction thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Runs work on the interaction thread.
#[async_trait]
pub trait InteractionExecutor: Send + Sync {
    fn is_interaction_thread(&self) -> bool;

    /// Queues `task` and returns immediately.
    fn run_async(&self, task: Task) -> Result<(), ExecutorError>;

    /// Runs `task` on the interaction thread and waits for it to finish.
    ///
    /// Runs inline when already on the interaction thread.
    async fn run_sync(&self, task: Task) -> Result<(), ExecutorError> {
        if self.is_interaction_thread() {
            return catch_unwind(AssertUnwindSafe(task)).map_err(|_| ExecutorError::TaskPanicked);
        }
        let (done, finished) = oneshot::channel();
        self.run_async(Box::new(move || {
            task();
            let _ = done.send(());
        }))?;
        // The sender is dropped without a value if the task panicked.
        finished.await.map_err(|_| ExecutorError::TaskPanicked)
    }
}

/// Runs `f` on the interaction thread and returns its result.
pub async fn call_sync<R, F>(executor: &dyn InteractionExecutor, f: F) -> Result<R, ExecutorError>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    if executor.is_interaction_thread() {
        return catch_unwind(AssertUnwindSafe(f)).map_err(|_| ExecutorError::TaskPanicked);
    }
    let (result, received) = oneshot::channel();
    executor.run_async(Box::new(move || {
        let _ = result.send(f());
    }))?;
    received.await.map_err(|_| ExecutorError::TaskPanicked)
}

/// Executor that treats every thread as the interaction thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl InteractionExecutor for InlineExecutor {
    fn is_interaction_thread(&self) -> bool {
        true
    }

    fn run_async(&self, task: Task) -> Result<(), ExecutorError> {
        catch_unwind(AssertUnwindSafe(task)).map_err(|_| ExecutorError::TaskPanicked)
    }
}

enum InteractionRequest {
    Run(Task),
    Shutdown,
}

/// A dedicated thread that runs queued tasks one at a time, in submission order.
///
/// The thread exits after [`InteractionThread::shutdown`] or once every handle has been
/// dropped; tasks queued before either are still run.
pub struct InteractionThread {
    sender: mpsc::UnboundedSender<InteractionRequest>,
    thread_id: ThreadId,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl InteractionThread {
    pub fn spawn(name: impl Into<String>) -> Result<Self, ExecutorError> {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<InteractionRequest>();
        let thread_name = name.clone();

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                info!(thread = %thread_name, "Interaction thread started");
                let mut executed = 0u64;
                while let Some(request) = receiver.blocking_recv() {
                    match request {
                        InteractionRequest::Run(task) => {
                            executed += 1;
                            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                                error!(thread = %thread_name, "Interaction task panicked");
                            }
                        }
                        InteractionRequest::Shutdown => break,
                    }
                }
                info!(thread = %thread_name, executed, "Interaction thread stopped");
            })
            .map_err(ExecutorError::Spawn)?;

        Ok(Self {
            sender,
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Stops the thread after the tasks already queued, and waits for it.
    ///
    /// Called from the interaction thread itself, it only requests the stop.
    pub fn shutdown(&self) -> Result<(), ExecutorError> {
        let _ = self.sender.send(InteractionRequest::Shutdown);
        if self.is_interaction_thread() {
            return Ok(());
        }
        let Some(handle) = self.handle.lock().take() else {
            return Ok(());
        };
        debug!("Joining interaction thread");
        handle.join().map_err(|_| ExecutorError::TaskPanicked)
    }
}

impl InteractionExecutor for InteractionThread {
    fn is_interaction_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    fn run_async(&self, task: Task) -> Result<(), ExecutorError> {
        self.sender
            .send(InteractionRequest::Run(task))
            .map_err(|_| ExecutorError::Stopped)
    }
}
