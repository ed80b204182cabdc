//! The executor capability and the plain executors shipped with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adorn_core::{AdornError, BoxTask, Failure};
use tokio::runtime::Handle;
use tracing::{error, warn};

/// Accepts tasks for execution at some point in the future.
///
/// An executor decides when and on which thread a task runs. Once
/// `execute` returns `Ok`, the task must eventually be run.
pub trait Executor: Send + Sync {
    /// Submit a task.
    fn execute(&self, task: BoxTask) -> Result<(), Failure>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        (**self).execute(task)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        (**self).execute(task)
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        (**self).execute(task)
    }
}

/// Runs each task immediately on the submitting thread and returns its
/// result from `execute`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        task.run()
    }
}

/// Runs each task on the blocking pool of a tokio runtime.
///
/// Failures surface on a pool thread with no caller to receive them, so
/// they are logged at `error` level, as are panics and cancellations seen
/// on the task's join handle. A runtime that is shutting down cancels the
/// task before it starts; `execute` then returns [`AdornError::Rejected`].
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Executor bound to `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor bound to the runtime the caller is running in.
    pub fn current() -> Result<Self, AdornError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| AdornError::Rejected(e.to_string()))
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        let name = task.name().to_owned();
        let started = Arc::new(AtomicBool::new(false));

        let run_name = name.clone();
        let run_started = started.clone();
        let join = self.handle.spawn_blocking(move || {
            run_started.store(true, Ordering::SeqCst);
            if let Err(failure) = task.run() {
                error!(task = %run_name, failure = %format!("{failure:#}"), "task failed");
            }
        });

        // Finished without starting means the pool refused it.
        if join.is_finished() && !started.load(Ordering::SeqCst) {
            warn!(task = %name, "runtime is shutting down; task rejected");
            let reason = format!("runtime is shutting down, {name} did not run");
            return Err(AdornError::Rejected(reason).into());
        }

        self.handle.spawn(async move {
            match join.await {
                Ok(()) => {}
                Err(e) if e.is_panic() => {
                    let failure = Failure::from_panic(e.into_panic());
                    error!(task = %name, %failure, "task panicked");
                }
                Err(_) => error!(task = %name, "task cancelled before it ran"),
            }
        });
        Ok(())
    }
}
