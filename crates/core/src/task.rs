//! Task model - the unit of deferred work handed to an executor.

use crate::Failure;

/// Boxed task, as accepted by executors.
pub type BoxTask = Box<dyn Task>;

/// A unit of deferred work.
///
/// A task runs at most once: [`run`](Task::run) consumes it.
pub trait Task: Send + 'static {
    /// Run the task.
    fn run(self: Box<Self>) -> Result<(), Failure>;

    /// Name used in logs. Defaults to the concrete type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A task backed by a closure. See [`task_fn`].
pub struct FnTask<F> {
    f: F,
    name: Option<String>,
}

impl<F> FnTask<F> {
    /// Give the task a name for logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<F> Task for FnTask<F>
where
    F: FnOnce() -> Result<(), Failure> + Send + 'static,
{
    fn run(self: Box<Self>) -> Result<(), Failure> {
        (self.f)()
    }

    fn name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| std::any::type_name::<F>())
    }
}

/// Lift a closure into a [`Task`].
pub fn task_fn<F>(f: F) -> FnTask<F>
where
    F: FnOnce() -> Result<(), Failure> + Send + 'static,
{
    FnTask { f, name: None }
}
