//! Adorners create the before/after adornment for a submitted task.

use std::sync::Arc;

use crate::{BoxBeforeAction, Failure, NoopBeforeAction, Task};

/// Shared adorner handle.
pub type SharedAdorner = Arc<dyn Adorner>;

/// Creates adornments for tasks submitted to an executor.
///
/// Called once per submission on the submitting thread. The task is only
/// lent for inspection; it runs later, when the executor gets to it.
pub trait Adorner: Send + Sync {
    /// Create the before action for `task`.
    ///
    /// `Ok(None)` is a contract violation that callers treat as
    /// [`AdornError::NullBeforeAction`](crate::AdornError::NullBeforeAction).
    fn create_adornment(&self, task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure>;
}

impl<A: Adorner + ?Sized> Adorner for Arc<A> {
    fn create_adornment(&self, task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure> {
        (**self).create_adornment(task)
    }
}

impl<A: Adorner + ?Sized> Adorner for Box<A> {
    fn create_adornment(&self, task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure> {
        (**self).create_adornment(task)
    }
}

/// Adorner whose adornment does nothing at every phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdorner;

impl Adorner for NoopAdorner {
    fn create_adornment(&self, _task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure> {
        Ok(Some(Box::new(NoopBeforeAction)))
    }
}

/// An adorner backed by a closure. See [`adorner_fn`].
pub struct FnAdorner<F>(F);

impl<F> Adorner for FnAdorner<F>
where
    F: Fn(&dyn Task) -> Result<Option<BoxBeforeAction>, Failure> + Send + Sync,
{
    fn create_adornment(&self, task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure> {
        (self.0)(task)
    }
}

/// Lift a closure into a shared [`Adorner`].
pub fn adorner_fn<F>(f: F) -> SharedAdorner
where
    F: Fn(&dyn Task) -> Result<Option<BoxBeforeAction>, Failure> + Send + Sync + 'static,
{
    Arc::new(FnAdorner(f))
}
