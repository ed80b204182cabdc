//! Before and after actions: the two halves of an adornment.

use crate::Failure;

/// Boxed before action.
pub type BoxBeforeAction = Box<dyn BeforeAction>;

/// Boxed after action.
pub type BoxAfterAction = Box<dyn AfterAction>;

/// Runs before a task, producing the after action to run once it finishes.
pub trait BeforeAction: Send + 'static {
    /// Run the action.
    ///
    /// The only valid successful result is `Ok(Some(_))`. `Ok(None)` is a
    /// contract violation that callers treat as
    /// [`AdornError::NullAfterAction`](crate::AdornError::NullAfterAction).
    fn run_before(self: Box<Self>) -> Result<Option<BoxAfterAction>, Failure>;
}

/// Runs after a task.
pub trait AfterAction: Send + 'static {
    /// Run the action. `failure` is the failure of the task (or of the
    /// before phase), or `None` if neither failed.
    fn run_after(self: Box<Self>, failure: Option<&Failure>) -> Result<(), Failure>;
}

/// Before action that does nothing but return a [`NoopAfterAction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBeforeAction;

impl BeforeAction for NoopBeforeAction {
    fn run_before(self: Box<Self>) -> Result<Option<BoxAfterAction>, Failure> {
        Ok(Some(Box::new(NoopAfterAction)))
    }
}

/// After action that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAfterAction;

impl AfterAction for NoopAfterAction {
    fn run_after(self: Box<Self>, _failure: Option<&Failure>) -> Result<(), Failure> {
        Ok(())
    }
}

/// A before action backed by a closure. See [`before_fn`].
pub struct FnBeforeAction<F>(F);

impl<F> BeforeAction for FnBeforeAction<F>
where
    F: FnOnce() -> Result<Option<BoxAfterAction>, Failure> + Send + 'static,
{
    fn run_before(self: Box<Self>) -> Result<Option<BoxAfterAction>, Failure> {
        (self.0)()
    }
}

/// An after action backed by a closure. See [`after_fn`].
pub struct FnAfterAction<F>(F);

impl<F> AfterAction for FnAfterAction<F>
where
    F: FnOnce(Option<&Failure>) -> Result<(), Failure> + Send + 'static,
{
    fn run_after(self: Box<Self>, failure: Option<&Failure>) -> Result<(), Failure> {
        (self.0)(failure)
    }
}

/// Lift a closure into a boxed [`BeforeAction`].
pub fn before_fn<F>(f: F) -> BoxBeforeAction
where
    F: FnOnce() -> Result<Option<BoxAfterAction>, Failure> + Send + 'static,
{
    Box::new(FnBeforeAction(f))
}

/// Lift a closure into a boxed [`AfterAction`].
pub fn after_fn<F>(f: F) -> BoxAfterAction
where
    F: FnOnce(Option<&Failure>) -> Result<(), Failure> + Send + 'static,
{
    Box::new(FnAfterAction(f))
}
