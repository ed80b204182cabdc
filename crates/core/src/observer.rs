//! Observers receive failures diverted away from adornment execution.

use std::sync::Arc;

use crate::Failure;

/// Shared observer handle.
pub type SharedObserver = Arc<dyn FailureObserver>;

/// Sink for failures raised by adornments (never by the task itself).
///
/// Returning `Err` propagates that failure to whoever invoked the adornment.
/// Returning the observed failure is the way to let through failures that
/// must not be swallowed.
pub trait FailureObserver: Send + Sync {
    /// Observe a failure.
    fn observe(&self, failure: Failure) -> Result<(), Failure>;
}

impl<O: FailureObserver + ?Sized> FailureObserver for Arc<O> {
    fn observe(&self, failure: Failure) -> Result<(), Failure> {
        (**self).observe(failure)
    }
}

impl<O: FailureObserver + ?Sized> FailureObserver for Box<O> {
    fn observe(&self, failure: Failure) -> Result<(), Failure> {
        (**self).observe(failure)
    }
}

/// An observer backed by a closure. See [`observer_fn`].
pub struct FnObserver<F>(F);

impl<F> FailureObserver for FnObserver<F>
where
    F: Fn(Failure) -> Result<(), Failure> + Send + Sync,
{
    fn observe(&self, failure: Failure) -> Result<(), Failure> {
        (self.0)(failure)
    }
}

/// Lift a closure into a shared [`FailureObserver`].
pub fn observer_fn<F>(f: F) -> SharedObserver
where
    F: Fn(Failure) -> Result<(), Failure> + Send + Sync + 'static,
{
    Arc::new(FnObserver(f))
}
