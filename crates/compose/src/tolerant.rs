//! Fault-tolerant decoration of adorners.

use std::sync::Arc;

use adorn_core::{
    capture, AdornError, AfterAction, Adorner, BeforeAction, BoxAfterAction, BoxBeforeAction,
    Failure, NoopAfterAction, NoopBeforeAction, SharedAdorner, SharedObserver, Task,
};

use crate::CompositeAdorner;

/// Adorner that diverts the failures of another adorner to an observer.
///
/// At each phase (creation, before, after) a failure or panic of the
/// decorated operation is handed to the observer and a no-op is substituted
/// for the result. An absent before or after action counts as a failure of
/// the phase that produced it.
///
/// It is only *mostly* fault tolerant: whatever the observer returns as an
/// error (or panics with) propagates unchanged. Wrap the observer in
/// [`FaultSwallowingObserver`](crate::FaultSwallowingObserver) to swallow
/// everything.
#[derive(Clone)]
pub struct MostlyFaultTolerantAdorner {
    decorated: SharedAdorner,
    observer: SharedObserver,
}

impl MostlyFaultTolerantAdorner {
    /// Decorate `decorated`, reporting its failures to `observer`.
    pub fn new(decorated: SharedAdorner, observer: SharedObserver) -> Self {
        Self {
            decorated,
            observer,
        }
    }
}

impl Adorner for MostlyFaultTolerantAdorner {
    fn create_adornment(&self, task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure> {
        let created = capture(|| self.decorated.create_adornment(task))
            .and_then(|before| before.ok_or_else(|| AdornError::NullBeforeAction.into()));

        match created {
            Ok(decorated) => Ok(Some(Box::new(TolerantBeforeAction {
                decorated,
                observer: self.observer.clone(),
            }))),
            Err(failure) => {
                tracing::debug!(task = task.name(), %failure, "adornment creation failed");
                self.observer.observe(failure)?;
                Ok(Some(Box::new(NoopBeforeAction)))
            }
        }
    }
}

struct TolerantBeforeAction {
    decorated: BoxBeforeAction,
    observer: SharedObserver,
}

impl BeforeAction for TolerantBeforeAction {
    fn run_before(self: Box<Self>) -> Result<Option<BoxAfterAction>, Failure> {
        let Self {
            decorated,
            observer,
        } = *self;
        let ran = capture(move || decorated.run_before())
            .and_then(|after| after.ok_or_else(|| AdornError::NullAfterAction.into()));

        match ran {
            Ok(decorated) => Ok(Some(Box::new(TolerantAfterAction {
                decorated,
                observer,
            }))),
            Err(failure) => {
                tracing::debug!(%failure, "before action failed");
                observer.observe(failure)?;
                Ok(Some(Box::new(NoopAfterAction)))
            }
        }
    }
}

struct TolerantAfterAction {
    decorated: BoxAfterAction,
    observer: SharedObserver,
}

impl AfterAction for TolerantAfterAction {
    fn run_after(self: Box<Self>, failure: Option<&Failure>) -> Result<(), Failure> {
        let Self {
            decorated,
            observer,
        } = *self;
        if let Err(after_failure) = capture(move || decorated.run_after(failure)) {
            tracing::debug!(failure = %after_failure, "after action failed");
            observer.observe(after_failure)?;
        }
        Ok(())
    }
}

/// Composite of `adorners`, each wrapped in a [`MostlyFaultTolerantAdorner`]
/// sharing `observer`.
pub fn composite_of_mostly_fault_tolerant<I>(adorners: I, observer: SharedObserver) -> CompositeAdorner
where
    I: IntoIterator<Item = SharedAdorner>,
{
    adorners
        .into_iter()
        .map(|adorner| {
            Arc::new(MostlyFaultTolerantAdorner::new(adorner, observer.clone())) as SharedAdorner
        })
        .collect()
}
