//! Ordered composition of adorners.

use adorn_core::{
    capture, AdornError, AfterAction, Adorner, BeforeAction, BoxAfterAction, BoxBeforeAction,
    Failure, SharedAdorner, Task,
};

/// Adorner that runs a list of adorners as one.
///
/// - Creation calls each adorner in order.
/// - The before phase runs each before action in order.
/// - The after phase runs each after action in reverse order, handing every
///   one the same failure.
///
/// Creation and before phases stop at the first failure and propagate it;
/// nothing already created or run is compensated. The after phase always runs
/// every after action: the first failure is surfaced and later ones are
/// attached to it as suppressed.
///
/// An empty composite does nothing at every phase.
#[derive(Clone, Default)]
pub struct CompositeAdorner {
    adorners: Vec<SharedAdorner>,
}

impl CompositeAdorner {
    /// Create a composite from adorners, in the order their before actions run.
    pub fn new<I>(adorners: I) -> Self
    where
        I: IntoIterator<Item = SharedAdorner>,
    {
        Self {
            adorners: adorners.into_iter().collect(),
        }
    }

    /// Number of constituent adorners.
    pub fn len(&self) -> usize {
        self.adorners.len()
    }

    /// Whether the composite has no constituents.
    pub fn is_empty(&self) -> bool {
        self.adorners.is_empty()
    }
}

impl FromIterator<SharedAdorner> for CompositeAdorner {
    fn from_iter<I: IntoIterator<Item = SharedAdorner>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Adorner for CompositeAdorner {
    fn create_adornment(&self, task: &dyn Task) -> Result<Option<BoxBeforeAction>, Failure> {
        let before_actions = self
            .adorners
            .iter()
            .map(|adorner| {
                adorner
                    .create_adornment(task)?
                    .ok_or_else(|| Failure::from(AdornError::NullBeforeAction))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Box::new(CompositeBeforeAction { before_actions })))
    }
}

struct CompositeBeforeAction {
    before_actions: Vec<BoxBeforeAction>,
}

impl BeforeAction for CompositeBeforeAction {
    fn run_before(self: Box<Self>) -> Result<Option<BoxAfterAction>, Failure> {
        let mut after_actions = Vec::with_capacity(self.before_actions.len());
        for action in self.before_actions {
            let after = action
                .run_before()?
                .ok_or_else(|| Failure::from(AdornError::NullAfterAction))?;
            after_actions.push(after);
        }
        after_actions.reverse();

        Ok(Some(Box::new(CompositeAfterAction { after_actions })))
    }
}

/// Holds after actions already in reverse acquisition order.
struct CompositeAfterAction {
    after_actions: Vec<BoxAfterAction>,
}

impl AfterAction for CompositeAfterAction {
    fn run_after(self: Box<Self>, failure: Option<&Failure>) -> Result<(), Failure> {
        let mut surfaced: Option<Failure> = None;
        for action in self.after_actions {
            if let Err(after_failure) = capture(|| action.run_after(failure)) {
                if surfaced.is_some() {
                    tracing::warn!(
                        failure = %after_failure,
                        "after action failed; attaching as suppressed"
                    );
                }
                surfaced = Failure::combine(surfaced, Some(after_failure));
            }
        }

        match surfaced {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
