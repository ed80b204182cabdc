//! The shared failure value and panic capture.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::AdornError;

/// Boxed error accepted as the cause of a [`Failure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure surfaced by a task or one of its adornments.
///
/// Holds the primary cause plus an ordered list of suppressed failures. The
/// suppressed list only ever grows: aggregation appends to it and never
/// reorders or drops entries.
#[derive(Debug)]
pub struct Failure {
    cause: BoxError,
    suppressed: Vec<Failure>,
}

impl Failure {
    /// Create a failure from any error (or string) cause.
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self {
            cause: cause.into(),
            suppressed: Vec::new(),
        }
    }

    /// Create a failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }

    /// Convert a caught panic payload into a failure.
    ///
    /// A payload that is itself a `Failure` (raised with
    /// [`std::panic::panic_any`]) is returned as is.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Failure>() {
            Ok(failure) => return *failure,
            Err(payload) => payload,
        };
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        tracing::debug!(%message, "captured panic");
        AdornError::Panicked(message).into()
    }

    /// The primary cause.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.cause
    }

    /// Consume the failure, returning its primary cause.
    pub fn into_cause(self) -> BoxError {
        self.cause
    }

    /// Failures attached as auxiliary context, in attachment order.
    pub fn suppressed(&self) -> &[Failure] {
        &self.suppressed
    }

    /// Attach another failure as auxiliary context.
    pub fn add_suppressed(&mut self, failure: Failure) {
        self.suppressed.push(failure);
    }

    /// Builder-style variant of [`add_suppressed`](Self::add_suppressed).
    pub fn with_suppressed(mut self, failure: Failure) -> Self {
        self.add_suppressed(failure);
        self
    }

    /// Downcast the primary cause.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.cause.downcast_ref::<E>()
    }

    /// Whether the primary cause is of type `E`.
    pub fn is<E>(&self) -> bool
    where
        E: std::error::Error + 'static,
    {
        self.cause.is::<E>()
    }

    /// Whether both failures surface the very same cause instance.
    ///
    /// Moving a `Failure` keeps its identity; two failures built from equal
    /// errors are not the same. Zero-sized causes may share an address and
    /// then compare as the same.
    pub fn same_as(&self, other: &Failure) -> bool {
        let this: *const (dyn std::error::Error + Send + Sync) = &*self.cause;
        let that: *const (dyn std::error::Error + Send + Sync) = &*other.cause;
        std::ptr::addr_eq(this, that)
    }

    /// Whether this failure came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self.downcast_ref::<AdornError>(), Some(AdornError::Panicked(_)))
    }

    /// Merge two optional failures into one.
    ///
    /// `primary` is surfaced when present, with `secondary` attached to it as
    /// suppressed; otherwise `secondary` is surfaced unchanged.
    pub fn combine(primary: Option<Failure>, secondary: Option<Failure>) -> Option<Failure> {
        match (primary, secondary) {
            (Some(mut primary), Some(secondary)) => {
                primary.add_suppressed(secondary);
                Some(primary)
            }
            (Some(primary), None) => Some(primary),
            (None, secondary) => secondary,
        }
    }

    fn fmt_suppressed(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for failure in &self.suppressed {
            write!(
                f,
                "\n{:indent$}suppressed: {}",
                "",
                failure.cause,
                indent = depth * 2
            )?;
            failure.fmt_suppressed(f, depth + 1)?;
        }
        Ok(())
    }
}

/// `{}` prints the primary cause; `{:#}` also prints the suppressed tree.
impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)?;
        if f.alternate() {
            self.fmt_suppressed(f, 1)?;
        }
        Ok(())
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// Run `f`, converting a panic into a [`Failure`].
pub fn capture<T, F>(f: F) -> Result<T, Failure>
where
    F: FnOnce() -> Result<T, Failure>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Failure::from_panic(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("marker {0}")]
    struct Marker(&'static str);

    #[test]
    fn test_combine_prefers_primary() {
        let combined = Failure::combine(
            Some(Failure::from(Marker("primary"))),
            Some(Failure::from(Marker("secondary"))),
        )
        .unwrap();

        assert_eq!(combined.downcast_ref::<Marker>(), Some(&Marker("primary")));
        assert_eq!(combined.suppressed().len(), 1);
        assert_eq!(
            combined.suppressed()[0].downcast_ref::<Marker>(),
            Some(&Marker("secondary"))
        );
    }

    #[test]
    fn test_combine_falls_back_to_secondary() {
        let combined = Failure::combine(None, Some(Failure::from(Marker("secondary")))).unwrap();
        assert_eq!(combined.downcast_ref::<Marker>(), Some(&Marker("secondary")));
        assert!(combined.suppressed().is_empty());

        assert!(Failure::combine(None, None).is_none());
    }

    #[test]
    fn test_suppressed_keeps_order() {
        let failure = Failure::msg("root")
            .with_suppressed(Failure::msg("first"))
            .with_suppressed(Failure::msg("second"));

        let messages: Vec<String> = failure.suppressed().iter().map(|f| f.to_string()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_alternate_display_renders_tree() {
        let failure = Failure::msg("root")
            .with_suppressed(Failure::msg("child").with_suppressed(Failure::msg("grandchild")));

        assert_eq!(failure.to_string(), "root");
        assert_eq!(
            format!("{failure:#}"),
            "root\n  suppressed: child\n    suppressed: grandchild"
        );
    }

    #[test]
    fn test_same_as_is_identity_not_equality() {
        let failure = Failure::from(Marker("one"));
        let twin = Failure::from(Marker("one"));

        assert!(failure.same_as(&failure));
        assert!(!failure.same_as(&twin));
    }

    #[test]
    fn test_same_as_survives_panic_any_round_trip() {
        let failure = Failure::msg("sneaky");
        let cause = failure.cause() as *const _ as *const ();
        let err = capture(|| -> Result<(), Failure> { std::panic::panic_any(failure) }).unwrap_err();

        assert_eq!(err.cause() as *const _ as *const (), cause);
    }

    #[test]
    fn test_capture_passes_results_through() {
        assert_eq!(capture(|| Ok::<_, Failure>(7)).unwrap(), 7);

        let err = capture(|| Err::<(), _>(Failure::from(Marker("err")))).unwrap_err();
        assert!(err.is::<Marker>());
    }

    #[test]
    fn test_capture_converts_str_panic() {
        let err = capture(|| -> Result<(), Failure> { panic!("boom") }).unwrap_err();
        assert!(err.is_panic());
        assert_eq!(
            err.downcast_ref::<AdornError>(),
            Some(&AdornError::Panicked("boom".to_string()))
        );
    }

    #[test]
    fn test_capture_converts_formatted_panic() {
        let code = 42;
        let err = capture(|| -> Result<(), Failure> { panic!("code {code}") }).unwrap_err();
        assert_eq!(err.to_string(), "panicked: code 42");
    }

    #[test]
    fn test_capture_unwraps_failure_payload() {
        let err = capture(|| -> Result<(), Failure> {
            std::panic::panic_any(Failure::from(Marker("sneaky")))
        })
        .unwrap_err();

        assert!(!err.is_panic());
        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("sneaky")));
    }
}
