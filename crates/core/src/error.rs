//! Failure kinds raised by the adornment machinery itself.

/// Errors originating inside this workspace rather than in user code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdornError {
    /// A before action completed but produced no after action.
    #[error("BeforeAction returned a null AfterAction")]
    NullAfterAction,

    /// An adorner completed but produced no before action.
    #[error("Adorner returned a null BeforeAction")]
    NullBeforeAction,

    /// A panic was caught while running a phase.
    #[error("panicked: {0}")]
    Panicked(String),

    /// A required construction input was missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An executor refused to accept a task.
    #[error("task rejected: {0}")]
    Rejected(String),
}
