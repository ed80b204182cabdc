//! Ready-made failure observers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use adorn_core::{capture, Failure, FailureObserver, SharedObserver};
use serde::{Deserialize, Serialize};

/// Observer that swallows every failure of the observer it decorates,
/// including panics.
///
/// This destroys information. Use it only when no adornment failure may
/// ever reach the caller.
#[derive(Clone)]
pub struct FaultSwallowingObserver {
    decorated: SharedObserver,
}

impl FaultSwallowingObserver {
    /// Decorate `decorated`.
    pub fn new(decorated: SharedObserver) -> Self {
        Self { decorated }
    }
}

impl FailureObserver for FaultSwallowingObserver {
    fn observe(&self, failure: Failure) -> Result<(), Failure> {
        let _ = capture(|| self.decorated.observe(failure));
        Ok(())
    }
}

/// Level used by [`TracingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverLevel {
    /// `tracing::Level::DEBUG`
    Debug,
    /// `tracing::Level::INFO`
    Info,
    /// `tracing::Level::WARN`
    #[default]
    Warn,
    /// `tracing::Level::ERROR`
    Error,
}

/// Observer that logs each failure, with its suppressed tree, and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    level: ObserverLevel,
}

impl TracingObserver {
    /// Create an observer logging at `level`.
    pub fn new(level: ObserverLevel) -> Self {
        Self { level }
    }

    /// Configured level.
    pub fn level(&self) -> ObserverLevel {
        self.level
    }
}

impl FailureObserver for TracingObserver {
    fn observe(&self, failure: Failure) -> Result<(), Failure> {
        match self.level {
            ObserverLevel::Debug => tracing::debug!(failure = %format!("{failure:#}"), "adornment failed"),
            ObserverLevel::Info => tracing::info!(failure = %format!("{failure:#}"), "adornment failed"),
            ObserverLevel::Warn => tracing::warn!(failure = %format!("{failure:#}"), "adornment failed"),
            ObserverLevel::Error => tracing::error!(failure = %format!("{failure:#}"), "adornment failed"),
        }
        Ok(())
    }
}

/// Observer that keeps every observed failure, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    failures: Mutex<Vec<Failure>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn failures(&self) -> MutexGuard<'_, Vec<Failure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of failures observed so far.
    pub fn len(&self) -> usize {
        self.failures().len()
    }

    /// Whether nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.failures().is_empty()
    }

    /// Display strings of the observed failures.
    pub fn messages(&self) -> Vec<String> {
        self.failures().iter().map(ToString::to_string).collect()
    }

    /// Drain the observed failures.
    pub fn take(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures())
    }
}

impl FailureObserver for RecordingObserver {
    fn observe(&self, failure: Failure) -> Result<(), Failure> {
        self.failures().push(failure);
        Ok(())
    }
}
