//! Scripted adorners that record every call into a shared log.

use std::sync::{Arc, Mutex};

use adorn_core::{adorner_fn, after_fn, before_fn, Failure, SharedAdorner};

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Create,
    Before,
    After,
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0} failed")]
pub(crate) struct PhaseError(pub String);

impl PhaseError {
    pub(crate) fn new(call: &str) -> Self {
        Self(call.to_string())
    }
}

pub(crate) fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &CallLog, call: String) {
    log.lock().unwrap().push(call);
}

/// An adorner named `name` that logs `name:create`, `name:before` and
/// `name:after(<failure or none>)`, failing at `fail_at` if set.
pub(crate) fn scripted(name: &'static str, log: &CallLog, fail_at: Option<Phase>) -> SharedAdorner {
    let log = log.clone();
    adorner_fn(move |_task| {
        record(&log, format!("{name}:create"));
        if fail_at == Some(Phase::Create) {
            return Err(PhaseError::new(&format!("{name}:create")).into());
        }
        let log = log.clone();
        Ok(Some(before_fn(move || {
            record(&log, format!("{name}:before"));
            if fail_at == Some(Phase::Before) {
                return Err(PhaseError::new(&format!("{name}:before")).into());
            }
            Ok(Some(after_fn(move |failure: Option<&Failure>| {
                let seen = failure.map_or_else(|| "none".to_string(), |f| f.to_string());
                record(&log, format!("{name}:after({seen})"));
                if fail_at == Some(Phase::After) {
                    return Err(PhaseError::new(&format!("{name}:after")).into());
                }
                Ok(())
            })))
        })))
    })
}
