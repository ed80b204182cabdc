//! The guaranteed-execution wrapper.

use adorn_core::{capture, AdornError, BoxBeforeAction, BoxTask, Failure, Task};
use tracing::{debug, warn};

/// Task that runs a before action, the decorated task, then the after action
/// produced by the before action.
///
/// Once [`run`](Task::run) starts, the decorated task runs exactly once, no
/// matter how the before action behaves. Failures are aggregated into a
/// single surfaced [`Failure`]:
///
/// - a task failure is surfaced first, with the before failure attached;
/// - otherwise the before failure is surfaced;
/// - otherwise the after failure is surfaced.
///
/// Whatever is not surfaced is attached as suppressed, in that order. The
/// after action receives the surfaced task/before failure. It never runs when
/// the before action failed, since there is none to run.
pub struct GuaranteedRunnable {
    task: BoxTask,
    before: BoxBeforeAction,
    trace_phases: bool,
}

impl GuaranteedRunnable {
    /// Wrap `task` with `before`.
    pub fn new(task: BoxTask, before: BoxBeforeAction) -> Self {
        Self {
            task,
            before,
            trace_phases: false,
        }
    }

    /// Emit a `debug!` event for each phase.
    pub fn trace_phases(mut self, enabled: bool) -> Self {
        self.trace_phases = enabled;
        self
    }
}

impl Task for GuaranteedRunnable {
    fn run(self: Box<Self>) -> Result<(), Failure> {
        let Self {
            task,
            before,
            trace_phases,
        } = *self;
        let span = tracing::debug_span!("guaranteed_run", task = task.name());
        let _entered = span.enter();

        // 1. Before
        if trace_phases {
            debug!("running before action");
        }
        let (after, before_failure) = match capture(move || before.run_before()) {
            Ok(Some(after)) => (Some(after), None),
            Ok(None) => (None, Some(Failure::from(AdornError::NullAfterAction))),
            Err(failure) => (None, Some(failure)),
        };

        // 2. Task, unconditionally
        if trace_phases {
            debug!(before_failed = before_failure.is_some(), "running task");
        }
        let task_failure = capture(move || task.run()).err();

        // 3. Task failure outranks before failure
        if task_failure.is_some() && before_failure.is_some() {
            warn!("before action and task both failed; attaching before failure as suppressed");
        }
        let primary = Failure::combine(task_failure, before_failure);

        // 4. No after action to run
        let Some(after) = after else {
            return match primary {
                Some(failure) => Err(failure),
                None => Ok(()),
            };
        };

        // 5. After
        if trace_phases {
            debug!(failed = primary.is_some(), "running after action");
        }
        let after_failure = capture(|| after.run_after(primary.as_ref())).err();

        // 6. Surface
        if primary.is_some() && after_failure.is_some() {
            warn!("after action failed; attaching as suppressed");
        }
        match Failure::combine(primary, after_failure) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        self.task.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adorn_core::{after_fn, before_fn, task_fn, BoxAfterAction};
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0}")]
    struct Marker(&'static str);

    fn record(log: &CallLog, call: impl Into<String>) {
        log.lock().unwrap().push(call.into());
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn task(log: &CallLog, outcome: Option<&'static str>) -> BoxTask {
        let log = log.clone();
        Box::new(task_fn(move || {
            record(&log, "task");
            match outcome {
                Some(marker) => Err(Marker(marker).into()),
                None => Ok(()),
            }
        }))
    }

    fn after(log: &CallLog, outcome: Option<&'static str>) -> BoxAfterAction {
        let log = log.clone();
        after_fn(move |failure| {
            let seen = failure.map_or_else(|| "none".to_string(), |f| f.to_string());
            record(&log, format!("after({seen})"));
            match outcome {
                Some(marker) => Err(Marker(marker).into()),
                None => Ok(()),
            }
        })
    }

    fn before(log: &CallLog, after_action: BoxAfterAction) -> BoxBeforeAction {
        let log = log.clone();
        before_fn(move || {
            record(&log, "before");
            Ok(Some(after_action))
        })
    }

    fn failing_before(log: &CallLog, marker: &'static str) -> BoxBeforeAction {
        let log = log.clone();
        before_fn(move || {
            record(&log, "before");
            Err(Marker(marker).into())
        })
    }

    fn run(task: BoxTask, before: BoxBeforeAction) -> Result<(), Failure> {
        Box::new(GuaranteedRunnable::new(task, before)).run()
    }

    #[test]
    fn test_runs_before_task_after_in_order() {
        let log = CallLog::default();
        let after_action = after(&log, None);

        run(task(&log, None), before(&log, after_action)).unwrap();

        assert_eq!(calls(&log), vec!["before", "task", "after(none)"]);
    }

    #[test]
    fn test_task_runs_when_before_fails() {
        let log = CallLog::default();

        let err = run(task(&log, None), failing_before(&log, "before")).unwrap_err();

        assert_eq!(calls(&log), vec!["before", "task"]);
        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("before")));
        assert!(err.suppressed().is_empty());
    }

    #[test]
    fn test_task_runs_when_before_panics() {
        let log = CallLog::default();
        let panicking = before_fn(|| -> Result<Option<BoxAfterAction>, Failure> {
            panic!("before exploded")
        });

        let err = run(task(&log, None), panicking).unwrap_err();

        assert_eq!(calls(&log), vec!["task"]);
        assert!(err.is_panic());
    }

    #[test]
    fn test_absent_after_action_is_a_before_failure() {
        let log = CallLog::default();
        let absent = before_fn(|| Ok(None));

        let err = run(task(&log, None), absent).unwrap_err();

        assert_eq!(calls(&log), vec!["task"]);
        assert_eq!(
            err.downcast_ref::<AdornError>(),
            Some(&AdornError::NullAfterAction)
        );
        assert_eq!(err.to_string(), "BeforeAction returned a null AfterAction");
    }

    #[test]
    fn test_task_failure_outranks_before_failure() {
        let log = CallLog::default();

        let err = run(task(&log, Some("task")), failing_before(&log, "before")).unwrap_err();

        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("task")));
        assert_eq!(err.suppressed().len(), 1);
        assert_eq!(
            err.suppressed()[0].downcast_ref::<Marker>(),
            Some(&Marker("before"))
        );
    }

    #[test]
    fn test_task_failure_outranks_absent_after_action() {
        let log = CallLog::default();

        let err = run(task(&log, Some("task")), before_fn(|| Ok(None))).unwrap_err();

        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("task")));
        assert_eq!(
            err.suppressed()[0].downcast_ref::<AdornError>(),
            Some(&AdornError::NullAfterAction)
        );
    }

    #[test]
    fn test_after_receives_task_failure() {
        let log = CallLog::default();
        let after_action = after(&log, None);

        let err = run(task(&log, Some("task")), before(&log, after_action)).unwrap_err();

        assert_eq!(calls(&log), vec!["before", "task", "after(task)"]);
        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("task")));
    }

    #[test]
    fn test_task_panic_is_surfaced_after_running_after() {
        let log = CallLog::default();
        let after_action = after(&log, None);
        let panicking: BoxTask = Box::new(task_fn(|| panic!("task exploded")));

        let err = run(panicking, before(&log, after_action)).unwrap_err();

        assert_eq!(calls(&log), vec!["before", "after(panicked: task exploded)"]);
        assert!(err.is_panic());
    }

    #[test]
    fn test_after_failure_surfaces_alone() {
        let log = CallLog::default();
        let after_action = after(&log, Some("after"));

        let err = run(task(&log, None), before(&log, after_action)).unwrap_err();

        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("after")));
        assert!(err.suppressed().is_empty());
    }

    #[test]
    fn test_after_failure_is_suppressed_on_task_failure() {
        let log = CallLog::default();
        let after_action = after(&log, Some("after"));

        let err = run(task(&log, Some("task")), before(&log, after_action)).unwrap_err();

        assert_eq!(calls(&log), vec!["before", "task", "after(task)"]);
        assert_eq!(err.downcast_ref::<Marker>(), Some(&Marker("task")));
        assert_eq!(err.suppressed().len(), 1);
        assert_eq!(
            err.suppressed()[0].downcast_ref::<Marker>(),
            Some(&Marker("after"))
        );
    }

    #[test]
    fn test_name_delegates_to_task() {
        let runnable = GuaranteedRunnable::new(
            Box::new(task_fn(|| Ok(())).named("nightly-report")),
            before_fn(|| Ok(None)),
        );
        assert_eq!(runnable.name(), "nightly-report");
    }
}
