//! adorn CLI - run tasks through a decorating executor and show how failures
//! from each phase are surfaced.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;
use tracing_subscriber::EnvFilter;

use adorn_compose::{composite_of_mostly_fault_tolerant, CompositeAdorner, RecordingObserver};
use adorn_core::{
    adorner_fn, after_fn, before_fn, task_fn, BoxTask, Failure, SharedAdorner, Task,
};
use adorn_execution::{DecoratingExecutor, Executor, ExecutorConfig, InlineExecutor, TokioExecutor};

#[derive(Parser)]
#[command(name = "adorn")]
#[command(about = "Run tasks with guaranteed before/after adornments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scenarios
    Scenarios,
    /// Run a scenario through a decorating executor
    Run {
        /// Scenario to run
        #[arg(value_enum)]
        scenario: Scenario,
        /// Executor the adorned task is forwarded to
        #[arg(long, value_enum, default_value_t = ExecutorKind::Inline)]
        executor: ExecutorKind,
        /// Observe adorner failures instead of surfacing them
        #[arg(long)]
        tolerant: bool,
        /// JSON file holding the executor configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Success,
    BeforeFails,
    NullAfter,
    TaskFails,
    AfterFails,
    AllFail,
    TaskPanics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExecutorKind {
    Inline,
    Tokio,
}

/// What a recording adorner does wrong.
#[derive(Debug, Clone, Copy, Default)]
struct Script {
    before_fails: bool,
    null_after: bool,
    after_fails: bool,
}

impl Scenario {
    fn about(self) -> &'static str {
        match self {
            Scenario::Success => "every phase succeeds",
            Scenario::BeforeFails => "the scenario adorner's before action fails",
            Scenario::NullAfter => "the scenario adorner's before action yields no after action",
            Scenario::TaskFails => "the task fails",
            Scenario::AfterFails => "the scenario adorner's after action fails",
            Scenario::AllFail => "the task and both after actions fail",
            Scenario::TaskPanics => "the task panics",
        }
    }

    fn name(self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_owned())
            .unwrap_or_default()
    }

    /// Scripts for the `audit` and `scenario` adorners.
    fn scripts(self) -> (Script, Script) {
        let failing_after = Script {
            after_fails: true,
            ..Script::default()
        };
        match self {
            Scenario::BeforeFails => (
                Script::default(),
                Script {
                    before_fails: true,
                    ..Script::default()
                },
            ),
            Scenario::NullAfter => (
                Script::default(),
                Script {
                    null_after: true,
                    ..Script::default()
                },
            ),
            Scenario::AfterFails => (Script::default(), failing_after),
            Scenario::AllFail => (failing_after, failing_after),
            Scenario::Success | Scenario::TaskFails | Scenario::TaskPanics => {
                (Script::default(), Script::default())
            }
        }
    }

    fn task(self, trace: &Trace) -> BoxTask {
        let trace = trace.clone();
        Box::new(
            task_fn(move || {
                push(&trace, "task");
                match self {
                    Scenario::TaskFails | Scenario::AllFail => Err(Failure::msg("task failed")),
                    Scenario::TaskPanics => panic!("task panicked"),
                    _ => Ok(()),
                }
            })
            .named(self.name()),
        )
    }
}

type Trace = Arc<Mutex<Vec<String>>>;

fn push(trace: &Trace, entry: impl Into<String>) {
    trace
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(entry.into());
}

fn recording_adorner(name: &'static str, trace: &Trace, script: Script) -> SharedAdorner {
    let trace = trace.clone();
    adorner_fn(move |task: &dyn Task| {
        push(&trace, format!("{name}:adorn({})", task.name()));
        let trace = trace.clone();
        Ok(Some(before_fn(move || {
            push(&trace, format!("{name}:before"));
            if script.before_fails {
                return Err(Failure::msg(format!("{name} before failed")));
            }
            if script.null_after {
                return Ok(None);
            }
            Ok(Some(after_fn(move |failure| {
                let seen = failure.map_or_else(|| "none".to_string(), ToString::to_string);
                push(&trace, format!("{name}:after({seen})"));
                if script.after_fails {
                    Err(Failure::msg(format!("{name} after failed")))
                } else {
                    Ok(())
                }
            })))
        })))
    })
}

/// Forwards tasks to `inner` and sends the outcome of each run back, so
/// background executors report to the caller too.
struct ReportingExecutor<E> {
    inner: E,
    outcomes: UnboundedSender<Result<(), Failure>>,
}

impl<E: Executor> Executor for ReportingExecutor<E> {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        let outcomes = self.outcomes.clone();
        let name = task.name().to_owned();
        self.inner.execute(Box::new(
            task_fn(move || {
                let _ = outcomes.send(task.run());
                Ok(())
            })
            .named(name),
        ))
    }
}

/// Result of one scenario run.
struct Report {
    trace: Vec<String>,
    outcome: Result<(), Failure>,
    submitted: bool,
    observed: Vec<String>,
}

fn load_config(path: &Path) -> Result<ExecutorConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

async fn run_scenario(
    scenario: Scenario,
    kind: ExecutorKind,
    tolerant: bool,
    config: ExecutorConfig,
) -> Result<Report> {
    let trace = Trace::default();
    let (audit, scripted) = scenario.scripts();
    let adorners = vec![
        recording_adorner("audit", &trace, audit),
        recording_adorner("scenario", &trace, scripted),
    ];
    let observer = Arc::new(RecordingObserver::new());
    let adorner: SharedAdorner = if tolerant {
        Arc::new(composite_of_mostly_fault_tolerant(adorners, observer.clone()))
    } else {
        Arc::new(CompositeAdorner::new(adorners))
    };

    let inner: Box<dyn Executor> = match kind {
        ExecutorKind::Inline => Box::new(InlineExecutor),
        ExecutorKind::Tokio => Box::new(TokioExecutor::current()?),
    };
    let (outcomes, mut received) = mpsc::unbounded_channel();
    let executor = DecoratingExecutor::builder()
        .executor(ReportingExecutor { inner, outcomes })
        .adorner(adorner)
        .config(config)
        .build()?;

    info!(scenario = %scenario.name(), executor = ?kind, tolerant, "running scenario");
    let (outcome, submitted) = match executor.execute(scenario.task(&trace)) {
        Ok(()) => {
            let outcome = received
                .recv()
                .await
                .context("task was dropped without running")?;
            (outcome, true)
        }
        Err(failure) => (Err(failure), false),
    };

    let trace = trace
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Ok(Report {
        trace,
        outcome,
        submitted,
        observed: observer.messages(),
    })
}

fn print_report(report: &Report, tolerant: bool) {
    println!("phases:");
    for entry in &report.trace {
        println!("  {entry}");
    }

    match &report.outcome {
        Ok(()) => println!("result: ok"),
        Err(failure) => {
            let stage = if report.submitted { "run" } else { "submission" };
            println!("result: {stage} failed");
            println!("surfaced: {failure:#}");
        }
    }

    if tolerant {
        println!("observed: {}", report.observed.len());
        for message in &report.observed {
            println!("  {message}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenarios => {
            for scenario in Scenario::value_variants() {
                println!("{:<14} {}", scenario.name(), scenario.about());
            }
        }
        Commands::Run {
            scenario,
            executor,
            tolerant,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => ExecutorConfig::default(),
            };
            let report = run_scenario(scenario, executor, tolerant, config).await?;
            print_report(&report, tolerant);
        }
    }

    Ok(())
}
