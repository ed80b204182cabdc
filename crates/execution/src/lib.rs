//! Execution layer - the guaranteed-execution wrapper and the decorating executor.

#![warn(missing_docs)]

pub mod config;
pub mod executor;
pub mod runnable;
pub mod decorating;

pub use config::ExecutorConfig;
pub use executor::{Executor, InlineExecutor, TokioExecutor};
pub use runnable::GuaranteedRunnable;
pub use decorating::{DecoratingExecutor, DecoratingExecutorBuilder};
