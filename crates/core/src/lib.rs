//! Adorn core contracts.
//!
//! This crate defines the failure value and the single-operation contracts
//! used to attach before/after behaviour to deferred work without ever
//! preventing that work from running.

#![warn(missing_docs)]

// Failures
mod error;
mod failure;

// Contracts
mod task;
mod action;
mod adorner;
mod observer;

// Re-exports
pub use error::AdornError;
pub use failure::{capture, BoxError, Failure};

pub use task::{task_fn, BoxTask, FnTask, Task};
pub use action::{
    after_fn, before_fn, AfterAction, BeforeAction, BoxAfterAction, BoxBeforeAction,
    FnAfterAction, FnBeforeAction, NoopAfterAction, NoopBeforeAction,
};
pub use adorner::{adorner_fn, Adorner, FnAdorner, NoopAdorner, SharedAdorner};
pub use observer::{observer_fn, FailureObserver, FnObserver, SharedObserver};
