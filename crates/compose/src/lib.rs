//! Adorner composition (Layer 2)
//!
//! Combinators over the core contracts: ordered composites, fault-tolerant
//! decoration, and the observers that receive diverted failures.

#![warn(missing_docs)]

pub mod composite;
pub mod tolerant;
pub mod observers;

#[cfg(test)]
mod test_support;

pub use composite::CompositeAdorner;
pub use tolerant::{composite_of_mostly_fault_tolerant, MostlyFaultTolerantAdorner};
pub use observers::{FaultSwallowingObserver, ObserverLevel, RecordingObserver, TracingObserver};
