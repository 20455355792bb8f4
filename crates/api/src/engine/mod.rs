//! Training execution.
//!
//! [`locks`] keeps at most one training run per hospital in flight and lets
//! operators cancel it. [`runner`] moves the CPU-bound fit onto a blocking
//! thread and enforces the configured time limit.

pub mod locks;
pub mod runner;

pub use locks::{AbortOutcome, TrainingGuard, TrainingLocks};
pub use runner::run_training;
