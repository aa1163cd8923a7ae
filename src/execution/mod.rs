//! Pipeline execution engine

pub mod engine;
pub mod error;

pub use engine::{run, CancelCheck, ExecutionEngine, RunOutcome, StepHook};
pub use error::ExecutionError;
