//! stepline - a linear state-passing pipeline
//!
//! Register named steps, wire them into a straight chain, compile, and run a
//! state value through every step in order.

pub mod cli;
pub mod core;
pub mod demo;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{
    Defect, DefinitionError, Pipeline, PipelineBuilder, PipelineConfig, RunRecord, RunStatus,
    Step, StepCatalog, StepError, Transition,
};
pub use execution::{run, ExecutionEngine, ExecutionError, RunOutcome};
