//! Run-time error types

use crate::core::{RunRecord, StepError};
use std::fmt;
use thiserror::Error;

/// Errors that abort a pipeline run
///
/// Both variants hand the state back to the caller. Mutations applied before
/// the run stopped are kept; nothing is rolled back.
#[derive(Debug, Error)]
pub enum ExecutionError<S: fmt::Debug> {
    /// A step's function returned an error
    #[error("step '{step}' failed: {source}")]
    StepExecution {
        step: String,
        #[source]
        source: StepError,
        /// State as it was immediately before the failing step ran
        snapshot: S,
        /// State as the failing step left it
        state: S,
        /// Steps that finished before the failure, in order
        completed: Vec<String>,
        record: RunRecord,
    },

    /// The cancellation check stopped the run between steps
    #[error("run cancelled before step '{before}'")]
    Cancelled {
        before: String,
        state: S,
        completed: Vec<String>,
        record: RunRecord,
    },
}

impl<S: fmt::Debug> ExecutionError<S> {
    /// The step that failed, or the one that was about to run when cancelled
    pub fn step(&self) -> &str {
        match self {
            ExecutionError::StepExecution { step, .. } => step,
            ExecutionError::Cancelled { before, .. } => before,
        }
    }

    /// Steps that finished before the run stopped
    pub fn completed(&self) -> &[String] {
        match self {
            ExecutionError::StepExecution { completed, .. }
            | ExecutionError::Cancelled { completed, .. } => completed,
        }
    }

    pub fn record(&self) -> &RunRecord {
        match self {
            ExecutionError::StepExecution { record, .. }
            | ExecutionError::Cancelled { record, .. } => record,
        }
    }

    /// Take back the state as the run left it
    pub fn into_state(self) -> S {
        match self {
            ExecutionError::StepExecution { state, .. }
            | ExecutionError::Cancelled { state, .. } => state,
        }
    }
}
