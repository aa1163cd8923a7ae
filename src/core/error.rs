//! Definition-time error types

use std::fmt;
use thiserror::Error;

/// Errors raised while building or compiling a pipeline definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("step '{0}' is already registered")]
    DuplicateStep(String),

    #[error("unknown step '{0}'")]
    UnknownStep(String),

    #[error("step '{from}' already transitions to '{existing}', cannot add '{from}' -> '{attempted}'")]
    MultipleOutgoingTransition {
        from: String,
        existing: String,
        attempted: String,
    },

    #[error("transition '{from}' -> '{to}' would create a cycle")]
    Cycle { from: String, to: String },

    #[error("no entry step has been set")]
    NoEntryPoint,

    #[error("pipeline validation failed: {}", DefectList(.0))]
    Validation(Vec<Defect>),
}

/// A single structural problem found by `PipelineBuilder::compile`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Defect {
    /// More than one transition leads into the same step
    #[error("step '{step}' has {} incoming transitions (from {})", .sources.len(), .sources.join(", "))]
    MergingTransitions { step: String, sources: Vec<String> },

    /// Walking from the entry step revisits a step
    #[error("cycle reachable from entry returns to step '{step}'")]
    CycleFromEntry { step: String },
}

/// Error returned by a step's processing function
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StepError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl StepError {
    /// Create a step error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a step error that wraps an underlying failure
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

struct DefectList<'a>(&'a [Defect]);

impl fmt::Display for DefectList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, defect) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", defect)?;
        }
        Ok(())
    }
}
