//! Step domain model

use crate::core::error::StepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Processing function of a step: reads and mutates the state in place
pub type StepFn<S> = Arc<dyn Fn(&mut S) -> Result<(), StepError> + Send + Sync>;

/// A named unit of work in a pipeline
pub struct Step<S> {
    /// Unique step name
    pub name: String,

    func: StepFn<S>,
}

impl<S> Step<S> {
    pub fn new(name: impl Into<String>, func: StepFn<S>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Run the step's function against the state
    pub fn invoke(&self, state: &mut S) -> Result<(), StepError> {
        (self.func)(state)
    }
}

impl<S> Clone for Step<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<S> fmt::Debug for Step<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A directed link from one step to the step that runs after it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

impl Transition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
