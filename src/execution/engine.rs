//! Pipeline executor - walks a compiled pipeline from its entry step

use crate::{
    core::{Pipeline, RunRecord},
    execution::ExecutionError,
};
use serde::Serialize;
use std::fmt;

/// Observer invoked with a step name and the current state
pub type StepHook<S> = Box<dyn Fn(&str, &S) + Send + Sync>;

/// Predicate consulted before each step; returning `true` cancels the run
pub type CancelCheck<S> = Box<dyn Fn(&str, &S) -> bool + Send + Sync>;

/// Result of a run that reached the terminal step
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome<S> {
    /// Final state after the terminal step
    pub state: S,

    /// Step names in the order they ran
    pub visited: Vec<String>,

    pub record: RunRecord,
}

/// Runs compiled pipelines, calling optional hooks around each step
///
/// The engine holds no per-run data, so one engine (and one pipeline) can
/// serve any number of runs, including concurrent ones.
pub struct ExecutionEngine<S> {
    on_enter: Option<StepHook<S>>,
    on_exit: Option<StepHook<S>>,
    cancel: Option<CancelCheck<S>>,
}

impl<S> Default for ExecutionEngine<S> {
    fn default() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
            cancel: None,
        }
    }
}

impl<S> fmt::Debug for ExecutionEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl<S: Clone + fmt::Debug> ExecutionEngine<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `hook` before each step's function runs
    pub fn on_step_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &S) + Send + Sync + 'static,
    {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Call `hook` after each step's function returns successfully
    pub fn on_step_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &S) + Send + Sync + 'static,
    {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Consult `check` before entering each step
    pub fn with_cancellation<F>(mut self, check: F) -> Self
    where
        F: Fn(&str, &S) -> bool + Send + Sync + 'static,
    {
        self.cancel = Some(Box::new(check));
        self
    }

    /// Run `pipeline` from its entry step until the terminal step completes
    pub fn run(&self, pipeline: &Pipeline<S>, initial: S) -> Result<RunOutcome<S>, ExecutionError<S>> {
        let mut record = RunRecord::new(pipeline.name());
        let mut state = initial;
        let mut visited: Vec<String> = Vec::new();

        for step in pipeline.walk() {
            if let Some(cancel) = &self.cancel {
                if cancel(&step.name, &state) {
                    record.cancel(&step.name);
                    return Err(ExecutionError::Cancelled {
                        before: step.name.clone(),
                        state,
                        completed: visited,
                        record,
                    });
                }
            }

            record.enter(&step.name);
            if let Some(hook) = &self.on_enter {
                hook(&step.name, &state);
            }

            let snapshot = state.clone();
            if let Err(source) = step.invoke(&mut state) {
                record.fail(&step.name, &source.to_string());
                return Err(ExecutionError::StepExecution {
                    step: step.name.clone(),
                    source,
                    snapshot,
                    state,
                    completed: visited,
                    record,
                });
            }

            record.step_succeeded();
            visited.push(step.name.clone());
            if let Some(hook) = &self.on_exit {
                hook(&step.name, &state);
            }
        }

        record.complete();
        Ok(RunOutcome {
            state,
            visited,
            record,
        })
    }
}

/// Run `pipeline` without hooks or cancellation
pub fn run<S: Clone + fmt::Debug>(
    pipeline: &Pipeline<S>,
    initial: S,
) -> Result<RunOutcome<S>, ExecutionError<S>> {
    ExecutionEngine::new().run(pipeline, initial)
}
