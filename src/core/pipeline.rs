//! Pipeline domain model
//!
//! A `PipelineBuilder` collects named steps and the transitions between them.
//! `compile` freezes it into a `Pipeline`, which is immutable and can be shared
//! by any number of runs.

use crate::core::{
    error::{Defect, DefinitionError, StepError},
    step::{Step, StepFn, Transition},
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Mutable registry of steps and transitions, consumed by `compile`
pub struct PipelineBuilder<S> {
    name: String,

    /// Steps in registration order
    steps: Vec<Step<S>>,

    /// Step name -> position in `steps`
    index: HashMap<String, usize>,

    /// Outgoing transition of each step (`None` = terminal)
    next: Vec<Option<usize>>,

    entry: Option<usize>,
}

impl<S> PipelineBuilder<S> {
    /// Create an empty builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            index: HashMap::new(),
            next: Vec::new(),
            entry: None,
        }
    }

    /// Register a step backed by a closure or function
    pub fn register_step<F>(
        &mut self,
        name: impl Into<String>,
        func: F,
    ) -> Result<&mut Self, DefinitionError>
    where
        F: Fn(&mut S) -> Result<(), StepError> + Send + Sync + 'static,
    {
        self.register_step_fn(name, Arc::new(func))
    }

    /// Register a step backed by an already shared function
    pub fn register_step_fn(
        &mut self,
        name: impl Into<String>,
        func: StepFn<S>,
    ) -> Result<&mut Self, DefinitionError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(DefinitionError::DuplicateStep(name));
        }

        self.index.insert(name.clone(), self.steps.len());
        self.steps.push(Step::new(name, func));
        self.next.push(None);
        Ok(self)
    }

    /// Wire `from` to run before `to`
    pub fn add_transition(&mut self, from: &str, to: &str) -> Result<&mut Self, DefinitionError> {
        let from_idx = self.lookup(from)?;
        let to_idx = self.lookup(to)?;

        if let Some(existing) = self.next[from_idx] {
            return Err(DefinitionError::MultipleOutgoingTransition {
                from: from.to_string(),
                existing: self.steps[existing].name.clone(),
                attempted: to.to_string(),
            });
        }

        if self.reaches(to_idx, from_idx) {
            return Err(DefinitionError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.next[from_idx] = Some(to_idx);
        Ok(self)
    }

    /// Designate the step execution starts at (replaces any earlier entry)
    pub fn set_entry(&mut self, name: &str) -> Result<&mut Self, DefinitionError> {
        self.entry = Some(self.lookup(name)?);
        Ok(self)
    }

    /// Number of registered steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validate the wiring and freeze it into an executable pipeline
    pub fn compile(self) -> Result<Pipeline<S>, DefinitionError> {
        let entry = self.entry.ok_or(DefinitionError::NoEntryPoint)?;
        let mut defects = Vec::new();

        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); self.steps.len()];
        for (from, to) in self.next.iter().enumerate() {
            if let Some(to) = to {
                incoming[*to].push(from);
            }
        }
        for (step, sources) in incoming.iter().enumerate() {
            if sources.len() > 1 {
                defects.push(Defect::MergingTransitions {
                    step: self.steps[step].name.clone(),
                    sources: sources.iter().map(|s| self.steps[*s].name.clone()).collect(),
                });
            }
        }

        let mut visited = vec![false; self.steps.len()];
        let mut current = Some(entry);
        while let Some(idx) = current {
            if visited[idx] {
                defects.push(Defect::CycleFromEntry {
                    step: self.steps[idx].name.clone(),
                });
                break;
            }
            visited[idx] = true;
            current = self.next[idx];
        }

        if !defects.is_empty() {
            return Err(DefinitionError::Validation(defects));
        }

        Ok(Pipeline {
            name: self.name,
            steps: self.steps,
            index: self.index,
            next: self.next,
            entry,
        })
    }

    fn lookup(&self, name: &str) -> Result<usize, DefinitionError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| DefinitionError::UnknownStep(name.to_string()))
    }

    /// Whether following transitions from `start` arrives at `target`
    fn reaches(&self, start: usize, target: usize) -> bool {
        let mut current = Some(start);
        while let Some(idx) = current {
            if idx == target {
                return true;
            }
            current = self.next[idx];
        }
        false
    }
}

impl<S> fmt::Debug for PipelineBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("steps", &self.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>())
            .field("next", &self.next)
            .field("entry", &self.entry)
            .finish()
    }
}

/// A compiled, immutable pipeline definition
pub struct Pipeline<S> {
    name: String,
    steps: Vec<Step<S>>,
    index: HashMap<String, usize>,
    next: Vec<Option<usize>>,
    entry: usize,
}

impl<S> Pipeline<S> {
    /// Pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the entry step
    pub fn entry(&self) -> &str {
        &self.steps[self.entry].name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains_step(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get a step by name
    pub fn step(&self, name: &str) -> Option<&Step<S>> {
        self.index.get(name).map(|idx| &self.steps[*idx])
    }

    /// Step names in registration order
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    /// Name of the step that runs after `name`, if any
    pub fn next_step(&self, name: &str) -> Option<&str> {
        let idx = *self.index.get(name)?;
        self.next[idx].map(|n| self.steps[n].name.as_str())
    }

    /// All transitions, ordered by source registration
    pub fn transitions(&self) -> Vec<Transition> {
        self.next
            .iter()
            .enumerate()
            .filter_map(|(from, to)| {
                to.map(|to| Transition::new(&self.steps[from].name, &self.steps[to].name))
            })
            .collect()
    }

    /// Steps in the order a run visits them
    pub fn execution_order(&self) -> Vec<&str> {
        self.walk().map(|s| s.name.as_str()).collect()
    }

    /// Registered steps a run never reaches
    pub fn unreachable_steps(&self) -> Vec<&str> {
        let mut reached = vec![false; self.steps.len()];
        let mut current = Some(self.entry);
        while let Some(idx) = current {
            reached[idx] = true;
            current = self.next[idx];
        }

        self.steps
            .iter()
            .zip(reached)
            .filter(|(_, reached)| !reached)
            .map(|(s, _)| s.name.as_str())
            .collect()
    }

    /// Iterate the chain from the entry step, following transitions
    pub fn walk(&self) -> Walk<'_, S> {
        Walk {
            pipeline: self,
            current: Some(self.entry),
        }
    }
}

impl<S> fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("entry", &self.entry())
            .field("steps", &self.step_names().collect::<Vec<_>>())
            .field("transitions", &self.transitions())
            .finish()
    }
}

/// Iterator over the steps of a pipeline in chain order
pub struct Walk<'a, S> {
    pipeline: &'a Pipeline<S>,
    current: Option<usize>,
}

impl<'a, S> Iterator for Walk<'a, S> {
    type Item = &'a Step<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        self.current = self.pipeline.next[idx];
        Some(&self.pipeline.steps[idx])
    }
}
