//! Pipeline layout configuration from YAML
//!
//! A layout names the steps of a pipeline and how they are wired. The step
//! functions themselves come from a `StepCatalog`, so one catalog can back
//! several layouts.

use crate::core::{
    error::StepError,
    pipeline::{Pipeline, PipelineBuilder},
    step::{StepFn, Transition},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Top-level layout loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Step the run starts at
    pub entry: String,

    /// Step names, in registration order
    pub steps: Vec<String>,

    /// Directed edges between steps
    #[serde(default)]
    pub transitions: Vec<Transition>,

    /// Optional pause between steps (in milliseconds), for demonstrations
    #[serde(default)]
    pub pacing_ms: Option<u64>,
}

/// Named step functions that layouts can refer to
pub struct StepCatalog<S> {
    entries: HashMap<String, StepFn<S>>,
}

impl<S> Default for StepCatalog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StepCatalog<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace the function registered under `name`
    pub fn insert<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&mut S) -> Result<(), StepError> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(func));
        self
    }

    pub fn get(&self, name: &str) -> Option<StepFn<S>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Catalog names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PipelineConfig {
    /// Load a layout from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a layout from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the layout for problems that do not need a catalog
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            anyhow::bail!("Pipeline '{}' declares no steps", self.name);
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step) {
                anyhow::bail!("Duplicate step name: {}", step);
            }
        }

        Ok(())
    }

    /// Pacing delay between steps, if configured
    pub fn pacing(&self) -> Option<Duration> {
        self.pacing_ms.map(Duration::from_millis)
    }

    /// Resolve the layout against `catalog` and compile it
    pub fn build<S>(&self, catalog: &StepCatalog<S>) -> Result<Pipeline<S>> {
        let mut builder = PipelineBuilder::new(self.name.clone());

        for name in &self.steps {
            let func = catalog.get(name).with_context(|| {
                format!(
                    "Step '{}' is not in the catalog (available: {})",
                    name,
                    catalog.names().join(", ")
                )
            })?;
            debug!("Registering step {}", name);
            builder.register_step_fn(name.clone(), func)?;
        }

        for transition in &self.transitions {
            debug!("Adding transition {}", transition);
            builder
                .add_transition(&transition.from, &transition.to)
                .with_context(|| format!("Invalid transition {}", transition))?;
        }

        builder.set_entry(&self.entry).context("Invalid entry step")?;

        let pipeline = builder
            .compile()
            .with_context(|| format!("Failed to compile pipeline '{}'", self.name))?;
        debug!(
            "Compiled pipeline {} with {} steps",
            pipeline.name(),
            pipeline.len()
        );
        Ok(pipeline)
    }
}
