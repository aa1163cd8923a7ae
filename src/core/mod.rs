//! Core domain models for pipelines
//!
//! This module defines the pipeline definition (steps, transitions, the
//! builder and its compiled form), the run record, and layout configuration.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::{PipelineConfig, StepCatalog};
pub use error::{Defect, DefinitionError, StepError};
pub use pipeline::{Pipeline, PipelineBuilder, Walk};
pub use state::{RunRecord, RunStatus};
pub use step::{Step, StepFn, Transition};
