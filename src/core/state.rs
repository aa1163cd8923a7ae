//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Run has not started
    NotStarted,
    /// A step is currently executing
    Running { step: String },
    /// The terminal step finished
    Completed,
    /// A step's function failed
    Failed { step: String, error: String },
    /// The cancellation check stopped the run before a step
    Cancelled { before: String },
}

impl RunStatus {
    /// Check if the run can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed { .. } | RunStatus::Cancelled { .. }
        )
    }
}

/// Record of one run, independent of the state value it carried
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Name of the pipeline that ran
    pub pipeline_name: String,

    /// Current status
    pub status: RunStatus,

    /// When the first step was entered
    pub started_at: Option<DateTime<Utc>>,

    /// When the run reached a terminal status
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of steps whose function returned successfully
    pub completed_steps: usize,
}

impl RunRecord {
    /// Create a record for a run that has not started
    pub fn new(pipeline_name: impl Into<String>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            pipeline_name: pipeline_name.into(),
            status: RunStatus::NotStarted,
            started_at: None,
            completed_at: None,
            completed_steps: 0,
        }
    }

    /// Mark `step` as running; the first call also stamps the start time
    pub fn enter(&mut self, step: &str) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.status = RunStatus::Running {
            step: step.to_string(),
        };
    }

    /// Count the running step as done
    pub fn step_succeeded(&mut self) {
        self.completed_steps += 1;
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.finish(RunStatus::Completed);
    }

    /// Mark the run as failed at `step`
    pub fn fail(&mut self, step: &str, error: &str) {
        self.finish(RunStatus::Failed {
            step: step.to_string(),
            error: error.to_string(),
        });
    }

    /// Mark the run as cancelled before `step`
    pub fn cancel(&mut self, before: &str) {
        self.finish(RunStatus::Cancelled {
            before: before.to_string(),
        });
    }

    /// Wall-clock duration of the run, once it has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.started_at?)
    }

    fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}
