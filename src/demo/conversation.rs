//! Conversation state and its step functions

use crate::core::{PipelineConfig, StepCatalog, StepError};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// State threaded through the conversation pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Status label set by the most recent step
    pub current_step: String,

    /// One thought per completed step, in order
    pub thought_process: Vec<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent thought, if any
    pub fn last_thought(&self) -> Option<&str> {
        self.thought_process.last().map(String::as_str)
    }
}

/// Demo steps: (name, status label, thought)
pub const STEPS: [(&str, &str, &str); 4] = [
    ("greet", "greeting", "I should greet the user first"),
    (
        "ask_question",
        "questioning",
        "Now I should ask what they need help with",
    ),
    (
        "provide_help",
        "helping",
        "I'll provide some helpful information",
    ),
    ("summarize", "summarizing", "I'll summarize what we discussed"),
];

/// Layout used when no file is given
pub const DEFAULT_LAYOUT: &str = r#"
name: "conversation"
entry: greet
pacing_ms: 1000
steps: [greet, ask_question, provide_help, summarize]
transitions:
  - { from: greet, to: ask_question }
  - { from: ask_question, to: provide_help }
  - { from: provide_help, to: summarize }
"#;

/// Catalog holding every demo step
pub fn catalog() -> StepCatalog<ConversationState> {
    let mut catalog = StepCatalog::new();
    for (name, status, thought) in STEPS {
        catalog.insert(name, move |state: &mut ConversationState| {
            state.thought_process.push(thought.to_string());
            state.current_step = status.to_string();
            Ok(())
        });
    }
    catalog
}

/// Parse the built-in layout
pub fn default_config() -> Result<PipelineConfig> {
    PipelineConfig::from_yaml(DEFAULT_LAYOUT)
}

/// Replace `step` in the catalog with one that always fails
pub fn inject_failure(catalog: &mut StepCatalog<ConversationState>, step: &str) -> Result<()> {
    if !catalog.contains(step) {
        anyhow::bail!(
            "Cannot inject a failure into unknown step '{}' (available: {})",
            step,
            catalog.names().join(", ")
        );
    }

    let message = format!("{} failed on purpose", step);
    catalog.insert(step, move |_: &mut ConversationState| {
        Err(StepError::new(message.clone()))
    });
    Ok(())
}
