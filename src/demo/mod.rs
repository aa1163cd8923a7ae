//! The conversation demo: four steps that each record a thought

pub mod conversation;

pub use conversation::{
    catalog, default_config, inject_failure, ConversationState, DEFAULT_LAYOUT, STEPS,
};
