//! CLI output formatting

use crate::{
    core::{Pipeline, RunRecord, RunStatus},
    demo::ConversationState,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static ENTER: Emoji<'_, '_> = Emoji("🟢 ", "> ");
pub static SPARKLES: Emoji<'_, '_> = Emoji("✨ ", "* ");

/// A horizontal rule sized to the terminal
pub fn separator() -> String {
    let width = term_size::dimensions_stdout()
        .map(|(w, _)| w.min(60))
        .unwrap_or(40);
    "=".repeat(width)
}

/// Show a spinner for the length of the pacing delay
pub fn pace(delay: Duration) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Processing state...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    std::thread::sleep(delay);
    spinner.finish_and_clear();
}

/// Line printed when a step is entered
pub fn format_step_enter(step: &str) -> String {
    format!("{} ENTERING STEP: {}", ENTER, style(step).cyan().bold())
}

/// Lines printed after a step returns
pub fn format_step_exit(step: &str, state: &ConversationState) -> String {
    format!(
        "{} {} complete! Updated state:\n  - Current step: {}\n  - Thought: {}",
        CHECK,
        style(step).green(),
        style(&state.current_step).bold(),
        state.last_thought().unwrap_or("-")
    )
}

/// The state's thoughts as a numbered list
pub fn format_thoughts(state: &ConversationState) -> String {
    state
        .thought_process
        .iter()
        .enumerate()
        .map(|(i, thought)| format!("  {}. {}", i + 1, thought))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a run status for display
pub fn format_status(status: &RunStatus) -> String {
    match status {
        RunStatus::NotStarted => style("NOT STARTED").dim().to_string(),
        RunStatus::Running { step } => style(format!("RUNNING ({})", step)).yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed { step, .. } => style(format!("FAILED at {}", step)).red().to_string(),
        RunStatus::Cancelled { before } => {
            style(format!("CANCELLED before {}", before)).yellow().to_string()
        }
    }
}

/// One-line summary of a run record
pub fn format_record(record: &RunRecord) -> String {
    let icon = match record.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed { .. } => CROSS,
        RunStatus::Cancelled { .. } => WARN,
        _ => INFO,
    };
    let duration = record
        .duration()
        .map(|d| format!("{}ms", d.num_milliseconds()))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} - {} - {} steps - {}",
        icon,
        style(&record.execution_id.to_string()[..8]).dim(),
        format_status(&record.status),
        record.completed_steps,
        style(duration).dim()
    )
}

/// The chain of a compiled pipeline, e.g. `a → b → c`
pub fn format_chain<S>(pipeline: &Pipeline<S>) -> String {
    pipeline
        .execution_order()
        .iter()
        .map(|step| style(step).cyan().to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}
