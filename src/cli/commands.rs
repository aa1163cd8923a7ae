//! CLI command definitions

use clap::Args;

/// Run the conversation pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to a pipeline layout YAML file (defaults to the built-in layout)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Pause between steps in milliseconds (overrides the layout's pacing)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Make the named step fail, to see how a run aborts
    #[arg(long)]
    pub fail_at: Option<String>,

    /// Cancel the run if it is still going after this many milliseconds
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Number of independent runs sharing one compiled pipeline
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub runs: u32,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a pipeline layout
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline layout YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Describe a pipeline layout
#[derive(Debug, Args, Clone)]
pub struct DescribeCommand {
    /// Path to a pipeline layout YAML file (defaults to the built-in layout)
    #[arg(short, long)]
    pub file: Option<String>,
}
