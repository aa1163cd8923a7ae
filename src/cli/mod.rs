//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{DescribeCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Linear state-passing pipeline demo
#[derive(Debug, Parser, Clone)]
#[command(name = "stepline")]
#[command(version)]
#[command(about = "Run a linear state-passing pipeline demo", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the conversation pipeline
    Run(RunCommand),

    /// Validate a pipeline layout against the demo steps
    Validate(ValidateCommand),

    /// Show how a pipeline layout is wired
    Describe(DescribeCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
