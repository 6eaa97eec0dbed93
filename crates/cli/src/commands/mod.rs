//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod completions;
mod config;
pub mod upload;

/// s3up - upload a directory tree to S3
///
/// Uploads every matching file under a local directory to an S3-compatible
/// bucket, keeping the relative layout under a key prefix.
#[derive(Parser, Debug)]
#[command(name = "s3up")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload matching files from a directory
    Upload(upload::UploadArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Upload(args) => upload::execute(args, output_config).await,
        Commands::Config(cmd) => config::execute(cmd, output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}
