//! config command - Manage the configuration file

use clap::Subcommand;
use s3up_core::{Config, ConfigManager};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}

#[derive(Debug, Serialize)]
struct ConfigOutput<'a> {
    path: String,
    exists: bool,
    config: &'a Config,
}

/// Execute a config subcommand
pub fn execute(cmd: ConfigCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ConfigManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to locate configuration: {e}"));
            return ExitCode::from(&e);
        }
    };

    match cmd {
        ConfigCommands::Init { force } => init(&manager, force, &formatter),
        ConfigCommands::Show => show(&manager, &formatter),
        ConfigCommands::Path => {
            if formatter.is_json() {
                formatter.json(&serde_json::json!({
                    "path": manager.config_path().display().to_string()
                }));
            } else {
                formatter.println(&manager.config_path().display().to_string());
            }
            ExitCode::Success
        }
    }
}

fn init(manager: &ConfigManager, force: bool, formatter: &Formatter) -> ExitCode {
    let path = manager.config_path().display().to_string();

    if manager.config_path().exists() && !force {
        formatter.error(&format!(
            "Configuration already exists at {path}. Use --force to overwrite."
        ));
        return ExitCode::UsageError;
    }

    match manager.save(&Config::default()) {
        Ok(()) => {
            formatter.success(&format!("Wrote default configuration to {path}"));
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to write {path}: {e}"));
            ExitCode::from(&e)
        }
    }
}

fn show(manager: &ConfigManager, formatter: &Formatter) -> ExitCode {
    let config = match manager.load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&ConfigOutput {
            path: manager.config_path().display().to_string(),
            exists: manager.config_path().exists(),
            config: &config,
        });
        return ExitCode::Success;
    }

    formatter.println(&format!("# {}", manager.config_path().display()));
    match toml::to_string_pretty(&config) {
        Ok(text) => {
            formatter.println(text.trim_end());
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to render configuration: {e}"));
            ExitCode::GeneralError
        }
    }
}
