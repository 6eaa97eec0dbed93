//! Output formatter for human-readable and JSON output
//!
//! Ensures consistent output formatting across all commands.

use serde::Serialize;

use super::OutputConfig;

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, all output is strict JSON without colors or progress.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{}", self.success_line(message));
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_line(message));
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{}", self.warning_line(message));
    }

    /// Output JSON directly
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet and JSON mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{message}");
    }

    fn success_line(&self, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[32m✓\x1b[0m {message}")
        } else {
            format!("✓ {message}")
        }
    }

    fn error_line(&self, message: &str) -> String {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
        } else if self.colors_enabled() {
            format!("\x1b[31m✗\x1b[0m {message}")
        } else {
            format!("✗ {message}")
        }
    }

    fn warning_line(&self, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[33m⚠\x1b[0m {message}")
        } else {
            format!("⚠ {message}")
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
