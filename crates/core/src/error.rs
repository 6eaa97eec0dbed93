//! Error types for s3up-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for s3up-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3up-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid job or configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source tree could not be walked
    #[error("Traversal error under {}: {message}", .root.display())]
    Traversal {
        /// Source root the walk was started from
        root: PathBuf,
        /// What went wrong
        message: String,
        /// True when the root itself does not exist
        missing: bool,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Authentication or permission failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Bucket or object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Build a traversal error for `root`
    pub fn traversal(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Traversal {
            root: root.into(),
            message: message.into(),
            missing: false,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,                                // UsageError
            Error::Network(_) => 3,                               // NetworkError
            Error::Auth(_) => 4,                                  // AuthError
            Error::NotFound(_) => 5,                              // NotFound
            Error::Traversal { missing: true, .. } => 5,          // NotFound
            _ => 1,                                               // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
        assert_eq!(Error::traversal("/data", "permission denied").exit_code(), 1);

        let missing = Error::Traversal {
            root: "/missing".into(),
            message: "does not exist".into(),
            missing: true,
        };
        assert_eq!(missing.exit_code(), 5);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Config("bucket name must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: bucket name must not be empty"
        );

        let err = Error::traversal("/data", "permission denied");
        assert_eq!(err.to_string(), "Traversal error under /data: permission denied");
    }
}
