//! Upload job configuration
//!
//! An `UploadJob` is built once at startup and read-only for the run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::normalize_prefix;
use crate::walk::{DEFAULT_EXTENSION, Enumerator};

/// Maximum number of concurrent transfers accepted
pub const MAX_CONCURRENCY: usize = 64;

/// What to do when a single file fails to upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop starting new transfers after the first failure
    AbortOnFirst,
    /// Record the failure and keep going
    #[default]
    Continue,
}

/// What to do with entries below the root that cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalMode {
    /// Abort the run on the first unreadable entry
    Strict,
    /// Report the entry and continue the walk
    #[default]
    SkipUnreadable,
}

/// Immutable description of one upload run
#[derive(Debug, Clone)]
pub struct UploadJob {
    /// Destination bucket
    pub bucket: String,
    /// Normalized key prefix, empty or ending with `/`
    pub prefix: String,
    /// Local directory to upload
    pub source_root: PathBuf,
    /// Extension filter
    pub extension: String,
    pub failure_policy: FailurePolicy,
    pub traversal_mode: TraversalMode,
    pub follow_links: bool,
    /// Number of transfers in flight at once
    pub concurrency: usize,
}

impl UploadJob {
    /// Build and validate a job
    pub fn new(
        bucket: impl Into<String>,
        prefix: &str,
        source_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let bucket = bucket.into();
        validate_bucket(&bucket)?;
        Ok(Self {
            bucket,
            prefix: normalize_prefix(prefix)?,
            source_root: source_root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            failure_policy: FailurePolicy::default(),
            traversal_mode: TraversalMode::default(),
            follow_links: false,
            concurrency: 1,
        })
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn traversal_mode(mut self, mode: TraversalMode) -> Self {
        self.traversal_mode = mode;
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Re-check invariants that builder setters may have broken
    pub fn validate(&self) -> Result<()> {
        validate_bucket(&self.bucket)?;
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(Error::Config(format!(
                "Concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        if normalize_prefix(&self.prefix)? != self.prefix {
            return Err(Error::Config(format!("Prefix is not normalized: {}", self.prefix)));
        }
        Ok(())
    }

    /// Enumerator configured for this job
    pub fn enumerator(&self) -> Enumerator {
        Enumerator::new(&self.source_root)
            .extension(&self.extension)
            .follow_links(self.follow_links)
    }
}

/// Check a bucket name against the S3 naming rules
///
/// 3-63 characters of lowercase letters, digits, `-` and `.`, starting and
/// ending with a letter or digit.
pub fn validate_bucket(bucket: &str) -> Result<()> {
    if bucket.is_empty() {
        return Err(Error::Config("Bucket name must not be empty".into()));
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(Error::Config(format!(
            "Bucket name must be 3-63 characters: {bucket}"
        )));
    }

    let valid_chars = bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_edges = bucket
        .chars()
        .next()
        .zip(bucket.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if !valid_chars || !valid_edges || bucket.contains("..") {
        return Err(Error::Config(format!("Invalid bucket name: {bucket}")));
    }

    Ok(())
}
