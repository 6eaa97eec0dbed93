//! Per-file outcomes and the aggregate run summary

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Result of one candidate's transfer
#[derive(Debug)]
pub enum UploadOutcome {
    Success {
        path: PathBuf,
        key: String,
        bytes: u64,
        elapsed: Duration,
    },
    Failure(UploadFailure),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn key(&self) -> &str {
        match self {
            UploadOutcome::Success { key, .. } => key,
            UploadOutcome::Failure(f) => &f.key,
        }
    }
}

/// A candidate that could not be uploaded
#[derive(Debug)]
pub struct UploadFailure {
    pub path: PathBuf,
    pub key: String,
    pub error: Error,
    pub elapsed: Duration,
}

/// Aggregate of one run
#[derive(Debug)]
pub struct UploadSummary {
    pub started_at: jiff::Timestamp,
    pub finished_at: jiff::Timestamp,
    /// Wall-clock time from batch start to the last completion
    pub elapsed: Duration,
    /// Transfers attempted, successful or not
    pub attempted: usize,
    pub succeeded: usize,
    pub bytes_uploaded: u64,
    /// Failed candidates, sorted by key
    pub failures: Vec<UploadFailure>,
    /// Entries below the root that could not be read and were skipped
    pub skipped: Vec<String>,
    /// True when the batch stopped early on a failure
    pub aborted: bool,
}

impl UploadSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }

    /// Exit code for a process that ran this summary
    ///
    /// Zero when nothing failed. When every failure has the same class the
    /// class code is used, otherwise the general error code.
    pub fn exit_code(&self) -> i32 {
        let mut codes = self.failures.iter().map(|f| f.error.exit_code());
        match codes.next() {
            None if self.aborted => 1,
            None => 0,
            Some(first) if codes.all(|c| c == first) => first,
            Some(_) => 1,
        }
    }
}

/// Running tally the coordinator feeds outcomes into
#[derive(Debug)]
pub(crate) struct Tally {
    started_at: jiff::Timestamp,
    attempted: usize,
    succeeded: usize,
    bytes_uploaded: u64,
    failures: Vec<UploadFailure>,
    skipped: Vec<String>,
    aborted: bool,
}

impl Tally {
    pub(crate) fn new(started_at: jiff::Timestamp) -> Self {
        Self {
            started_at,
            attempted: 0,
            succeeded: 0,
            bytes_uploaded: 0,
            failures: Vec::new(),
            skipped: Vec::new(),
            aborted: false,
        }
    }

    pub(crate) fn record(&mut self, outcome: UploadOutcome) {
        self.attempted += 1;
        match outcome {
            UploadOutcome::Success { bytes, .. } => {
                self.succeeded += 1;
                self.bytes_uploaded += bytes;
            }
            UploadOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    pub(crate) fn skip(&mut self, message: String) {
        self.skipped.push(message);
    }

    pub(crate) fn abort(&mut self) {
        self.aborted = true;
    }

    pub(crate) fn finish(mut self, elapsed: Duration) -> UploadSummary {
        self.failures.sort_by(|a, b| a.key.cmp(&b.key));
        self.skipped.sort();
        UploadSummary {
            started_at: self.started_at,
            finished_at: jiff::Timestamp::now(),
            elapsed,
            attempted: self.attempted,
            succeeded: self.succeeded,
            bytes_uploaded: self.bytes_uploaded,
            failures: self.failures,
            skipped: self.skipped,
            aborted: self.aborted,
        }
    }
}
