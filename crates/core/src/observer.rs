//! Progress and outcome reporting
//!
//! The coordinator reports through an injected `UploadObserver` instead of
//! writing to a global logger, so callers decide where events go.

use crate::error::Error;
use crate::job::UploadJob;
use crate::summary::{UploadOutcome, UploadSummary};

/// Receives leveled events from an upload run
///
/// All methods have empty defaults. Implementations must be cheap, they are
/// called inline between transfers.
pub trait UploadObserver: Send + Sync {
    /// The run passed validation and the walk is starting
    fn on_start(&self, _job: &UploadJob) {}

    /// A candidate finished, successfully or not
    fn on_outcome(&self, _outcome: &UploadOutcome) {}

    /// An entry below the root could not be read and was skipped
    fn on_skipped_entry(&self, _error: &Error) {}

    /// Every candidate has been processed, or the batch was aborted
    fn on_complete(&self, _summary: &UploadSummary) {}
}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl UploadObserver for TracingObserver {
    fn on_start(&self, job: &UploadJob) {
        tracing::info!(
            bucket = %job.bucket,
            prefix = %job.prefix,
            source = %job.source_root.display(),
            extension = %job.extension,
            concurrency = job.concurrency,
            "Starting upload"
        );
    }

    fn on_outcome(&self, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::Success {
                path,
                key,
                bytes,
                elapsed,
            } => tracing::info!(
                path = %path.display(),
                key = %key,
                bytes,
                elapsed_secs = elapsed.as_secs_f64(),
                "File {} uploaded to {} in {:.2} seconds",
                path.display(),
                key,
                elapsed.as_secs_f64()
            ),
            UploadOutcome::Failure(failure) => tracing::error!(
                path = %failure.path.display(),
                key = %failure.key,
                error = %failure.error,
                "Failed to upload {} to {}: {}",
                failure.path.display(),
                failure.key,
                failure.error
            ),
        }
    }

    fn on_skipped_entry(&self, error: &Error) {
        tracing::warn!(error = %error, "Skipping unreadable entry");
    }

    fn on_complete(&self, summary: &UploadSummary) {
        if summary.aborted {
            tracing::error!(
                attempted = summary.attempted,
                succeeded = summary.succeeded,
                failed = summary.failed(),
                "Upload aborted after {} file(s) in {:.2} seconds",
                summary.attempted,
                summary.elapsed.as_secs_f64()
            );
        } else {
            tracing::info!(
                attempted = summary.attempted,
                succeeded = summary.succeeded,
                failed = summary.failed(),
                bytes = summary.bytes_uploaded,
                "All {} file(s) processed in {:.2} seconds",
                summary.attempted,
                summary.elapsed.as_secs_f64()
            );
        }
    }
}
