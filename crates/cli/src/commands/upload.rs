//! upload command - Upload a directory tree
//!
//! Walks a local directory and uploads every file matching the extension
//! filter to `bucket/prefix/<relative path>`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use s3up_core::{
    Config, ConfigManager, Coordinator, FailurePolicy, ObjectStore, StorageConfig, TracingObserver,
    TraversalMode, UploadJob, UploadObserver, UploadOutcome, UploadSummary,
};
use s3up_s3::S3Client;
use serde::Serialize;

use crate::dry_run::DryRunStore;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload matching files from a directory
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local directory to upload
    pub source: PathBuf,

    /// Destination bucket
    #[arg(short, long, env = "S3UP_BUCKET")]
    pub bucket: String,

    /// Key prefix for uploaded objects
    #[arg(short, long, env = "S3UP_PREFIX")]
    pub prefix: Option<String>,

    /// Only upload files with this extension (case-insensitive, empty for all files)
    #[arg(short, long, env = "S3UP_EXTENSION")]
    pub extension: Option<String>,

    /// Number of files uploaded at once
    #[arg(short = 'j', long, env = "S3UP_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Stop after the first failed upload
    #[arg(long)]
    pub fail_fast: bool,

    /// Abort when a directory below the source cannot be read
    #[arg(long)]
    pub strict: bool,

    /// Follow symbolic links
    #[arg(short = 'L', long)]
    pub follow_links: bool,

    /// Only show what would be uploaded
    #[arg(long)]
    pub dry_run: bool,

    /// Custom S3 endpoint URL
    #[arg(long, env = "S3UP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Region override
    #[arg(long, env = "S3UP_REGION")]
    pub region: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    pub path_style: bool,
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    path: String,
    key: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    dry_run: bool,
    bucket: String,
    prefix: String,
    source: String,
    started_at: jiff::Timestamp,
    finished_at: jiff::Timestamp,
    elapsed_secs: f64,
    attempted: usize,
    succeeded: usize,
    failed: usize,
    bytes_uploaded: u64,
    size_human: String,
    aborted: bool,
    failures: Vec<FailureOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<String>,
}

impl UploadOutput {
    fn new(job: &UploadJob, summary: &UploadSummary, dry_run: bool) -> Self {
        let status = if summary.aborted {
            "aborted"
        } else if summary.failures.is_empty() {
            "success"
        } else if summary.succeeded == 0 {
            "failed"
        } else {
            "partial"
        };

        Self {
            status,
            dry_run,
            bucket: job.bucket.clone(),
            prefix: job.prefix.clone(),
            source: job.source_root.display().to_string(),
            started_at: summary.started_at,
            finished_at: summary.finished_at,
            elapsed_secs: summary.elapsed.as_secs_f64(),
            attempted: summary.attempted,
            succeeded: summary.succeeded,
            failed: summary.failed(),
            bytes_uploaded: summary.bytes_uploaded,
            size_human: humansize::format_size(summary.bytes_uploaded, humansize::BINARY),
            aborted: summary.aborted,
            failures: summary
                .failures
                .iter()
                .map(|f| FailureOutput {
                    path: f.path.display().to_string(),
                    key: f.key.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            skipped: summary.skipped.clone(),
        }
    }
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let config = match ConfigManager::new().and_then(|m| m.load()) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from(&e);
        }
    };

    let job = match build_job(&args, &config) {
        Ok(job) => job,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let mut progress_config = output_config;
    progress_config.no_progress |= !config.defaults.progress;

    if args.dry_run {
        return run(&DryRunStore, &job, true, &formatter, &progress_config).await;
    }

    let storage = storage_config(&args, &config);
    let client = match S3Client::new(&storage).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from(&e);
        }
    };

    run(&client, &job, false, &formatter, &progress_config).await
}

async fn run<S: ObjectStore>(
    store: &S,
    job: &UploadJob,
    dry_run: bool,
    formatter: &Formatter,
    output_config: &OutputConfig,
) -> ExitCode {
    let progress = ProgressBar::spinner(output_config, "uploaded");
    let observer = ConsoleObserver {
        formatter,
        progress: &progress,
        bucket: &job.bucket,
        dry_run,
    };

    let coordinator = Coordinator::new(store).with_observer(&observer);

    let result = tokio::select! {
        result = coordinator.run(job) => result,
        _ = tokio::signal::ctrl_c() => {
            progress.finish_and_clear();
            formatter.warning("Interrupted, uploads in flight were cancelled.");
            return ExitCode::Interrupted;
        }
    };
    progress.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&UploadOutput::new(job, &summary, dry_run));
    } else if summary.aborted {
        formatter.error(&summary_line(&summary, dry_run));
    } else if summary.failures.is_empty() {
        formatter.success(&summary_line(&summary, dry_run));
    } else {
        formatter.warning(&summary_line(&summary, dry_run));
    }

    ExitCode::from(&summary)
}

/// Build the job from flags, falling back to the configuration file
fn build_job(args: &UploadArgs, config: &Config) -> s3up_core::Result<UploadJob> {
    let defaults = &config.defaults;

    let prefix = args.prefix.as_deref().unwrap_or(&defaults.prefix);
    let failure_policy = if args.fail_fast {
        FailurePolicy::AbortOnFirst
    } else {
        defaults.failure_policy
    };
    let traversal_mode = if args.strict {
        TraversalMode::Strict
    } else {
        defaults.traversal_mode
    };

    let job = UploadJob::new(&args.bucket, prefix, &args.source)?
        .extension(args.extension.clone().unwrap_or_else(|| defaults.extension.clone()))
        .concurrency(args.concurrency.unwrap_or(defaults.concurrency))
        .failure_policy(failure_policy)
        .traversal_mode(traversal_mode)
        .follow_links(args.follow_links || defaults.follow_links);

    job.validate()?;
    Ok(job)
}

/// Storage settings from flags, falling back to the configuration file
fn storage_config(args: &UploadArgs, config: &Config) -> StorageConfig {
    StorageConfig {
        endpoint: args.endpoint.clone().or_else(|| config.storage.endpoint.clone()),
        region: args.region.clone().or_else(|| config.storage.region.clone()),
        force_path_style: args.path_style || config.storage.force_path_style,
    }
}

fn summary_line(summary: &UploadSummary, dry_run: bool) -> String {
    let verb = if dry_run { "Would upload" } else { "Uploaded" };
    let size = humansize::format_size(summary.bytes_uploaded, humansize::BINARY);
    let secs = summary.elapsed.as_secs_f64();

    if summary.aborted {
        format!(
            "Aborted after first failure: {} succeeded, {} failed in {secs:.2}s",
            summary.succeeded,
            summary.failed()
        )
    } else if summary.failures.is_empty() {
        format!("{verb} {} file(s) ({size}) in {secs:.2}s", summary.succeeded)
    } else {
        format!(
            "Completed with errors: {} succeeded, {} failed in {secs:.2}s",
            summary.succeeded,
            summary.failed()
        )
    }
}

fn outcome_line(outcome: &UploadOutcome, bucket: &str, dry_run: bool) -> String {
    match outcome {
        UploadOutcome::Success {
            path,
            key,
            bytes,
            elapsed,
        } => {
            let arrow = if dry_run { "=>" } else { "->" };
            format!(
                "{} {arrow} {bucket}/{key} ({}, {})",
                path.display(),
                humansize::format_size(*bytes, humansize::BINARY),
                format_elapsed(*elapsed)
            )
        }
        UploadOutcome::Failure(f) => format!(
            "Failed to upload {} to {bucket}/{}: {}",
            f.path.display(),
            f.key,
            f.error
        ),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Prints per-file lines and drives the spinner, then forwards to tracing
struct ConsoleObserver<'a> {
    formatter: &'a Formatter,
    progress: &'a ProgressBar,
    bucket: &'a str,
    dry_run: bool,
}

impl UploadObserver for ConsoleObserver<'_> {
    fn on_start(&self, job: &UploadJob) {
        TracingObserver.on_start(job);
    }

    fn on_outcome(&self, outcome: &UploadOutcome) {
        TracingObserver.on_outcome(outcome);
        self.progress.inc();

        let line = outcome_line(outcome, self.bucket, self.dry_run);
        self.progress.suspend(|| {
            if outcome.is_success() {
                self.formatter.println(&line);
            } else {
                self.formatter.error(&line);
            }
        });
    }

    fn on_skipped_entry(&self, error: &s3up_core::Error) {
        TracingObserver.on_skipped_entry(error);
        self.progress
            .suspend(|| self.formatter.warning(&format!("Skipped: {error}")));
    }

    fn on_complete(&self, summary: &UploadSummary) {
        TracingObserver.on_complete(summary);
    }
}
