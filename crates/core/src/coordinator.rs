//! Batch upload coordinator
//!
//! Drives one `UploadJob`: walks the source tree, maps every candidate to its
//! destination key, hands it to the store and folds the outcomes into an
//! `UploadSummary`. At most `job.concurrency` transfers are in flight; with the
//! default of one, discovery and transfer alternate strictly.

use std::time::Instant;

use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::error::Result;
use crate::job::{FailurePolicy, TraversalMode, UploadJob};
use crate::observer::{TracingObserver, UploadObserver};
use crate::summary::{Tally, UploadFailure, UploadOutcome, UploadSummary};
use crate::traits::ObjectStore;
use crate::walk::Candidate;

static DEFAULT_OBSERVER: TracingObserver = TracingObserver;

/// Runs upload jobs against an object store
pub struct Coordinator<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    observer: &'a dyn UploadObserver,
}

impl<'a, S: ObjectStore + ?Sized> Coordinator<'a, S> {
    /// Create a coordinator reporting through `tracing`
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            observer: &DEFAULT_OBSERVER,
        }
    }

    /// Report through a custom observer
    pub fn with_observer(mut self, observer: &'a dyn UploadObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Upload every candidate of `job`
    ///
    /// Configuration and root errors are returned before the store is touched.
    /// Transfer failures never produce `Err`; they are collected in the
    /// summary, and under `FailurePolicy::AbortOnFirst` stop new transfers
    /// from starting. In `TraversalMode::Strict` an unreadable entry below the
    /// root aborts the run with the traversal error.
    pub async fn run(&self, job: &UploadJob) -> Result<UploadSummary> {
        job.validate()?;
        let mut candidates = job.enumerator().candidates()?;

        let started = Instant::now();
        let mut tally = Tally::new(jiff::Timestamp::now());
        self.observer.on_start(job);

        let mut in_flight = FuturesUnordered::new();
        let mut exhausted = false;
        let mut stopped = false;

        loop {
            while !exhausted && !stopped && in_flight.len() < job.concurrency {
                match candidates.next() {
                    None => exhausted = true,
                    Some(Ok(candidate)) => {
                        tracing::debug!(path = %candidate.path.display(), "Discovered candidate");
                        in_flight.push(self.transfer(job, candidate));
                    }
                    Some(Err(error)) => match job.traversal_mode {
                        TraversalMode::Strict => return Err(error),
                        TraversalMode::SkipUnreadable => {
                            self.observer.on_skipped_entry(&error);
                            tally.skip(error.to_string());
                        }
                    },
                }
            }

            let Some(outcome) = in_flight.next().await else {
                break;
            };

            self.observer.on_outcome(&outcome);
            let failed = !outcome.is_success();
            tally.record(outcome);

            if failed && job.failure_policy == FailurePolicy::AbortOnFirst && !stopped {
                stopped = true;
                tally.abort();
            }
        }

        let summary = tally.finish(started.elapsed());
        self.observer.on_complete(&summary);
        Ok(summary)
    }

    async fn transfer(&self, job: &UploadJob, candidate: Candidate) -> UploadOutcome {
        let started = Instant::now();

        let key = match candidate.key(&job.prefix) {
            Ok(key) => key,
            Err(error) => {
                return UploadOutcome::Failure(UploadFailure {
                    key: candidate.path.to_string_lossy().into_owned(),
                    path: candidate.path,
                    error,
                    elapsed: started.elapsed(),
                });
            }
        };

        match self
            .store
            .put_object(&candidate.path, &job.bucket, &key)
            .await
        {
            Ok(info) => UploadOutcome::Success {
                path: candidate.path,
                key,
                bytes: info.size_bytes,
                elapsed: started.elapsed(),
            },
            Err(error) => UploadOutcome::Failure(UploadFailure {
                path: candidate.path,
                key,
                error,
                elapsed: started.elapsed(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::{MockObjectStore, ObjectInfo};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl UploadObserver for Recorder {
        fn on_start(&self, job: &UploadJob) {
            self.events.lock().unwrap().push(format!("start {}", job.bucket));
        }

        fn on_outcome(&self, outcome: &UploadOutcome) {
            let tag = if outcome.is_success() { "ok" } else { "err" };
            self.events
                .lock()
                .unwrap()
                .push(format!("{tag} {}", outcome.key()));
        }

        fn on_complete(&self, summary: &UploadSummary) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", summary.attempted));
        }
    }

    fn dataset() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("x.csv"), "1,2\n").unwrap();
        fs::write(dir.path().join("sub").join("y.csv"), "3,4\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_run_uploads_matching_files() {
        let dir = dataset();
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|_, bucket, key| bucket == "reports-bucket" && key.starts_with("reports/"))
            .times(2)
            .returning(|_, _, key| Ok(ObjectInfo::file(key, 4)));

        let job = UploadJob::new("reports-bucket", "reports/", dir.path()).unwrap();
        let recorder = Recorder::default();
        let summary = Coordinator::new(&store)
            .with_observer(&recorder)
            .run(&job)
            .await
            .unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.bytes_uploaded, 8);
        assert!(summary.is_success());

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.first().unwrap(), "start reports-bucket");
        assert_eq!(events.last().unwrap(), "done 2");
        assert!(events.contains(&"ok reports/x.csv".to_string()));
        assert!(events.contains(&"ok reports/sub/y.csv".to_string()));
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let dir = dataset();
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .times(2)
            .returning(|_, _, key| {
                if key == "sub/y.csv" {
                    Err(Error::Auth("AccessDenied".into()))
                } else {
                    Ok(ObjectInfo::file(key, 4))
                }
            });

        let job = UploadJob::new("bucket", "", dir.path()).unwrap();
        let summary = Coordinator::new(&store).run(&job).await.unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].key, "sub/y.csv");
        assert!(summary.failures[0].path.ends_with("y.csv"));
        assert!(!summary.aborted);
        assert_eq!(summary.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_abort_on_first_failure() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{i}.csv")), "x").unwrap();
        }

        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .times(1)
            .returning(|_, _, _| Err(Error::Network("connection reset".into())));

        let job = UploadJob::new("bucket", "", dir.path())
            .unwrap()
            .failure_policy(FailurePolicy::AbortOnFirst);
        let summary = Coordinator::new(&store).run(&job).await.unwrap();

        assert!(summary.aborted);
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_missing_root_makes_no_calls() {
        let dir = TempDir::new().unwrap();
        let mut store = MockObjectStore::new();
        store.expect_put_object().never();

        let job = UploadJob::new("bucket", "", dir.path().join("missing")).unwrap();
        let result = Coordinator::new(&store).run(&job).await;
        assert!(matches!(result, Err(Error::Traversal { missing: true, .. })));
    }

    #[tokio::test]
    async fn test_invalid_job_makes_no_calls() {
        let dir = dataset();
        let mut store = MockObjectStore::new();
        store.expect_put_object().never();

        let job = UploadJob::new("bucket", "", dir.path()).unwrap().concurrency(0);
        let result = Coordinator::new(&store).run(&job).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_tree() {
        let dir = TempDir::new().unwrap();
        let store = MockObjectStore::new();
        let job = UploadJob::new("bucket", "p", dir.path()).unwrap();
        let summary = Coordinator::new(&store).run(&job).await.unwrap();
        assert_eq!(summary.attempted, 0);
        assert!(summary.is_success());
    }
}
