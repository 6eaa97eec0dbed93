//! Dry-run object store
//!
//! Stands in for the S3 adapter under `--dry-run`: nothing is sent, every
//! file is reported as if it had been uploaded.

use std::path::Path;

use async_trait::async_trait;
use s3up_core::{ObjectInfo, ObjectStore, Result};

#[derive(Debug, Default)]
pub struct DryRunStore;

#[async_trait]
impl ObjectStore for DryRunStore {
    async fn put_object(&self, local_path: &Path, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let size = tokio::fs::metadata(local_path).await?.len();
        tracing::debug!(path = %local_path.display(), bucket, key, size, "Dry run, skipping upload");
        Ok(ObjectInfo::file(key, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_reports_size_without_uploading() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("x.csv");
        std::fs::write(&file, "a,b\n").unwrap();

        let info = DryRunStore.put_object(&file, "bucket", "p/x.csv").await.unwrap();
        assert_eq!(info.key, "p/x.csv");
        assert_eq!(info.size_bytes, 4);
    }

    #[tokio::test]
    async fn test_dry_run_missing_file() {
        let result = DryRunStore
            .put_object(Path::new("/nonexistent/x.csv"), "bucket", "x.csv")
            .await;
        assert!(result.is_err());
    }
}
