//! ObjectStore trait definition
//!
//! This trait defines the interface the upload coordinator needs from an
//! S3-compatible backend. It keeps the engine decoupled from the SDK.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Metadata for an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size_bytes: u64,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for a stored file
    pub fn file(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size_bytes: size,
        }
    }
}

/// Trait for S3-compatible storage operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
/// Implementations must be safe to call concurrently from several transfers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local_path` to `bucket` under `key`
    async fn put_object(&self, local_path: &Path, bucket: &str, key: &str) -> Result<ObjectInfo>;
}
