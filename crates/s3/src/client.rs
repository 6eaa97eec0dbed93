//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3up-core.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::error::display::DisplayErrorContext;

use s3up_core::{Error, ObjectInfo, ObjectStore, Result, StorageConfig};

/// S3 client wrapper
///
/// `aws_sdk_s3::Client` is safe to share between concurrent transfers.
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client
    ///
    /// Credentials and, unless overridden, the region come from the SDK's
    /// default provider chain (environment, profile, instance metadata).
    pub async fn new(storage: &StorageConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &storage.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &storage.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;

        if config.region().is_none() {
            return Err(Error::Config(
                "No region configured. Set AWS_REGION or pass --region.".into(),
            ));
        }

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(storage.force_path_style)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Wrap an already configured SDK client
    pub fn from_client(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }
}

/// Map an SDK error message to the matching error class
fn classify(bucket: &str, key: &str, message: String) -> Error {
    if message.contains("NoSuchBucket") {
        Error::NotFound(format!("Bucket not found: {bucket}"))
    } else if message.contains("NotFound") {
        Error::NotFound(format!("{bucket}/{key}"))
    } else if message.contains("AccessDenied")
        || message.contains("InvalidAccessKeyId")
        || message.contains("SignatureDoesNotMatch")
        || message.contains("ExpiredToken")
        || message.contains("credentials")
    {
        Error::Auth(message)
    } else {
        Error::Network(message)
    }
}

/// Content type for a local file, guessed from its extension
fn content_type_for(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

#[async_trait]
impl ObjectStore for S3Client {
    /// Upload with a single `PutObject`
    ///
    /// S3 caps a single `PutObject` at 5 GiB; larger files fail with the
    /// server's `EntityTooLarge` error and are reported as transfer failures.
    async fn put_object(&self, local_path: &Path, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let size = tokio::fs::metadata(local_path).await?.len();
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| Error::General(format!("{}: {e}", local_path.display())))?;

        let content_type = content_type_for(local_path);

        let mut request = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(size as i64)
            .body(body);

        if let Some(ct) = &content_type {
            request = request.content_type(ct);
        }

        tracing::debug!(bucket, key, size, "Sending PutObject");

        request
            .send()
            .await
            .map_err(|e| classify(bucket, key, DisplayErrorContext(&e).to_string()))?;

        Ok(ObjectInfo::file(key, size))
    }
}
