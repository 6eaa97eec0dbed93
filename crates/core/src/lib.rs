//! s3up-core: Core library for the s3up uploader
//!
//! This crate provides the upload engine, including:
//! - Source tree enumeration with extension filtering
//! - Local path to object key mapping
//! - Batch coordination with per-file failure isolation
//! - Configuration file management
//! - ObjectStore trait for the storage backend
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod job;
pub mod observer;
pub mod path;
pub mod summary;
pub mod traits;
pub mod walk;

pub use config::{Config, ConfigManager, Defaults, StorageConfig};
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use job::{FailurePolicy, TraversalMode, UploadJob};
pub use observer::{TracingObserver, UploadObserver};
pub use path::{destination_key, normalize_prefix};
pub use summary::{UploadFailure, UploadOutcome, UploadSummary};
pub use traits::{ObjectInfo, ObjectStore};
pub use walk::{Candidate, Enumerator};
