//! Source tree enumeration
//!
//! Walks a local directory recursively and yields every regular file whose
//! name ends with the configured extension. Order follows whatever the
//! filesystem returns and must not be relied upon.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::path::destination_key;

/// Extension uploaded when none is configured
pub const DEFAULT_EXTENSION: &str = ".csv";

/// A local file discovered for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full local path of the file
    pub path: PathBuf,
    /// Source root the file was discovered under
    pub root: PathBuf,
}

impl Candidate {
    /// Destination key of this file under `prefix`
    pub fn key(&self, prefix: &str) -> Result<String> {
        destination_key(prefix, &self.root, &self.path)
    }
}

/// Restartable producer of upload candidates for one source root
#[derive(Debug, Clone)]
pub struct Enumerator {
    root: PathBuf,
    extension: String,
    follow_links: bool,
}

impl Enumerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            follow_links: false,
        }
    }

    /// Only yield files ending with `extension` (case-insensitive, dot optional)
    ///
    /// An empty extension matches every file.
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = normalize_extension(extension);
        self
    }

    /// Follow symbolic links while walking
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Check whether a file name passes the extension filter
    pub fn matches(&self, file_name: &str) -> bool {
        self.extension.is_empty() || file_name.to_lowercase().ends_with(&self.extension)
    }

    /// Verify the root exists and is a directory
    pub fn check_root(&self) -> Result<()> {
        let metadata = match std::fs::metadata(&self.root) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Traversal {
                    root: self.root.clone(),
                    message: "source directory does not exist".into(),
                    missing: true,
                });
            }
            Err(e) => return Err(Error::traversal(&self.root, e.to_string())),
        };

        if !metadata.is_dir() {
            return Err(Error::traversal(&self.root, "source is not a directory"));
        }

        Ok(())
    }

    /// Start a new walk over the tree
    ///
    /// Fails up front when the root is unusable. Errors below the root are
    /// yielded as `Err` items and the walk continues past them.
    pub fn candidates(&self) -> Result<Candidates> {
        self.check_root()?;

        let inner = walkdir::WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .into_iter();

        Ok(Candidates {
            inner,
            enumerator: self.clone(),
        })
    }
}

/// Lazy iterator over the candidates of one walk
pub struct Candidates {
    inner: walkdir::IntoIter,
    enumerator: Enumerator,
}

impl Iterator for Candidates {
    type Item = Result<Candidate>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let message = match e.path() {
                        Some(path) => format!("{}: {e}", path.display()),
                        None => e.to_string(),
                    };
                    return Some(Err(Error::traversal(&self.enumerator.root, message)));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.enumerator.matches(&name) {
                continue;
            }

            return Some(Ok(Candidate {
                path: entry.into_path(),
                root: self.enumerator.root.clone(),
            }));
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}
