//! Destination key mapping
//!
//! Maps a local file discovered under a source root to the object key it is
//! stored under: `prefix + relative path`, always with `/` separators.

use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Key separator used by S3-compatible stores
pub const KEY_SEPARATOR: char = '/';

/// Normalize a user supplied key prefix
///
/// Backslashes become `/`, leading separators are removed and a non-empty
/// prefix always ends with exactly one `/`. Prefixes with `.` or `..`
/// segments are rejected.
pub fn normalize_prefix(prefix: &str) -> Result<String> {
    let unified = prefix.replace('\\', "/");
    let trimmed = unified.trim_matches(KEY_SEPARATOR);
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let mut segments = Vec::new();
    for segment in trimmed.split(KEY_SEPARATOR) {
        match segment {
            "" => continue,
            "." | ".." => {
                return Err(Error::Config(format!(
                    "Prefix must not contain '{segment}' segments: {prefix}"
                )));
            }
            s => segments.push(s),
        }
    }

    Ok(format!("{}/", segments.join("/")))
}

/// Path of `candidate` relative to `root`, with `/` separators
pub fn relative_key(root: &Path, candidate: &Path) -> Result<String> {
    let relative = candidate.strip_prefix(root).map_err(|_| {
        Error::General(format!(
            "{} is not under {}",
            candidate.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().replace('\\', "/")),
            Component::CurDir => {}
            other => {
                return Err(Error::General(format!(
                    "Unexpected path component {:?} in {}",
                    other.as_os_str(),
                    candidate.display()
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::General(format!(
            "{} has no path relative to {}",
            candidate.display(),
            root.display()
        )));
    }

    Ok(parts.join("/"))
}

/// Join a prefix and a relative key with exactly one separator between them
pub fn join_key(prefix: &str, relative: &str) -> String {
    let base = prefix.trim_end_matches(KEY_SEPARATOR);
    let child = relative.trim_start_matches(KEY_SEPARATOR);
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{base}/{child}")
    }
}

/// Compute the destination key for a candidate discovered under `root`
pub fn destination_key(prefix: &str, root: &Path, candidate: &Path) -> Result<String> {
    let relative = relative_key(root, candidate)?;
    let prefix = normalize_prefix(prefix)?;
    Ok(join_key(&prefix, &relative))
}
