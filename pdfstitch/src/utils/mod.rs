//! Utilities for input path collection.

use crate::input::is_supported_path;
use crate::{Result, error::StitchError};
use std::path::PathBuf;
use tracing::debug;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Matches of one pattern come back in alphabetical order; patterns keep
/// the order they were given in. Wildcard matches are limited to files with
/// a supported image or PDF extension. A plain path without glob characters
/// is passed through as given, so reading it later reports a missing file
/// by name.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"scans/*.jpg"`
/// - `"./docs/**/*.pdf"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let pattern = pattern.as_ref();

    if !has_glob_chars(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern)
        .map_err(|err| StitchError::invalid_config(format!("Invalid pattern '{pattern}': {err}")))?;

    for entry in paths {
        let path = entry.map_err(|err| StitchError::invalid_config(err.to_string()))?;
        if path.is_file() && is_supported_path(&path) {
            resolved_paths.push(path);
        } else {
            debug!(path = %path.display(), "Skipping unsupported match");
        }
    }

    Ok(resolved_paths)
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
