//! Utility functions for working with stats reports

use std::path::Path;

pub mod progress;

/// Derive a subject identifier from a report file path.
///
/// Used when the configuration lists a report without declaring an
/// identifier; the file stem (`mcp.stats` -> `mcp`) is the identifier.
#[must_use]
pub fn subject_id_from_path(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
