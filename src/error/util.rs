//! Utility functions for error handling
//!
//! File-level helpers that attach the offending path and the purpose of
//! the access to every I/O failure, so batch errors stay actionable.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, SegReaderError};

/// Safely open a file with the offending path attached on failure.
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(SegReaderError::io(
            path,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found (needed for: {purpose})"),
            ),
        ));
    }

    if !path.is_file() {
        return Err(SegReaderError::io(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path is not a file (expected a file for: {purpose})"),
            ),
        ));
    }

    fs::File::open(path).map_err(|e| SegReaderError::io(path, e))
}

/// Safely read a file to a string with the offending path attached.
///
/// Encoding errors surface as `InvalidData` I/O errors, unmodified apart
/// from the attached path.
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    match io::Read::read_to_string(&mut file, &mut content) {
        Ok(_) => Ok(content),
        Err(e) => Err(SegReaderError::io(path, e)),
    }
}

/// Check that a directory exists and is readable.
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(SegReaderError::io(
            path,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found (needed for: {purpose})"),
            ),
        ));
    }

    if !path.is_dir() {
        return Err(SegReaderError::io(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path is not a directory (expected a directory for: {purpose})"),
            ),
        ));
    }

    fs::read_dir(path)
        .map(|_| ())
        .map_err(|e| SegReaderError::io(path, e))
}
