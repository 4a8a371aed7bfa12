//! Error handling for the segstats pipeline.

use std::io;
use std::path::{Path, PathBuf};

pub mod util;

/// Specialized error type for the segstats pipeline.
///
/// Parse- and validation-level variants describe bad input data and carry
/// the subject, line, or identifier needed to act on them. `Io`, `Config`,
/// and `Internal` are fatal to a run regardless of the reject policy.
#[derive(Debug, thiserror::Error)]
pub enum SegReaderError {
    /// Error opening or reading a file
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A LUT line that cannot be split into `SegId StructName [R G B A]`
    #[error("malformed LUT line {line}: {reason}")]
    MalformedLut { line: usize, reason: String },

    /// The same `SegId` declared twice in one LUT
    #[error("duplicate SegId {seg_id} in LUT (lines {first_line} and {second_line})")]
    DuplicateSegId {
        seg_id: u32,
        first_line: usize,
        second_line: usize,
    },

    /// A required header key absent from a stats report
    #[error("subject {subject}: missing required header field `{field}`")]
    MissingHeaderField { subject: String, field: &'static str },

    /// A data row that cannot be split into four numeric fields and a name
    #[error("subject {subject}, line {line}: malformed row: {reason}")]
    MalformedRow {
        subject: String,
        line: usize,
        reason: String,
    },

    /// A token that fails integer/float conversion
    #[error("subject {subject}, line {line}, column {column}: cannot parse `{token}` as {expected}")]
    NumericParse {
        subject: String,
        line: usize,
        column: &'static str,
        token: String,
        expected: &'static str,
    },

    /// Declared `NRows` does not match the number of parsed data rows
    #[error("subject {subject}: header declares {declared} data rows but the table has {actual}")]
    RowCountMismatch {
        subject: String,
        declared: usize,
        actual: usize,
    },

    /// The report's `SegId` set differs from the atlas
    #[error(
        "subject {subject}: segment set differs from atlas {atlas}: missing {missing:?}, extra {extra:?}"
    )]
    SegmentSetMismatch {
        subject: String,
        atlas: String,
        missing: Vec<u32>,
        extra: Vec<u32>,
    },

    /// A structure name that contradicts the atlas entry for the same `SegId`
    #[error(
        "subject {subject}: SegId {seg_id} is named `{actual}` but atlas {atlas} declares `{expected}`"
    )]
    StructNameMismatch {
        subject: String,
        atlas: String,
        seg_id: u32,
        expected: String,
        actual: String,
    },

    /// `NVoxels * VoxelVolume_mm3` disagrees with the reported volume
    #[error(
        "subject {subject}: SegId {seg_id}: {n_voxels} voxels x {voxel_volume_mm3} mm^3/voxel = {derived} disagrees with reported volume {volume_mm3} (relative tolerance {tolerance})"
    )]
    VolumeConsistency {
        subject: String,
        seg_id: u32,
        n_voxels: u64,
        voxel_volume_mm3: f64,
        volume_mm3: f64,
        derived: f64,
        tolerance: f64,
    },

    /// A table reached aggregation with a `SegId` set unlike the first one
    #[error(
        "subject {subject}: segment set differs from the first aggregated table: missing {missing:?}, extra {extra:?}"
    )]
    HeterogeneousAtlas {
        subject: String,
        missing: Vec<u32>,
        extra: Vec<u32>,
    },

    /// Two tables claim the same subject identifier
    #[error("duplicate subject identifier `{subject}` in aggregation input")]
    DuplicateSubject { subject: String },

    /// One or more subjects rejected under the strict policy
    #[error("{}", format_rejected(.rejected))]
    RejectedSubjects {
        /// Each rejected subject with the error that rejected it
        rejected: Vec<(String, Box<SegReaderError>)>,
    },

    /// Invariant violation that indicates a bug, not bad input
    #[error("internal invariant violation: {0}")]
    Internal(String),

    /// Configuration that cannot be read or deserialized
    #[error("config error at {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

fn format_rejected(rejected: &[(String, Box<SegReaderError>)]) -> String {
    let subjects: Vec<&str> = rejected.iter().map(|(s, _)| s.as_str()).collect();
    format!(
        "{} subject(s) rejected under strict policy: {}",
        rejected.len(),
        subjects.join(", ")
    )
}

impl SegReaderError {
    /// Attach a path to an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole run regardless of the
    /// reject policy. User-input errors (parse, validation, aggregation)
    /// are not fatal; I/O, config, and internal errors are.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Config { .. } | Self::Internal(_)
        )
    }

    /// The path this error points at, if it carries one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type for segstats pipeline operations
pub type Result<T> = std::result::Result<T, SegReaderError>;
