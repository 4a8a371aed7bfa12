//! A Rust library for parsing segmentation statistics reports with schema
//! validation, cross-subject consistency checks, and group-level
//! aggregation.
//!
//! The pipeline is a linear batch flow: an atlas LUT names structures by
//! segment identifier, each subject's report is parsed into a typed table
//! and validated against the atlas, and the accepted tables are folded
//! into one deterministic subjects-by-structures matrix ready for
//! region-of-interest analysis.

pub mod aggregate;
pub mod async_io;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod lut;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod utils;
pub mod validate;

// Re-export the most common types for easier use
// Core types
pub use aggregate::{GroupTable, aggregate};
pub use config::{RejectPolicy, RunConfig, SubjectReport};
pub use error::{Result, SegReaderError};
pub use lut::{Atlas, LutEntry};
pub use models::{HeaderMeta, Measure, ReportHeader, SegmentRecord, SubjectStats};

// Pipeline stages
pub use export::{export_group_table, write_group_table};
pub use loader::{SubjectOutcome, load_reports_parallel, load_subject_report};
pub use parser::{parse_report, read_report};
pub use pipeline::{RunSummary, run, run_and_export};
pub use validate::{DEFAULT_VOLUME_TOLERANCE, cohort_voxel_volume_warnings, validate_subject};

// Async functionality
pub use async_io::{load_reports_parallel_async, read_report_async};
