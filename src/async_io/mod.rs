//! Async loading of stats reports
//!
//! Cooperative-scheduling variant of the batch loader: the file reads
//! are the only suspension points, fanned out with a bounded
//! `buffer_unordered` stream. Outcome order follows completion order;
//! the aggregation engine sorts subjects deterministically either way.

use std::path::Path;

use futures::stream::{self, StreamExt};

use crate::config::SubjectReport;
use crate::error::{Result, SegReaderError};
use crate::loader::SubjectOutcome;
use crate::lut::Atlas;
use crate::models::SubjectStats;
use crate::parser;
use crate::validate;

/// Read and parse a single subject report asynchronously.
pub async fn read_report_async(subject: &str, path: &Path) -> Result<SubjectStats> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SegReaderError::io(path, e))?;
    parser::parse_report(subject, &text)
}

/// Read, parse, and validate a single subject report asynchronously.
pub async fn load_subject_report_async(
    report: &SubjectReport,
    atlas: &Atlas,
    tolerance: f64,
) -> Result<SubjectStats> {
    let table = read_report_async(&report.subject, &report.path).await?;
    validate::validate_subject(&table, atlas, tolerance)?;
    Ok(table)
}

/// Load a batch of subject reports concurrently using async IO.
///
/// Up to `num_cpus` reports are in flight at a time. Like the sync
/// loader, one rejected subject never blocks the others; every report
/// produces an outcome.
pub async fn load_reports_parallel_async(
    reports: &[SubjectReport],
    atlas: &Atlas,
    tolerance: f64,
) -> Vec<SubjectOutcome> {
    if reports.is_empty() {
        return Vec::new();
    }

    log::info!(
        "Loading {} subject report(s) for atlas {} asynchronously",
        reports.len(),
        atlas.name()
    );

    let outcomes = stream::iter(reports)
        .map(|report| async move {
            let result = load_subject_report_async(report, atlas, tolerance).await;
            SubjectOutcome {
                subject: report.subject.clone(),
                result,
            }
        })
        .buffer_unordered(num_cpus::get())
        .collect::<Vec<_>>()
        .await;

    let accepted = outcomes.iter().filter(|o| o.result.is_ok()).count();
    log::info!(
        "Accepted {accepted}/{} subject report(s) for atlas {}",
        outcomes.len(),
        atlas.name()
    );

    outcomes
}
