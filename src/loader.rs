//! Stats report loading utilities
//!
//! File-level wrappers around the parser plus the parallel batch stage:
//! every subject report is parsed and validated independently on a rayon
//! worker pool, and per-subject outcomes are collected without letting
//! one malformed file abort the batch. The caller decides at the barrier
//! what a rejection means.

use rayon::prelude::*;

use crate::config::SubjectReport;
use crate::error::Result;
use crate::lut::Atlas;
use crate::models::SubjectStats;
use crate::parser;
use crate::utils::progress;
use crate::validate;

/// Terminal state of one subject in a batch run.
#[derive(Debug)]
pub struct SubjectOutcome {
    /// Subject identifier
    pub subject: String,
    /// The validated table, or the typed error that rejected it
    pub result: Result<SubjectStats>,
}

/// Read, parse, and validate a single subject report.
pub fn load_subject_report(
    report: &SubjectReport,
    atlas: &Atlas,
    tolerance: f64,
) -> Result<SubjectStats> {
    let table = parser::read_report(&report.subject, &report.path)?;
    validate::validate_subject(&table, atlas, tolerance)?;
    Ok(table)
}

/// Load a batch of subject reports in parallel.
///
/// Parsing and validation are independent, read-only operations over
/// disjoint files; the only shared state is the read-only atlas. The
/// returned outcomes are in input order, one per report, each either an
/// accepted table or the error that rejected the subject.
pub fn load_reports_parallel(
    reports: &[SubjectReport],
    atlas: &Atlas,
    tolerance: f64,
    show_progress: bool,
) -> Vec<SubjectOutcome> {
    if reports.is_empty() {
        return Vec::new();
    }

    log::info!(
        "Loading {} subject report(s) for atlas {} on {} worker thread(s)",
        reports.len(),
        atlas.name(),
        rayon::current_num_threads()
    );

    let bar = show_progress.then(|| {
        progress::create_batch_progress_bar(reports.len() as u64, Some("Parsing subject reports"))
    });

    let outcomes: Vec<SubjectOutcome> = reports
        .par_iter()
        .map(|report| {
            let result = load_subject_report(report, atlas, tolerance);
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            SubjectOutcome {
                subject: report.subject.clone(),
                result,
            }
        })
        .collect();

    if let Some(bar) = &bar {
        progress::finish_progress_bar(bar, Some("Subject reports parsed"));
    }

    let accepted = outcomes.iter().filter(|o| o.result.is_ok()).count();
    log::info!(
        "Accepted {accepted}/{} subject report(s) for atlas {}",
        outcomes.len(),
        atlas.name()
    );

    outcomes
}
