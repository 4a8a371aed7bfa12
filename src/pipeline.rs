//! Pipeline runner
//!
//! The explicit entry point for one aggregation run: load the atlas, fan
//! the per-subject parse+validate stage over a bounded worker pool, join
//! at the barrier, apply the reject policy, and fold the accepted tables
//! into a group table. Configuration comes in as a value; nothing is
//! discovered from the environment.

use std::path::PathBuf;

use crate::aggregate::{self, GroupTable};
use crate::config::{RejectPolicy, RunConfig};
use crate::error::{Result, SegReaderError};
use crate::export;
use crate::loader;
use crate::lut::Atlas;
use crate::validate;

/// Everything a caller may want to report after a run.
#[derive(Debug)]
pub struct RunSummary {
    /// The aggregated group table
    pub table: GroupTable,
    /// Subjects whose tables were folded in, ascending
    pub accepted: Vec<String>,
    /// Rejected subjects with their errors (empty under strict success)
    pub rejected: Vec<(String, SegReaderError)>,
    /// Subjects whose voxel volume diverges from the cohort's first
    pub divergent_voxel_volumes: Vec<(String, f64)>,
}

/// Run the full ingestion-validation-aggregation pipeline.
///
/// Parse and validation errors are collected per subject and resolved at
/// the barrier according to the configured policy; I/O and internal
/// invariant errors abort the run immediately regardless of policy.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let atlas = Atlas::load(config.atlas_name.as_str(), &config.lut_path)?;
    log::info!(
        "Atlas {} declares {} structures",
        atlas.name(),
        atlas.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads())
        .build()
        .map_err(|e| SegReaderError::Internal(format!("failed to build worker pool: {e}")))?;

    let outcomes = pool.install(|| {
        loader::load_reports_parallel(
            &config.subject_reports,
            &atlas,
            config.volume_tolerance,
            true,
        )
    });

    // Barrier: every subject has reached a terminal state.
    let mut accepted_tables = Vec::new();
    let mut rejected = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(table) => accepted_tables.push(table),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => rejected.push((outcome.subject, e)),
        }
    }

    if config.policy == RejectPolicy::Strict && !rejected.is_empty() {
        return Err(SegReaderError::RejectedSubjects {
            rejected: rejected
                .into_iter()
                .map(|(subject, e)| (subject, Box::new(e)))
                .collect(),
        });
    }
    for (subject, e) in &rejected {
        log::warn!("excluding subject {subject}: {e}");
    }
    if accepted_tables.is_empty() {
        log::warn!("no subject report accepted for atlas {}", atlas.name());
    }

    let divergent_voxel_volumes = validate::cohort_voxel_volume_warnings(&accepted_tables);

    let table = aggregate::aggregate(&atlas, &accepted_tables, config.measure)?;

    Ok(RunSummary {
        accepted: table.subjects().to_vec(),
        table,
        rejected,
        divergent_voxel_volumes,
    })
}

/// Run the pipeline and write the group table to the configured path.
///
/// Returns the summary and the path written.
pub fn run_and_export(config: &RunConfig) -> Result<(RunSummary, PathBuf)> {
    let summary = run(config)?;
    let path = config.effective_output_path();
    export::export_group_table(&summary.table, &path)?;
    Ok((summary, path))
}
