//! Run configuration for the segstats pipeline.
//!
//! The pipeline entry point takes a [`RunConfig`] explicitly; nothing in
//! the core discovers configuration from the working directory. The
//! marker-file convention lives behind the CLI's `--init` mode only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegReaderError};
use crate::models::Measure;
use crate::validate::DEFAULT_VOLUME_TOLERANCE;

/// What a rejected subject does to the rest of the run.
///
/// Strict is the default: a silently-shrunk cohort is a worse failure
/// mode than a loud one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectPolicy {
    /// Any rejected subject fails the whole run
    #[default]
    Strict,
    /// Rejected subjects are excluded and reported; the run continues
    Lenient,
}

/// One subject's report location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectReport {
    /// Subject identifier
    pub subject: String,
    /// Path to the subject's stats report
    pub path: PathBuf,
}

/// Configuration for one aggregation run.
///
/// `measure` is required and has no default; a config without it does
/// not deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Atlas name
    pub atlas_name: String,
    /// Location of the atlas LUT
    pub lut_path: PathBuf,
    /// Subject reports, in declaration order
    pub subject_reports: Vec<SubjectReport>,
    /// Measure aggregated into the group table
    pub measure: Measure,
    /// Reject policy, strict by default
    #[serde(default)]
    pub policy: RejectPolicy,
    /// Relative tolerance for the volume-consistency check
    #[serde(default = "default_volume_tolerance")]
    pub volume_tolerance: f64,
    /// Worker pool size; bounded by available cores when unset
    #[serde(default)]
    pub threads: Option<usize>,
    /// Output location; derived from atlas and measure when unset
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

const fn default_volume_tolerance() -> f64 {
    DEFAULT_VOLUME_TOLERANCE
}

impl RunConfig {
    /// Load a run configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = crate::error::util::safe_read_to_string(path, "loading run config")?;
        serde_json::from_str(&text).map_err(|e| SegReaderError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Effective worker pool size for the parallel subject stage.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.threads.map_or_else(num_cpus::get, |n| n.max(1))
    }

    /// Output path to use when none is configured.
    #[must_use]
    pub fn effective_output_path(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("{}_{}.txt", self.atlas_name, self.measure))
        })
    }
}

/// Name of the marker file the CLI `--init` mode writes.
pub const MARKER_FILE: &str = ".segreaderfile";

/// Default filename of the written config template.
pub const CONFIG_BASE_FILE: &str = "segstats_config.json";

/// Write a config template and directory marker for the CLI.
///
/// The template always overwrites; the marker, which records which
/// config file applies to the directory, is only replaced when `force`
/// is set. Returns the template path.
pub fn write_config_base(dir: &Path, force: bool) -> Result<PathBuf> {
    crate::error::util::validate_directory(dir, "writing config skeleton")?;

    let template = RunConfig {
        atlas_name: "my-atlas".to_string(),
        lut_path: PathBuf::from("path/to/atlas-lut.txt"),
        subject_reports: vec![SubjectReport {
            subject: "subj01".to_string(),
            path: PathBuf::from("path/to/subj01.stats"),
        }],
        measure: Measure::VolumeMm3,
        policy: RejectPolicy::default(),
        volume_tolerance: DEFAULT_VOLUME_TOLERANCE,
        threads: None,
        output_path: None,
    };
    let body = serde_json::to_string_pretty(&template).map_err(|e| SegReaderError::Config {
        path: dir.join(CONFIG_BASE_FILE),
        reason: e.to_string(),
    })?;

    let config_path = dir.join(CONFIG_BASE_FILE);
    std::fs::write(&config_path, body).map_err(|e| SegReaderError::io(&config_path, e))?;
    log::info!("Wrote config template to {}", config_path.display());

    let marker_path = dir.join(MARKER_FILE);
    if marker_path.exists() && !force {
        log::info!(
            "Marker {} already exists; leaving it in place",
            marker_path.display()
        );
    } else {
        std::fs::write(&marker_path, format!("{CONFIG_BASE_FILE}\n"))
            .map_err(|e| SegReaderError::io(&marker_path, e))?;
        log::info!("Wrote marker {}", marker_path.display());
    }

    Ok(config_path)
}
