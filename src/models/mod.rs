//! Common domain type definitions
//!
//! This module contains the record, header, and measure types shared by
//! the parser, validator, and aggregation engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The per-structure quantity aggregated into a group table.
///
/// There is no default; the configuration collaborator must choose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Count of voxels assigned to a structure
    NVoxels,
    /// Physical volume in cubic millimeters
    VolumeMm3,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NVoxels => write!(f, "NVoxels"),
            Self::VolumeMm3 => write!(f, "Volume_mm3"),
        }
    }
}

/// One row of a subject's segmentation statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    /// 1-based row index; contiguous and ascending within a report
    pub index: u32,
    /// Segment identifier, unique within a report
    pub seg_id: u32,
    /// Voxel count for the structure
    pub n_voxels: u64,
    /// Reported physical volume
    pub volume_mm3: f64,
    /// Structure name as reported by the segmentation tool
    pub struct_name: String,
}

impl SegmentRecord {
    /// The chosen measure for this record, as a float cell value.
    #[must_use]
    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::NVoxels => self.n_voxels as f64,
            Measure::VolumeMm3 => self.volume_mm3,
        }
    }
}

/// Order-preserving header metadata where duplicate keys overwrite.
///
/// The key order is the file's order of first appearance; it carries no
/// semantics beyond faithful round-tripping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMeta {
    entries: Vec<(String, String)>,
}

impl HeaderMeta {
    /// Create an empty metadata map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a key/value pair. An existing key keeps its position and
    /// has its value overwritten.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed header of a stats report.
///
/// The required fields are validated at parse time; everything else the
/// header declares is preserved in `meta`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    /// Physical volume of one voxel for this subject's acquisition
    pub voxel_volume_mm3: f64,
    /// Declared number of data rows
    pub n_rows: usize,
    /// Declared number of table columns
    pub n_table_cols: usize,
    /// Declared column names
    pub col_headers: Vec<String>,
    /// Remaining header metadata, order-preserving
    pub meta: HeaderMeta,
}

/// One subject's parsed and typed segmentation statistics report.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectStats {
    /// Subject identifier (from configuration or the report filename)
    pub subject: String,
    /// Typed header block
    pub header: ReportHeader,
    /// Data rows in file order
    pub records: Vec<SegmentRecord>,
}

impl SubjectStats {
    /// Per-voxel volume for this subject.
    #[must_use]
    pub fn voxel_volume_mm3(&self) -> f64 {
        self.header.voxel_volume_mm3
    }

    /// Segment identifiers in file order.
    pub fn seg_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|r| r.seg_id)
    }

    /// Find the record for a segment identifier.
    #[must_use]
    pub fn record(&self, seg_id: u32) -> Option<&SegmentRecord> {
        self.records.iter().find(|r| r.seg_id == seg_id)
    }
}
