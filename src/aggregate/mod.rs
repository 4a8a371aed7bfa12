//! Aggregation engine
//!
//! Folds validated per-subject tables into one dense group matrix per
//! atlas. Row order is the ascending lexicographic order of subject
//! identifiers and column order is the atlas's canonical LUT order, so
//! the output is deterministic regardless of file-discovery order.

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, SegReaderError};
use crate::lut::{Atlas, LutEntry};
use crate::models::{Measure, SegmentRecord, SubjectStats};

/// The subjects-by-structures matrix produced for one atlas.
///
/// Owns its matrix exclusively; not mutated after the engine finishes.
#[derive(Debug, Clone)]
pub struct GroupTable {
    atlas_name: String,
    measure: Measure,
    subjects: Vec<String>,
    columns: Vec<LutEntry>,
    values: Vec<f64>,
}

impl GroupTable {
    /// Name of the atlas the table was built against.
    #[must_use]
    pub fn atlas_name(&self) -> &str {
        &self.atlas_name
    }

    /// The measure held in every cell.
    #[must_use]
    pub const fn measure(&self) -> Measure {
        self.measure
    }

    /// Subject identifiers in ascending order, one per row.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Column structures in atlas order.
    #[must_use]
    pub fn columns(&self) -> &[LutEntry] {
        &self.columns
    }

    /// Number of subject rows.
    #[must_use]
    pub fn n_subjects(&self) -> usize {
        self.subjects.len()
    }

    /// Number of structure columns.
    #[must_use]
    pub fn n_structures(&self) -> usize {
        self.columns.len()
    }

    /// One subject's row of cell values.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let w = self.columns.len();
        &self.values[row * w..(row + 1) * w]
    }

    /// Cell value for a subject and segment identifier.
    #[must_use]
    pub fn value(&self, subject: &str, seg_id: u32) -> Option<f64> {
        let row = self.subjects.iter().position(|s| s == subject)?;
        let col = self.columns.iter().position(|c| c.seg_id == seg_id)?;
        Some(self.row(row)[col])
    }
}

/// Merge validated subject tables into one group table.
///
/// All inputs must already have passed the validator. The engine still
/// re-asserts identical `SegId` sets across tables as a defensive check;
/// a lookup miss past that point is an internal invariant violation, not
/// a user error.
///
/// # Errors
/// `DuplicateSubject` if two tables claim the same identifier,
/// `HeterogeneousAtlas` if a table's segment set differs from the first
/// table's, `Internal` if a cell lookup fails after the set check.
pub fn aggregate(atlas: &Atlas, tables: &[SubjectStats], measure: Measure) -> Result<GroupTable> {
    let mut seen = FxHashSet::default();
    for table in tables {
        if !seen.insert(table.subject.as_str()) {
            return Err(SegReaderError::DuplicateSubject {
                subject: table.subject.clone(),
            });
        }
    }

    if let Some(first) = tables.first() {
        let reference: FxHashSet<u32> = first.seg_ids().collect();
        for table in &tables[1..] {
            let ids: FxHashSet<u32> = table.seg_ids().collect();
            if ids != reference {
                let missing = reference.difference(&ids).copied().sorted().collect();
                let extra = ids.difference(&reference).copied().sorted().collect();
                return Err(SegReaderError::HeterogeneousAtlas {
                    subject: table.subject.clone(),
                    missing,
                    extra,
                });
            }
        }
    }

    let ordered: Vec<&SubjectStats> = tables
        .iter()
        .sorted_by(|a, b| a.subject.cmp(&b.subject))
        .collect();

    let columns: Vec<LutEntry> = atlas.entries().to_vec();
    let mut values = Vec::with_capacity(ordered.len() * columns.len());

    for table in &ordered {
        let by_id: FxHashMap<u32, &SegmentRecord> =
            table.records.iter().map(|r| (r.seg_id, r)).collect();
        for column in &columns {
            let record = by_id.get(&column.seg_id).ok_or_else(|| {
                SegReaderError::Internal(format!(
                    "subject {} has no record for SegId {} after validation",
                    table.subject, column.seg_id
                ))
            })?;
            values.push(record.measure(measure));
        }
    }

    log::debug!(
        "Aggregated {} subject(s) x {} structure(s) for atlas {}",
        ordered.len(),
        columns.len(),
        atlas.name()
    );

    Ok(GroupTable {
        atlas_name: atlas.name().to_string(),
        measure,
        subjects: ordered.iter().map(|t| t.subject.clone()).collect(),
        columns,
        values,
    })
}
