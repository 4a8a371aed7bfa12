//! Consistency validator
//!
//! Gates a parsed subject table against its atlas: exact segment-set
//! equality, per-record structure-name agreement, and reconciliation of
//! voxel-count-derived volumes against reported volumes under a relative
//! tolerance. Validation is pure; it never mutates the table or the
//! atlas, and a failed subject never reaches aggregation.

use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::error::{Result, SegReaderError};
use crate::lut::Atlas;
use crate::models::SubjectStats;

/// Default relative tolerance for the volume-consistency check.
///
/// Accounts for upstream rounding of `VoxelVolume_mm3` and `Volume_mm3`
/// to fewer significant digits than the true product.
pub const DEFAULT_VOLUME_TOLERANCE: f64 = 1e-2;

/// Relative disagreement between the derived and reported volume.
///
/// The denominator is clamped to 1 so near-zero reported volumes do not
/// blow up the ratio.
#[must_use]
pub fn relative_volume_error(n_voxels: u64, voxel_volume_mm3: f64, volume_mm3: f64) -> f64 {
    let derived = n_voxels as f64 * voxel_volume_mm3;
    (derived - volume_mm3).abs() / volume_mm3.max(1.0)
}

/// Validate one subject table against its atlas.
///
/// # Errors
/// `SegmentSetMismatch` listing both missing and extra identifiers when
/// the table's `SegId` set differs from the atlas (nothing is silently
/// dropped or padded), `StructNameMismatch` naming both candidate names
/// when a record disagrees with the atlas entry for the same identifier,
/// and `VolumeConsistency` when a record's derived volume falls outside
/// the tolerance. A record with zero voxels and zero volume is always
/// consistent.
pub fn validate_subject(table: &SubjectStats, atlas: &Atlas, tolerance: f64) -> Result<()> {
    let table_ids: FxHashSet<u32> = table.seg_ids().collect();
    let atlas_ids: FxHashSet<u32> = atlas.seg_ids().collect();

    if table_ids != atlas_ids {
        let missing: Vec<u32> = atlas_ids.difference(&table_ids).copied().sorted().collect();
        let extra: Vec<u32> = table_ids.difference(&atlas_ids).copied().sorted().collect();
        return Err(SegReaderError::SegmentSetMismatch {
            subject: table.subject.clone(),
            atlas: atlas.name().to_string(),
            missing,
            extra,
        });
    }

    for record in &table.records {
        // Set equality already holds, so the lookup cannot miss.
        let declared = atlas.struct_name(record.seg_id).unwrap_or_default();
        if record.struct_name != declared {
            return Err(SegReaderError::StructNameMismatch {
                subject: table.subject.clone(),
                atlas: atlas.name().to_string(),
                seg_id: record.seg_id,
                expected: declared.to_string(),
                actual: record.struct_name.clone(),
            });
        }
    }

    let voxel_volume = table.voxel_volume_mm3();
    for record in &table.records {
        if record.n_voxels == 0 && record.volume_mm3 == 0.0 {
            continue;
        }
        let err = relative_volume_error(record.n_voxels, voxel_volume, record.volume_mm3);
        if err > tolerance {
            return Err(SegReaderError::VolumeConsistency {
                subject: table.subject.clone(),
                seg_id: record.seg_id,
                n_voxels: record.n_voxels,
                voxel_volume_mm3: voxel_volume,
                volume_mm3: record.volume_mm3,
                derived: record.n_voxels as f64 * voxel_volume,
                tolerance,
            });
        }
    }

    Ok(())
}

/// Relative tolerance for comparing voxel volumes across a cohort.
const COHORT_VOXEL_VOLUME_TOLERANCE: f64 = 1e-6;

/// Flag subjects whose `VoxelVolume_mm3` differs from the first subject's.
///
/// Differing voxel volumes may indicate inconsistent acquisition or
/// resampling across the cohort; each divergent subject is logged as a
/// warning and returned, but none is rejected.
pub fn cohort_voxel_volume_warnings(tables: &[SubjectStats]) -> Vec<(String, f64)> {
    let Some(first) = tables.first() else {
        return Vec::new();
    };
    let reference = first.voxel_volume_mm3();

    let mut divergent = Vec::new();
    for table in &tables[1..] {
        let vv = table.voxel_volume_mm3();
        if (vv - reference).abs() / reference.max(f64::MIN_POSITIVE) > COHORT_VOXEL_VOLUME_TOLERANCE
        {
            log::warn!(
                "subject {} has VoxelVolume_mm3 {} but subject {} has {}; cohort may mix acquisitions",
                table.subject,
                vv,
                first.subject,
                reference
            );
            divergent.push((table.subject.clone(), vv));
        }
    }
    divergent
}
