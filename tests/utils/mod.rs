//! Shared fixtures for the integration tests
//!
//! Synthesizes an atlas LUT and per-subject stats reports that mirror
//! the Harvard-Oxford layout: 110 structures with identifiers 1..=110.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of structures in the synthetic atlas.
pub const N_STRUCTURES: u32 = 110;

/// Canonical structure name for a segment identifier.
pub fn structure_name(seg_id: u32) -> String {
    match seg_id {
        1 => "L-Thalamus".to_string(),
        54 => "L-Supracalcarine-ctx".to_string(),
        _ => format!("Structure-{seg_id:03}"),
    }
}

/// LUT text with identifiers 1..=110 and deterministic filler colors.
pub fn atlas_lut_text() -> String {
    let mut text = String::from("# synthetic lookup table\n");
    for id in 1..=N_STRUCTURES {
        let (r, g, b) = ((id * 37) % 256, (id * 91) % 256, (id * 53) % 256);
        text.push_str(&format!("{id} {} {r} {g} {b} 0\n", structure_name(id)));
    }
    text
}

/// Deterministic per-subject voxel counts for filler rows.
pub fn default_n_voxels(subject: &str, seg_id: u32) -> u64 {
    let s: u64 = subject.bytes().map(u64::from).sum();
    (s * 7 + u64::from(seg_id) * 13) % 5000 + 1
}

/// A complete, internally consistent report for identifiers 1..=110.
///
/// `n_voxels` chooses the voxel count per structure; every reported
/// volume is the exact voxel-count product.
pub fn full_report(subject: &str, voxel_volume: f64, n_voxels: impl Fn(u32) -> u64) -> String {
    let mut text = String::new();
    text.push_str(&format!("# Title segmentation statistics for {subject}\n"));
    text.push_str(&format!("# VoxelVolume_mm3 {voxel_volume}\n"));
    text.push_str(&format!("# NRows {N_STRUCTURES}\n"));
    text.push_str("# NTableCols 5\n");
    text.push_str("# ColHeaders Index SegId NVoxels Volume_mm3 StructName\n");
    for id in 1..=N_STRUCTURES {
        let n = n_voxels(id);
        let volume = n as f64 * voxel_volume;
        text.push_str(&format!(
            "{} {id} {n} {volume:.1} {}\n",
            id,
            structure_name(id)
        ));
    }
    text
}

/// Report for subject `mcp`: structure 1 (L-Thalamus) holds 1391 voxels
/// of 8 mm^3, so its volume is exactly 11128.0.
pub fn mcp_report() -> String {
    full_report("mcp", 8.0, |id| {
        if id == 1 { 1391 } else { default_n_voxels("mcp", id) }
    })
}

/// Report for subject `ba3` against the 25%-threshold atlas.
pub fn ba3_report_25() -> String {
    full_report("ba3", 8.0, |id| default_n_voxels("ba3", id))
}

/// Report for subject `ba3` against the 50%-threshold atlas: structure
/// 54 (L-Supracalcarine-ctx) is empty.
pub fn ba3_report_50() -> String {
    full_report("ba3", 8.0, |id| {
        if id == 54 { 0 } else { default_n_voxels("ba3", id) }
    })
}

static SCRATCH_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "seg-reader-test-{name}-{}-{}",
        std::process::id(),
        SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
