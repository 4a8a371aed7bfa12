//! Tests for the consistency validator

use seg_reader::lut::Atlas;
use seg_reader::parser::parse_report;
use seg_reader::validate::{
    cohort_voxel_volume_warnings, validate_subject, DEFAULT_VOLUME_TOLERANCE,
};
use seg_reader::SegReaderError;

use crate::utils::{
    atlas_lut_text, ba3_report_25, full_report, mcp_report, structure_name, N_STRUCTURES,
};

fn atlas() -> Atlas {
    Atlas::from_lut_text("HarvardOxford-25", &atlas_lut_text()).unwrap()
}

#[test]
fn a_complete_consistent_report_is_accepted() {
    let table = parse_report("mcp", &mcp_report()).unwrap();
    validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE).expect("accepted");
}

#[test]
fn missing_structure_is_named_and_rejected() {
    // Structure 42 is absent; indices stay contiguous so only the
    // validator can catch this.
    let mut text = String::new();
    text.push_str("# VoxelVolume_mm3 8.0\n");
    text.push_str(&format!("# NRows {}\n", N_STRUCTURES - 1));
    text.push_str("# NTableCols 5\n");
    text.push_str("# ColHeaders Index SegId NVoxels Volume_mm3 StructName\n");
    let mut index = 0;
    for id in (1..=N_STRUCTURES).filter(|&id| id != 42) {
        index += 1;
        text.push_str(&format!("{index} {id} 2 16.0 {}\n", structure_name(id)));
    }

    let table = parse_report("s1", &text).unwrap();
    match validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE).unwrap_err() {
        SegReaderError::SegmentSetMismatch { missing, extra, .. } => {
            assert_eq!(missing, vec![42]);
            assert!(extra.is_empty());
        }
        other => panic!("expected SegmentSetMismatch, got {other}"),
    }
}

#[test]
fn extra_structure_is_named_and_rejected() {
    let mut text = String::new();
    text.push_str("# VoxelVolume_mm3 8.0\n");
    text.push_str(&format!("# NRows {}\n", N_STRUCTURES + 1));
    text.push_str("# NTableCols 5\n");
    text.push_str("# ColHeaders Index SegId NVoxels Volume_mm3 StructName\n");
    for id in 1..=N_STRUCTURES + 1 {
        text.push_str(&format!("{id} {id} 2 16.0 {}\n", structure_name(id)));
    }

    let table = parse_report("s1", &text).unwrap();
    match validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE).unwrap_err() {
        SegReaderError::SegmentSetMismatch { missing, extra, .. } => {
            assert!(missing.is_empty());
            assert_eq!(extra, vec![111]);
        }
        other => panic!("expected SegmentSetMismatch, got {other}"),
    }
}

#[test]
fn stale_structure_name_is_rejected_with_both_names() {
    let text = mcp_report().replace("L-Thalamus", "Left-Thalamus-Proper");
    let table = parse_report("mcp", &text).unwrap();
    match validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE).unwrap_err() {
        SegReaderError::StructNameMismatch {
            seg_id,
            expected,
            actual,
            ..
        } => {
            assert_eq!(seg_id, 1);
            assert_eq!(expected, "L-Thalamus");
            assert_eq!(actual, "Left-Thalamus-Proper");
        }
        other => panic!("expected StructNameMismatch, got {other}"),
    }
}

#[test]
fn inconsistent_volume_is_rejected() {
    // SegId 1 claims 11128.0 mm^3 but holds 1391 voxels of 8 mm^3 plus
    // a 5% inflation.
    let text = mcp_report().replace(" 1391 11128.0 ", " 1391 11684.4 ");
    let table = parse_report("mcp", &text).unwrap();
    match validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE).unwrap_err() {
        SegReaderError::VolumeConsistency {
            seg_id, n_voxels, ..
        } => {
            assert_eq!(seg_id, 1);
            assert_eq!(n_voxels, 1391);
        }
        other => panic!("expected VolumeConsistency, got {other}"),
    }
}

#[test]
fn rounding_within_tolerance_is_accepted() {
    // 0.5% off: inside the default 1% tolerance, outside a 0.1% one.
    let text = mcp_report().replace(" 1391 11128.0 ", " 1391 11183.6 ");
    let table = parse_report("mcp", &text).unwrap();
    validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE).expect("within tolerance");
    assert!(matches!(
        validate_subject(&table, &atlas(), 1e-3).unwrap_err(),
        SegReaderError::VolumeConsistency { .. }
    ));
}

#[test]
fn empty_structure_with_zero_volume_is_always_consistent() {
    let text = full_report("ba3", 8.0, |id| if id == 54 { 0 } else { 3 });
    let table = parse_report("ba3", &text).unwrap();
    validate_subject(&table, &atlas(), 0.0).expect("zero/zero is exempt");
}

#[test]
fn validation_does_not_mutate_the_table() {
    let table = parse_report("mcp", &mcp_report()).unwrap();
    let before = table.clone();
    let _ = validate_subject(&table, &atlas(), DEFAULT_VOLUME_TOLERANCE);
    assert_eq!(table, before);
}

#[test]
fn divergent_voxel_volumes_are_flagged_not_rejected() {
    let a = parse_report("a", &full_report("a", 8.0, |_| 2)).unwrap();
    let b = parse_report("b", &full_report("b", 2.0, |_| 2)).unwrap();
    let c = parse_report("c", &full_report("c", 8.0, |_| 2)).unwrap();

    let divergent = cohort_voxel_volume_warnings(&[a, b, c]);
    assert_eq!(divergent, vec![("b".to_string(), 2.0)]);
}

#[test]
fn mcp_and_ba3_reports_are_both_accepted() {
    let atlas = atlas();
    for (subject, text) in [("mcp", mcp_report()), ("ba3", ba3_report_25())] {
        let table = parse_report(subject, &text).unwrap();
        validate_subject(&table, &atlas, DEFAULT_VOLUME_TOLERANCE)
            .unwrap_or_else(|e| panic!("{subject} rejected: {e}"));
    }
}
