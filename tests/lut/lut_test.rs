//! Tests for atlas LUT loading and ordering

use seg_reader::lut::Atlas;
use seg_reader::SegReaderError;

use crate::utils::{atlas_lut_text, structure_name, N_STRUCTURES};

#[test]
fn loads_full_lut_in_file_order() {
    let atlas = Atlas::from_lut_text("HarvardOxford-25", &atlas_lut_text()).expect("valid LUT");

    assert_eq!(atlas.len(), N_STRUCTURES as usize);
    let ids: Vec<u32> = atlas.seg_ids().collect();
    assert_eq!(ids, (1..=N_STRUCTURES).collect::<Vec<_>>());
    assert_eq!(atlas.struct_name(1), Some("L-Thalamus"));
    assert_eq!(atlas.struct_name(54), Some("L-Supracalcarine-ctx"));
    assert_eq!(atlas.struct_name(2), Some(structure_name(2).as_str()));
    assert!(atlas.struct_name(111).is_none());
}

#[test]
fn trailing_color_channels_are_ignored() {
    let with_colors = Atlas::from_lut_text("a", "3 Left-X 10 20 30 0\n").unwrap();
    let without_colors = Atlas::from_lut_text("a", "3 Left-X\n").unwrap();
    assert_eq!(with_colors.entries(), without_colors.entries());
}

#[test]
fn non_canonical_row_order_is_preserved() {
    let atlas = Atlas::from_lut_text("a", "9 C\n1 A\n5 B\n").unwrap();
    let ids: Vec<u32> = atlas.seg_ids().collect();
    assert_eq!(ids, vec![9, 1, 5]);
}

#[test]
fn line_without_name_is_malformed() {
    match Atlas::from_lut_text("a", "1 A\n7\n").unwrap_err() {
        SegReaderError::MalformedLut { line, .. } => assert_eq!(line, 2),
        other => panic!("expected MalformedLut, got {other}"),
    }
}

#[test]
fn unparsable_id_is_malformed() {
    assert!(matches!(
        Atlas::from_lut_text("a", "one A\n").unwrap_err(),
        SegReaderError::MalformedLut { line: 1, .. }
    ));
}

#[test]
fn duplicate_id_reports_both_lines() {
    match Atlas::from_lut_text("a", "1 A\n2 B\n2 C\n").unwrap_err() {
        SegReaderError::DuplicateSegId {
            seg_id,
            first_line,
            second_line,
        } => {
            assert_eq!(seg_id, 2);
            assert_eq!((first_line, second_line), (2, 3));
        }
        other => panic!("expected DuplicateSegId, got {other}"),
    }
}

#[test]
fn written_lut_parses_back_to_the_same_atlas() {
    let atlas = Atlas::from_lut_text("a", &atlas_lut_text()).unwrap();

    let mut out = Vec::new();
    atlas.write_lut(&mut out).unwrap();
    let reread = Atlas::from_lut_text("a", &String::from_utf8(out).unwrap()).unwrap();

    assert_eq!(atlas.entries(), reread.entries());
}
