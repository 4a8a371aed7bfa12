//! Stats report parser
//!
//! Parses one subject's segmentation statistics report: a block of
//! `#`-prefixed `Key Value...` header lines and a whitespace-delimited
//! five-column data table (`Index SegId NVoxels Volume_mm3 StructName`).
//!
//! The header is reduced to a typed [`ReportHeader`] at parse time
//! instead of an open-ended string map; the required keys are
//! `VoxelVolume_mm3`, `NRows`, `NTableCols`, and `ColHeaders`. Structure
//! names may contain internal whitespace or punctuation: the first four
//! tokens of a data row are always the numeric fields and everything
//! after them is the name.

use smallvec::SmallVec;

use crate::error::util::safe_read_to_string;
use crate::error::{Result, SegReaderError};
use crate::models::{HeaderMeta, ReportHeader, SegmentRecord, SubjectStats};
use rustc_hash::FxHashMap;
use std::path::Path;

/// The column names a well-formed report declares.
pub const EXPECTED_COL_HEADERS: [&str; 5] =
    ["Index", "SegId", "NVoxels", "Volume_mm3", "StructName"];

/// Parse a report file for a subject.
pub fn read_report(subject: &str, path: &Path) -> Result<SubjectStats> {
    let text = safe_read_to_string(path, "reading stats report")?;
    parse_report(subject, &text)
}

/// Parse one subject's stats report text into a typed table.
///
/// # Errors
/// `MissingHeaderField` if a required header key is absent,
/// `MalformedRow` for rows that cannot be split into four numeric fields
/// and a name (or that break `Index`/`SegId` invariants), `NumericParse`
/// for tokens that fail typed conversion, and `RowCountMismatch` when
/// the declared `NRows` disagrees with the table.
pub fn parse_report(subject: &str, text: &str) -> Result<SubjectStats> {
    let mut meta = HeaderMeta::new();
    let mut voxel_volume_mm3: Option<f64> = None;
    let mut n_rows: Option<usize> = None;
    let mut n_table_cols: Option<usize> = None;
    let mut col_headers: Option<Vec<String>> = None;

    let mut records: Vec<SegmentRecord> = Vec::new();
    let mut seen_ids: FxHashMap<u32, usize> = FxHashMap::default();

    for (lineno, raw) in text.lines().enumerate() {
        let line = lineno + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            let mut tokens = rest.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };
            let value = tokens.collect::<Vec<_>>().join(" ");
            match key {
                "VoxelVolume_mm3" => {
                    voxel_volume_mm3 =
                        Some(parse_float(subject, line, "VoxelVolume_mm3", &value)?);
                }
                "NRows" => {
                    n_rows = Some(parse_int(subject, line, "NRows", &value)?);
                }
                "NTableCols" => {
                    n_table_cols = Some(parse_int(subject, line, "NTableCols", &value)?);
                }
                "ColHeaders" => {
                    col_headers =
                        Some(value.split_whitespace().map(str::to_string).collect());
                }
                _ => {}
            }
            meta.insert(key, value);
            continue;
        }

        let record = parse_data_row(subject, line, trimmed)?;

        if let Some(&first) = seen_ids.get(&record.seg_id) {
            return Err(SegReaderError::MalformedRow {
                subject: subject.to_string(),
                line,
                reason: format!(
                    "duplicate SegId {} (first seen at line {first})",
                    record.seg_id
                ),
            });
        }
        seen_ids.insert(record.seg_id, line);

        let expected_index = records.len() as u32 + 1;
        if record.index != expected_index {
            return Err(SegReaderError::MalformedRow {
                subject: subject.to_string(),
                line,
                reason: format!("Index {} out of sequence (expected {expected_index})", record.index),
            });
        }

        records.push(record);
    }

    let header = ReportHeader {
        voxel_volume_mm3: voxel_volume_mm3.ok_or(SegReaderError::MissingHeaderField {
            subject: subject.to_string(),
            field: "VoxelVolume_mm3",
        })?,
        n_rows: n_rows.ok_or(SegReaderError::MissingHeaderField {
            subject: subject.to_string(),
            field: "NRows",
        })?,
        n_table_cols: n_table_cols.ok_or(SegReaderError::MissingHeaderField {
            subject: subject.to_string(),
            field: "NTableCols",
        })?,
        col_headers: col_headers.ok_or(SegReaderError::MissingHeaderField {
            subject: subject.to_string(),
            field: "ColHeaders",
        })?,
        meta,
    };

    sanity_check_header(subject, &header);

    if header.n_rows != records.len() {
        return Err(SegReaderError::RowCountMismatch {
            subject: subject.to_string(),
            declared: header.n_rows,
            actual: records.len(),
        });
    }

    Ok(SubjectStats {
        subject: subject.to_string(),
        header,
        records,
    })
}

/// Split one data line into four numeric fields and a trailing name.
fn parse_data_row(subject: &str, line: usize, text: &str) -> Result<SegmentRecord> {
    let tokens: SmallVec<[&str; 8]> = text.split_whitespace().collect();

    if tokens.len() < 5 {
        let reason = if tokens.len() < 4 {
            format!(
                "expected four numeric fields and a structure name, found {} token(s)",
                tokens.len()
            )
        } else {
            "missing structure name after the four numeric fields".to_string()
        };
        return Err(SegReaderError::MalformedRow {
            subject: subject.to_string(),
            line,
            reason,
        });
    }

    let index: u32 = parse_int(subject, line, "Index", tokens[0])?;
    let seg_id: u32 = parse_int(subject, line, "SegId", tokens[1])?;
    let n_voxels: u64 = parse_int(subject, line, "NVoxels", tokens[2])?;
    let volume_mm3 = parse_float(subject, line, "Volume_mm3", tokens[3])?;
    let struct_name = tokens[4..].join(" ");

    Ok(SegmentRecord {
        index,
        seg_id,
        n_voxels,
        volume_mm3,
        struct_name,
    })
}

fn parse_int<T: std::str::FromStr>(
    subject: &str,
    line: usize,
    column: &'static str,
    token: &str,
) -> Result<T> {
    token.parse().map_err(|_| SegReaderError::NumericParse {
        subject: subject.to_string(),
        line,
        column,
        token: token.to_string(),
        expected: "integer",
    })
}

fn parse_float(subject: &str, line: usize, column: &'static str, token: &str) -> Result<f64> {
    token.parse().map_err(|_| SegReaderError::NumericParse {
        subject: subject.to_string(),
        line,
        column,
        token: token.to_string(),
        expected: "float",
    })
}

/// Declared column counts and names are sanity signals, not ground truth;
/// disagreements are logged and parsing proceeds on the five-field
/// contract.
fn sanity_check_header(subject: &str, header: &ReportHeader) {
    if header.n_table_cols != EXPECTED_COL_HEADERS.len() {
        log::warn!(
            "subject {subject}: header declares {} table columns, expected {}",
            header.n_table_cols,
            EXPECTED_COL_HEADERS.len()
        );
    }
    if header.col_headers != EXPECTED_COL_HEADERS {
        log::warn!(
            "subject {subject}: unexpected ColHeaders {:?}",
            header.col_headers
        );
    }
}
