//! Export writer
//!
//! Serializes a group table to tab-delimited text: a header row of
//! structure names in atlas order behind a `subject` key column, then
//! one row per subject. The writer performs no validation; it is a pure
//! formatting step and fails only on I/O.
//!
//! Writing to a path archives any previous table for the same name into
//! an `.old/` sibling directory with a timestamp suffix before the new
//! file is created.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::aggregate::GroupTable;
use crate::error::{Result, SegReaderError};

/// Column delimiter of the exported table.
pub const DELIMITER: char = '\t';

/// Write a group table to a sink.
pub fn write_group_table<W: Write>(table: &GroupTable, mut sink: W) -> io::Result<()> {
    write!(sink, "subject")?;
    for column in table.columns() {
        write!(sink, "{DELIMITER}{}", column.struct_name)?;
    }
    writeln!(sink)?;

    for (row, subject) in table.subjects().iter().enumerate() {
        write!(sink, "{subject}")?;
        for value in table.row(row) {
            write!(sink, "{DELIMITER}{value}")?;
        }
        writeln!(sink)?;
    }

    Ok(())
}

/// Write a group table to a file, archiving any previous one.
///
/// An existing file at `path` is moved to `.old/<stem>_<YYYYMMDD-HHMM>`
/// beside it first; a missing previous file is not an error.
pub fn export_group_table(table: &GroupTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| SegReaderError::io(parent, e))?;
    }

    if path.exists() {
        archive_previous(path)?;
    }

    let file = fs::File::create(path).map_err(|e| SegReaderError::io(path, e))?;
    let mut writer = io::BufWriter::new(file);
    write_group_table(table, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| SegReaderError::io(path, e))?;

    log::info!(
        "Wrote {} x {} group table for atlas {} to {}",
        table.n_subjects(),
        table.n_structures(),
        table.atlas_name(),
        path.display()
    );
    Ok(())
}

fn archive_previous(path: &Path) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let archive_dir = parent.join(".old");
    fs::create_dir_all(&archive_dir).map_err(|e| SegReaderError::io(&archive_dir, e))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stamp = Local::now().format("%Y%m%d-%H%M");
    let archived = archive_dir.join(format!("{stem}_{stamp}{ext}"));

    fs::rename(path, &archived).map_err(|e| SegReaderError::io(path, e))?;
    log::info!(
        "Archived previous table {} to {}",
        path.display(),
        archived.display()
    );
    Ok(())
}
