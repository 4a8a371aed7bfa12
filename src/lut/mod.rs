//! Atlas lookup-table model
//!
//! An [`Atlas`] is the immutable mapping from segment identifier to
//! canonical structure name, loaded once per run from a color lookup
//! table. The LUT's row order is preserved and later dictates the column
//! order of every group table built against the atlas.

use std::io::Write;
use std::path::Path;

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::error::util::safe_read_to_string;
use crate::error::{Result, SegReaderError};

/// One LUT row: a segment identifier and its canonical structure name.
///
/// Trailing color channels in the source line are consumed by display
/// tools and ignored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutEntry {
    pub seg_id: u32,
    pub struct_name: String,
}

/// A named segmentation scheme with a fixed, ordered set of structures.
#[derive(Debug, Clone)]
pub struct Atlas {
    name: String,
    entries: Vec<LutEntry>,
    by_id: FxHashMap<u32, usize>,
}

impl Atlas {
    /// Parse an atlas from LUT text.
    ///
    /// Each line is `SegId StructName [R G B A]`; blank lines and
    /// `#`-prefixed comment lines are skipped. Row order becomes the
    /// atlas's canonical structure ordering.
    ///
    /// # Errors
    /// `MalformedLut` if a line cannot be split into an identifier and a
    /// name, `DuplicateSegId` if an identifier appears twice.
    pub fn from_lut_text(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut by_id = FxHashMap::default();
        let mut first_line_of = FxHashMap::default();

        for (lineno, raw) in text.lines().enumerate() {
            let line = lineno + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            let id_token = tokens.next().ok_or_else(|| SegReaderError::MalformedLut {
                line,
                reason: "empty line after trimming".to_string(),
            })?;
            let seg_id: u32 = id_token.parse().map_err(|_| SegReaderError::MalformedLut {
                line,
                reason: format!("cannot parse `{id_token}` as a segment id"),
            })?;
            let struct_name = tokens.next().ok_or_else(|| SegReaderError::MalformedLut {
                line,
                reason: format!("no structure name after id {seg_id}"),
            })?;

            if let Some(&first_line) = first_line_of.get(&seg_id) {
                return Err(SegReaderError::DuplicateSegId {
                    seg_id,
                    first_line,
                    second_line: line,
                });
            }
            first_line_of.insert(seg_id, line);
            by_id.insert(seg_id, entries.len());
            entries.push(LutEntry {
                seg_id,
                struct_name: struct_name.to_string(),
            });
        }

        Ok(Self {
            name: name.into(),
            entries,
            by_id,
        })
    }

    /// Load an atlas from a LUT file.
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        let text = safe_read_to_string(path, "loading atlas LUT")?;
        let atlas = Self::from_lut_text(name, &text)?;
        log::debug!(
            "Loaded atlas {} with {} structures from {}",
            atlas.name,
            atlas.len(),
            path.display()
        );
        Ok(atlas)
    }

    /// Atlas name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the atlas declares no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical (file) order.
    #[must_use]
    pub fn entries(&self) -> &[LutEntry] {
        &self.entries
    }

    /// Segment identifiers in canonical order.
    pub fn seg_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|e| e.seg_id)
    }

    /// The declared structure name for an identifier.
    #[must_use]
    pub fn struct_name(&self, seg_id: u32) -> Option<&str> {
        self.by_id
            .get(&seg_id)
            .map(|&i| self.entries[i].struct_name.as_str())
    }

    /// Whether the atlas declares this identifier.
    #[must_use]
    pub fn contains(&self, seg_id: u32) -> bool {
        self.by_id.contains_key(&seg_id)
    }

    /// Serialize the atlas back to LUT format.
    ///
    /// Color channels are regenerated at random (alpha 0); display tools
    /// only need them to be distinct, not stable.
    pub fn write_lut<W: Write>(&self, mut sink: W) -> std::io::Result<()> {
        let mut rng = rand::rng();
        for entry in &self.entries {
            let (r, g, b): (u8, u8, u8) = (rng.random(), rng.random(), rng.random());
            writeln!(
                sink,
                "{}\t{}\t\t\t{}\t{}\t{}\t0",
                entry.seg_id, entry.struct_name, r, g, b
            )?;
        }
        Ok(())
    }

    /// Write the atlas to a LUT file.
    pub fn write_lut_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| SegReaderError::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_lut(&mut writer)
            .and_then(|()| std::io::Write::flush(&mut writer))
            .map_err(|e| SegReaderError::io(path, e))?;
        log::info!("Wrote LUT for atlas {} to {}", self.name, path.display());
        Ok(())
    }
}
