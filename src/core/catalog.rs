//! Archive catalog: per-entry offset, size and name
//!
//! The catalog maps each archived file to the position of its compressed body.
//! Compressed sizes are never stored; entry *i* spans from its own offset to
//! the offset of entry *i + 1*, and the last entry ends where the region after
//! the bodies begins. [`Catalog::body_ranges`] makes that rule explicit.
//!
//! Serialized form (no signature):
//!
//! ```text
//! [count: u64]
//! ([start_offset: u64][uncompressed_size: u64][name\0])*
//! ```

use crate::encoding::{encode_text, encode_u64, encoded_text_len, ensure_no_nul, U64_LEN};
use crate::error::{JvfsError, Result};
use crate::header::{ArchiveLayout, SIGNATURE_LEN};
use crate::scanner::ScannedFile;
use std::io::Write;
use std::ops::Range;

/// Fixed bytes per entry besides the name: offset, size and NUL terminator
pub const ENTRY_OVERHEAD: u64 = U64_LEN + U64_LEN + 1;

/// One archived file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    name: String,
    uncompressed_size: u64,
    start_offset: u64,
}

impl FileRecord {
    /// Entry name as stored in the catalog
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the original file
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Output position where the compressed body begins
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }
}

/// Exact serialized size of a catalog over `names`
///
/// With `signature` set the result also counts the NUL-terminated magic that
/// precedes a v0 header. The value depends only on name lengths, so it can
/// be computed before anything is compressed.
pub fn uncompressed_header_size<S: AsRef<str>>(names: &[S], signature: Option<ArchiveLayout>) -> u64 {
    let names_len: u64 = names.iter().map(|n| n.as_ref().len() as u64).sum();
    let mut size = U64_LEN + ENTRY_OVERHEAD * names.len() as u64 + names_len;
    if signature.is_some() {
        size += SIGNATURE_LEN;
    }
    size
}

/// Catalog under construction
///
/// Holds the entry names in scan order and fills in offset and size one entry
/// at a time as bodies are written.
#[derive(Debug)]
pub struct CatalogBuilder {
    names: Vec<String>,
    records: Vec<FileRecord>,
}

impl CatalogBuilder {
    /// Start a catalog with one pending entry per file
    pub fn new(files: &[ScannedFile]) -> Result<Self> {
        let names = files.iter().map(|f| f.name.clone()).collect::<Vec<_>>();
        for name in &names {
            ensure_no_nul(name)?;
        }
        Ok(CatalogBuilder {
            records: Vec::with_capacity(names.len()),
            names,
        })
    }

    /// Names of all entries, recorded or not
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of entries still waiting for their body
    pub fn pending(&self) -> usize {
        self.names.len() - self.records.len()
    }

    /// Serialized catalog size, optionally including a signature
    pub fn header_size(&self, signature: Option<ArchiveLayout>) -> u64 {
        uncompressed_header_size(&self.names, signature)
    }

    /// Complete the next pending entry
    ///
    /// # Errors
    ///
    /// - `IncompleteCatalog` if every entry is already recorded
    /// - `OffsetOrder` if `start_offset` does not follow the previous entry
    pub fn record(&mut self, start_offset: u64, uncompressed_size: u64) -> Result<&FileRecord> {
        let index = self.records.len();
        let name = self.names.get(index).cloned().ok_or(JvfsError::IncompleteCatalog {
            expected: self.names.len(),
            recorded: index + 1,
        })?;

        if let Some(previous) = self.records.last() {
            if start_offset <= previous.start_offset {
                return Err(JvfsError::OffsetOrder {
                    index,
                    previous: previous.start_offset,
                    current: start_offset,
                });
            }
        }

        self.records.push(FileRecord {
            name,
            uncompressed_size,
            start_offset,
        });
        Ok(&self.records[index])
    }

    /// Finish the catalog once every entry has been recorded
    pub fn finish(self) -> Result<Catalog> {
        if self.records.len() != self.names.len() {
            return Err(JvfsError::IncompleteCatalog {
                expected: self.names.len(),
                recorded: self.records.len(),
            });
        }
        Ok(Catalog {
            records: self.records,
        })
    }
}

/// Completed catalog in archive order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<FileRecord>,
}

impl Catalog {
    /// Entries in archive order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all uncompressed sizes
    pub fn original_size(&self) -> u64 {
        self.records.iter().map(|r| r.uncompressed_size).sum()
    }

    /// Serialized size without signature
    pub fn payload_size(&self) -> u64 {
        U64_LEN
            + self
                .records
                .iter()
                .map(|r| U64_LEN + U64_LEN + encoded_text_len(&r.name))
                .sum::<u64>()
    }

    /// Write the catalog to `sink`
    pub fn encode<W: Write + ?Sized>(&self, sink: &mut W) -> Result<()> {
        encode_u64(self.records.len() as u64, sink)?;
        for record in &self.records {
            encode_u64(record.start_offset, sink)?;
            encode_u64(record.uncompressed_size, sink)?;
            encode_text(&record.name, sink)?;
        }
        Ok(())
    }

    /// Serialize the catalog into a new buffer
    pub fn materialize(&self) -> Result<Vec<u8>> {
        let mut blob = Vec::with_capacity(self.payload_size() as usize);
        self.encode(&mut blob)?;
        Ok(blob)
    }

    /// Verify offsets are strictly increasing
    pub fn check_offsets(&self) -> Result<()> {
        for (index, pair) in self.records.windows(2).enumerate() {
            if pair[1].start_offset <= pair[0].start_offset {
                return Err(JvfsError::OffsetOrder {
                    index: index + 1,
                    previous: pair[0].start_offset,
                    current: pair[1].start_offset,
                });
            }
        }
        Ok(())
    }

    /// Compressed region of every entry
    ///
    /// Each body ends where the next one starts; the last one ends at `end`,
    /// the first byte after the body region (end of file for v0, the header
    /// offset for v1).
    pub fn body_ranges(&self, end: u64) -> Result<Vec<Range<u64>>> {
        self.check_offsets()?;
        if let Some(last) = self.records.last() {
            if end <= last.start_offset {
                return Err(JvfsError::OffsetOrder {
                    index: self.records.len(),
                    previous: last.start_offset,
                    current: end,
                });
            }
        }

        let ends = self
            .records
            .iter()
            .skip(1)
            .map(|r| r.start_offset)
            .chain(std::iter::once(end));
        Ok(self
            .records
            .iter()
            .zip(ends)
            .map(|(r, end)| r.start_offset..end)
            .collect())
    }
}
