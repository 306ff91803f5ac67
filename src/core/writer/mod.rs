//! Archive writers for both catalog layouts
//!
//! Both writers share the body loop: each scanned file is opened in turn,
//! its start offset is taken from the output position, and it is streamed
//! through the compressor straight into the archive. They differ only in
//! where the catalog goes:
//!
//! - [`v0`] reserves a zero-filled header at offset 0 and back-fills it
//! - [`v1`] leaves a placeholder offset after the signature and appends a
//!   compressed catalog after the last body
//!
//! A failure at any step aborts the run. Nothing already written is rolled
//! back.

pub mod v0;
pub mod v1;

use crate::catalog::{Catalog, CatalogBuilder};
use crate::compression::{compress_stream, CompressionLevel};
use crate::error::{JvfsError, Result};
use crate::header::ArchiveLayout;
use crate::io::ArchiveSink;
use crate::scanner::ScannedFile;
use std::fs::File;
use std::io::{Seek, Write};
use tracing::debug;

/// Result of writing one archive
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    /// Layout that was written
    pub layout: ArchiveLayout,
    /// Catalog as stored in the archive
    pub catalog: Catalog,
    /// First byte after the body region (end of file for v0, header offset for v1)
    pub bodies_end: u64,
    /// Uncompressed header bytes: signature and catalog for v0, catalog only for v1
    pub header_size: u64,
    /// Compressed catalog stream length (v1 only)
    pub compressed_header_size: Option<u64>,
    /// Total archive length
    pub archive_size: u64,
}

/// Write an archive of `files` using `layout`
pub fn write_archive<W: Write + Seek>(
    sink: &mut ArchiveSink<W>,
    files: &[ScannedFile],
    layout: ArchiveLayout,
    level: CompressionLevel,
) -> Result<ArchiveSummary> {
    match layout {
        ArchiveLayout::V0 => v0::write(sink, files, level),
        ArchiveLayout::V1 => v1::write(sink, files, level),
    }
}

/// Compress every file into `sink` and record its entry
fn write_bodies<W: Write + Seek>(
    sink: &mut ArchiveSink<W>,
    files: &[ScannedFile],
    catalog: &mut CatalogBuilder,
    level: CompressionLevel,
) -> Result<()> {
    for file in files {
        let mut source = File::open(&file.source).map_err(|source| JvfsError::OpenSource {
            path: file.source.clone(),
            source,
        })?;

        let start_offset = sink.position()?;
        let stats = compress_stream(&mut source, sink, level)?;
        let record = catalog.record(start_offset, stats.bytes_in)?;

        debug!(
            "Packed {} at {} ({} -> {} bytes)",
            record.name(),
            start_offset,
            stats.bytes_in,
            stats.bytes_out
        );
    }
    Ok(())
}
