//! Compressed-header layout (`JVFS0101`)
//!
//! `Start → WriteSignature → WriteBodies → PatchOffset → CompressCatalog → Done`
//!
//! The catalog goes after the last body, so nothing has to be sized up
//! front. The only back-patch is the 8-byte header offset right after the
//! signature.

use super::{write_bodies, ArchiveSummary};
use crate::catalog::CatalogBuilder;
use crate::compression::{compress_stream, CompressionLevel};
use crate::encoding::encode_u64;
use crate::error::{JvfsError, Result};
use crate::header::ArchiveLayout;
use crate::io::ArchiveSink;
use crate::scanner::ScannedFile;
use std::io::{Seek, Write};
use tracing::info;

const LAYOUT: ArchiveLayout = ArchiveLayout::V1;

pub fn write<W: Write + Seek>(
    sink: &mut ArchiveSink<W>,
    files: &[ScannedFile],
    level: CompressionLevel,
) -> Result<ArchiveSummary> {
    if files.is_empty() {
        return Err(JvfsError::NoEntries);
    }
    let mut builder = CatalogBuilder::new(files)?;

    // WriteSignature
    sink.rewind()?;
    LAYOUT.encode_signature(sink)?;
    let header_offset = sink.reserve_u64()?;

    // WriteBodies
    write_bodies(sink, files, &mut builder, level)?;

    // PatchOffset
    let header_pos = sink.position()?;
    sink.resolve(header_offset, header_pos)?;

    // CompressCatalog
    info!("Compressing header...");
    let header_size = builder.header_size(None);
    let catalog = builder.finish()?;
    encode_u64(header_size, sink)?;

    let blob = catalog.materialize()?;
    let stats = compress_stream(&mut blob.as_slice(), sink, level)?;
    sink.flush()?;

    let archive_size = sink.position()?;
    info!(
        "Final package size: {} (comp hdr: {} / unc {})",
        archive_size, stats.bytes_out, stats.bytes_in
    );

    Ok(ArchiveSummary {
        layout: LAYOUT,
        catalog,
        bodies_end: header_pos,
        header_size,
        compressed_header_size: Some(stats.bytes_out),
        archive_size,
    })
}
