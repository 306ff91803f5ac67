//! Plain-header layout (`JVFS0100`)
//!
//! `Start → ReserveHeader → WriteBodies → PatchHeader → Done`
//!
//! The header size is known before any body is compressed because it depends
//! only on the entry names, so the writer reserves exactly that many zero
//! bytes at offset 0 and overwrites them once every offset is known.

use super::{write_bodies, ArchiveSummary};
use crate::catalog::CatalogBuilder;
use crate::compression::CompressionLevel;
use crate::error::{JvfsError, Result};
use crate::header::ArchiveLayout;
use crate::io::ArchiveSink;
use crate::scanner::ScannedFile;
use std::io::{Seek, Write};
use tracing::info;

const LAYOUT: ArchiveLayout = ArchiveLayout::V0;

pub fn write<W: Write + Seek>(
    sink: &mut ArchiveSink<W>,
    files: &[ScannedFile],
    level: CompressionLevel,
) -> Result<ArchiveSummary> {
    if files.is_empty() {
        return Err(JvfsError::NoEntries);
    }
    let mut builder = CatalogBuilder::new(files)?;

    // ReserveHeader
    sink.rewind()?;
    let header_size = builder.header_size(Some(LAYOUT));
    let region = sink.reserve(header_size)?;

    // WriteBodies
    write_bodies(sink, files, &mut builder, level)?;
    let bodies_end = sink.position()?;
    let catalog = builder.finish()?;

    // PatchHeader
    let mut header = Vec::with_capacity(header_size as usize);
    LAYOUT.encode_signature(&mut header)?;
    catalog.encode(&mut header)?;
    sink.patch(region, &header)?;
    sink.flush()?;

    info!("Final package size: {} (uncomp hdr: {})", bodies_end, header_size);

    Ok(ArchiveSummary {
        layout: LAYOUT,
        catalog,
        bodies_end,
        header_size,
        compressed_header_size: None,
        archive_size: bodies_end,
    })
}
