//! Statistics for a finished packing run

use crate::compression::CompressionLevel;
use crate::error::Result;
use crate::header::ArchiveLayout;
use crate::writer::ArchiveSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackReport {
    pub layout: ArchiveLayout,
    pub level: CompressionLevel,
    pub entry_count: u64,
    /// Sum of all uncompressed file sizes
    pub original_size: u64,
    pub archive_size: u64,
    /// Uncompressed header bytes (signature included for v0, catalog only for v1)
    pub header_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_header_size: Option<u64>,
}

impl PackReport {
    pub fn new(summary: &ArchiveSummary, level: CompressionLevel) -> Self {
        PackReport {
            layout: summary.layout,
            level,
            entry_count: summary.catalog.len() as u64,
            original_size: summary.catalog.original_size(),
            archive_size: summary.archive_size,
            header_size: summary.header_size,
            compressed_header_size: summary.compressed_header_size,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
