use crate::encoding::encode_text;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Magic for archives with a plain header at offset 0
pub const MAGIC_V0: [u8; 8] = *b"JVFS0100";

/// Magic for archives with a compressed trailing header
pub const MAGIC_V1: [u8; 8] = *b"JVFS0101";

/// Encoded signature length (magic plus NUL terminator)
pub const SIGNATURE_LEN: u64 = 9;

/// Catalog placement strategy
///
/// The layout is chosen once per archive and identified by the signature at
/// the start of the file.
///
/// ```text
/// V0: [JVFS0100\0][count][entries...][body 0][body 1]...
/// V1: [JVFS0101\0][header_offset][body 0]...[catalog_size][zlib(catalog)]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveLayout {
    /// Plain catalog reserved at the start and back-filled
    #[default]
    V0,
    /// Compressed catalog after the bodies, addressed from a patched offset
    V1,
}

impl ArchiveLayout {
    /// Magic bytes for this layout
    pub fn magic(&self) -> &'static [u8; 8] {
        match self {
            ArchiveLayout::V0 => &MAGIC_V0,
            ArchiveLayout::V1 => &MAGIC_V1,
        }
    }

    /// Magic as text
    pub fn magic_str(&self) -> &'static str {
        match self {
            ArchiveLayout::V0 => "JVFS0100",
            ArchiveLayout::V1 => "JVFS0101",
        }
    }

    /// Whether the catalog is stored compressed
    pub fn compressed_header(&self) -> bool {
        matches!(self, ArchiveLayout::V1)
    }

    /// Write the NUL-terminated signature
    pub fn encode_signature<W: Write + ?Sized>(&self, sink: &mut W) -> Result<()> {
        encode_text(self.magic_str(), sink)
    }
}

impl fmt::Display for ArchiveLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveLayout::V0 => write!(f, "v0"),
            ArchiveLayout::V1 => write!(f, "v1"),
        }
    }
}
