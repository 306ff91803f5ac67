//! # JVFS - Read-Only Compressed Package Format
//!
//! `jvfs-rs` packs a directory tree into a single read-only archive. Every
//! regular file is deflated on its own and appended to the archive, and a
//! catalog records each entry's name, original size and body offset.
//!
//! - **Two layouts**: a plain catalog at offset 0 (v0) or a compressed
//!   catalog after the bodies (v1)
//! - **Bounded memory**: files are streamed through 16 KiB buffers
//! - **Deterministic output**: same tree and options, same bytes
//! - **Atomic output** (optional): stage in a temp file, rename on success
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jvfs_rs::{pack, PackOptions, Result};
//!
//! # fn main() -> Result<()> {
//! let report = pack("assets", "assets.pkg", &PackOptions::default())?;
//! println!("{} entries, {} bytes", report.entry_count, report.archive_size);
//! # Ok(())
//! # }
//! ```
//!
//! ## Advanced Usage
//!
//! ```rust,no_run
//! use jvfs_rs::{ArchiveLayout, CompressionLevel, Packer, Result};
//!
//! # fn main() -> Result<()> {
//! let report = Packer::new("assets", "assets.pkg")
//!     .layout(ArchiveLayout::V1)
//!     .level(CompressionLevel::Best)
//!     .atomic(true)
//!     .pack()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! v0 ("JVFS0100")                        v1 ("JVFS0101")
//! ┌──────────────────────────────┐       ┌──────────────────────────────┐
//! │ JVFS0100\0                   │       │ JVFS0101\0                   │
//! │ entry count        (u64 BE)  │       │ header offset      (u64 BE) ─┼─┐
//! │ offset, size, name\0  * n    │       ├──────────────────────────────┤ │
//! ├──────────────────────────────┤       │ body 0 (zlib)                │ │
//! │ body 0 (zlib)                │       │ ...                          │ │
//! │ body 1 (zlib)                │       │ body n-1 (zlib)              │ │
//! │ ...                          │       ├──────────────────────────────┤ │
//! └──────────────────────────────┘       │ catalog size       (u64 BE) │◀┘
//!                                        │ zlib(count, entries * n)     │
//!                                        └──────────────────────────────┘
//! ```
//!
//! Body sizes are not stored: each body ends where the next entry's offset
//! begins, and the last one ends at the end of the file (v0) or at the header
//! offset (v1).

pub mod core;

#[allow(unused_imports)]
pub(crate) use crate::core::{
    catalog, compression, config, encoding, error, header, io, report, scanner, writer,
};

pub use crate::core::{
    catalog::{uncompressed_header_size, Catalog, CatalogBuilder, FileRecord},
    compression::{compress_stream, CompressStats, CompressionLevel, CHUNK_SIZE},
    config::PackOptions,
    error::{JvfsError, Result},
    header::{ArchiveLayout, MAGIC_V0, MAGIC_V1, SIGNATURE_LEN},
    io::{ArchiveFile, ArchiveSink},
    report::PackReport,
    scanner::{scan, EntryNaming, ScanOptions, ScannedFile},
    writer::{write_archive, ArchiveSummary},
};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Pack every regular file under `root` into an archive at `output`
///
/// The tree is scanned before the output is created, so an empty tree fails
/// with `EmptyInput` and leaves no file behind. Later failures leave a
/// partial archive unless `options.atomic` is set.
pub fn pack<R: AsRef<Path>, O: AsRef<Path>>(root: R, output: O, options: &PackOptions) -> Result<PackReport> {
    let root = root.as_ref();
    let output = output.as_ref();

    info!(
        "Constructing package {} (compression method: {})",
        options.layout, options.level
    );

    let mut files = scan(root, &options.scan_options())?;
    exclude_output(&mut files, output);
    if files.is_empty() {
        return Err(JvfsError::EmptyInput {
            root: root.to_path_buf(),
        });
    }
    info!("Total entries found in {:?}: {}", root, files.len());

    let mut archive = ArchiveFile::create(output, options.atomic)?;
    let summary = {
        let mut sink = ArchiveSink::new(&mut archive);
        write_archive(&mut sink, &files, options.layout, options.level)?
    };
    archive.commit()?;

    let report = PackReport::new(&summary, options.level);
    info!("Original entries size: {}", report.original_size);
    info!("All done");
    Ok(report)
}

/// Drop the archive itself from the file list when it lives under the root
fn exclude_output(files: &mut Vec<ScannedFile>, output: &Path) {
    let Ok(output) = fs::canonicalize(output) else {
        return;
    };
    files.retain(|file| {
        let is_output = fs::canonicalize(&file.source)
            .map(|source| source == output)
            .unwrap_or(false);
        if is_output {
            warn!("Skipping output archive {:?} found under the root", file.source);
        }
        !is_output
    });
}

/// Builder-style packing
///
/// # Examples
///
/// ```rust,no_run
/// use jvfs_rs::{ArchiveLayout, Packer};
///
/// # fn main() -> jvfs_rs::Result<()> {
/// let report = Packer::new("filesystem", "out.pkg")
///     .layout(ArchiveLayout::V1)
///     .pack()?;
/// assert!(report.entry_count > 0);
/// # Ok(())
/// # }
/// ```
pub struct Packer {
    root: PathBuf,
    output: PathBuf,
    options: PackOptions,
}

impl Packer {
    /// Pack `root` into `output` with default options
    pub fn new<R: Into<PathBuf>, O: Into<PathBuf>>(root: R, output: O) -> Self {
        Packer {
            root: root.into(),
            output: output.into(),
            options: PackOptions::default(),
        }
    }

    /// Replace all options at once
    pub fn options(mut self, options: PackOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the catalog layout
    pub fn layout(mut self, layout: ArchiveLayout) -> Self {
        self.options.layout = layout;
        self
    }

    /// Set the compression level
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.options.level = level;
        self
    }

    /// Set how entries are named
    pub fn naming(mut self, naming: EntryNaming) -> Self {
        self.options.naming = naming;
        self
    }

    /// Stage output in a temporary file until the archive is complete
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.options.atomic = atomic;
        self
    }

    /// Run the packer
    pub fn pack(self) -> Result<PackReport> {
        pack(&self.root, &self.output, &self.options)
    }
}
