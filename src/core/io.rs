//! Output stream handling for archive construction
//!
//! [`ArchiveSink`] wraps any seekable writer and turns the "write now, fill in
//! later" steps of both layouts into explicit tokens: a [`PendingRegion`] for
//! the zero-filled v0 header and a [`PendingOffset`] for the v1 header
//! address. A token can only be resolved once, and resolving it returns the
//! stream to the end of the data written so far.
//!
//! [`ArchiveFile`] owns the destination file. With atomic output enabled the
//! archive is written to a temporary file next to the destination and only
//! renamed into place on [`ArchiveFile::commit`].

use crate::encoding::encode_u64;
use crate::error::{JvfsError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Reserved bytes to be overwritten with content of the same length
#[derive(Debug)]
#[must_use = "a reserved region must be patched"]
pub struct PendingRegion {
    start: u64,
    len: u64,
}

impl PendingRegion {
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Reserved `u64` slot to be resolved with a value known later
#[derive(Debug)]
#[must_use = "a pending offset must be resolved"]
pub struct PendingOffset {
    position: u64,
}

impl PendingOffset {
    pub fn position(&self) -> u64 {
        self.position
    }
}

/// Seekable archive output
pub struct ArchiveSink<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> ArchiveSink<W> {
    pub fn new(inner: W) -> Self {
        ArchiveSink { inner }
    }

    /// Current write position
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Write `len` zero bytes at the current position and return the region
    pub fn reserve(&mut self, len: u64) -> Result<PendingRegion> {
        let start = self.position()?;
        let zeros = [0u8; 4096];
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(zeros.len() as u64) as usize;
            self.inner.write_all(&zeros[..n])?;
            remaining -= n as u64;
        }
        Ok(PendingRegion { start, len })
    }

    /// Write a placeholder `u64` at the current position
    pub fn reserve_u64(&mut self) -> Result<PendingOffset> {
        let position = self.position()?;
        encode_u64(0, &mut self.inner)?;
        Ok(PendingOffset { position })
    }

    /// Overwrite a reserved region and return to the current end
    ///
    /// # Errors
    ///
    /// Returns `HeaderSizeMismatch` without touching the stream if `bytes`
    /// is not exactly as long as the reservation.
    pub fn patch(&mut self, region: PendingRegion, bytes: &[u8]) -> Result<()> {
        if bytes.len() as u64 != region.len {
            return Err(JvfsError::HeaderSizeMismatch {
                reserved: region.len,
                actual: bytes.len() as u64,
            });
        }
        self.overwrite(region.start, bytes)
    }

    /// Store `value` in a pending slot and return to the current end
    pub fn resolve(&mut self, offset: PendingOffset, value: u64) -> Result<()> {
        self.overwrite(offset.position, &value.to_be_bytes())
    }

    fn overwrite(&mut self, at: u64, bytes: &[u8]) -> Result<()> {
        let end = self.position()?;
        self.inner.seek(SeekFrom::Start(at))?;
        self.inner.write_all(bytes)?;
        self.inner.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    /// Move to the start of the stream
    pub fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> Write for ArchiveSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

enum Target {
    Direct(File),
    Staged(NamedTempFile),
}

/// Destination file of one packing run
pub struct ArchiveFile {
    target: Target,
    path: PathBuf,
}

impl ArchiveFile {
    /// Create (or truncate) the archive at `path`
    ///
    /// With `atomic` set, bytes go to a temporary file in the same directory
    /// and `path` is untouched until [`commit`](Self::commit).
    pub fn create<P: AsRef<Path>>(path: P, atomic: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let create_err = |source| JvfsError::CreateOutput {
            path: path.clone(),
            source,
        };

        let target = if atomic {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let staged = NamedTempFile::new_in(&dir).map_err(create_err)?;
            debug!("Staging archive in {:?}", staged.path());
            Target::Staged(staged)
        } else {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .map_err(create_err)?;
            Target::Direct(file)
        };

        Ok(ArchiveFile { target, path })
    }

    /// Final archive path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync to disk and move a staged archive into place
    pub fn commit(self) -> Result<()> {
        match self.target {
            Target::Direct(file) => {
                file.sync_all()?;
            }
            Target::Staged(staged) => {
                staged.as_file().sync_all()?;
                staged.persist(&self.path).map_err(|e| JvfsError::CreateOutput {
                    path: self.path.clone(),
                    source: e.error,
                })?;
                debug!("Moved staged archive to {:?}", self.path);
            }
        }
        Ok(())
    }
}

impl Write for ArchiveFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.target {
            Target::Direct(file) => file.write(buf),
            Target::Staged(staged) => staged.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.target {
            Target::Direct(file) => file.flush(),
            Target::Staged(staged) => staged.flush(),
        }
    }
}

impl Seek for ArchiveFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.target {
            Target::Direct(file) => file.seek(pos),
            Target::Staged(staged) => staged.seek(pos),
        }
    }
}
