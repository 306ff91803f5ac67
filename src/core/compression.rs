//! Streaming deflate for archive bodies
//!
//! Every body (and the v1 catalog) is a standalone zlib stream. Input is fed
//! to the compressor in fixed chunks and output is drained through a buffer of
//! the same size, so memory stays at two chunks no matter how large the
//! source is.
//!
//! **Design**:
//! - Chunk size: 16 KiB for both the input and the output buffer
//! - Flush: `None` for every chunk except the one that hits end-of-data,
//!   which is fed with `Finish`
//! - Container: zlib header + deflate + Adler-32, so a reader can find the
//!   end of a body from the stream itself

use crate::error::{JvfsError, Result};
use flate2::{Compress, Compression, FlushCompress, Status};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::str::FromStr;

/// Size of the input and output buffers
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Size/speed tradeoff for deflate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// zlib's default level (6)
    #[default]
    Default,
    /// Maximum compression (9)
    Best,
}

impl CompressionLevel {
    /// zlib numeric level
    pub fn level(&self) -> u32 {
        match self {
            CompressionLevel::Default => 6,
            CompressionLevel::Best => 9,
        }
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionLevel::Default => write!(f, "default"),
            CompressionLevel::Best => write!(f, "best"),
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(CompressionLevel::Default),
            "best" => Ok(CompressionLevel::Best),
            _ => Err(format!(
                "Invalid compression level '{}'. Valid options: best, default",
                s
            )),
        }
    }
}

/// Byte counts for one compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressStats {
    /// Bytes read from the source
    pub bytes_in: u64,
    /// Bytes written to the destination
    pub bytes_out: u64,
}

/// Compress all of `source` into `dest` as one zlib stream
///
/// Returns the exact number of bytes consumed and produced. Nothing is
/// written to `dest` beyond the compressed stream itself.
///
/// # Errors
///
/// - `ShortWrite` if `dest` stops accepting bytes
/// - `Io` if reading `source` or writing `dest` fails
/// - `Compression` if the deflate engine reports an error
pub fn compress_stream<R, W>(source: &mut R, dest: &mut W, level: CompressionLevel) -> Result<CompressStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut compressor = Compress::new(level.into(), true);
    let mut input = vec![0u8; CHUNK_SIZE];
    let mut output = vec![0u8; CHUNK_SIZE];

    loop {
        let filled = fill_chunk(source, &mut input)?;
        let flush = if filled < CHUNK_SIZE {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };

        let mut consumed = 0usize;
        let finished = loop {
            let before_in = compressor.total_in();
            let before_out = compressor.total_out();

            let status = compressor
                .compress(&input[consumed..filled], &mut output, flush)
                .map_err(|e| JvfsError::Compression(e.to_string()))?;

            consumed += (compressor.total_in() - before_in) as usize;
            let produced = (compressor.total_out() - before_out) as usize;
            dest.write_all(&output[..produced])?;

            if status == Status::StreamEnd {
                break true;
            }
            // Output space left over means the compressor has nothing pending
            if flush == FlushCompress::None && consumed == filled && produced < output.len() {
                break false;
            }
        };

        if finished {
            break;
        }
    }

    Ok(CompressStats {
        bytes_in: compressor.total_in(),
        bytes_out: compressor.total_out(),
    })
}

/// Read until `buf` is full or the source is exhausted
fn fill_chunk<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
