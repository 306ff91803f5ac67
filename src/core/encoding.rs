//! Primitive field encoding for JVFS archives
//!
//! Every integer in the format is an unsigned 64-bit value stored big-endian
//! in exactly 8 bytes. Every string is stored as its raw UTF-8 bytes followed
//! by a single NUL terminator, with no length prefix and no escaping.

use crate::error::{JvfsError, Result};
use std::io::Write;

/// Encoded size of a `u64` field
pub const U64_LEN: u64 = 8;

/// Write `value` as 8 big-endian bytes
pub fn encode_u64<W: Write + ?Sized>(value: u64, sink: &mut W) -> Result<()> {
    sink.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Write `value` followed by a NUL terminator
///
/// # Errors
///
/// Returns `NulInName` without writing anything if `value` contains a NUL
/// byte, since a reader would split the string there.
pub fn encode_text<W: Write + ?Sized>(value: &str, sink: &mut W) -> Result<()> {
    ensure_no_nul(value)?;
    sink.write_all(value.as_bytes())?;
    sink.write_all(&[0])?;
    Ok(())
}

/// Number of bytes `encode_text` writes for `value`
pub fn encoded_text_len(value: &str) -> u64 {
    value.len() as u64 + 1
}

/// Reject strings that cannot be stored NUL-terminated
pub fn ensure_no_nul(value: &str) -> Result<()> {
    if value.as_bytes().contains(&0) {
        return Err(JvfsError::NulInName(value.to_string()));
    }
    Ok(())
}
