//! Archive construction internals
//!
//! - [`error`] - Error types for packing runs
//! - [`encoding`] - Big-endian integers and NUL-terminated strings
//! - [`header`] - Layout signatures (`JVFS0100` / `JVFS0101`)
//! - [`scanner`] - Directory traversal into an ordered file list
//! - [`compression`] - Bounded-memory streaming deflate
//! - [`catalog`] - Entry table construction and sizing
//! - [`io`] - Seekable output with back-patch tokens, atomic output files
//! - [`writer`] - The v0 and v1 archive writers
//! - [`config`] - Packing options (TOML)
//! - [`report`] - Run statistics (JSON)

pub mod catalog;
pub mod compression;
pub mod config;
pub mod encoding;
pub mod error;
pub mod header;
pub mod io;
pub mod report;
pub mod scanner;
pub mod writer;
