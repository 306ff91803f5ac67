//! Packing options
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! layout = "v1"
//! level = "best"
//! naming = "relative"
//! atomic = true
//! ```
//!
//! Every key is optional and falls back to the default (`v0`, `default`,
//! `relative`, non-atomic).

use crate::compression::CompressionLevel;
use crate::error::{JvfsError, Result};
use crate::header::ArchiveLayout;
use crate::scanner::{EntryNaming, ScanOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackOptions {
    /// Catalog placement
    pub layout: ArchiveLayout,

    /// Deflate level for bodies and the v1 catalog
    pub level: CompressionLevel,

    /// Entry naming scheme
    pub naming: EntryNaming,

    /// Stage output in a temporary file and rename it into place on success
    ///
    /// Without this a failed run leaves a truncated archive behind.
    pub atomic: bool,
}

impl PackOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(JvfsError::Io)?;
        Self::from_toml_str(&text)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            naming: self.naming,
        }
    }
}
