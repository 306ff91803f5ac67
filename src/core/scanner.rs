//! Directory traversal into a flat, ordered file list
//!
//! The walk is depth-first over an explicit stack, so there is no recursion
//! limit. Within one directory the children are visited in byte-wise name
//! order; across directories the order is LIFO discovery order, which means
//! the result is deterministic but not globally sorted.

use crate::encoding::ensure_no_nul;
use crate::error::{JvfsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How scanned files are named inside the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryNaming {
    /// Path relative to the root, `/`-separated (`sub/b.bin`)
    #[default]
    Relative,
    /// Root path as given, then `/`, then the relative path (`data/sub/b.bin`)
    RootPrefixed,
}

/// A regular file discovered under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path used to open the file
    pub source: PathBuf,
    /// Entry name written to the catalog
    pub name: String,
}

/// Scanner settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub naming: EntryNaming,
}

/// Names starting with `.` are never archived or descended into
///
/// This also covers `.` and `..`, which `read_dir` does not yield anyway.
/// The check runs on the raw name, so a hidden entry is skipped even when
/// its name is not valid UTF-8.
pub fn is_hidden<S: AsRef<OsStr>>(name: S) -> bool {
    name.as_ref().as_encoded_bytes().first() == Some(&b'.')
}

/// Walk `root` and return every regular file below it
///
/// An empty vector is a valid result; callers that need at least one file
/// must reject it themselves.
///
/// # Errors
///
/// - `Traversal` if any directory (including `root`) cannot be listed
/// - `OpenSource` if a discovered entry cannot be inspected (dangling symlink)
/// - `NonUtf8Path` / `NulInName` if an entry name cannot be stored
pub fn scan<P: AsRef<Path>>(root: P, options: &ScanOptions) -> Result<Vec<ScannedFile>> {
    let root = root.as_ref();
    let prefix = match options.naming {
        EntryNaming::Relative => String::new(),
        EntryNaming::RootPrefixed => root_prefix(root)?,
    };

    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut pending: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, relative)) = pending.pop() {
        if let Ok(canonical) = fs::canonicalize(&dir) {
            if !visited.insert(canonical) {
                warn!("Skipping already visited directory {:?}", dir);
                continue;
            }
        }

        for (name, path) in list_dir(&dir)? {
            if is_hidden(&name) {
                debug!("Skipping hidden entry {:?}", path);
                continue;
            }
            let name = name
                .into_string()
                .map_err(|_| JvfsError::NonUtf8Path(path.clone()))?;

            let child = if relative.is_empty() {
                name
            } else {
                format!("{}/{}", relative, name)
            };

            let metadata = fs::metadata(&path).map_err(|source| JvfsError::OpenSource {
                path: path.clone(),
                source,
            })?;

            if metadata.is_dir() {
                pending.push((path, child));
            } else if metadata.is_file() {
                let name = format!("{}{}", prefix, child);
                ensure_no_nul(&name)?;
                debug!("Found {}", name);
                files.push(ScannedFile { source: path, name });
            } else {
                warn!("Skipping special file {:?}", path);
            }
        }
    }

    Ok(files)
}

/// List a directory's children sorted by name
fn list_dir(dir: &Path) -> Result<Vec<(OsString, PathBuf)>> {
    let traversal = |source| JvfsError::Traversal {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(traversal)? {
        let entry = entry.map_err(traversal)?;
        children.push((entry.file_name(), entry.path()));
    }
    children.sort_by(|a, b| a.0.as_encoded_bytes().cmp(b.0.as_encoded_bytes()));
    Ok(children)
}

fn root_prefix(root: &Path) -> Result<String> {
    let mut prefix = root
        .to_str()
        .ok_or_else(|| JvfsError::NonUtf8Path(root.to_path_buf()))?
        .replace('\\', "/");
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    Ok(prefix)
}
