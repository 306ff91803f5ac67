use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JvfsError {
    #[error("Unable to open directory {path:?}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No files found in {root:?}")]
    EmptyInput { root: PathBuf },

    #[error("Archive has no entries")]
    NoEntries,

    #[error("No write access on {path:?}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path:?}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Short write: destination accepted fewer bytes than requested")]
    ShortWrite,

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Entry name contains a NUL byte: {0:?}")]
    NulInName(String),

    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("Header size mismatch: reserved {reserved} bytes, encoded {actual}")]
    HeaderSizeMismatch { reserved: u64, actual: u64 },

    #[error("Catalog incomplete: {recorded} of {expected} entries recorded")]
    IncompleteCatalog { expected: usize, recorded: usize },

    #[error("Entry offsets out of order at index {index}: {previous} then {current}")]
    OffsetOrder {
        index: usize,
        previous: u64,
        current: u64,
    },

    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for JvfsError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::WriteZero {
            JvfsError::ShortWrite
        } else {
            JvfsError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, JvfsError>;
