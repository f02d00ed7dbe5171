//! Error taxonomy shared by every component.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by the core. Each variant names the operation and the
/// offending id or path so callers can present a useful message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{op}: group '{id}' not found")]
    NotFound { op: &'static str, id: String },

    #[error("invalid {field} {value:?}: {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The data directory or backup folder could not be read or written.
    #[error("{op}: {}: {source}", path.display())]
    Persistence {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The system hosts file could not be read or written.
    #[error("{op}: {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot lock data directory {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn not_found(op: &'static str, id: &str) -> Self {
        Error::NotFound {
            op,
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(field: &'static str, value: impl ToString, reason: &str) -> Self {
        Error::Validation {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn persistence(op: &'static str, path: &Path, source: io::Error) -> Self {
        Error::Persistence {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}
