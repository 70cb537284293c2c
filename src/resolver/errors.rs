//! Resolution error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error during library closure resolution.
///
/// Any error aborts the whole resolution; no partial closure is produced.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to create output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },
}

impl ResolveError {
    /// Whether this is a missing-input error as opposed to an I/O failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    /// A hint for the user, if one applies.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ResolveError::NotFound { .. } => Some("help: check the path of the project file"),
            ResolveError::OutputDir { .. } => {
                Some("help: set `build.out_dir` in fwkit.toml to a writable directory")
            }
            ResolveError::Read { .. } | ResolveError::Scan { .. } => None,
        }
    }
}
