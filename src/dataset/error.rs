//! Error types for the train/test dataset split

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, SplitError>;

/// Errors that can occur while collecting, splitting or exporting frames
#[derive(Debug, Error)]
pub enum SplitError {
    /// A directory or simulation output could not be read
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path that was accessed
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Simulation output is malformed
    #[error("{path}:{line}: {reason}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number
        line: usize,
        reason: String,
    },

    /// Sub-systems cannot be pooled into one labeled system
    #[error("cannot pool systems: {reason}")]
    Incompatible { reason: String },

    /// No sub-directory held a simulation output file
    #[error("no sub-directory of {root} contains a {file_name} file")]
    NoSystems { root: PathBuf, file_name: String },

    /// Every simulation output was empty
    #[error("no labeled frames found under {root}")]
    NoFrames { root: PathBuf },

    #[error("test fraction {0} is outside [0, 1)")]
    InvalidFraction(f64),

    /// Writing the numeric arrays failed
    #[error("failed to export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An array could not be encoded as `.npy`
    #[error("failed to write array {path}: {source}")]
    Npy {
        path: PathBuf,
        #[source]
        source: ndarray_npy::WriteNpyError,
    },
}

impl SplitError {
    /// Create an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create an export error for `path`
    pub fn export(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Export {
            path: path.into(),
            source,
        }
    }
}
