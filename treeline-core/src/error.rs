//! Error types for source analysis.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Errors that can occur while analyzing a single file.
///
/// None of these abort a repository run. The mapper turns them into
/// diagnostics and moves on to the next file.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("{0} is not valid UTF-8 text")]
    Decode(PathBuf),

    /// No registered analyzer accepts this file.
    #[error("no analyzer can handle {0}")]
    Unsupported(PathBuf),

    /// The underlying parser failed.
    #[error("parser error: {0}")]
    Parser(String),
}

impl AnalyzeError {
    /// Wraps an I/O error, classifying invalid UTF-8 as a decode failure.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::InvalidData {
            Self::Decode(path)
        } else {
            Self::Io { path, source }
        }
    }
}
