use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapperError>;

/// Failures that abort a whole mapping run.
///
/// Problems with individual files never show up here; they are reported as
/// diagnostics on the resulting map.
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("repository not found: {0}")]
    NotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to walk repository: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}
