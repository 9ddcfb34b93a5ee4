//! Treeline Mapper - from a directory on disk to a repository map
//!
//! This crate owns everything that touches the file system: discovering
//! files, reading configuration, and running analyzers. It then hands the
//! assembled tree to the graph and render crates.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use treeline_mapper::{MapOptions, RepoMapper};
//!
//! let map = RepoMapper::default().create_overview(Path::new("."), &MapOptions::default())?;
//! println!("{}", map.text);
//! # Ok::<(), treeline_mapper::MapperError>(())
//! ```

pub mod config;
pub mod discovery;
mod error;
mod mapper;

pub use config::MapperConfig;
pub use discovery::{build_globset, discover_files, SourceFile};
pub use error::{ConfigError, MapperError, Result};
pub use mapper::{focus_key, AnalyzedRepo, Diagnostic, MapOptions, MapStats, RepoMap, RepoMapper};
