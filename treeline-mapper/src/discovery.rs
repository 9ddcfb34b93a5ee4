//! Repository file discovery.
//!
//! Walks the repository with the `ignore` crate, so `.gitignore` rules and
//! hidden files are handled the way ripgrep handles them. Results are sorted
//! so the same repository always yields the same tree.

use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Extensions that never carry text worth mapping.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "webp", "bmp", "woff", "woff2", "ttf", "otf", "mp3",
    "mp4", "wav", "zip", "tar", "gz", "7z", "pdf", "pyc", "pyo", "so", "dylib", "dll", "exe",
    "o", "a", "class", "jar", "wasm", "bin", "db", "sqlite",
];

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Repository-relative path with `/` separators.
    pub rel_path: String,
}

/// Compiles exclude globs. An empty list matches nothing.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Lists the files of `repo` that are not ignored or excluded, sorted by
/// relative path.
pub fn discover_files(repo: &Path, exclude: &GlobSet) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(repo)
        .follow_links(false)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(rel_path) = relative_key(repo, path) else {
            continue;
        };
        if exclude.is_match(&rel_path) {
            trace!(path = %rel_path, "excluded by pattern");
            continue;
        }
        if is_binary(path) {
            trace!(path = %rel_path, "skipping binary file");
            continue;
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            rel_path,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

/// Repository-relative key of `path` with `/` separators.
///
/// Absolute paths must lie under `repo`. Relative paths are taken as given,
/// after stripping a leading `repo` prefix if present.
pub fn relative_key(repo: &Path, path: &Path) -> Option<String> {
    let relative = path
        .strip_prefix(repo)
        .ok()
        .or_else(|| (!path.is_absolute()).then_some(path))?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| BINARY_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}
