//! Repository mapping.
//!
//! `RepoMapper` wires the pieces together for one run: discover files,
//! analyze them into a tree, score the tree, and serialize the scored view.

use crate::config::MapperConfig;
use crate::discovery::{build_globset, discover_files, relative_key};
use crate::error::{MapperError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use treeline_core::{AnalyzerRegistry, CodeNode, ScoredTree, Scores, TreeAssembler};
use treeline_graph::ImportanceCalculator;
use treeline_render::{Format, RenderOptions, Serializer, SizeEstimator};

/// A file that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

/// Counters for one mapping run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    pub files_analyzed: usize,
    pub files_failed: usize,
    pub nodes: usize,
    /// Size of the rendered text as measured by the serializer's estimator.
    pub output_size: usize,
    pub duration_ms: u64,
}

/// The result of a mapping run.
#[derive(Debug, Clone)]
pub struct RepoMap {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: MapStats,
}

/// An analyzed repository tree.
#[derive(Debug, Clone)]
pub struct AnalyzedRepo {
    pub root: CodeNode,
    pub diagnostics: Vec<Diagnostic>,
    pub files_analyzed: usize,
}

/// Options for a single map request.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub render: RenderOptions,
    /// Globs over repository-relative paths to leave out.
    pub exclude: Vec<String>,
    /// Symbol names or node paths to treat as important.
    pub mentioned_symbols: Vec<String>,
}

/// Maps repositories into importance-ordered, size-bounded text.
pub struct RepoMapper {
    analyzers: AnalyzerRegistry,
    calculator: ImportanceCalculator,
    serializer: Serializer,
}

impl Default for RepoMapper {
    fn default() -> Self {
        Self::new(
            AnalyzerRegistry::with_defaults(),
            ImportanceCalculator::default(),
            Serializer::new(Format::default()),
        )
    }
}

impl RepoMapper {
    pub fn new(
        analyzers: AnalyzerRegistry,
        calculator: ImportanceCalculator,
        serializer: Serializer,
    ) -> Self {
        Self {
            analyzers,
            calculator,
            serializer,
        }
    }

    /// Builds a mapper from a config, measuring output with `estimator`.
    pub fn from_config(
        config: &MapperConfig,
        estimator: impl SizeEstimator + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            AnalyzerRegistry::with_defaults(),
            config.calculator(),
            Serializer::with_estimator(config.format, estimator),
        )
    }

    pub fn calculator(&self) -> &ImportanceCalculator {
        &self.calculator
    }

    /// Maps the whole repository with no focus.
    pub fn create_overview(&self, repo: &Path, options: &MapOptions) -> Result<RepoMap> {
        self.create_map(repo, &[], options)
    }

    /// Maps the repository with `files` treated as the focus.
    ///
    /// Files may be absolute or relative to `repo`. Files outside the
    /// repository or not part of the analyzed tree are ignored.
    pub fn create_focused_view(
        &self,
        files: &[PathBuf],
        repo: &Path,
        options: &MapOptions,
    ) -> Result<RepoMap> {
        let focused: Vec<String> = files
            .iter()
            .filter_map(|file| focus_key(repo, file))
            .collect();
        debug!(focused = focused.len(), "resolved focus files");
        self.create_map(repo, &focused, options)
    }

    fn create_map(&self, repo: &Path, focused: &[String], options: &MapOptions) -> Result<RepoMap> {
        let start = Instant::now();

        let analyzed = self.analyze_repository(repo, &options.exclude)?;
        let scores = self.score(&analyzed.root, focused, &options.mentioned_symbols);
        let tree = ScoredTree::new(&analyzed.root, &scores);
        let text = self.serializer.serialize(&tree, &options.render);

        let stats = MapStats {
            files_analyzed: analyzed.files_analyzed,
            files_failed: analyzed.diagnostics.len(),
            nodes: analyzed.root.len(),
            output_size: self.serializer.estimate(&text),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            files = stats.files_analyzed,
            failed = stats.files_failed,
            nodes = stats.nodes,
            size = stats.output_size,
            "mapped repository in {}ms",
            stats.duration_ms
        );

        Ok(RepoMap {
            text,
            diagnostics: analyzed.diagnostics,
            stats,
        })
    }

    /// Discovers and analyzes every file of `repo` into one tree.
    ///
    /// Files that fail to analyze are left out and reported as diagnostics.
    pub fn analyze_repository(&self, repo: &Path, exclude: &[String]) -> Result<AnalyzedRepo> {
        if !repo.exists() {
            return Err(MapperError::NotFound(repo.to_path_buf()));
        }
        if !repo.is_dir() {
            return Err(MapperError::NotADirectory(repo.to_path_buf()));
        }

        let exclude = build_globset(exclude)?;
        let files = discover_files(repo, &exclude)?;
        debug!(files = files.len(), "discovered files");

        let mut assembler = TreeAssembler::new(repo_name(repo));
        let mut diagnostics = Vec::new();
        let mut files_analyzed = 0;

        for file in files {
            match self.analyzers.analyze_file(&file.path, &file.rel_path) {
                Ok(nodes) => {
                    debug!(file = %file.rel_path, nodes = nodes.len(), "analyzed");
                    assembler.add_file(&file.rel_path, nodes);
                    files_analyzed += 1;
                }
                Err(e) => {
                    warn!(file = %file.rel_path, error = %e, "skipping file");
                    diagnostics.push(Diagnostic {
                        path: file.rel_path,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(AnalyzedRepo {
            root: assembler.finish(),
            diagnostics,
            files_analyzed,
        })
    }

    /// Scores every node of an analyzed tree.
    pub fn score(&self, root: &CodeNode, focused: &[String], mentioned: &[String]) -> Scores {
        self.calculator.calculate_tree(root, focused, mentioned)
    }
}

/// Display name of the repository root.
fn repo_name(repo: &Path) -> String {
    repo.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| repo.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string())
}

/// Repository-relative key of a focus file.
///
/// `file` may be absolute or relative to `repo`. Existing files are resolved
/// through their canonical paths, so `..` segments and symlinked roots still
/// match. Files outside the repository have no key.
pub fn focus_key(repo: &Path, file: &Path) -> Option<String> {
    let candidate = if file.is_absolute() {
        file.to_path_buf()
    } else {
        repo.join(file)
    };
    if let (Ok(repo), Ok(file)) = (repo.canonicalize(), candidate.canonicalize()) {
        return relative_key(&repo, &file);
    }
    relative_key(repo, file)
}
