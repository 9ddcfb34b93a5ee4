//! Mapper configuration.
//!
//! Settings are read from `<repo>/.treeline/config.json`, falling back to
//! `<user config dir>/treeline/config.json` and then to built-in defaults.
//! Missing keys take their default value.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use treeline_graph::{ImportanceCalculator, PageRankScorer, ReferenceScorer, Scorer, ScorerKind};
use treeline_render::{DetailLevel, Format, RenderOptions};

/// Directory holding per-repository state.
pub const CONFIG_DIR: &str = ".treeline";

pub const CONFIG_FILE: &str = "config.json";

pub const CONFIG_VERSION: &str = "1.0";

/// Default output budget.
pub const DEFAULT_TOKEN_LIMIT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub version: String,
    pub scorer: ScorerKind,
    pub reference: ReferenceScorer,
    pub pagerank: PageRankScorer,
    pub format: Format,
    pub detail: DetailLevel,
    pub token_limit: Option<usize>,
    pub max_depth: Option<usize>,
    /// Globs matched against repository-relative paths.
    pub exclude: Vec<String>,
    /// Priority multipliers by node path.
    pub priorities: BTreeMap<String, f64>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            scorer: ScorerKind::default(),
            reference: ReferenceScorer::default(),
            pagerank: PageRankScorer::default(),
            format: Format::default(),
            detail: DetailLevel::default(),
            token_limit: Some(DEFAULT_TOKEN_LIMIT),
            max_depth: None,
            exclude: vec![
                "**/__pycache__/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/*.lock".to_string(),
            ],
            priorities: BTreeMap::new(),
        }
    }
}

impl MapperConfig {
    /// Path of the repository-local config file.
    pub fn local_path(repo: &Path) -> PathBuf {
        repo.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Path of the per-user config file, if the platform has a config dir.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("treeline").join(CONFIG_FILE))
    }

    /// Loads the config that applies to `repo`.
    pub fn load(repo: &Path) -> Result<Self, ConfigError> {
        let candidates = std::iter::once(Self::local_path(repo)).chain(Self::user_path());
        for path in candidates {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::from_file(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes this config to `path` as pretty JSON, creating parent dirs.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The scorer selected by `scorer`, with its configured parameters.
    pub fn scorer(&self) -> Scorer {
        Scorer::from_kind(self.scorer, self.reference, self.pagerank)
    }

    pub fn calculator(&self) -> ImportanceCalculator {
        ImportanceCalculator::new(self.scorer())
            .with_weights(self.priorities.clone().into_iter().collect())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.detail)
            .with_max_depth(self.max_depth)
            .with_token_limit(self.token_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: MapperConfig =
            serde_json::from_str(r#"{ "scorer": "pagerank", "format": "tree" }"#).unwrap();

        assert_eq!(config.scorer, ScorerKind::PageRank);
        assert_eq!(config.format, Format::Tree);
        assert_eq!(config.detail, DetailLevel::Signatures);
        assert_eq!(config.token_limit, Some(DEFAULT_TOKEN_LIMIT));
        assert_eq!(config.reference, ReferenceScorer::default());
    }

    #[test]
    fn test_nested_scorer_parameters() {
        let config: MapperConfig = serde_json::from_str(
            r#"{ "reference": { "distance_decay": 0.25 }, "pagerank": { "damping": 0.5 } }"#,
        )
        .unwrap();

        assert_eq!(config.reference.distance_decay, 0.25);
        assert_eq!(config.reference.ref_weight, 1.0);
        assert_eq!(config.pagerank.damping, 0.5);
        assert_eq!(config.pagerank.max_iterations, 100);
    }

    #[test]
    fn test_save_and_load_local() {
        let dir = tempdir().unwrap();
        let mut config = MapperConfig::default();
        config.detail = DetailLevel::Docstrings;
        config.priorities.insert("src/core.py".to_string(), 2.0);

        config.save(&MapperConfig::local_path(dir.path())).unwrap();
        let loaded = MapperConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = MapperConfig::local_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            MapperConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_render_options_follow_config() {
        let config = MapperConfig {
            max_depth: Some(3),
            token_limit: None,
            ..MapperConfig::default()
        };
        let options = config.render_options();
        assert_eq!(options.max_depth, Some(3));
        assert_eq!(options.token_limit, None);
        assert_eq!(options.detail, DetailLevel::Signatures);
    }
}
