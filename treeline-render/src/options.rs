use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much of each node to render, in increasing cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Names and hierarchy only.
    Structure,
    /// Adds one-line declarations.
    #[default]
    Signatures,
    /// Adds documentation text.
    Docstrings,
    /// Adds complete bodies.
    FullCode,
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Structure => "structure",
            Self::Signatures => "signatures",
            Self::Docstrings => "docstrings",
            Self::FullCode => "full_code",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "structure" => Ok(Self::Structure),
            "signatures" => Ok(Self::Signatures),
            "docstrings" => Ok(Self::Docstrings),
            "full_code" | "full" | "code" => Ok(Self::FullCode),
            other => Err(format!(
                "unknown detail level '{other}' (expected structure, signatures, docstrings or full_code)"
            )),
        }
    }
}

/// Per-call rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub detail: DetailLevel,
    /// Nodes deeper than this are never rendered. The root is depth 0.
    pub max_depth: Option<usize>,
    /// Output size budget in estimator units.
    pub token_limit: Option<usize>,
}

impl RenderOptions {
    pub fn new(detail: DetailLevel) -> Self {
        Self {
            detail,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_token_limit(mut self, token_limit: Option<usize>) -> Self {
        self.token_limit = token_limit;
        self
    }
}
