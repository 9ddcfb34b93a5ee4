//! Importance scorers over the reference graph.
//!
//! Two strategies are available and selected by configuration:
//! - [`ReferenceScorer`]: degree counts, important-source boost and a
//!   distance decay around the focus set, normalized to `[0, 1]`
//! - [`PageRankScorer`]: personalized PageRank by power iteration

mod pagerank;
mod reference;

pub use pagerank::PageRankScorer;
pub use reference::ReferenceScorer;

use crate::graph::ReferenceGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use treeline_core::Scores;

/// The active scoring strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Scorer {
    Reference(ReferenceScorer),
    PageRank(PageRankScorer),
}

impl Default for Scorer {
    fn default() -> Self {
        Scorer::Reference(ReferenceScorer::default())
    }
}

impl Scorer {
    /// Builds the scorer selected by `kind` from its parameter set.
    pub fn from_kind(kind: ScorerKind, reference: ReferenceScorer, pagerank: PageRankScorer) -> Self {
        match kind {
            ScorerKind::Reference => Scorer::Reference(reference),
            ScorerKind::PageRank => Scorer::PageRank(pagerank),
        }
    }

    pub fn kind(&self) -> ScorerKind {
        match self {
            Scorer::Reference(_) => ScorerKind::Reference,
            Scorer::PageRank(_) => ScorerKind::PageRank,
        }
    }

    /// Scores every vertex of `graph`.
    ///
    /// `important` holds focus vertex paths; `weights` maps paths to
    /// priority multipliers. Paths that are not vertices are ignored.
    pub fn score(
        &self,
        graph: &ReferenceGraph,
        important: &BTreeSet<String>,
        weights: &HashMap<String, f64>,
    ) -> Scores {
        match self {
            Scorer::Reference(scorer) => scorer.score(graph, important, weights),
            Scorer::PageRank(scorer) => scorer.score(graph, important, weights),
        }
    }
}

/// Names the scoring strategies for configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Reference,
    PageRank,
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerKind::Reference => write!(f, "reference"),
            ScorerKind::PageRank => write!(f, "pagerank"),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(ScorerKind::Reference),
            "pagerank" | "rank" => Ok(ScorerKind::PageRank),
            other => Err(format!("unknown scorer '{other}' (expected reference or pagerank)")),
        }
    }
}

/// Divides every score by the maximum. All zero when the maximum is not positive.
pub(crate) fn normalize(scores: &mut Scores) {
    let max = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 && max.is_finite() {
        for score in scores.values_mut() {
            *score /= max;
        }
    } else {
        for score in scores.values_mut() {
            *score = 0.0;
        }
    }
}

/// Priority multiplier for a vertex path, 1.0 when absent.
pub(crate) fn weight_of(weights: &HashMap<String, f64>, path: &str) -> f64 {
    weights.get(path).copied().unwrap_or(1.0)
}
