use super::{normalize, weight_of};
use crate::graph::ReferenceGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use treeline_core::Scores;

/// Scores vertices by how often they are referenced and how close they sit
/// to the important set.
///
/// Per vertex `v`:
///
/// ```text
/// raw(v)   = in(v) * ref_weight + out(v) * outref_weight
///          + in_from_important(v) * important_ref_boost
/// score(v) = raw(v) * weights[v] + sum over s of distance_decay ^ hops(s, v)
/// ```
///
/// and the result is divided by its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceScorer {
    /// Weight per incoming edge.
    pub ref_weight: f64,
    /// Weight per outgoing edge.
    pub outref_weight: f64,
    /// Extra weight per incoming edge from an important vertex.
    pub important_ref_boost: f64,
    /// Per-hop decay of the distance term.
    pub distance_decay: f64,
}

impl Default for ReferenceScorer {
    fn default() -> Self {
        Self {
            ref_weight: 1.0,
            outref_weight: 0.5,
            important_ref_boost: 2.0,
            distance_decay: 0.5,
        }
    }
}

impl ReferenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(
        &self,
        graph: &ReferenceGraph,
        important: &BTreeSet<String>,
        weights: &HashMap<String, f64>,
    ) -> Scores {
        let important_ids: Vec<_> = important.iter().filter_map(|p| graph.vertex(p)).collect();

        let mut raw = vec![0.0; graph.node_count()];
        for id in graph.vertex_ids() {
            let mut score = graph.in_degree(id) as f64 * self.ref_weight
                + graph.out_degree(id) as f64 * self.outref_weight;

            if !important_ids.is_empty() {
                let boosted = graph
                    .incoming(id)
                    .filter(|(source, _)| important_ids.contains(source))
                    .count();
                score += boosted as f64 * self.important_ref_boost;
            }

            if let Some(path) = graph.path(id) {
                score *= weight_of(weights, path);
            }
            raw[id.index()] = score;
        }

        for source in important {
            match graph.hop_distances(source) {
                Ok(distances) => {
                    for (id, hops) in distances {
                        raw[id.index()] += self.distance_decay.powi(hops as i32);
                    }
                }
                Err(e) => debug!(source = %source, error = %e, "skipping distance term"),
            }
        }

        let mut scores: Scores = graph
            .vertex_ids()
            .filter_map(|id| Some((graph.path(id)?.to_string(), raw[id.index()])))
            .collect();
        normalize(&mut scores);
        scores
    }
}
