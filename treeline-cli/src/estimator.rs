//! Token counting for the command line.

use tiktoken_rs::CoreBPE;
use tracing::warn;
use treeline_render::{CharEstimator, SizeEstimator};

/// Counts cl100k tokens.
pub struct TiktokenEstimator {
    bpe: CoreBPE,
}

impl TiktokenEstimator {
    pub fn cl100k() -> Result<Self, String> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| e.to_string())?;
        Ok(Self { bpe })
    }
}

impl SizeEstimator for TiktokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// The estimator used by the commands.
pub enum Estimator {
    Tokens(TiktokenEstimator),
    Chars(CharEstimator),
}

impl Estimator {
    /// The tokenizer if it loads, the character heuristic otherwise.
    pub fn load() -> Self {
        match TiktokenEstimator::cl100k() {
            Ok(estimator) => Self::Tokens(estimator),
            Err(e) => {
                warn!(error = %e, "tokenizer unavailable, estimating by characters");
                Self::Chars(CharEstimator)
            }
        }
    }
}

impl SizeEstimator for Estimator {
    fn estimate(&self, text: &str) -> usize {
        match self {
            Self::Tokens(tokens) => tokens.estimate(text),
            Self::Chars(chars) => chars.estimate(text),
        }
    }
}
