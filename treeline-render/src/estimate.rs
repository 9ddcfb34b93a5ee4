//! Size estimation.
//!
//! Serializers never measure text themselves. They ask a `SizeEstimator`,
//! which may count characters, tokens, or anything else monotone in length.

/// Estimates the size of a piece of output.
pub trait SizeEstimator {
    fn estimate(&self, text: &str) -> usize;
}

impl<F> SizeEstimator for F
where
    F: Fn(&str) -> usize,
{
    fn estimate(&self, text: &str) -> usize {
        self(text)
    }
}

/// Roughly four characters per token.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimator;

impl SizeEstimator for CharEstimator {
    fn estimate(&self, text: &str) -> usize {
        (text.chars().count() + 3) / 4
    }
}
