//! Output budget accounting.
//!
//! A `Budget` is threaded through the traversal by value: every visit takes
//! the remaining budget and returns what is left after its subtree.

/// Remaining output size, or unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    remaining: Option<usize>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    pub fn limited(limit: usize) -> Self {
        Self {
            remaining: Some(limit),
        }
    }

    pub fn from_limit(limit: Option<usize>) -> Self {
        Self { remaining: limit }
    }

    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    /// True once nothing more may be emitted.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Whether a header of `size` may be emitted. Requires strictly less than
    /// the remaining amount, so an admitted header never exhausts the budget.
    pub fn admits(&self, size: usize) -> bool {
        self.remaining.map_or(true, |left| size < left)
    }

    /// Whether an optional block of `size` fits in what remains.
    pub fn fits(&self, size: usize) -> bool {
        self.remaining.map_or(true, |left| size <= left)
    }

    /// Subtracts an emitted `size`.
    #[must_use]
    pub fn spend(self, size: usize) -> Self {
        Self {
            remaining: self.remaining.map(|left| left.saturating_sub(size)),
        }
    }

    /// Marks the budget exhausted. Unlimited budgets cannot be exhausted.
    #[must_use]
    pub fn exhaust(self) -> Self {
        Self {
            remaining: self.remaining.map(|_| 0),
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_admits_everything() {
        let budget = Budget::unlimited();
        assert!(budget.admits(usize::MAX));
        assert!(budget.fits(usize::MAX));
        assert!(!budget.spend(1_000).is_exhausted());
        assert!(!budget.exhaust().is_exhausted());
    }

    #[test]
    fn test_admits_is_strict() {
        let budget = Budget::limited(5);
        assert!(budget.admits(4));
        assert!(!budget.admits(5));
        assert!(budget.fits(5));
        assert!(!budget.fits(6));
    }

    #[test]
    fn test_spend_saturates() {
        let budget = Budget::limited(3).spend(2);
        assert_eq!(budget.remaining(), Some(1));
        assert!(budget.spend(10).is_exhausted());
    }

    #[test]
    fn test_zero_budget_admits_nothing() {
        let budget = Budget::limited(0);
        assert!(budget.is_exhausted());
        assert!(!budget.admits(0));
        assert!(budget.fits(0));
    }
}
