//! Portfolio weight vectors.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Portfolio weights aligned to an ordered list of instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioWeights {
    symbols: Vec<Symbol>,
    #[serde(skip)]
    weights: Array1<f64>,
}

impl PortfolioWeights {
    /// Create weights for `symbols`.
    #[must_use]
    pub fn new(symbols: Vec<Symbol>, weights: Array1<f64>) -> Self {
        debug_assert_eq!(symbols.len(), weights.len());
        Self { symbols, weights }
    }

    /// Instruments, in weight order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Weight vector.
    #[must_use]
    pub const fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.sum()
    }

    /// Whether the weights sum to one within `tolerance`.
    #[must_use]
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total() - 1.0).abs() <= tolerance
    }

    /// Weights rescaled to sum to one. Returns `None` when the total is not positive.
    #[must_use]
    pub fn renormalized(&self) -> Option<Self> {
        let total = self.total();
        (total > 0.0 && total.is_finite())
            .then(|| Self { symbols: self.symbols.clone(), weights: &self.weights / total })
    }

    /// Weight of one instrument.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.symbols.iter().position(|s| s == symbol).map(|i| self.weights[i])
    }

    /// Number of instruments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn normalization_check_and_rescale() {
        let w = PortfolioWeights::new(vec!["A".into(), "B".into()], array![0.3, 0.3]);
        assert!(!w.is_normalized(1e-9));

        let n = w.renormalized().unwrap();
        assert!(n.is_normalized(1e-12));
        assert!((n.get(&"A".into()).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn renormalize_rejects_zero_total() {
        let w = PortfolioWeights::new(vec!["A".into()], array![0.0]);
        assert!(w.renormalized().is_none());
    }
}
