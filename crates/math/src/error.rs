//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid percentile value.
    #[error("invalid percentile: {0} (must be in [0, 1])")]
    InvalidPercentile(f64),

    /// Invalid probability for a quantile function.
    #[error("invalid probability: {0} (must be in (0, 1))")]
    InvalidProbability(f64),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Fewer observations than the operation needs.
    #[error("insufficient observations: need more than {parameters}, got {observations}")]
    InsufficientObservations {
        /// Number of free parameters (or minimum count).
        parameters: usize,
        /// Number of observations supplied.
        observations: usize,
    },

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Numerical instability (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MathError::InvalidPercentile(1.6);
        assert!(err.to_string().contains("1.6"));

        let err = MathError::DimensionMismatch { expected: 10, actual: 5 };
        assert!(err.to_string().contains("10") && err.to_string().contains("5"));

        let err = MathError::InsufficientObservations { parameters: 5, observations: 4 };
        assert_eq!(err.to_string(), "insufficient observations: need more than 5, got 4");
    }
}
