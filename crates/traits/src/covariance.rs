//! Factor covariance estimation.

use ndarray::Array2;

/// Errors that can occur during covariance estimation.
#[derive(Debug, thiserror::Error)]
pub enum CovarianceError {
    /// Not enough observations.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Non-finite values in the input.
    #[error("non-finite value at row {row}, column {column}")]
    NonFinite {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },
}

/// Estimator of a covariance matrix from a `(periods x variables)` sample.
pub trait CovarianceEstimator: Send + Sync {
    /// Estimate the `(variables x variables)` covariance matrix.
    ///
    /// # Errors
    /// Returns `CovarianceError` if the sample is too small or contains
    /// non-finite values.
    fn estimate(&self, sample: &Array2<f64>) -> Result<Array2<f64>, CovarianceError>;
}
