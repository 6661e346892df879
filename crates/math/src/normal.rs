//! Standard normal quantile.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::MathError;

/// Inverse CDF of the standard normal distribution.
///
/// # Errors
/// Returns `MathError::InvalidProbability` unless `0 < p < 1`.
pub fn normal_quantile(p: f64) -> Result<f64, MathError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(MathError::InvalidProbability(p));
    }
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::NumericalInstability(format!("standard normal: {e}")))?;
    Ok(standard.inverse_cdf(p))
}
