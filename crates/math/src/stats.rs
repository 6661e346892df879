//! Sample moments.

use ndarray::{Array2, Axis};

use crate::MathError;

/// Unbiased sample variance (denominator `n - 1`).
///
/// # Errors
/// Returns `MathError::InsufficientObservations` for fewer than two values.
pub fn sample_variance(values: &[f64]) -> Result<f64, MathError> {
    let n = values.len();
    if n < 2 {
        return Err(MathError::InsufficientObservations { parameters: 1, observations: n });
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    Ok(values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64)
}

/// Unbiased sample covariance of the columns of a `(periods x variables)` matrix.
///
/// # Errors
/// Returns `MathError::InsufficientObservations` for fewer than two rows and
/// `MathError::NumericalInstability` if the sample holds non-finite values.
pub fn sample_covariance(sample: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let (n, k) = sample.dim();
    if n < 2 {
        return Err(MathError::InsufficientObservations { parameters: 1, observations: n });
    }
    if sample.iter().any(|x| !x.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite value in sample".to_string()));
    }

    let means = sample.mean_axis(Axis(0)).ok_or(MathError::EmptyData)?;
    let centered = sample - &means;
    let mut cov = centered.t().dot(&centered) / (n - 1) as f64;

    // Exact symmetry regardless of summation order.
    for i in 0..k {
        for j in (i + 1)..k {
            let avg = 0.5 * (cov[[i, j]] + cov[[j, i]]);
            cov[[i, j]] = avg;
            cov[[j, i]] = avg;
        }
    }
    Ok(cov)
}

/// Correlation matrix implied by a covariance matrix.
///
/// Variables with zero variance get `NaN` correlations off the diagonal.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the matrix is not square.
pub fn correlation_from_covariance(cov: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let (n, m) = cov.dim();
    if n != m {
        return Err(MathError::DimensionMismatch { expected: n, actual: m });
    }
    let std: Vec<f64> = (0..n).map(|i| cov[[i, i]].max(0.0).sqrt()).collect();
    Ok(Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j { 1.0 } else { cov[[i, j]] / (std[i] * std[j]) }
    }))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn variance_matches_hand_computation() {
        // mean 2.5, squared deviations 2.25 + 0.25 + 0.25 + 2.25 = 5, / 3
        assert_relative_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 5.0 / 3.0);
        assert!(sample_variance(&[1.0]).is_err());
    }

    #[test]
    fn covariance_of_perfectly_correlated_columns() {
        let sample = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let cov = sample_covariance(&sample).unwrap();
        assert_relative_eq!(cov[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cov[[1, 1]], 4.0, epsilon = 1e-12);
        assert_relative_eq!(cov[[0, 1]], 2.0, epsilon = 1e-12);
        assert_eq!(cov[[0, 1]], cov[[1, 0]]);

        let corr = correlation_from_covariance(&cov).unwrap();
        assert_relative_eq!(corr[[0, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn covariance_rejects_single_row_and_nan() {
        assert!(sample_covariance(&array![[1.0, 2.0]]).is_err());
        assert!(sample_covariance(&array![[1.0, f64::NAN], [2.0, 3.0]]).is_err());
    }
}
