//! Factor covariance estimation.

use carhart_math::{correlation_from_covariance, sample_covariance};
use carhart_primitives::{Date, FactorReturns};
use carhart_traits::{CovarianceError, CovarianceEstimator};
use ndarray::Array2;
use tracing::info;

use crate::{Context, ModelError, Stage};

/// Unbiased sample covariance (denominator `n - 1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCovariance;

impl CovarianceEstimator for SampleCovariance {
    fn estimate(&self, sample: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let (rows, _) = sample.dim();
        if rows < 2 {
            return Err(CovarianceError::InsufficientData { required: 2, actual: rows });
        }
        if let Some(((row, column), _)) = sample.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(CovarianceError::NonFinite { row, column });
        }
        sample_covariance(sample)
            .map_err(|_| CovarianceError::InsufficientData { required: 2, actual: rows })
    }
}

/// Factor covariance and correlation over the factors' common dates.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorCovariance {
    /// `(factors x factors)` covariance.
    pub covariance: Array2<f64>,
    /// Implied correlation.
    pub correlation: Array2<f64>,
    /// Dates of the sample.
    pub dates: Vec<Date>,
}

impl FactorCovariance {
    /// Estimate from the dates on which all four factors are present.
    ///
    /// # Errors
    /// Returns `ModelError::Covariance` if the estimator rejects the sample.
    pub fn estimate(
        estimator: &dyn CovarianceEstimator,
        factors: &FactorReturns,
    ) -> Result<Self, ModelError> {
        let dates: Vec<Date> = factors.complete_dates().into_iter().collect();
        let sample = factors.matrix(&dates).ok_or_else(|| ModelError::MissingInputData {
            context: Context::stage(Stage::Covariance),
            detail: "factor value missing on a complete date".to_string(),
        })?;

        let covariance = estimator.estimate(&sample)?;
        let correlation = correlation_from_covariance(&covariance)
            .map_err(|source| ModelError::Math {
                context: Context::stage(Stage::Covariance),
                source,
            })?;

        info!(observations = dates.len(), "estimated factor covariance");
        Ok(Self { covariance, correlation, dates })
    }
}
