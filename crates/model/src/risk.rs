//! Covariance composition and parametric portfolio risk.

use carhart_math::{MathError, check_positive_semidefinite, is_symmetric, normal_quantile};
use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::info;

use crate::{Context, ModelError, Stage};

/// Configuration for risk aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    /// One-sided VaR confidence level.
    pub confidence: f64,
    /// Accepted deviation of the weight sum from one.
    pub weight_tolerance: f64,
    /// Relative tolerance of the symmetry and PSD checks.
    pub covariance_tolerance: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { confidence: 0.95, weight_tolerance: 1e-6, covariance_tolerance: 1e-10 }
    }
}

/// Split of portfolio variance into its factor and specific parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDecomposition {
    /// Portfolio factor exposures `Bᵀw`.
    pub exposures: Vec<f64>,
    /// `(Bᵀw)ᵀ F (Bᵀw)`.
    pub factor_variance: f64,
    /// `Σ w_i² s_i`.
    pub specific_variance: f64,
}

impl RiskDecomposition {
    /// Share of total variance explained by the factors.
    #[must_use]
    pub fn factor_share(&self) -> f64 {
        let total = self.factor_variance + self.specific_variance;
        if total > 0.0 { self.factor_variance / total } else { 0.0 }
    }
}

/// Portfolio risk under the composed covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    /// Total asset covariance `B F Bᵀ + diag(s)`.
    pub total_covariance: Array2<f64>,
    /// `wᵀ Σ w`.
    pub variance: f64,
    /// Square root of the variance.
    pub std_dev: f64,
    /// One-day parametric VaR as a return; negative.
    pub value_at_risk: f64,
    /// Confidence level of the VaR.
    pub confidence: f64,
    /// Factor and specific contributions.
    pub decomposition: RiskDecomposition,
}

/// Combines loadings, factor covariance and specific variances into asset
/// covariance and portfolio risk.
#[derive(Debug, Clone, Default)]
pub struct RiskAggregator {
    config: RiskConfig,
}

impl RiskAggregator {
    /// Create an aggregator at 95% confidence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator with custom configuration.
    #[must_use]
    pub const fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Compose `Σ = B F Bᵀ + diag(s)` and verify it.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` for inconsistent shapes and
    /// `ModelError::DegenerateCovariance` if `Σ` is non-finite, asymmetric or
    /// not positive semi-definite. The matrix is never repaired.
    pub fn total_covariance(
        &self,
        loadings: &Array2<f64>,
        factor_covariance: &Array2<f64>,
        specific_variance: &Array1<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        let context = || Context::stage(Stage::Aggregation);
        let (n, k) = loadings.dim();
        if factor_covariance.dim() != (k, k) {
            return Err(ModelError::DimensionMismatch {
                context: context(),
                expected: k,
                actual: factor_covariance.nrows(),
            });
        }
        if specific_variance.len() != n {
            return Err(ModelError::DimensionMismatch {
                context: context(),
                expected: n,
                actual: specific_variance.len(),
            });
        }

        let mut sigma = loadings.dot(factor_covariance).dot(&loadings.t());
        for (i, s) in specific_variance.iter().enumerate() {
            sigma[[i, i]] += s;
        }

        let degenerate =
            |detail: String| ModelError::DegenerateCovariance { context: context(), detail };
        if sigma.iter().any(|v| !v.is_finite()) {
            return Err(degenerate("non-finite entry".to_string()));
        }
        if !is_symmetric(&sigma, self.config.covariance_tolerance) {
            return Err(degenerate("not symmetric".to_string()));
        }
        check_positive_semidefinite(&sigma, self.config.covariance_tolerance).map_err(|e| match e {
            MathError::NumericalInstability(detail) => degenerate(detail),
            other => degenerate(other.to_string()),
        })?;
        Ok(sigma)
    }

    /// Portfolio variance, standard deviation and VaR for `weights`.
    ///
    /// `weights` must follow the row order of `loadings` and sum to one within
    /// tolerance. They are checked, never rescaled.
    ///
    /// # Errors
    /// Returns `ModelError::WeightNormalizationViolation` for weights that do
    /// not sum to one, `ModelError::InvalidConfig` for a confidence outside
    /// `(0, 1)`, and any error of [`Self::total_covariance`].
    pub fn assess(
        &self,
        loadings: &Array2<f64>,
        factor_covariance: &Array2<f64>,
        specific_variance: &Array1<f64>,
        weights: &Array1<f64>,
    ) -> Result<RiskAssessment, ModelError> {
        let confidence = self.config.confidence;
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "confidence must lie in (0, 1), got {confidence}"
            )));
        }
        if weights.len() != loadings.nrows() {
            return Err(ModelError::DimensionMismatch {
                context: Context::stage(Stage::Aggregation),
                expected: loadings.nrows(),
                actual: weights.len(),
            });
        }
        let sum = weights.sum();
        if !sum.is_finite() || (sum - 1.0).abs() > self.config.weight_tolerance {
            return Err(ModelError::WeightNormalizationViolation {
                sum,
                tolerance: self.config.weight_tolerance,
            });
        }

        let total_covariance =
            self.total_covariance(loadings, factor_covariance, specific_variance)?;
        let variance = weights.dot(&total_covariance.dot(weights));
        // PSD within tolerance; rounding may leave a tiny negative
        let std_dev = variance.max(0.0).sqrt();
        let z = normal_quantile(1.0 - confidence).map_err(|source| ModelError::Math {
            context: Context::stage(Stage::Aggregation),
            source,
        })?;
        let value_at_risk = z * std_dev;

        let exposure_vector = loadings.t().dot(weights);
        let decomposition = RiskDecomposition {
            exposures: exposure_vector.to_vec(),
            factor_variance: exposure_vector.dot(&factor_covariance.dot(&exposure_vector)),
            specific_variance: weights
                .iter()
                .zip(specific_variance.iter())
                .map(|(w, s)| w * w * s)
                .sum(),
        };

        info!(variance, std_dev, value_at_risk, confidence, "aggregated portfolio risk");
        Ok(RiskAssessment {
            total_covariance,
            variance,
            std_dev,
            value_at_risk,
            confidence,
            decomposition,
        })
    }
}
