//! Per-instrument factor loading estimation.

use std::collections::BTreeMap;

use carhart_math::{ordinary_least_squares, sample_variance};
use carhart_primitives::{Date, DateSeries, Factor, FactorReturns, Panel, Symbol};
use ndarray::{Array1, Array2, s};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{Context, Exclusion, ModelError, Stage};

/// Configuration for loading estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Minimum number of complete-case observations per instrument.
    pub min_observations: usize,
}

impl EstimatorConfig {
    /// Free parameters of each regression: the factors plus an intercept.
    pub const PARAMETERS: usize = Factor::COUNT + 1;

    /// Check that the sample always exceeds the parameter count.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if `min_observations` does not
    /// exceed the number of regression parameters.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.min_observations <= Self::PARAMETERS {
            return Err(ModelError::InvalidConfig(format!(
                "min_observations must exceed {}, got {}",
                Self::PARAMETERS,
                self.min_observations
            )));
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self { min_observations: Self::PARAMETERS + 1 }
    }
}

/// Outcome of one instrument's time-series regression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationResult {
    /// Instrument.
    pub symbol: Symbol,
    /// Intercept. Not part of the loading vector.
    pub alpha: f64,
    /// Loadings in [`Factor::ALL`] order.
    pub loadings: [f64; Factor::COUNT],
    /// Coefficient of determination.
    pub r_squared: f64,
    /// In-sample residuals on the dates used.
    pub residuals: DateSeries,
    /// Sample variance of the residuals (denominator `n - 1`).
    pub specific_variance: f64,
    /// Number of observations used.
    pub n_obs: usize,
}

impl EstimationResult {
    /// Loading on one factor.
    #[must_use]
    pub const fn loading(&self, factor: Factor) -> f64 {
        self.loadings[factor.index()]
    }

    /// Loading vector as an array.
    #[must_use]
    pub fn loading_vector(&self) -> Array1<f64> {
        Array1::from_iter(self.loadings)
    }
}

/// Successful fits and exclusions of one estimation pass.
#[derive(Debug, Clone, Default)]
pub struct Estimates {
    /// Results keyed by instrument.
    pub results: BTreeMap<Symbol, EstimationResult>,
    /// Instruments that could not be estimated.
    pub exclusions: Vec<Exclusion>,
}

impl Estimates {
    /// Estimated instruments in symbol order.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.results.keys().cloned().collect()
    }

    /// `(instruments x factors)` loading matrix in symbol order.
    #[must_use]
    pub fn loading_matrix(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.results.len(), Factor::COUNT));
        for (i, result) in self.results.values().enumerate() {
            out.row_mut(i).assign(&result.loading_vector());
        }
        out
    }

    /// Specific variances in symbol order.
    #[must_use]
    pub fn specific_variances(&self) -> Array1<f64> {
        self.results.values().map(|r| r.specific_variance).collect()
    }
}

/// Regresses each instrument's returns on the four factors with an intercept.
///
/// Each instrument uses the dates on which its own return and all four factor
/// returns are present.
#[derive(Debug, Clone, Default)]
pub struct FactorModelEstimator {
    config: EstimatorConfig,
}

impl FactorModelEstimator {
    /// Create an estimator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with custom configuration.
    #[must_use]
    pub const fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate the loadings of a single instrument.
    ///
    /// # Errors
    /// Returns `ModelError::InsufficientSample` when fewer than
    /// `min_observations` complete-case dates exist, and `ModelError::Math` if
    /// the design matrix is rank deficient.
    pub fn estimate_instrument(
        &self,
        symbol: &Symbol,
        returns: &DateSeries,
        factors: &FactorReturns,
    ) -> Result<EstimationResult, ModelError> {
        let context = || Context::stage(Stage::Estimation).with_symbol(symbol);

        let complete = factors.complete_dates();
        let dates: Vec<Date> =
            returns.dates().into_iter().filter(|d| complete.contains(d)).collect();
        let n_obs = dates.len();
        let required = self.config.min_observations.max(EstimatorConfig::PARAMETERS + 1);
        if n_obs < required {
            return Err(ModelError::InsufficientSample {
                context: context(),
                required,
                actual: n_obs,
            });
        }

        let (Some(y), Some(factor_matrix)) = (returns.values_at(&dates), factors.matrix(&dates))
        else {
            return Err(ModelError::MissingInputData {
                context: context(),
                detail: "complete-case date without a value".to_string(),
            });
        };

        let mut design = Array2::ones((n_obs, EstimatorConfig::PARAMETERS));
        design.slice_mut(s![.., 1..]).assign(&factor_matrix);

        let fit = ordinary_least_squares(&Array1::from_vec(y), &design)
            .map_err(|source| ModelError::Math { context: context(), source })?;
        let specific_variance = sample_variance(fit.residuals.as_slice().unwrap_or(&[]))
            .map_err(|source| ModelError::Math { context: context(), source })?;

        let mut loadings = [0.0; Factor::COUNT];
        for factor in Factor::ALL {
            loadings[factor.index()] = fit.coefficients[factor.index() + 1];
        }

        debug!(
            %symbol,
            n_obs,
            alpha = fit.coefficients[0],
            market = loadings[0],
            r_squared = fit.r_squared,
            "estimated loadings"
        );

        Ok(EstimationResult {
            symbol: symbol.clone(),
            alpha: fit.coefficients[0],
            loadings,
            r_squared: fit.r_squared,
            residuals: dates.iter().copied().zip(fit.residuals.iter().copied()).collect(),
            specific_variance,
            n_obs,
        })
    }

    /// Estimate every instrument of a returns panel in parallel.
    ///
    /// Instruments that fail are excluded and reported; results are gathered
    /// into a symbol-ordered map once all regressions finish.
    ///
    /// # Errors
    /// Returns `ModelError::MissingInputData` if no instrument survives.
    pub fn estimate_all(
        &self,
        returns: &Panel,
        factors: &FactorReturns,
    ) -> Result<Estimates, ModelError> {
        let symbols: Vec<Symbol> = returns.symbols().into_iter().collect();

        let outcomes: Vec<(Symbol, Result<EstimationResult, ModelError>)> = symbols
            .into_par_iter()
            .map(|symbol| {
                let outcome = self.estimate_instrument(&symbol, &returns.series(&symbol), factors);
                (symbol, outcome)
            })
            .collect();

        let mut estimates = Estimates::default();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    estimates.results.insert(symbol, result);
                }
                Err(err) => {
                    warn!(%symbol, error = %err, "excluding instrument from the model");
                    estimates.exclusions.push(err.to_exclusion());
                }
            }
        }

        if estimates.results.is_empty() {
            return Err(ModelError::MissingInputData {
                context: Context::stage(Stage::Estimation),
                detail: "no instrument could be estimated".to_string(),
            });
        }

        info!(
            estimated = estimates.results.len(),
            excluded = estimates.exclusions.len(),
            "estimated factor loadings"
        );
        Ok(estimates)
    }
}
