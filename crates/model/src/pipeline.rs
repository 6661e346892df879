//! End-to-end risk model pipeline.

use carhart_primitives::{Date, DateSeries, Panel, PortfolioWeights, Symbol};
use carhart_styles::{BookToMarket, MomentumEngine, ReturnSeries, TercileClassifier};
use carhart_traits::{MarketData, MarketDataProvider, MetricInputs};
use ndarray::Array1;
use tracing::{info, warn};

use crate::{
    Context, Estimates, Exclusion, FactorBuilder, FactorCovariance, FactorInputs,
    FactorModelEstimator, ModelError, PipelineConfig, RiskAggregator, RiskReport,
    SampleCovariance, Stage, WeightPolicy,
};

/// Runs returns, classification, factor construction, estimation and risk
/// aggregation in order.
///
/// A run is a pure function of the loaded data and the configuration: the
/// same inputs always produce the same report.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with custom configuration.
    #[must_use]
    pub const fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load data from `provider` and run the model.
    ///
    /// # Errors
    /// Returns `ModelError::Provider` if loading fails, otherwise any error of
    /// [`Self::run_on`].
    pub fn run(&self, provider: &dyn MarketDataProvider) -> Result<RiskReport, ModelError> {
        let data = provider.load()?;
        info!(provider = provider.name(), "loaded market data");
        self.run_on(&data)
    }

    /// Run the model on already loaded data.
    ///
    /// # Errors
    /// Returns `ModelError` for invalid configuration, missing inputs, an
    /// empty estimation universe, a degenerate covariance or unusable weights.
    pub fn run_on(&self, data: &MarketData) -> Result<RiskReport, ModelError> {
        self.config.validate()?;
        data.validate()?;
        info!(
            instruments = data.universe().len(),
            dates = data.prices.n_dates(),
            "starting risk model run"
        );

        let mut exclusions = Vec::new();
        let returns = ReturnSeries::compute(&data.prices, &data.benchmark);
        Self::check_returns(data, &returns, &mut exclusions)?;
        info!(
            dates = returns.instruments().n_dates(),
            benchmark_dates = returns.benchmark().len(),
            "computed daily returns"
        );

        let inputs = MetricInputs {
            returns: returns.instruments(),
            market_caps: &data.market_caps,
            book_equity: &data.book_equity,
        };
        let classifier = TercileClassifier::with_config(self.config.tercile());
        let style = |stage: Stage| move |source| ModelError::Style { stage, source };
        let value =
            classifier.classify(&BookToMarket, &inputs).map_err(style(Stage::Classification))?;
        let momentum_engine = MomentumEngine::with_config(self.config.momentum());
        let momentum =
            classifier.classify(&momentum_engine, &inputs).map_err(style(Stage::Momentum))?;
        let classified = [(Stage::Classification, &value), (Stage::Momentum, &momentum)];
        for (stage, classification) in classified {
            exclusions.extend(classification.undefined_dates().iter().map(|date| Exclusion {
                context: Context::stage(stage).with_date(*date),
                reason: "too few values to classify date".to_string(),
            }));
        }
        info!(
            value_dates = value.dates().len(),
            momentum_dates = momentum.dates().len(),
            "classified instruments"
        );

        let factor_inputs = FactorInputs {
            returns: returns.instruments(),
            benchmark_returns: returns.benchmark(),
            market_caps: &data.market_caps,
            value: &value,
            momentum: &momentum,
        };
        let factors = FactorBuilder::with_config(self.config.factors()).build(&factor_inputs)?;
        for (date, absent) in FactorBuilder::gaps(&factor_inputs, &factors) {
            let names: Vec<&str> = absent.iter().map(|f| f.name()).collect();
            exclusions.push(Exclusion {
                context: Context::stage(Stage::Factors).with_date(date),
                reason: format!("factor absent: {}", names.join(", ")),
            });
        }

        let estimates = FactorModelEstimator::with_config(self.config.estimator())
            .estimate_all(returns.instruments(), &factors)?;
        let factor_covariance = FactorCovariance::estimate(&SampleCovariance, &factors)?;

        exclusions.extend(estimates.exclusions.iter().cloned());
        let (weight_date, weights) =
            self.select_weights(&data.weights, &estimates, &mut exclusions)?;

        let risk = RiskAggregator::with_config(self.config.risk()).assess(
            &estimates.loading_matrix(),
            &factor_covariance.covariance,
            &estimates.specific_variances(),
            weights.weights(),
        )?;

        let portfolio_returns = portfolio_returns(returns.instruments(), &weights);
        info!(
            instruments = weights.len(),
            excluded = exclusions.len(),
            var = risk.value_at_risk,
            "risk model run complete"
        );

        Ok(RiskReport {
            symbols: estimates.symbols(),
            loadings: estimates.loading_matrix(),
            specific_variance: estimates.specific_variances(),
            estimates: estimates.results,
            factor_returns: factors,
            factor_covariance: factor_covariance.covariance,
            factor_correlation: factor_covariance.correlation,
            weight_date,
            weights,
            risk,
            portfolio_returns,
            returns: returns.instruments().clone(),
            exclusions,
        })
    }

    /// Fail on empty return series and flag instruments without any return.
    fn check_returns(
        data: &MarketData,
        returns: &ReturnSeries,
        exclusions: &mut Vec<Exclusion>,
    ) -> Result<(), ModelError> {
        let missing = |detail: &str| ModelError::MissingInputData {
            context: Context::stage(Stage::Returns),
            detail: detail.to_string(),
        };
        if returns.instruments().is_empty() {
            return Err(missing("no instrument has two consecutive prices"));
        }
        if returns.benchmark().is_empty() {
            return Err(missing("benchmark has fewer than two prices"));
        }

        let with_returns = returns.instruments().symbols();
        for symbol in data.universe().iter().filter(|s| !with_returns.contains(*s)) {
            warn!(%symbol, "instrument has no daily return");
            exclusions.push(Exclusion {
                context: Context::stage(Stage::Returns).with_symbol(symbol),
                reason: "no daily return: fewer than two consecutive prices".to_string(),
            });
        }
        Ok(())
    }

    /// Portfolio weights of the estimated instruments on the configured date.
    ///
    /// The row as supplied must sum to one within tolerance under either
    /// policy. Renormalization only compensates for instruments dropped by
    /// the model and is recorded as an exclusion.
    fn select_weights(
        &self,
        weights: &Panel,
        estimates: &Estimates,
        exclusions: &mut Vec<Exclusion>,
    ) -> Result<(Date, PortfolioWeights), ModelError> {
        let context = || Context::stage(Stage::Aggregation);
        let date = match self.config.weight_date {
            Some(date) => date,
            None => weights.dates().last().copied().ok_or_else(|| ModelError::MissingInputData {
                context: context(),
                detail: "no portfolio weights".to_string(),
            })?,
        };
        let row = weights.cross_section(date).ok_or_else(|| ModelError::MissingInputData {
            context: context().with_date(date),
            detail: "no portfolio weights on weight date".to_string(),
        })?;

        let symbols = estimates.symbols();
        let mut values = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let weight = row.get(symbol).ok_or_else(|| ModelError::MissingInputData {
                context: context().with_symbol(symbol).with_date(date),
                detail: "no portfolio weight for estimated instrument".to_string(),
            })?;
            values.push(weight);
        }

        let tolerance = self.config.weight_tolerance;
        let supplied: f64 = row.values().iter().sum();
        if !supplied.is_finite() || (supplied - 1.0).abs() > tolerance {
            return Err(ModelError::WeightNormalizationViolation { sum: supplied, tolerance });
        }

        for (symbol, weight) in row.iter() {
            if weight != 0.0 && !estimates.results.contains_key(symbol) {
                warn!(%symbol, weight, "dropping weight of instrument without estimates");
                exclusions.push(Exclusion {
                    context: context().with_symbol(symbol).with_date(date),
                    reason: format!("weight {weight} dropped: instrument not estimated"),
                });
            }
        }

        let portfolio = PortfolioWeights::new(symbols, Array1::from_vec(values));
        let portfolio = match self.config.weight_policy {
            WeightPolicy::Strict => portfolio,
            WeightPolicy::Renormalize if portfolio.is_normalized(tolerance) => portfolio,
            WeightPolicy::Renormalize => {
                let total = portfolio.total();
                let violation =
                    || ModelError::WeightNormalizationViolation { sum: total, tolerance };
                let renormalized = portfolio.renormalized().ok_or_else(violation)?;
                let scale = 1.0 / total;
                warn!(total, scale, "renormalizing weights of estimated instruments");
                exclusions.push(Exclusion {
                    context: context().with_date(date),
                    reason: format!("estimated weights summed to {total:.6}, scaled by {scale:.6}"),
                });
                renormalized
            }
        };
        Ok((date, portfolio))
    }
}

/// Daily return of a fixed-weight portfolio.
///
/// Defined on dates where every instrument with a non-zero weight has a return.
#[must_use]
pub fn portfolio_returns(returns: &Panel, weights: &PortfolioWeights) -> DateSeries {
    let held: Vec<(&Symbol, f64)> = weights
        .symbols()
        .iter()
        .zip(weights.weights().iter().copied())
        .filter(|(_, w)| *w != 0.0)
        .collect();
    returns
        .iter()
        .filter_map(|(date, xs)| {
            held.iter()
                .try_fold(0.0, |acc, (symbol, w)| xs.get(symbol).map(|r| acc + w * r))
                .map(|r| (date, r))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn portfolio_returns_need_every_holding() {
        let (a, b) = (Symbol::from("A"), Symbol::from("B"));
        let mut returns = Panel::new();
        returns.insert(day(1), a.clone(), 0.02);
        returns.insert(day(1), b.clone(), -0.01);
        returns.insert(day(2), a.clone(), 0.01);
        let weights = PortfolioWeights::new(vec![a, b], Array1::from_vec(vec![0.25, 0.75]));

        let series = portfolio_returns(&returns, &weights);

        assert_eq!(series.len(), 1);
        let expected = 0.25 * 0.02 - 0.75 * 0.01;
        assert_relative_eq!(series.get(day(1)).unwrap(), expected, epsilon = 1e-15);
    }

    #[test]
    fn zero_weights_do_not_require_returns() {
        let (a, b) = (Symbol::from("A"), Symbol::from("B"));
        let mut returns = Panel::new();
        returns.insert(day(2), a.clone(), 0.01);
        let weights = PortfolioWeights::new(vec![a, b], Array1::from_vec(vec![1.0, 0.0]));
        assert_relative_eq!(portfolio_returns(&returns, &weights).get(day(2)).unwrap(), 0.01);
    }
}
