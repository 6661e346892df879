//! Pipeline configuration.

use carhart_primitives::Date;
use carhart_styles::{MomentumConfig, StyleError, TercileConfig};
use serde::{Deserialize, Serialize};

use crate::{EstimatorConfig, FactorConfig, ModelError, RiskConfig, Stage};

/// How portfolio weights are reconciled with the estimated instruments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Drop weights of excluded instruments and rescale the rest to sum to one.
    #[default]
    Renormalize,
    /// Use the weights as given; a sum other than one is an error.
    Strict,
}

/// Configuration of a full pipeline run.
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Percentile of the lower tercile cut point.
    pub low_percentile: f64,
    /// Percentile of the upper tercile cut point.
    pub high_percentile: f64,
    /// Minimum instruments for a date to be classified.
    pub min_classification_count: usize,
    /// Momentum window in trading days.
    pub momentum_window: usize,
    /// Most recent days excluded from momentum.
    pub momentum_skip: usize,
    /// Daily funding rate deducted from the benchmark return.
    pub funding_rate: f64,
    /// Minimum complete-case observations per regression.
    pub min_regression_observations: usize,
    /// VaR confidence level.
    pub confidence: f64,
    /// Accepted deviation of the weight sum from one.
    pub weight_tolerance: f64,
    /// Relative tolerance of the covariance checks.
    pub covariance_tolerance: f64,
    /// Date whose weights define the portfolio; latest available when unset.
    pub weight_date: Option<Date>,
    /// Reconciliation of weights with estimated instruments.
    pub weight_policy: WeightPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let tercile = TercileConfig::default();
        let momentum = MomentumConfig::default();
        let risk = RiskConfig::default();
        Self {
            low_percentile: tercile.low_percentile,
            high_percentile: tercile.high_percentile,
            min_classification_count: tercile.min_observations,
            momentum_window: momentum.window,
            momentum_skip: momentum.skip,
            funding_rate: FactorConfig::default().funding_rate,
            min_regression_observations: EstimatorConfig::default().min_observations,
            confidence: risk.confidence,
            weight_tolerance: risk.weight_tolerance,
            covariance_tolerance: risk.covariance_tolerance,
            weight_date: None,
            weight_policy: WeightPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns `ModelError::ConfigFile` on malformed TOML and
    /// `ModelError::InvalidConfig` if a value is out of range.
    pub fn from_toml_str(s: &str) -> Result<Self, ModelError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Tercile classification settings.
    #[must_use]
    pub const fn tercile(&self) -> TercileConfig {
        TercileConfig {
            low_percentile: self.low_percentile,
            high_percentile: self.high_percentile,
            min_observations: self.min_classification_count,
        }
    }

    /// Momentum settings.
    #[must_use]
    pub const fn momentum(&self) -> MomentumConfig {
        MomentumConfig { window: self.momentum_window, skip: self.momentum_skip }
    }

    /// Factor construction settings.
    #[must_use]
    pub const fn factors(&self) -> FactorConfig {
        FactorConfig { funding_rate: self.funding_rate }
    }

    /// Regression settings.
    #[must_use]
    pub const fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig { min_observations: self.min_regression_observations }
    }

    /// Risk aggregation settings.
    #[must_use]
    pub const fn risk(&self) -> RiskConfig {
        RiskConfig {
            confidence: self.confidence,
            weight_tolerance: self.weight_tolerance,
            covariance_tolerance: self.covariance_tolerance,
        }
    }

    /// Check every component setting.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ModelError> {
        let style = |stage: Stage| move |source: StyleError| ModelError::Style { stage, source };
        self.tercile().validate().map_err(style(Stage::Classification))?;
        self.momentum().validate().map_err(style(Stage::Momentum))?;
        self.estimator().validate()?;

        if !self.funding_rate.is_finite() {
            return Err(ModelError::InvalidConfig("funding_rate must be finite".into()));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "confidence must lie in (0, 1), got {}",
                self.confidence
            )));
        }
        if !(self.weight_tolerance >= 0.0 && self.covariance_tolerance >= 0.0) {
            return Err(ModelError::InvalidConfig("tolerances must be non-negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.low_percentile, 0.3);
        assert_eq!(config.high_percentile, 0.7);
        assert_eq!(config.min_classification_count, 3);
        assert_eq!(config.momentum_window, 252);
        assert_eq!(config.momentum_skip, 1);
        assert_eq!(config.funding_rate, 0.0001);
        assert_eq!(config.min_regression_observations, 6);
        assert_eq!(config.confidence, 0.95);
        assert_eq!(config.weight_date, None);
        assert_eq!(config.weight_policy, WeightPolicy::Renormalize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = PipelineConfig::from_toml_str(
            r#"
            confidence = 0.99
            funding_rate = 0.0
            weight_date = "2024-06-28"
            weight_policy = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.confidence, 0.99);
        assert_eq!(config.funding_rate, 0.0);
        assert_eq!(config.weight_date, NaiveDate::from_ymd_opt(2024, 6, 28));
        assert_eq!(config.weight_policy, WeightPolicy::Strict);
        assert_eq!(config.momentum_window, 252);
    }

    #[test]
    fn invalid_toml_values_are_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml_str("confidence = 1.5"),
            Err(ModelError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("momentum_window = 0"),
            Err(ModelError::Style { stage: Stage::Momentum, .. })
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("momentum_skip = 9223372036854775807"),
            Err(ModelError::Style { stage: Stage::Momentum, .. })
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("confidence = \"high\""),
            Err(ModelError::ConfigFile(_))
        ));
    }
}
