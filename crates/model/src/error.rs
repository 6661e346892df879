//! Error types for the risk model pipeline.

use std::fmt;

use carhart_math::MathError;
use carhart_primitives::{Date, Symbol};
use carhart_styles::StyleError;
use carhart_traits::{CovarianceError, ProviderError};
use serde::Serialize;

/// Pipeline stage at which a condition was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Loading inputs from the provider.
    Input,
    /// Daily return computation.
    Returns,
    /// Tercile classification.
    Classification,
    /// Momentum computation.
    Momentum,
    /// Factor-return construction.
    Factors,
    /// Per-instrument loading estimation.
    Estimation,
    /// Factor covariance estimation.
    Covariance,
    /// Covariance composition and portfolio risk.
    Aggregation,
}

impl Stage {
    /// Lowercase stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Returns => "returns",
            Self::Classification => "classification",
            Self::Momentum => "momentum",
            Self::Factors => "factors",
            Self::Estimation => "estimation",
            Self::Covariance => "covariance",
            Self::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an error or exclusion arose: stage plus optional date and instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    /// Pipeline stage.
    pub stage: Stage,
    /// Affected date, if specific to one.
    pub date: Option<Date>,
    /// Affected instrument, if specific to one.
    pub symbol: Option<Symbol>,
}

impl Context {
    /// Context of a whole stage.
    #[must_use]
    pub const fn stage(stage: Stage) -> Self {
        Self { stage, date: None, symbol: None }
    }

    /// Attach an instrument.
    #[must_use]
    pub fn with_symbol(mut self, symbol: &Symbol) -> Self {
        self.symbol = Some(symbol.clone());
        self
    }

    /// Attach a date.
    #[must_use]
    pub const fn with_date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage={}", self.stage)?;
        if let Some(symbol) = &self.symbol {
            write!(f, " symbol={symbol}")?;
        }
        if let Some(date) = &self.date {
            write!(f, " date={date}")?;
        }
        Ok(())
    }
}

/// An instrument or date left out of the model, carried in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    /// Where the exclusion happened.
    pub context: Context,
    /// Why.
    pub reason: String,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.context, self.reason)
    }
}

/// Errors that can occur while building the risk model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A required value is absent.
    #[error("[{context}] missing input data: {detail}")]
    MissingInputData {
        /// Location.
        context: Context,
        /// What is missing.
        detail: String,
    },

    /// Too few observations for a regression or classification.
    #[error("[{context}] insufficient sample: need at least {required} observations, got {actual}")]
    InsufficientSample {
        /// Location.
        context: Context,
        /// Minimum number of observations.
        required: usize,
        /// Observations available.
        actual: usize,
    },

    /// The composed covariance is non-finite, asymmetric or indefinite.
    #[error("[{context}] degenerate covariance: {detail}")]
    DegenerateCovariance {
        /// Location.
        context: Context,
        /// Which check failed.
        detail: String,
    },

    /// Portfolio weights do not sum to one.
    #[error("[stage=aggregation] weights sum to {sum}, expected 1 within {tolerance}")]
    WeightNormalizationViolation {
        /// Actual sum of the weights.
        sum: f64,
        /// Accepted deviation from one.
        tolerance: f64,
    },

    /// Inconsistent input shapes.
    #[error("[{context}] dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Location.
        context: Context,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Math error.
    #[error("[{context}] math error: {source}")]
    Math {
        /// Location.
        context: Context,
        /// Underlying error.
        #[source]
        source: MathError,
    },

    /// Style computation error.
    #[error("[stage={stage}] style error: {source}")]
    Style {
        /// Stage.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: StyleError,
    },

    /// Provider error.
    #[error("[stage=input] provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Covariance estimation error.
    #[error("[stage=covariance] covariance error: {0}")]
    Covariance(#[from] CovarianceError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl ModelError {
    /// Returns whether this error is recoverable by excluding one instrument or
    /// date rather than failing the run.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingInputData { context, .. }
            | Self::InsufficientSample { context, .. }
            | Self::Math { context, .. } => {
                context.stage != Stage::Aggregation
                    && (context.symbol.is_some() || context.date.is_some())
            }
            _ => false,
        }
    }

    /// Stage the error belongs to, when known.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::MissingInputData { context, .. }
            | Self::InsufficientSample { context, .. }
            | Self::DegenerateCovariance { context, .. }
            | Self::DimensionMismatch { context, .. }
            | Self::Math { context, .. } => Some(context.stage),
            Self::Style { stage, .. } => Some(*stage),
            Self::WeightNormalizationViolation { .. } => Some(Stage::Aggregation),
            Self::Provider(_) => Some(Stage::Input),
            Self::Covariance(_) => Some(Stage::Covariance),
            Self::InvalidConfig(_) | Self::ConfigFile(_) | Self::Polars(_) => None,
        }
    }

    /// Convert into an exclusion record, keeping the context.
    #[must_use]
    pub fn to_exclusion(&self) -> Exclusion {
        let context = match self {
            Self::MissingInputData { context, .. }
            | Self::InsufficientSample { context, .. }
            | Self::DegenerateCovariance { context, .. }
            | Self::DimensionMismatch { context, .. }
            | Self::Math { context, .. } => context.clone(),
            other => Context::stage(other.stage().unwrap_or(Stage::Input)),
        };
        let reason = match self {
            Self::MissingInputData { detail, .. } => detail.clone(),
            Self::InsufficientSample { required, actual, .. } => {
                format!("insufficient sample: {actual} observations, need {required}")
            }
            Self::Math { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Exclusion { context, reason }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn error_display_carries_context() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = ModelError::MissingInputData {
            context: Context::stage(Stage::Aggregation)
                .with_symbol(&Symbol::from("AAPL"))
                .with_date(date),
            detail: "no portfolio weight".to_string(),
        };
        assert_eq!(
            err.to_string(),
            concat!(
                "[stage=aggregation symbol=AAPL date=2024-01-02] ",
                "missing input data: no portfolio weight"
            )
        );
    }

    #[test]
    fn error_is_recoverable() {
        let err = ModelError::InsufficientSample {
            context: Context::stage(Stage::Estimation).with_symbol(&Symbol::from("MSFT")),
            required: 6,
            actual: 4,
        };
        assert!(err.is_recoverable());
        assert_eq!(err.stage(), Some(Stage::Estimation));

        let exclusion = err.to_exclusion();
        assert_eq!(exclusion.context.symbol, Some(Symbol::from("MSFT")));
        assert!(exclusion.reason.contains("4 observations"));

        let err = ModelError::WeightNormalizationViolation { sum: 0.9, tolerance: 1e-6 };
        assert!(!err.is_recoverable());
        assert_eq!(err.stage(), Some(Stage::Aggregation));

        let err = ModelError::DegenerateCovariance {
            context: Context::stage(Stage::Aggregation),
            detail: "not symmetric".to_string(),
        };
        assert!(!err.is_recoverable());
    }
}
