#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod factors;
pub use factors::{FactorBuilder, FactorConfig, FactorInputs};

mod estimator;
pub use estimator::{EstimationResult, Estimates, EstimatorConfig, FactorModelEstimator};

mod covariance;
pub use covariance::{FactorCovariance, SampleCovariance};

mod risk;
pub use risk::{RiskAggregator, RiskAssessment, RiskConfig, RiskDecomposition};

mod attribution;
pub use attribution::{Attribution, FactorContribution};

mod config;
pub use config::{PipelineConfig, WeightPolicy};

mod pipeline;
pub use pipeline::{Pipeline, portfolio_returns};

mod report;
pub use report::RiskReport;

mod error;
pub use error::{Context, Exclusion, ModelError, Stage};

/// Re-export commonly used types.
pub mod prelude {
    pub use carhart_traits::{MarketData, MarketDataProvider};

    pub use super::{ModelError, Pipeline, PipelineConfig, RiskReport};
}
