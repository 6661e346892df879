#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod provider;
pub use provider::{MarketData, MarketDataProvider, ProviderError};

mod metric;
pub use metric::{MetricInputs, SortMetric};

mod covariance;
pub use covariance::{CovarianceError, CovarianceEstimator};
