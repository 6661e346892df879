#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cross_section;
pub use cross_section::{mean, median, percentile};

mod stats;
pub use stats::{correlation_from_covariance, sample_covariance, sample_variance};

mod linalg;
pub use linalg::{
    OlsResult, check_positive_semidefinite, is_symmetric, ordinary_least_squares,
    symmetric_eigenvalues,
};

mod normal;
pub use normal::normal_quantile;

mod error;
pub use error::MathError;
