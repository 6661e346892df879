#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod symbol;
pub use symbol::Symbol;

mod series;
pub use series::{CrossSection, DateSeries, Panel, intersect_dates};

mod factor;
pub use factor::{Factor, FactorReturns};

mod classification;
pub use classification::{Classification, LabelSet, Tercile};

mod weights;
pub use weights::PortfolioWeights;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
