//! # carhart
//!
//! A four-factor (market, size, value, momentum) equity risk model.
//!
//! This crate provides a unified interface to the carhart crates.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Trait abstractions
//! - `math`: Statistics and linear algebra
//! - `styles`: Returns, tercile classification, momentum, size and value
//! - `model`: Factor construction, estimation and risk aggregation
//! - `utils`: DataFrame ingestion
//! - `cli`: The `analyze` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use carhart::model::Pipeline;
//! use carhart::utils::FrameProvider;
//!
//! let provider = FrameProvider::new(prices, benchmark, market_caps, book_equity);
//! let report = Pipeline::new().run(&provider)?;
//! report.print_summary();
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "cli")]
use clap as _;
#[cfg(feature = "cli")]
use tracing as _;
#[cfg(feature = "cli")]
use tracing_subscriber as _;

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use carhart_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use carhart_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use carhart_math as math;
#[cfg(feature = "styles")]
#[doc(inline)]
pub use carhart_styles as styles;
#[cfg(feature = "model")]
#[doc(inline)]
pub use carhart_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use carhart_utils as utils;
