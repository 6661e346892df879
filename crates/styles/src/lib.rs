#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod returns;
pub use returns::{ReturnSeries, simple_returns};

mod classifier;
pub use classifier::{TercileClassifier, TercileConfig};

mod momentum;
pub use momentum::{MomentumConfig, MomentumEngine};

mod size;
pub use size::SizeSplit;

mod value;
pub use value::BookToMarket;

mod error;
pub use error::StyleError;
