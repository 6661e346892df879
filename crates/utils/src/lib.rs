#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod columns;

mod frame;
pub use frame::{frame_from_panel, panel_from_frame, read_csv, series_from_frame};

mod fill;
pub use fill::{fill_features, forward_fill_panel};

mod caps;
pub use caps::{market_caps_from_shares, weights_from_caps};

mod provider;
pub use provider::FrameProvider;

mod error;
pub use error::UtilsError;
