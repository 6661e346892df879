//! Carrying sparse observations forward.

use std::collections::BTreeSet;

use carhart_primitives::{Date, Panel};
use polars::prelude::*;

use crate::columns::{DATE, SYMBOL};

/// Forward fill feature columns of a long frame within each symbol.
///
/// Sorts by date, casts each feature to float and carries the last non-null
/// value forward, at most `limit` rows if given. Leading nulls stay null.
pub fn fill_features(df: LazyFrame, features: &[&str], limit: Option<IdxSize>) -> LazyFrame {
    let sort_options = SortMultipleOptions::new().with_maintain_order(true);
    let mut lf = df.sort([DATE], sort_options);

    for &feat in features {
        lf = lf.with_column(
            col(feat).cast(DataType::Float64).forward_fill(limit).over([col(SYMBOL)]).alias(feat),
        );
    }

    lf
}

/// Carry each instrument's latest observation onto `calendar`.
///
/// An instrument is present on a calendar date once it has an observation on
/// or before that date. Observations dated between calendar dates, such as
/// filings on weekends, take effect on the next calendar date.
#[must_use]
pub fn forward_fill_panel(panel: &Panel, calendar: &BTreeSet<Date>) -> Panel {
    let mut filled = Panel::new();
    for symbol in panel.symbols() {
        let series = panel.series(&symbol);
        let mut observations = series.iter().peekable();
        let mut last = None;
        for &date in calendar {
            while let Some((_, value)) = observations.next_if(|&(d, _)| d <= date) {
                last = Some(value);
            }
            if let Some(value) = last {
                filled.insert(date, symbol.clone(), value);
            }
        }
    }
    filled
}
