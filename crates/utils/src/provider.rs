//! Market data from in-memory DataFrames.

use carhart_primitives::Panel;
use carhart_traits::{MarketData, MarketDataProvider, ProviderError};
use polars::prelude::*;
use tracing::debug;

use crate::{
    UtilsError,
    columns::{BOOK_EQUITY, CLOSE, MARKET_CAP, WEIGHT},
    forward_fill_panel, panel_from_frame, series_from_frame, weights_from_caps,
};

/// A [`MarketDataProvider`] over long DataFrames.
///
/// Expected columns:
/// - prices: `date | symbol | close`
/// - benchmark: `date | close`
/// - market caps: `date | symbol | market_cap`
/// - book equity: `date | symbol | book_equity`, on filing dates
/// - weights (optional): `date | symbol | weight`
///
/// Book equity is carried forward onto the price calendar. Without explicit
/// weights the portfolio is cap weighted on every date.
#[derive(Debug, Clone)]
pub struct FrameProvider {
    prices: DataFrame,
    benchmark: DataFrame,
    market_caps: DataFrame,
    book_equity: DataFrame,
    weights: Option<DataFrame>,
}

impl FrameProvider {
    /// Create a provider from the required frames.
    #[must_use]
    pub const fn new(
        prices: DataFrame,
        benchmark: DataFrame,
        market_caps: DataFrame,
        book_equity: DataFrame,
    ) -> Self {
        Self { prices, benchmark, market_caps, book_equity, weights: None }
    }

    /// Use explicit portfolio weights instead of cap weights.
    #[must_use]
    pub fn with_weights(mut self, weights: DataFrame) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Convert the frames into aligned market data.
    ///
    /// # Errors
    /// Returns `UtilsError` if a frame lacks a column, a column has the wrong
    /// type, or the price frame holds no complete row.
    pub fn build(&self) -> Result<MarketData, UtilsError> {
        let prices = panel_from_frame(&self.prices, CLOSE)?;
        if prices.is_empty() {
            let detail = "price frame has no complete rows".to_string();
            return Err(UtilsError::InvalidParameter(detail));
        }
        let calendar = prices.dates();

        let filings = panel_from_frame(&self.book_equity, BOOK_EQUITY)?;
        let book_equity = forward_fill_panel(&filings, &calendar);
        let weights = match &self.weights {
            Some(frame) => panel_from_frame(frame, WEIGHT)?,
            None => self.cap_weights()?,
        };

        let data = MarketData {
            benchmark: series_from_frame(&self.benchmark, CLOSE)?,
            market_caps: panel_from_frame(&self.market_caps, MARKET_CAP)?,
            book_equity,
            weights,
            prices,
        };
        debug!(
            instruments = data.universe().len(),
            dates = calendar.len(),
            filings = filings.n_dates(),
            "converted frames to market data"
        );
        Ok(data)
    }

    fn cap_weights(&self) -> Result<Panel, UtilsError> {
        let frame = weights_from_caps(self.market_caps.clone().lazy()).collect()?;
        panel_from_frame(&frame, WEIGHT)
    }
}

impl MarketDataProvider for FrameProvider {
    fn name(&self) -> &str {
        "frames"
    }

    fn load(&self) -> Result<MarketData, ProviderError> {
        let data = self.build()?;
        data.validate()?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use carhart_primitives::{Date, Symbol};
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn provider() -> FrameProvider {
        let prices = df! {
            "date" => &[day(6), day(7), day(8), day(6), day(7), day(8)],
            "symbol" => &["A", "A", "A", "B", "B", "B"],
            "close" => &[10.0, 10.5, 10.2, 40.0, 39.0, 41.0],
        }
        .unwrap();
        let benchmark = df! {
            "date" => &[day(6), day(7), day(8)],
            "close" => &[5000.0, 5010.0, 4990.0],
        }
        .unwrap();
        let market_caps = df! {
            "date" => &[day(6), day(7), day(8), day(6), day(7), day(8)],
            "symbol" => &["A", "A", "A", "B", "B", "B"],
            "market_cap" => &[100.0, 105.0, 102.0, 300.0, 292.5, 307.5],
        }
        .unwrap();
        let book_equity = df! {
            "date" => &[day(3), day(7)],
            "symbol" => &["A", "B"],
            "book_equity" => &[80.0, 150.0],
        }
        .unwrap();
        FrameProvider::new(prices, benchmark, market_caps, book_equity)
    }

    #[test]
    fn book_equity_is_carried_onto_price_dates() {
        let data = provider().load().unwrap();
        let (a, b) = (Symbol::from("A"), Symbol::from("B"));

        assert_eq!(data.book_equity.get(day(6), &a), Some(80.0));
        assert_eq!(data.book_equity.get(day(8), &a), Some(80.0));
        assert_eq!(data.book_equity.get(day(6), &b), None);
        assert_eq!(data.book_equity.get(day(8), &b), Some(150.0));
        assert_eq!(data.book_equity.get(day(3), &a), None);
    }

    #[test]
    fn default_weights_are_cap_weights() {
        let data = provider().load().unwrap();
        assert_relative_eq!(data.weights.get(day(6), &Symbol::from("A")).unwrap(), 0.25);
        assert_eq!(data.weights.n_dates(), 3);
    }

    #[test]
    fn explicit_weights_win() {
        let weights = df! {
            "date" => &[day(8), day(8)],
            "symbol" => &["A", "B"],
            "weight" => &[0.6, 0.4],
        }
        .unwrap();
        let data = provider().with_weights(weights).load().unwrap();
        assert_eq!(data.weights.n_dates(), 1);
        assert_eq!(data.weights.get(day(8), &Symbol::from("A")), Some(0.6));
    }

    #[test]
    fn empty_prices_are_invalid() {
        let mut provider = provider();
        provider.prices = df! {
            "date" => &[day(6)],
            "symbol" => &["A"],
            "close" => &[None::<f64>],
        }
        .unwrap();
        let err = provider.load().unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
    }
}
