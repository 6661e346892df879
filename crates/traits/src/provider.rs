//! Market data provisioning.

use carhart_primitives::{DateSeries, Panel, Symbol};

/// Errors raised by a market data provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not produce data at all.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// A required input series is empty.
    #[error("missing input series: {0}")]
    MissingSeries(&'static str),

    /// The data is present but malformed.
    #[error("invalid input data: {0}")]
    Invalid(String),
}

/// The aligned input series of one pipeline run.
///
/// All panels are keyed by trading date and instrument. A missing observation
/// is an absent entry; providers must never substitute zeros.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    /// Daily close prices per instrument.
    pub prices: Panel,
    /// Daily close of the benchmark index.
    pub benchmark: DateSeries,
    /// Daily market capitalization (or shares-outstanding proxy) per instrument.
    pub market_caps: Panel,
    /// Book equity per instrument, carried forward between filing dates.
    pub book_equity: Panel,
    /// Historical portfolio weights per date, each date summing to one.
    pub weights: Panel,
}

impl MarketData {
    /// Instrument universe: every instrument with at least one price.
    #[must_use]
    pub fn universe(&self) -> Vec<Symbol> {
        self.prices.symbols().into_iter().collect()
    }

    /// Check that every required series carries data.
    ///
    /// # Errors
    /// Returns `ProviderError::MissingSeries` naming the first empty series.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let checks = [
            ("prices", self.prices.is_empty()),
            ("benchmark", self.benchmark.is_empty()),
            ("market_caps", self.market_caps.is_empty()),
            ("book_equity", self.book_equity.is_empty()),
            ("weights", self.weights.is_empty()),
        ];
        match checks.iter().find(|(_, empty)| *empty) {
            Some((name, _)) => Err(ProviderError::MissingSeries(*name)),
            None => Ok(()),
        }
    }
}

/// Source of the input series for a run.
///
/// Retrieval, caching, identifier resolution and retries all live behind this
/// trait. The risk pipeline only sees the finished [`MarketData`].
pub trait MarketDataProvider {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Load the aligned input series.
    ///
    /// # Errors
    /// Returns `ProviderError` when the data cannot be produced.
    fn load(&self) -> Result<MarketData, ProviderError>;
}

impl MarketDataProvider for MarketData {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn load(&self) -> Result<MarketData, ProviderError> {
        self.validate()?;
        Ok(self.clone())
    }
}
