//! Column names of the long input frames.

/// Trading date.
pub const DATE: &str = "date";
/// Instrument identifier.
pub const SYMBOL: &str = "symbol";
/// Close price.
pub const CLOSE: &str = "close";
/// Shares outstanding.
pub const SHARES: &str = "shares";
/// Market capitalization.
pub const MARKET_CAP: &str = "market_cap";
/// Book equity.
pub const BOOK_EQUITY: &str = "book_equity";
/// Portfolio weight.
pub const WEIGHT: &str = "weight";
