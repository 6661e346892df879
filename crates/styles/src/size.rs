//! Median split of market capitalization.

use carhart_math::median;
use carhart_primitives::{CrossSection, Symbol};

/// Small and big groups of one date's size sort.
///
/// Only instruments with both a market cap and a return on the date are
/// eligible. Instruments whose cap equals the median exactly are placed in
/// both groups, so with an odd number of eligible instruments the median
/// instrument contributes to both sides of the spread.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSplit {
    /// Median market cap of the eligible instruments.
    pub median: f64,
    /// Instruments with cap at or below the median.
    pub small: Vec<Symbol>,
    /// Instruments with cap at or above the median.
    pub big: Vec<Symbol>,
}

impl SizeSplit {
    /// Split the instruments of `market_caps` that also appear in `returns`.
    ///
    /// Returns `None` when no instrument is eligible.
    #[must_use]
    pub fn compute(market_caps: &CrossSection, returns: &CrossSection) -> Option<Self> {
        let eligible: Vec<(&Symbol, f64)> =
            market_caps.iter().filter(|(s, _)| returns.get(s).is_some()).collect();
        let caps: Vec<f64> = eligible.iter().map(|(_, cap)| *cap).collect();
        let median = median(&caps).ok()?;

        let small =
            eligible.iter().filter(|(_, cap)| *cap <= median).map(|(s, _)| (*s).clone()).collect();
        let big =
            eligible.iter().filter(|(_, cap)| *cap >= median).map(|(s, _)| (*s).clone()).collect();
        Some(Self { median, small, big })
    }

    /// Small-minus-big spread of `returns`, absent if either group is empty.
    #[must_use]
    pub fn spread(&self, returns: &CrossSection) -> Option<f64> {
        Some(returns.mean_over(&self.small)? - returns.mean_over(&self.big)?)
    }
}
