//! Construction of the four daily factor-return series.

use std::collections::BTreeSet;

use carhart_primitives::{
    Classification, CrossSection, Date, DateSeries, Factor, FactorReturns, Panel, Tercile,
    intersect_dates,
};
use carhart_styles::SizeSplit;
use tracing::{info, warn};

use crate::{Context, ModelError, Stage};

/// Configuration for factor construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorConfig {
    /// Daily funding rate deducted from the benchmark return.
    pub funding_rate: f64,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self { funding_rate: 0.0001 }
    }
}

/// Aligned inputs of factor construction.
#[derive(Debug, Clone, Copy)]
pub struct FactorInputs<'a> {
    /// Daily instrument returns.
    pub returns: &'a Panel,
    /// Daily benchmark returns.
    pub benchmark_returns: &'a DateSeries,
    /// Market capitalization per instrument.
    pub market_caps: &'a Panel,
    /// Book-to-market terciles.
    pub value: &'a Classification,
    /// Momentum terciles.
    pub momentum: &'a Classification,
}

/// Builds market, size, value and momentum factor returns.
///
/// Every factor is evaluated on the dates common to instrument returns,
/// benchmark returns and market caps. A long/short factor is absent on a date
/// when either side has no constituent with a return; it is never zero-filled.
#[derive(Debug, Clone, Default)]
pub struct FactorBuilder {
    config: FactorConfig,
}

impl FactorBuilder {
    /// Create a builder with the default funding rate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    #[must_use]
    pub const fn with_config(config: FactorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FactorConfig {
        &self.config
    }

    /// Dates on which factors are evaluated.
    #[must_use]
    pub fn calendar(inputs: &FactorInputs<'_>) -> BTreeSet<Date> {
        intersect_dates(&[
            inputs.returns.dates(),
            inputs.benchmark_returns.dates(),
            inputs.market_caps.dates(),
        ])
    }

    /// High-minus-low spread of `returns` under `classification` on `date`.
    #[must_use]
    pub fn long_short(
        returns: &CrossSection,
        classification: &Classification,
        date: Date,
    ) -> Option<f64> {
        let high = returns.mean_over(classification.members(date, Tercile::High))?;
        let low = returns.mean_over(classification.members(date, Tercile::Low))?;
        Some(high - low)
    }

    /// Calendar dates on which at least one factor is absent, with the
    /// missing factors in [`Factor::ALL`] order.
    #[must_use]
    pub fn gaps(inputs: &FactorInputs<'_>, factors: &FactorReturns) -> Vec<(Date, Vec<Factor>)> {
        Self::calendar(inputs)
            .into_iter()
            .filter_map(|date| {
                let absent: Vec<Factor> = Factor::ALL
                    .into_iter()
                    .filter(|f| factors.get(*f).get(date).is_none())
                    .collect();
                (!absent.is_empty()).then_some((date, absent))
            })
            .collect()
    }

    /// Build all four factor series.
    ///
    /// # Errors
    /// Returns `ModelError::MissingInputData` if the inputs share no date.
    pub fn build(&self, inputs: &FactorInputs<'_>) -> Result<FactorReturns, ModelError> {
        let calendar = Self::calendar(inputs);
        if calendar.is_empty() {
            return Err(ModelError::MissingInputData {
                context: Context::stage(Stage::Factors),
                detail: "returns, benchmark and market caps share no date".to_string(),
            });
        }

        let mut factors = FactorReturns::default();
        for &date in &calendar {
            let (Some(returns), Some(caps), Some(benchmark)) = (
                inputs.returns.cross_section(date),
                inputs.market_caps.cross_section(date),
                inputs.benchmark_returns.get(date),
            ) else {
                continue;
            };

            factors.market.insert(date, benchmark - self.config.funding_rate);
            if let Some(smb) = SizeSplit::compute(caps, returns).and_then(|s| s.spread(returns)) {
                factors.size.insert(date, smb);
            }
            if let Some(hml) = Self::long_short(returns, inputs.value, date) {
                factors.value.insert(date, hml);
            }
            if let Some(mom) = Self::long_short(returns, inputs.momentum, date) {
                factors.momentum.insert(date, mom);
            }
        }

        for factor in Factor::ALL {
            let missing = calendar.len() - factors.get(factor).len();
            if missing > 0 {
                warn!(%factor, missing, "factor absent on dates with an empty side");
            }
        }
        info!(
            dates = calendar.len(),
            complete = factors.complete_dates().len(),
            "built factor returns"
        );
        Ok(factors)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_relative_eq;
    use carhart_primitives::{LabelSet, Symbol};
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::from(s)
    }

    struct Fixture {
        returns: Panel,
        benchmark: DateSeries,
        caps: Panel,
        value: Classification,
        momentum: Classification,
    }

    impl Fixture {
        fn inputs(&self) -> FactorInputs<'_> {
            FactorInputs {
                returns: &self.returns,
                benchmark_returns: &self.benchmark,
                market_caps: &self.caps,
                value: &self.value,
                momentum: &self.momentum,
            }
        }
    }

    fn fixture() -> Fixture {
        let mut returns = Panel::new();
        let mut caps = Panel::new();
        let rows = [("A", 0.01, 10.0), ("B", 0.02, 20.0), ("C", 0.03, 30.0), ("D", 0.05, 40.0)];
        for (s, r, c) in rows {
            returns.insert(day(2), sym(s), r);
            caps.insert(day(2), sym(s), c);
        }
        let benchmark: DateSeries = [(day(2), 0.004), (day(3), 0.001)].into_iter().collect();

        let mut value = Classification::new(LabelSet::BOOK_TO_MARKET);
        value.insert(
            day(2),
            BTreeMap::from([
                (sym("A"), Tercile::High),
                (sym("B"), Tercile::Middle),
                (sym("C"), Tercile::Low),
                (sym("D"), Tercile::High),
            ]),
        );
        let mut momentum = Classification::new(LabelSet::MOMENTUM);
        let labels = BTreeMap::from([(sym("A"), Tercile::Low), (sym("B"), Tercile::Middle)]);
        momentum.insert(day(2), labels);

        Fixture { returns, benchmark, caps, value, momentum }
    }

    #[test]
    fn gaps_list_absent_factors_per_date() {
        let f = fixture();
        let mut inputs = f.inputs();
        let factors = FactorBuilder::new().build(&inputs).unwrap();

        // Momentum has no High bucket on day 2
        assert_eq!(FactorBuilder::gaps(&inputs, &factors), vec![(day(2), vec![Factor::Momentum])]);

        let empty = Classification::new(LabelSet::BOOK_TO_MARKET);
        inputs.value = &empty;
        let factors = FactorBuilder::new().build(&inputs).unwrap();
        assert_eq!(
            FactorBuilder::gaps(&inputs, &factors),
            vec![(day(2), vec![Factor::Value, Factor::Momentum])]
        );
    }

    #[test]
    fn factors_on_common_dates() {
        let f = fixture();
        let factors = FactorBuilder::new().build(&f.inputs()).unwrap();

        // Day 3 has a benchmark return only
        assert_eq!(factors.market.len(), 1);
        assert_relative_eq!(factors.market.get(day(2)).unwrap(), 0.0039, epsilon = 1e-15);

        // Median cap 25: small {A, B}, big {C, D}
        assert_relative_eq!(factors.size.get(day(2)).unwrap(), 0.015 - 0.04, epsilon = 1e-15);

        // High {A, D} minus Low {C}
        assert_relative_eq!(factors.value.get(day(2)).unwrap(), 0.03 - 0.03, epsilon = 1e-15);
    }

    #[test]
    fn empty_side_leaves_factor_absent() {
        let f = fixture();
        let factors = FactorBuilder::new().build(&f.inputs()).unwrap();

        // No winners on day 2
        assert_eq!(factors.momentum.get(day(2)), None);
        assert!(factors.complete_dates().is_empty());
    }

    #[test]
    fn value_factor_is_high_minus_low_mean() {
        let f = fixture();
        let xs = f.returns.cross_section(day(2)).unwrap();
        let hml = FactorBuilder::long_short(xs, &f.value, day(2)).unwrap();
        assert_relative_eq!(hml, (0.01 + 0.05) / 2.0 - 0.03, epsilon = 1e-15);
        assert_eq!(FactorBuilder::long_short(xs, &f.value, day(3)), None);
    }

    #[test]
    fn funding_rate_is_configurable() {
        let f = fixture();
        let builder = FactorBuilder::with_config(FactorConfig { funding_rate: 0.0 });
        let factors = builder.build(&f.inputs()).unwrap();
        assert_relative_eq!(factors.market.get(day(2)).unwrap(), 0.004);
    }

    #[test]
    fn disjoint_inputs_are_an_error() {
        let mut f = fixture();
        f.benchmark = [(day(9), 0.01)].into_iter().collect();
        let err = FactorBuilder::new().build(&f.inputs()).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Factors));
    }
}
