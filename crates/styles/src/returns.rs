//! Daily simple returns.

use carhart_primitives::{Date, DateSeries, Panel};

/// Simple returns of every instrument in `prices`.
///
/// Returns are taken between consecutive dates of the panel's own calendar
/// (every date on which any instrument has a price). An instrument missing a
/// price on either date of a pair gets no return for the later date.
#[must_use]
pub fn simple_returns(prices: &Panel) -> Panel {
    let calendar: Vec<Date> = prices.dates().into_iter().collect();
    let symbols = prices.symbols();
    let series: Vec<_> =
        symbols.iter().map(|s| (s, prices.series(s).pct_change(&calendar))).collect();
    Panel::from_series(series.iter().map(|(s, r)| (*s, r)))
}

/// Daily simple returns of the instrument universe and the benchmark index.
#[derive(Debug, Clone, Default)]
pub struct ReturnSeries {
    instruments: Panel,
    benchmark: DateSeries,
}

impl ReturnSeries {
    /// Compute returns from instrument closes and benchmark closes.
    #[must_use]
    pub fn compute(prices: &Panel, benchmark: &DateSeries) -> Self {
        let benchmark_calendar: Vec<Date> = benchmark.dates().into_iter().collect();
        Self {
            instruments: simple_returns(prices),
            benchmark: benchmark.pct_change(&benchmark_calendar),
        }
    }

    /// Instrument returns.
    #[must_use]
    pub const fn instruments(&self) -> &Panel {
        &self.instruments
    }

    /// Benchmark returns.
    #[must_use]
    pub const fn benchmark(&self) -> &DateSeries {
        &self.benchmark
    }

    /// Split into `(instruments, benchmark)`.
    #[must_use]
    pub fn into_parts(self) -> (Panel, DateSeries) {
        (self.instruments, self.benchmark)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use carhart_primitives::Symbol;
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn returns_follow_price_calendar() {
        let a = Symbol::from("AAA");
        let b = Symbol::from("BBB");
        let mut prices = Panel::new();
        prices.insert(day(2), a.clone(), 100.0);
        prices.insert(day(3), a.clone(), 110.0);
        prices.insert(day(4), a.clone(), 99.0);
        prices.insert(day(2), b.clone(), 50.0);
        // BBB has no price on day 3
        prices.insert(day(4), b.clone(), 55.0);

        let returns = simple_returns(&prices);

        assert_eq!(returns.get(day(2), &a), None);
        assert_relative_eq!(returns.get(day(3), &a).unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns.get(day(4), &a).unwrap(), -0.1, epsilon = 1e-12);
        assert_eq!(returns.get(day(3), &b), None);
        assert_eq!(returns.get(day(4), &b), None);
    }

    #[test]
    fn benchmark_returns_use_own_dates() {
        let benchmark: DateSeries =
            [(day(2), 4000.0), (day(3), 4040.0), (day(5), 3999.6)].into_iter().collect();
        let returns = ReturnSeries::compute(&Panel::new(), &benchmark);

        assert!(returns.instruments().is_empty());
        assert_eq!(returns.benchmark().len(), 2);
        assert_relative_eq!(returns.benchmark().get(day(3)).unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(returns.benchmark().get(day(5)).unwrap(), -0.01, epsilon = 1e-12);
    }

    #[test]
    fn zero_price_yields_no_return() {
        let a = Symbol::from("AAA");
        let mut prices = Panel::new();
        prices.insert(day(2), a.clone(), 0.0);
        prices.insert(day(3), a.clone(), 10.0);
        assert!(simple_returns(&prices).is_empty());
    }
}
