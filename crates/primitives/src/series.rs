//! Date-indexed series and cross-sectional panels.
//!
//! Every container here stores observed values only. Inserting a non-finite
//! value is a no-op, so `get` returning `None` is the single representation
//! of a missing observation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Date, Symbol};

/// A scalar time series keyed by trading date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateSeries {
    values: BTreeMap<Date, f64>,
}

impl DateSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: BTreeMap::new() }
    }

    /// Insert an observation. Non-finite values are treated as missing.
    pub fn insert(&mut self, date: Date, value: f64) {
        if value.is_finite() {
            self.values.insert(date, value);
        }
    }

    /// Value at `date`, if observed.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dates with an observation, ascending.
    #[must_use]
    pub fn dates(&self) -> BTreeSet<Date> {
        self.values.keys().copied().collect()
    }

    /// First and last observed dates.
    #[must_use]
    pub fn span(&self) -> Option<(Date, Date)> {
        let first = self.values.keys().next()?;
        let last = self.values.keys().next_back()?;
        Some((*first, *last))
    }

    /// Iterate over `(date, value)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }

    /// Values at the given dates, in the order given. `None` if any date is missing.
    #[must_use]
    pub fn values_at(&self, dates: &[Date]) -> Option<Vec<f64>> {
        dates.iter().map(|d| self.get(*d)).collect()
    }

    /// Restrict the series to a set of dates.
    #[must_use]
    pub fn restrict(&self, dates: &BTreeSet<Date>) -> Self {
        let values =
            self.values.iter().filter(|(d, _)| dates.contains(d)).map(|(d, v)| (*d, *v)).collect();
        Self { values }
    }

    /// Simple returns `v_t / v_{t-1} - 1` between consecutive observations.
    ///
    /// A return is produced only when the previous observation sits on the
    /// immediately preceding date of `calendar`; gaps yield no value.
    #[must_use]
    pub fn pct_change(&self, calendar: &[Date]) -> Self {
        let mut out = Self::new();
        for pair in calendar.windows(2) {
            if let (Some(prev), Some(curr)) = (self.get(pair[0]), self.get(pair[1]))
                && prev != 0.0
            {
                out.insert(pair[1], curr / prev - 1.0);
            }
        }
        out
    }
}

impl FromIterator<(Date, f64)> for DateSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (date, value) in iter {
            series.insert(date, value);
        }
        series
    }
}

/// Metric or return values for the instrument universe on one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    values: BTreeMap<Symbol, f64>,
}

impl CrossSection {
    /// Create an empty cross-section.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: BTreeMap::new() }
    }

    /// Insert a value. Non-finite values are treated as missing.
    pub fn insert(&mut self, symbol: Symbol, value: f64) {
        if value.is_finite() {
            self.values.insert(symbol, value);
        }
    }

    /// Value for `symbol`, if observed.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(symbol).copied()
    }

    /// Number of instruments with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(symbol, value)` pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> + '_ {
        self.values.iter().map(|(s, v)| (s, *v))
    }

    /// Observed values in symbol order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }

    /// Mean of the values of `members` that are present in this cross-section.
    ///
    /// Returns `None` when none of the members has a value.
    #[must_use]
    pub fn mean_over<'a>(&self, members: impl IntoIterator<Item = &'a Symbol>) -> Option<f64> {
        let (sum, count) = members
            .into_iter()
            .filter_map(|s| self.get(s))
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

impl FromIterator<(Symbol, f64)> for CrossSection {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        let mut xs = Self::new();
        for (symbol, value) in iter {
            xs.insert(symbol, value);
        }
        xs
    }
}

/// A date x instrument table of observations.
///
/// Stored row-wise: one [`CrossSection`] per date. Dates whose cross-section
/// would be empty are not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    rows: BTreeMap<Date, CrossSection>,
}

impl Panel {
    /// Create an empty panel.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: BTreeMap::new() }
    }

    /// Insert one observation. Non-finite values are treated as missing.
    pub fn insert(&mut self, date: Date, symbol: Symbol, value: f64) {
        if value.is_finite() {
            self.rows.entry(date).or_default().insert(symbol, value);
        }
    }

    /// Insert or replace a whole cross-section. Empty cross-sections are skipped.
    pub fn insert_cross_section(&mut self, date: Date, xs: CrossSection) {
        if !xs.is_empty() {
            self.rows.insert(date, xs);
        }
    }

    /// Value for `symbol` on `date`, if observed.
    #[must_use]
    pub fn get(&self, date: Date, symbol: &Symbol) -> Option<f64> {
        self.rows.get(&date).and_then(|xs| xs.get(symbol))
    }

    /// Cross-section on `date`.
    #[must_use]
    pub fn cross_section(&self, date: Date) -> Option<&CrossSection> {
        self.rows.get(&date)
    }

    /// Dates with at least one observation, ascending.
    #[must_use]
    pub fn dates(&self) -> BTreeSet<Date> {
        self.rows.keys().copied().collect()
    }

    /// Union of all instruments observed on any date.
    #[must_use]
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.rows.values().flat_map(|xs| xs.values.keys().cloned()).collect()
    }

    /// Time series of one instrument.
    #[must_use]
    pub fn series(&self, symbol: &Symbol) -> DateSeries {
        self.rows.iter().filter_map(|(d, xs)| xs.get(symbol).map(|v| (*d, v))).collect()
    }

    /// Number of dates.
    #[must_use]
    pub fn n_dates(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over `(date, cross-section)` rows in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, &CrossSection)> + '_ {
        self.rows.iter().map(|(d, xs)| (*d, xs))
    }

    /// Restrict the panel to a set of dates.
    #[must_use]
    pub fn restrict(&self, dates: &BTreeSet<Date>) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|(d, _)| dates.contains(d))
            .map(|(d, xs)| (*d, xs.clone()))
            .collect();
        Self { rows }
    }

    /// Build a panel from per-instrument series.
    #[must_use]
    pub fn from_series<'a>(series: impl IntoIterator<Item = (&'a Symbol, &'a DateSeries)>) -> Self {
        let mut panel = Self::new();
        for (symbol, s) in series {
            for (date, value) in s.iter() {
                panel.insert(date, symbol.clone(), value);
            }
        }
        panel
    }
}

/// Intersect several date indices.
///
/// This is the explicit alignment step every cross-series computation starts
/// from. An empty input list yields an empty set.
#[must_use]
pub fn intersect_dates(indices: &[BTreeSet<Date>]) -> BTreeSet<Date> {
    let Some((first, rest)) = indices.split_first() else {
        return BTreeSet::new();
    };
    first.iter().filter(|d| rest.iter().all(|idx| idx.contains(d))).copied().collect()
}
