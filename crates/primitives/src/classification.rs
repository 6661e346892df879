//! Tercile labels and per-date classifications.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Date, Symbol};

/// Position of an instrument relative to the 30th/70th percentile cut points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tercile {
    /// At or below the lower cut point.
    Low,
    /// Strictly between the cut points.
    Middle,
    /// At or above the upper cut point.
    High,
}

impl Tercile {
    /// All buckets, low to high.
    pub const ALL: [Self; 3] = [Self::Low, Self::Middle, Self::High];
}

/// Display names of the three buckets for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    /// Name of the low bucket.
    pub low: &'static str,
    /// Name of the middle bucket.
    pub middle: &'static str,
    /// Name of the high bucket.
    pub high: &'static str,
}

impl LabelSet {
    /// Labels used for book-to-market sorts.
    pub const BOOK_TO_MARKET: Self = Self { low: "Low", middle: "Medium", high: "High" };

    /// Labels used for momentum sorts.
    pub const MOMENTUM: Self = Self { low: "Loser", middle: "Neutral", high: "Winner" };

    /// Display name of a bucket.
    #[must_use]
    pub const fn label(&self, tercile: Tercile) -> &'static str {
        match tercile {
            Tercile::Low => self.low,
            Tercile::Middle => self.middle,
            Tercile::High => self.high,
        }
    }
}

/// Tercile assignment of every classified instrument on every date.
///
/// Dates on which the cross-section was too small to classify are recorded in
/// [`Classification::undefined_dates`] and carry no labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    labels: LabelSet,
    buckets: BTreeMap<Date, BTreeMap<Symbol, Tercile>>,
    undefined: BTreeSet<Date>,
}

impl Classification {
    /// Create an empty classification using `labels` for display.
    #[must_use]
    pub const fn new(labels: LabelSet) -> Self {
        Self { labels, buckets: BTreeMap::new(), undefined: BTreeSet::new() }
    }

    /// Record the labels of one date.
    pub fn insert(&mut self, date: Date, labels: BTreeMap<Symbol, Tercile>) {
        self.undefined.remove(&date);
        self.buckets.insert(date, labels);
    }

    /// Record that `date` could not be classified.
    pub fn mark_undefined(&mut self, date: Date) {
        self.buckets.remove(&date);
        self.undefined.insert(date);
    }

    /// Label set used for display.
    #[must_use]
    pub const fn label_set(&self) -> LabelSet {
        self.labels
    }

    /// Bucket of `symbol` on `date`.
    #[must_use]
    pub fn get(&self, date: Date, symbol: &Symbol) -> Option<Tercile> {
        self.buckets.get(&date).and_then(|row| row.get(symbol)).copied()
    }

    /// Display label of `symbol` on `date`.
    #[must_use]
    pub fn label(&self, date: Date, symbol: &Symbol) -> Option<&'static str> {
        self.get(date, symbol).map(|t| self.labels.label(t))
    }

    /// All labels of one date.
    #[must_use]
    pub fn on(&self, date: Date) -> Option<&BTreeMap<Symbol, Tercile>> {
        self.buckets.get(&date)
    }

    /// Instruments in `tercile` on `date`, in symbol order.
    #[must_use]
    pub fn members(&self, date: Date, tercile: Tercile) -> Vec<&Symbol> {
        self.buckets
            .get(&date)
            .map(|row| row.iter().filter(|(_, t)| **t == tercile).map(|(s, _)| s).collect())
            .unwrap_or_default()
    }

    /// Dates with a defined classification.
    #[must_use]
    pub fn dates(&self) -> BTreeSet<Date> {
        self.buckets.keys().copied().collect()
    }

    /// Dates that could not be classified.
    #[must_use]
    pub const fn undefined_dates(&self) -> &BTreeSet<Date> {
        &self.undefined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_sets_name_buckets() {
        assert_eq!(LabelSet::BOOK_TO_MARKET.label(Tercile::Middle), "Medium");
        assert_eq!(LabelSet::MOMENTUM.label(Tercile::High), "Winner");
        assert_eq!(LabelSet::MOMENTUM.label(Tercile::Low), "Loser");
    }

    #[test]
    fn members_and_undefined_dates() {
        let d1 = Date::from_ymd_opt(2024, 5, 1).unwrap();
        let d2 = Date::from_ymd_opt(2024, 5, 2).unwrap();

        let mut c = Classification::new(LabelSet::BOOK_TO_MARKET);
        let row: BTreeMap<Symbol, Tercile> = [
            ("A".into(), Tercile::Low),
            ("B".into(), Tercile::Middle),
            ("C".into(), Tercile::High),
            ("D".into(), Tercile::High),
        ]
        .into_iter()
        .collect();
        c.insert(d1, row);
        c.mark_undefined(d2);

        assert_eq!(c.members(d1, Tercile::High).len(), 2);
        assert_eq!(c.label(d1, &"A".into()), Some("Low"));
        assert!(c.members(d2, Tercile::Low).is_empty());
        assert!(c.undefined_dates().contains(&d2));
        assert_eq!(c.dates().len(), 1);
    }
}
