//! Factor identifiers and factor-return series.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{Date, DateSeries, intersect_dates};

/// One of the four risk factors of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Factor {
    /// Benchmark excess return over the funding rate.
    Market,
    /// Small minus big (SMB).
    Size,
    /// High minus low book-to-market (HML).
    Value,
    /// Winners minus losers (MOM).
    Momentum,
}

impl Factor {
    /// All factors, in column order of every loading vector and matrix.
    pub const ALL: [Self; 4] = [Self::Market, Self::Size, Self::Value, Self::Momentum];

    /// Number of factors.
    pub const COUNT: usize = Self::ALL.len();

    /// Short column name of the factor.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Size => "smb",
            Self::Value => "hml",
            Self::Momentum => "mom",
        }
    }

    /// Column index of the factor.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Market => 0,
            Self::Size => 1,
            Self::Value => 2,
            Self::Momentum => 3,
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Daily return series of the four factors, stored column-wise.
///
/// A date on which a factor is undefined (an empty side of the spread, an
/// unclassifiable cross-section, a missing benchmark return) is simply absent
/// from that factor's series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorReturns {
    /// Market factor.
    pub market: DateSeries,
    /// Size factor.
    pub size: DateSeries,
    /// Value factor.
    pub value: DateSeries,
    /// Momentum factor.
    pub momentum: DateSeries,
}

impl FactorReturns {
    /// Series of one factor.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> &DateSeries {
        match factor {
            Factor::Market => &self.market,
            Factor::Size => &self.size,
            Factor::Value => &self.value,
            Factor::Momentum => &self.momentum,
        }
    }

    /// Mutable series of one factor.
    pub const fn get_mut(&mut self, factor: Factor) -> &mut DateSeries {
        match factor {
            Factor::Market => &mut self.market,
            Factor::Size => &mut self.size,
            Factor::Value => &mut self.value,
            Factor::Momentum => &mut self.momentum,
        }
    }

    /// Dates on which all four factors are defined.
    #[must_use]
    pub fn complete_dates(&self) -> BTreeSet<Date> {
        let indices: Vec<BTreeSet<Date>> =
            Factor::ALL.iter().map(|f| self.get(*f).dates()).collect();
        intersect_dates(&indices)
    }

    /// The `(dates x factors)` matrix for the given dates.
    ///
    /// Returns `None` if any factor is missing on any of the dates.
    #[must_use]
    pub fn matrix(&self, dates: &[Date]) -> Option<Array2<f64>> {
        let mut out = Array2::zeros((dates.len(), Factor::COUNT));
        for (i, date) in dates.iter().enumerate() {
            for factor in Factor::ALL {
                out[[i, factor.index()]] = self.get(factor).get(*date)?;
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> Date {
        Date::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn factor_order_matches_index() {
        for (i, factor) in Factor::ALL.iter().enumerate() {
            assert_eq!(factor.index(), i);
        }
        assert_eq!(Factor::Value.to_string(), "hml");
    }

    #[test]
    fn complete_dates_require_every_factor() {
        let mut fr = FactorReturns::default();
        for factor in Factor::ALL {
            fr.get_mut(factor).insert(day(1), 0.01);
            fr.get_mut(factor).insert(day(2), 0.02);
        }
        // Momentum undefined on day 3, everything else present.
        for factor in [Factor::Market, Factor::Size, Factor::Value] {
            fr.get_mut(factor).insert(day(3), 0.03);
        }

        let dates: Vec<Date> = fr.complete_dates().into_iter().collect();
        assert_eq!(dates, vec![day(1), day(2)]);

        let m = fr.matrix(&dates).unwrap();
        assert_eq!(m.dim(), (2, 4));
        assert!(fr.matrix(&[day(3)]).is_none());
    }
}
