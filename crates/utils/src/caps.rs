//! Market capitalization and cap-weighted portfolios.

use polars::prelude::*;

use crate::{
    columns::{CLOSE, DATE, MARKET_CAP, SHARES, SYMBOL, WEIGHT},
    fill_features,
};

/// Market capitalization from close prices and shares outstanding.
///
/// Shares are reported far less often than prices, so the latest reported
/// count is carried forward within each symbol before multiplying. Returns a
/// `date | symbol | market_cap` frame on the price dates where a share count
/// is known.
pub fn market_caps_from_shares(prices: LazyFrame, shares: LazyFrame) -> LazyFrame {
    let keys = [col(DATE), col(SYMBOL)];
    let joined = prices.select([col(DATE), col(SYMBOL), col(CLOSE)]).join(
        shares.select([col(DATE), col(SYMBOL), col(SHARES)]),
        keys.clone(),
        keys,
        JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
    );

    fill_features(joined, &[SHARES], None)
        .filter(col(CLOSE).is_not_null().and(col(SHARES).is_not_null()))
        .select([
            col(DATE),
            col(SYMBOL),
            (col(CLOSE).cast(DataType::Float64) * col(SHARES)).alias(MARKET_CAP),
        ])
}

/// Cap weights per date: each positive market cap over the date's total.
///
/// Returns a `date | symbol | weight` frame whose weights sum to one on
/// every date.
pub fn weights_from_caps(caps: LazyFrame) -> LazyFrame {
    let cap = col(MARKET_CAP).cast(DataType::Float64);
    caps.filter(cap.clone().gt(lit(0.0))).select([
        col(DATE),
        col(SYMBOL),
        (cap.clone() / cap.sum().over([col(DATE)])).alias(WEIGHT),
    ])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use carhart_primitives::{Date, Symbol};
    use chrono::NaiveDate;

    use super::*;
    use crate::panel_from_frame;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn shares_carry_forward_between_reports() {
        let prices = df! {
            "date" => &[day(1), day(2), day(3), day(1), day(2), day(3)],
            "symbol" => &["A", "A", "A", "B", "B", "B"],
            "close" => &[10.0, 11.0, 12.0, 50.0, 51.0, 52.0],
        }
        .unwrap()
        .lazy();
        // B reports shares only after the first price date; A on a non-trading day
        let shares = df! {
            "date" => &[day(1), day(2), NaiveDate::from_ymd_opt(2024, 3, 30).unwrap()],
            "symbol" => &["A", "B", "A"],
            "shares" => &[100.0, 20.0, 90.0],
        }
        .unwrap()
        .lazy();

        let caps = market_caps_from_shares(prices, shares).collect().unwrap();
        let caps = panel_from_frame(&caps, MARKET_CAP).unwrap();

        let (a, b) = (Symbol::from("A"), Symbol::from("B"));
        assert_relative_eq!(caps.get(day(1), &a).unwrap(), 1000.0);
        assert_relative_eq!(caps.get(day(3), &a).unwrap(), 1200.0);
        assert_eq!(caps.get(day(1), &b), None);
        assert_relative_eq!(caps.get(day(2), &b).unwrap(), 1020.0);
        assert_relative_eq!(caps.get(day(3), &b).unwrap(), 1040.0);
        assert_eq!(caps.n_dates(), 3);
    }

    #[test]
    fn weights_sum_to_one_per_date() {
        let caps = df! {
            "date" => &[day(1), day(1), day(1), day(2), day(2)],
            "symbol" => &["A", "B", "C", "A", "B"],
            "market_cap" => &[100.0, 300.0, 0.0, 50.0, 150.0],
        }
        .unwrap()
        .lazy();

        let weights = weights_from_caps(caps).collect().unwrap();
        let weights = panel_from_frame(&weights, WEIGHT).unwrap();

        assert_relative_eq!(weights.get(day(1), &Symbol::from("A")).unwrap(), 0.25);
        assert_eq!(weights.get(day(1), &Symbol::from("C")), None);
        for (_, xs) in weights.iter() {
            assert_relative_eq!(xs.values().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }
}
