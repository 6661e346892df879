//! Book-to-market sort metric.

use carhart_primitives::{LabelSet, Panel};
use carhart_traits::{MetricInputs, SortMetric};

/// Book equity divided by market capitalization.
///
/// Defined on a date only where both inputs are present and the market cap is
/// strictly positive. Book equity is expected to be carried forward onto the
/// trading calendar already.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookToMarket;

impl BookToMarket {
    /// Book-to-market ratio per date and instrument.
    #[must_use]
    pub fn compute(market_caps: &Panel, book_equity: &Panel) -> Panel {
        let mut out = Panel::new();
        for (date, caps) in market_caps.iter() {
            let Some(books) = book_equity.cross_section(date) else {
                continue;
            };
            for (symbol, cap) in caps.iter() {
                if cap > 0.0
                    && let Some(book) = books.get(symbol)
                {
                    out.insert(date, symbol.clone(), book / cap);
                }
            }
        }
        out
    }
}

impl SortMetric for BookToMarket {
    fn name(&self) -> &str {
        "book_to_market"
    }

    fn labels(&self) -> LabelSet {
        LabelSet::BOOK_TO_MARKET
    }

    fn evaluate(&self, inputs: &MetricInputs<'_>) -> Panel {
        Self::compute(inputs.market_caps, inputs.book_equity)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use carhart_primitives::{Date, Symbol};
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2023, 6, d).unwrap()
    }

    #[test]
    fn ratio_requires_both_inputs_and_positive_cap() {
        let (a, b, c) = (Symbol::from("A"), Symbol::from("B"), Symbol::from("C"));
        let mut caps = Panel::new();
        caps.insert(day(1), a.clone(), 200.0);
        caps.insert(day(1), b.clone(), 0.0);
        caps.insert(day(1), c.clone(), 50.0);
        caps.insert(day(2), a.clone(), 250.0);
        let mut books = Panel::new();
        books.insert(day(1), a.clone(), 100.0);
        books.insert(day(1), b.clone(), 100.0);

        let ratio = BookToMarket::compute(&caps, &books);

        assert_relative_eq!(ratio.get(day(1), &a).unwrap(), 0.5);
        assert_eq!(ratio.get(day(1), &b), None);
        assert_eq!(ratio.get(day(1), &c), None);
        assert!(ratio.cross_section(day(2)).is_none());
    }

    #[test]
    fn metric_uses_book_to_market_labels() {
        let metric = BookToMarket;
        assert_eq!(metric.name(), "book_to_market");
        assert_eq!(metric.labels().high, "High");
        assert_eq!(metric.labels().middle, "Medium");
    }
}
