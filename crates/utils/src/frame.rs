//! Conversion between long DataFrames and typed panels.
//!
//! Long frames carry one observation per row: `date | symbol | value` for
//! panels and `date | value` for a single series. Rows with a null in any of
//! these columns, or a non-finite value, are dropped on the way in.

use std::path::Path;

use carhart_primitives::{Date, DateSeries, Panel, Symbol};
use polars::prelude::*;
use tracing::debug;

use crate::{
    UtilsError,
    columns::{DATE, SYMBOL},
};

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, UtilsError> {
    df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))
}

fn dates(df: &DataFrame) -> Result<Vec<Option<Date>>, UtilsError> {
    let dates = column(df, DATE)?.cast(&DataType::Date)?;
    Ok(dates.date()?.as_date_iter().collect())
}

fn values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    let values = column(df, name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Read a CSV file with a header row into a lazy frame.
///
/// ISO formatted date columns are parsed as dates.
///
/// # Errors
/// Returns `UtilsError::Polars` if the file cannot be scanned.
pub fn read_csv(path: impl AsRef<Path>) -> Result<LazyFrame, UtilsError> {
    let frame = LazyCsvReader::new(path.as_ref())
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()?;
    Ok(frame)
}

/// Build a panel from the `date`, `symbol` and `value_col` columns of `df`.
///
/// The date column may hold dates or ISO strings. Later rows overwrite
/// earlier rows with the same date and symbol.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` if a column is absent, or
/// `UtilsError::Polars` if a column cannot be cast.
pub fn panel_from_frame(df: &DataFrame, value_col: &str) -> Result<Panel, UtilsError> {
    let dates = dates(df)?;
    let symbols = column(df, SYMBOL)?.cast(&DataType::String)?;
    let values = values(df, value_col)?;

    let mut panel = Panel::new();
    let mut skipped = 0usize;
    for ((date, symbol), value) in dates.into_iter().zip(symbols.str()?.into_iter()).zip(values) {
        match (date, symbol, value) {
            (Some(date), Some(symbol), Some(value)) if value.is_finite() => {
                panel.insert(date, Symbol::new(symbol), value);
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(column = value_col, skipped, "dropped incomplete rows");
    }
    Ok(panel)
}

/// Build a series from the `date` and `value_col` columns of `df`.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` if a column is absent, or
/// `UtilsError::Polars` if a column cannot be cast.
pub fn series_from_frame(df: &DataFrame, value_col: &str) -> Result<DateSeries, UtilsError> {
    let series = dates(df)?
        .into_iter()
        .zip(values(df, value_col)?)
        .filter_map(|(date, value)| Some((date?, value?)))
        .collect();
    Ok(series)
}

/// Flatten a panel into a long `date | symbol | value_col` frame.
///
/// Rows are ordered by date, then symbol.
///
/// # Errors
/// Returns a `PolarsError` if the frame cannot be assembled.
pub fn frame_from_panel(panel: &Panel, value_col: &str) -> PolarsResult<DataFrame> {
    let mut dates: Vec<Date> = Vec::new();
    let mut symbols: Vec<&str> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    for (date, xs) in panel.iter() {
        for (symbol, value) in xs.iter() {
            dates.push(date);
            symbols.push(symbol.as_str());
            values.push(value);
        }
    }
    DataFrame::new(vec![
        Column::new(DATE.into(), dates),
        Column::new(SYMBOL.into(), symbols),
        Column::new(value_col.into(), values),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::columns::CLOSE;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn panel_skips_null_and_non_finite_rows() {
        let df = df! {
            "date" => &[day(1), day(1), day(4), day(4)],
            "symbol" => &["AAA", "BBB", "AAA", "BBB"],
            "close" => &[Some(10.0), None, Some(f64::NAN), Some(21.5)],
        }
        .unwrap();

        let panel = panel_from_frame(&df, CLOSE).unwrap();

        assert_eq!(panel.get(day(1), &Symbol::from("AAA")), Some(10.0));
        assert_eq!(panel.get(day(1), &Symbol::from("BBB")), None);
        assert_eq!(panel.get(day(4), &Symbol::from("AAA")), None);
        assert_eq!(panel.get(day(4), &Symbol::from("BBB")), Some(21.5));
    }

    #[test]
    fn missing_value_column_is_reported() {
        let df = df! {
            "date" => &[day(1)],
            "symbol" => &["AAA"],
        }
        .unwrap();

        let err = panel_from_frame(&df, CLOSE).unwrap_err();
        assert!(matches!(err, UtilsError::MissingColumn(name) if name == "close"));
    }

    #[test]
    fn integer_values_are_cast() {
        let df = df! {
            "date" => &[day(5), day(6)],
            "close" => &[4000i64, 4040],
        }
        .unwrap();

        let series = series_from_frame(&df, CLOSE).unwrap();
        assert_eq!(series.get(day(6)), Some(4040.0));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn panel_frame_is_sorted_long_format() {
        let mut panel = Panel::new();
        panel.insert(day(2), Symbol::from("BBB"), 2.0);
        panel.insert(day(1), Symbol::from("BBB"), 1.5);
        panel.insert(day(1), Symbol::from("AAA"), 1.0);

        let df = frame_from_panel(&panel, "value").unwrap();

        assert_eq!(df.height(), 3);
        let symbols: Vec<Option<&str>> =
            df.column("symbol").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(symbols, vec![Some("AAA"), Some("BBB"), Some("BBB")]);
        assert_eq!(panel_from_frame(&df, "value").unwrap(), panel);
    }
}
