//! Offline price files.
//!
//! Reads a wide CSV with a `date` column followed by one column of prices per
//! symbol:
//!
//! ```text
//! date,HSBC,BP,^GSPC
//! 2020-01-02,39.14,38.04,3257.85
//! 2020-01-03,38.72,38.46,3234.85
//! ```
//!
//! Blank cells mark a missing observation for that symbol on that date.

use crate::error::{DataError, Result};
use crate::prices::{PriceSeries, PriceTable, Symbol};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a wide price CSV into an aligned [`PriceTable`].
pub fn read_price_csv<R: Read>(
    reader: R,
    tickers: Vec<Symbol>,
    benchmark: Symbol,
) -> Result<PriceTable> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => {
            return Err(DataError::Parse(
                "Price CSV must start with a 'date' column".to_string(),
            ));
        }
    }
    let symbols = columns.map(Symbol::new).collect::<Result<Vec<_>>>()?;

    let mut points: Vec<Vec<(NaiveDate, f64)>> = vec![Vec::new(); symbols.len()];
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            DataError::Parse(format!(
                "Invalid date '{}' on row {}: {}",
                raw_date,
                line + 1,
                e
            ))
        })?;

        for (idx, cell) in record.iter().skip(1).enumerate() {
            if cell.is_empty() || idx >= symbols.len() {
                continue;
            }
            let price: f64 = cell.parse().map_err(|_| {
                DataError::Parse(format!(
                    "Invalid price '{}' for {} on {}",
                    cell, symbols[idx], date
                ))
            })?;
            points[idx].push((date, price));
        }
    }

    let series = symbols
        .into_iter()
        .zip(points)
        .map(|(symbol, pts)| Ok((symbol, PriceSeries::new(pts)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    PriceTable::from_series(tickers, benchmark, series)
}

/// Read a wide price CSV from disk.
pub fn read_price_file<P: AsRef<Path>>(
    path: P,
    tickers: Vec<Symbol>,
    benchmark: Symbol,
) -> Result<PriceTable> {
    let file = File::open(path)?;
    read_price_csv(file, tickers, benchmark)
}
