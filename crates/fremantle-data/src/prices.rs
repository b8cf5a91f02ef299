//! Date-indexed price tables.
//!
//! A [`PriceTable`] holds one price vector per symbol, all aligned to a single
//! strictly increasing date index. The benchmark is a named field rather than
//! one more entry in the ticker list. Tables are built once per load and are
//! read-only afterwards; windows over them are cheap borrowed views.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A ticker or index symbol (e.g. `"HSBC"`, `"^GSPC"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from a trimmed identifier, rejecting blank ones.
    pub fn new(symbol: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        if trimmed.len() == symbol.len() {
            return Ok(Self(symbol));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = DataError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Parse a list of raw identifiers into symbols.
pub fn symbols<I, S>(raw: I) -> Result<Vec<Symbol>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    raw.into_iter().map(Symbol::new).collect()
}

/// Prices for one symbol in strictly increasing date order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate dates and prices that
    /// cannot be divided by.
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(DataError::Parse(format!(
                    "Price dates must be strictly increasing: {} follows {}",
                    pair[1].0, pair[0].0
                )));
            }
        }
        if let Some((date, price)) = points
            .iter()
            .find(|(_, price)| !price.is_finite() || *price <= 0.0)
        {
            return Err(DataError::Parse(format!(
                "Invalid price {} on {}",
                price, date
            )));
        }
        Ok(Self { points })
    }

    /// Build a series from unordered observations. Two observations on one date
    /// are rejected.
    pub fn from_unsorted(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        let mut points: Vec<(NaiveDate, f64)> = points.into_iter().collect();
        points.sort_by_key(|(date, _)| *date);
        Self::new(points)
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observation dates.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(date, _)| *date)
    }

    /// Observations as `(date, price)` pairs.
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }
}

/// Aligned prices for a set of tickers plus their benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    prices: BTreeMap<Symbol, Vec<f64>>,
    tickers: Vec<Symbol>,
    benchmark: Symbol,
}

impl PriceTable {
    /// Align per-symbol series on their common dates.
    ///
    /// Fails with [`DataError::DataUnavailable`] when nothing was supplied, when
    /// the benchmark or any requested ticker is absent, or when the required
    /// symbols share no dates. Symbols that were supplied but not requested are
    /// dropped.
    pub fn from_series(
        tickers: Vec<Symbol>,
        benchmark: Symbol,
        mut series: BTreeMap<Symbol, PriceSeries>,
    ) -> Result<Self> {
        if tickers.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker set".to_string()));
        }

        series.retain(|_, s| !s.is_empty());
        if series.is_empty() {
            return Err(DataError::unavailable(
                "retrieval returned no prices for the ticker list",
            ));
        }
        if !series.contains_key(&benchmark) {
            return Err(DataError::unavailable(format!(
                "data for the benchmark {} wasn't loaded",
                benchmark
            )));
        }

        let mut unique = BTreeSet::new();
        let tickers: Vec<Symbol> = tickers
            .into_iter()
            .filter(|t| unique.insert(t.clone()))
            .collect();
        if let Some(missing) = tickers.iter().find(|t| !series.contains_key(*t)) {
            return Err(DataError::unavailable(format!(
                "data for {} wasn't loaded",
                missing
            )));
        }

        let required: BTreeSet<&Symbol> = tickers.iter().chain([&benchmark]).collect();
        let by_symbol: BTreeMap<&Symbol, BTreeMap<NaiveDate, f64>> = required
            .iter()
            .map(|symbol| (*symbol, series[*symbol].points.iter().copied().collect()))
            .collect();

        let dates: Vec<NaiveDate> = series[&benchmark]
            .dates()
            .filter(|date| by_symbol.values().all(|prices| prices.contains_key(date)))
            .collect();
        if dates.is_empty() {
            return Err(DataError::unavailable(
                "the requested symbols share no trading dates",
            ));
        }

        let prices = by_symbol
            .into_iter()
            .map(|(symbol, by_date)| {
                let aligned = dates.iter().map(|date| by_date[date]).collect();
                (symbol.clone(), aligned)
            })
            .collect();

        Ok(Self {
            dates,
            prices,
            tickers,
            benchmark,
        })
    }

    /// Build a table from a long-format quotes frame.
    ///
    /// The frame needs a `symbol` column, a `date` column (Date or ISO string) and
    /// the price column named by `price_column`. Rows with a null price are
    /// skipped.
    pub fn from_quotes(
        quotes: &DataFrame,
        tickers: Vec<Symbol>,
        benchmark: Symbol,
        price_column: &str,
    ) -> Result<Self> {
        if quotes.height() == 0 {
            return Err(DataError::unavailable(
                "retrieval returned an empty quote table",
            ));
        }

        let symbol_col = quotes.column("symbol")?.str()?;
        let dates = quotes.column("date")?.cast(&DataType::String)?;
        let date_col = dates.str()?;
        let price_col = quotes.column(price_column)?.cast(&DataType::Float64)?;
        let price_col = price_col.f64()?;

        let mut points: BTreeMap<Symbol, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for i in 0..quotes.height() {
            let (Some(symbol), Some(date), Some(price)) =
                (symbol_col.get(i), date_col.get(i), price_col.get(i))
            else {
                continue;
            };
            let date = parse_date(date)?;
            points
                .entry(Symbol::new(symbol)?)
                .or_default()
                .push((date, price));
        }

        let series = points
            .into_iter()
            .map(|(symbol, pts)| Ok((symbol, PriceSeries::from_unsorted(pts)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Self::from_series(tickers, benchmark, series)
    }

    /// Shared date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Requested tickers, in request order.
    pub fn tickers(&self) -> &[Symbol] {
        &self.tickers
    }

    /// The benchmark symbol.
    pub const fn benchmark(&self) -> &Symbol {
        &self.benchmark
    }

    /// Prices for `symbol` aligned to [`Self::dates`].
    pub fn prices(&self, symbol: &str) -> Option<&[f64]> {
        self.prices.get(symbol).map(Vec::as_slice)
    }

    /// Whether `symbol` has a price vector.
    pub fn contains(&self, symbol: &str) -> bool {
        self.prices.contains_key(symbol)
    }

    /// Number of dates in the index.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the index is empty. Never true for a validated table.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First and last index dates.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Restrict the table to `start <= date <= end`.
    ///
    /// The comparison is on dates, not positions, so gaps in the calendar are
    /// irrelevant. An `end` before `start` yields an empty window.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> PriceWindow<'_> {
        // The index is sorted, so the inclusive mask is one contiguous run.
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end).max(lo);
        PriceWindow {
            table: self,
            range: lo..hi,
        }
    }
}

/// A borrowed date-range view over a [`PriceTable`].
#[derive(Debug, Clone)]
pub struct PriceWindow<'a> {
    table: &'a PriceTable,
    range: Range<usize>,
}

impl<'a> PriceWindow<'a> {
    /// Dates inside the window.
    pub fn dates(&self) -> &'a [NaiveDate] {
        &self.table.dates[self.range.clone()]
    }

    /// Prices for `symbol` inside the window.
    pub fn prices(&self, symbol: &str) -> Option<&'a [f64]> {
        self.table
            .prices(symbol)
            .map(|prices| &prices[self.range.clone()])
    }

    /// Whether `symbol` is present in the window.
    pub fn contains(&self, symbol: &str) -> bool {
        !self.is_empty() && self.table.contains(symbol)
    }

    /// The table's benchmark symbol.
    pub const fn benchmark(&self) -> &'a Symbol {
        &self.table.benchmark
    }

    /// The table's requested tickers.
    pub fn tickers(&self) -> &'a [Symbol] {
        &self.table.tickers
    }

    /// Number of dates inside the window.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the window holds no dates.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Owner of the single price table loaded for a run.
#[derive(Debug, Default)]
pub struct PriceStore {
    table: Option<PriceTable>,
}

impl PriceStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self { table: None }
    }

    /// Install the outcome of a load.
    ///
    /// A failed load is returned unchanged and leaves the store exactly as it was.
    pub fn install(&mut self, loaded: Result<PriceTable>) -> Result<&PriceTable> {
        let table = loaded?;
        Ok(&*self.table.insert(table))
    }

    /// The installed table.
    pub fn table(&self) -> Result<&PriceTable> {
        self.table
            .as_ref()
            .ok_or_else(|| DataError::unavailable("no price table has been loaded"))
    }

    /// Whether a table is installed.
    pub const fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Drop the installed table.
    pub fn clear(&mut self) {
        self.table = None;
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    // Datetime columns cast to strings carry a time suffix.
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DataError::Parse(format!("Invalid date '{}': {}", raw, e)))
}
