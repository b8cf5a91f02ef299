//! Per-date beta records and the time-indexed beta table.

use crate::estimator::round_beta;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Betas for every ticker at one evaluation date, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaRecord {
    /// Window end date that produced these values.
    pub date: NaiveDate,

    /// Rounded beta per ticker.
    pub betas: BTreeMap<String, f64>,
}

impl BetaRecord {
    /// Build a record from full-precision estimates, rounding each one.
    pub fn from_estimates<I, S>(date: NaiveDate, estimates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            date,
            betas: estimates
                .into_iter()
                .map(|(ticker, beta)| (ticker.into(), round_beta(beta)))
                .collect(),
        }
    }

    /// Beta for `ticker`, if present.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.betas.get(ticker).copied()
    }

    /// `(ticker, beta)` pairs in the order of `tickers`, skipping absent ones.
    pub fn ordered<'a>(&'a self, tickers: &'a [String]) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        tickers
            .iter()
            .filter_map(|ticker| self.get(ticker).map(|beta| (ticker.as_str(), beta)))
    }
}

/// Beta records in evaluation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BetaTable {
    tickers: Vec<String>,
    records: Vec<BetaRecord>,
}

impl BetaTable {
    /// An empty table for the given ticker order.
    pub const fn new(tickers: Vec<String>) -> Self {
        Self {
            tickers,
            records: Vec::new(),
        }
    }

    /// Append the record for the next evaluation date.
    pub fn push(&mut self, record: BetaRecord) {
        self.records.push(record);
    }

    /// Tickers in display order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// All records.
    pub fn records(&self) -> &[BetaRecord] {
        &self.records
    }

    /// Iterate records in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, BetaRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been added.
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Evaluation dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Beta for `ticker` at `date`.
    pub fn beta(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.date == date)
            .and_then(|r| r.get(ticker))
    }

    /// The `(date, beta)` history of one ticker.
    pub fn series(&self, ticker: &str) -> Vec<(NaiveDate, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.get(ticker).map(|beta| (r.date, beta)))
            .collect()
    }

    /// Smallest and largest beta across the table.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .flat_map(|r| r.betas.values().copied())
            .fold(None, |acc, beta| match acc {
                None => Some((beta, beta)),
                Some((lo, hi)) => Some((lo.min(beta), hi.max(beta))),
            })
    }
}

impl<'a> IntoIterator for &'a BetaTable {
    type Item = &'a BetaRecord;
    type IntoIter = std::slice::Iter<'a, BetaRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
