//! Options recognised by the price retrieval boundary.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar granularity requested from the quote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute
    #[serde(rename = "1m")]
    OneMinute,
    /// 2 minutes
    #[serde(rename = "2m")]
    TwoMinutes,
    /// 5 minutes
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minutes
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minutes
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// 60 minutes
    #[serde(rename = "60m")]
    SixtyMinutes,
    /// 90 minutes
    #[serde(rename = "90m")]
    NinetyMinutes,
    /// 1 hour
    #[serde(rename = "1h")]
    OneHour,
    /// 1 day
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    /// 5 days
    #[serde(rename = "5d")]
    FiveDays,
    /// 1 week
    #[serde(rename = "1wk")]
    OneWeek,
    /// 1 month
    #[serde(rename = "1mo")]
    OneMonth,
    /// 3 months
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Interval {
    /// Every supported interval, finest first.
    pub const ALL: [Self; 13] = [
        Self::OneMinute,
        Self::TwoMinutes,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
        Self::NinetyMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::FiveDays,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
    ];

    /// The provider's query-string code for this interval.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::TwoMinutes => "2m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::SixtyMinutes => "60m",
            Self::NinetyMinutes => "90m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
        }
    }

    /// Whether bars at this granularity fall within a single trading day.
    pub const fn is_intraday(&self) -> bool {
        matches!(
            self,
            Self::OneMinute
                | Self::TwoMinutes
                | Self::FiveMinutes
                | Self::FifteenMinutes
                | Self::ThirtyMinutes
                | Self::SixtyMinutes
                | Self::NinetyMinutes
                | Self::OneHour
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.code() == s)
            .ok_or_else(|| DataError::InvalidInterval(s.to_string()))
    }
}

/// How the rows of a multi-symbol download are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One block of rows per symbol, dates ascending inside each block.
    #[default]
    Ticker,
    /// One block of rows per date, holding every symbol's bar.
    Column,
}

impl GroupBy {
    /// Quote-frame columns to sort by, outermost first.
    pub const fn sort_keys(&self) -> [&'static str; 2] {
        match self {
            Self::Ticker => ["symbol", "date"],
            Self::Column => ["date", "symbol"],
        }
    }
}

/// Parameters for a single price load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// First date to retrieve (inclusive).
    pub start: NaiveDate,
    /// Last date to retrieve (inclusive).
    pub end: NaiveDate,
    /// Bar granularity (default: daily).
    pub interval: Interval,
    /// Use split/dividend adjusted closes (default: true).
    pub auto_adjust: bool,
    /// Include pre- and post-market bars (default: false).
    pub pre_post: bool,
    /// Result grouping (default: by ticker).
    pub group_by: GroupBy,
}

impl LoadOptions {
    /// Options for a daily, adjusted load over `[start, end]`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            interval: Interval::default(),
            auto_adjust: true,
            pre_post: false,
            group_by: GroupBy::default(),
        }
    }

    /// Set the bar interval.
    pub const fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Toggle adjusted closes.
    pub const fn auto_adjust(mut self, auto_adjust: bool) -> Self {
        self.auto_adjust = auto_adjust;
        self
    }

    /// Toggle pre/post-market bars.
    pub const fn pre_post(mut self, pre_post: bool) -> Self {
        self.pre_post = pre_post;
        self
    }

    /// Set the grouping.
    pub const fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Reject ranges whose start falls after their end, and intraday intervals.
    ///
    /// Prices are keyed by calendar date, so bars finer than a day cannot be told
    /// apart.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_intraday() {
            return Err(DataError::InvalidInterval(format!(
                "{} is intraday; prices are indexed by date",
                self.interval
            )));
        }
        if self.start > self.end {
            return Err(DataError::InvalidDateRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }

    /// Name of the quote column holding the price used for returns.
    pub const fn price_column(&self) -> &'static str {
        if self.auto_adjust {
            "adjusted_close"
        } else {
            "close"
        }
    }
}
