//! Quote data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::options::{GroupBy, LoadOptions};
use crate::prices::{PriceTable, Symbol};
use chrono::{NaiveDate, NaiveTime};
use futures::stream::{self, StreamExt};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance quote provider with default rate limiting (1 req/sec).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Create a new Yahoo Finance quote provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch OHLCV data for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "HSBC")
    /// * `options` - Date range, interval and session flags
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, open, high, low, close, volume, adjusted_close
    pub async fn fetch_quotes(&self, symbol: &str, options: &LoadOptions) -> Result<DataFrame> {
        options.validate()?;

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let start_time = to_offset_datetime(options.start, NaiveTime::MIN)?;
        // The end bound is inclusive, so ask for everything up to the end of that day.
        let end_time = to_offset_datetime(
            options.end,
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        )?;

        let response = self
            .provider
            .get_quote_history_interval_prepost(
                symbol,
                start_time,
                end_time,
                options.interval.code(),
                options.pre_post,
            )
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let dates: Vec<i64> = quotes.iter().map(|q| q.timestamp).collect();
        let opens: Vec<f64> = quotes.iter().map(|q| q.open).collect();
        let highs: Vec<f64> = quotes.iter().map(|q| q.high).collect();
        let lows: Vec<f64> = quotes.iter().map(|q| q.low).collect();
        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let volumes: Vec<u64> = quotes.iter().map(|q| q.volume).collect();
        let adj_closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();

        let mut df = DataFrame::new(vec![
            Series::new("timestamp".into(), dates).into(),
            Series::new("open".into(), opens).into(),
            Series::new("high".into(), highs).into(),
            Series::new("low".into(), lows).into(),
            Series::new("close".into(), closes).into(),
            Series::new("volume".into(), volumes).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        let symbol_col: Column = Series::new("symbol".into(), vec![symbol; df.height()]).into();
        df.with_column(symbol_col)?;

        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .select(&[
                col("symbol"),
                col("date"),
                col("open"),
                col("high"),
                col("low"),
                col("close"),
                col("volume"),
                col("adjusted_close"),
            ])
            .collect()?;

        sleep(self.rate_limit_delay).await;

        tracing::debug!(symbol, rows = df.height(), "fetched quotes");
        Ok(df)
    }

    /// Fetch OHLCV data for multiple symbols, one request at a time.
    ///
    /// A symbol that fails to download is logged and skipped; the call only fails
    /// when nothing at all could be fetched. Rows are ordered by
    /// [`LoadOptions::group_by`].
    pub async fn fetch_quotes_batch(
        &self,
        symbols: &[Symbol],
        options: &LoadOptions,
    ) -> Result<DataFrame> {
        options.validate()?;

        let fetched: Vec<Option<LazyFrame>> = stream::iter(symbols)
            .then(|symbol| async move {
                match self.fetch_quotes(symbol.as_str(), options).await {
                    Ok(df) => Some(df.lazy()),
                    Err(e) => {
                        tracing::warn!(%symbol, error = %e, "failed to fetch quotes");
                        None
                    }
                }
            })
            .collect()
            .await;

        let dfs: Vec<LazyFrame> = fetched.into_iter().flatten().collect();
        if dfs.is_empty() {
            return Err(DataError::MissingData {
                symbol: "batch".to_string(),
                reason: "No data fetched for any symbol".to_string(),
            });
        }

        let combined = concat(dfs, UnionArgs::default())?;
        Ok(group_quotes(combined, options.group_by).collect()?)
    }

    /// Load an aligned price table for `tickers` and `benchmark` in one call.
    ///
    /// Fails with [`DataError::DataUnavailable`] if the download comes back empty or
    /// is missing the benchmark or any ticker.
    pub async fn load(
        &self,
        tickers: &[Symbol],
        benchmark: &Symbol,
        options: &LoadOptions,
    ) -> Result<PriceTable> {
        let mut symbols = tickers.to_vec();
        if !symbols.contains(benchmark) {
            symbols.push(benchmark.clone());
        }

        let quotes = match self.fetch_quotes_batch(&symbols, options).await {
            Ok(quotes) => quotes,
            Err(DataError::MissingData { reason, .. }) => {
                return Err(DataError::unavailable(reason));
            }
            Err(e) => return Err(e),
        };

        PriceTable::from_quotes(
            &quotes,
            tickers.to_vec(),
            benchmark.clone(),
            options.price_column(),
        )
    }
}

/// Order a long quotes frame so rows come in per-symbol or per-date blocks.
fn group_quotes(quotes: LazyFrame, group_by: GroupBy) -> LazyFrame {
    quotes.sort(group_by.sort_keys(), SortMultipleOptions::default())
}

fn to_offset_datetime(date: NaiveDate, time: NaiveTime) -> Result<time::OffsetDateTime> {
    let timestamp = date.and_time(time).and_utc().timestamp();
    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}
