//! A single beta run: load prices once, schedule windows, report the table.

use chrono::NaiveDate;
use fremantle_beta::{BetaError, BetaTable, ProgressSink, SchedulerConfig, WindowScheduler};
use fremantle_data::yahoo::YahooQuoteProvider;
use fremantle_data::{
    DataError, LoadOptions, PriceStore, PriceTable, Symbol, read_price_csv, read_price_file,
    symbols,
};
use fremantle_output::{ExportError, ExportFormat, Exporter, ReportError, render_to_dir};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by a [`BetaSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Price loading failed or no prices are installed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A window could not be estimated.
    #[error(transparent)]
    Beta(#[from] BetaError),

    /// The chart could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The table could not be exported.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Rendering or exporting before a successful run.
    #[error("No beta table: run the session to completion first")]
    NotRun,
}

impl SessionError {
    /// Whether this is a data-unavailable failure from either the store or a window.
    pub const fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Data(DataError::DataUnavailable { .. })
                | Self::Beta(BetaError::DataUnavailable { .. })
        )
    }
}

/// Tickers, benchmark, the loaded prices, and the last completed beta table.
#[derive(Debug)]
pub struct BetaSession {
    tickers: Vec<Symbol>,
    benchmark: Symbol,
    store: PriceStore,
    betas: Option<BetaTable>,
}

impl BetaSession {
    /// Create a session for `tickers` measured against `benchmark`.
    ///
    /// Fails if the ticker list is empty or any symbol is blank.
    pub fn new<I, S>(tickers: I, benchmark: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers = symbols(tickers)?;
        if tickers.is_empty() {
            return Err(DataError::InvalidSymbol("at least one ticker is required".to_string()).into());
        }

        Ok(Self {
            tickers,
            benchmark: Symbol::new(benchmark)?,
            store: PriceStore::new(),
            betas: None,
        })
    }

    /// Tickers in display order.
    pub fn tickers(&self) -> &[Symbol] {
        &self.tickers
    }

    /// The benchmark symbol.
    pub const fn benchmark(&self) -> &Symbol {
        &self.benchmark
    }

    /// The price store.
    pub const fn store(&self) -> &PriceStore {
        &self.store
    }

    /// The last completed beta table.
    pub const fn betas(&self) -> Option<&BetaTable> {
        self.betas.as_ref()
    }

    /// Install the outcome of a price load.
    ///
    /// A failed load empties the store, so a later [`run`](Self::run) fails fast
    /// instead of reusing stale prices. Any previous beta table is dropped.
    pub fn install_prices(
        &mut self,
        loaded: fremantle_data::Result<PriceTable>,
    ) -> Result<&PriceTable> {
        self.betas = None;
        let table = match loaded {
            Ok(table) => table,
            Err(e) => {
                self.store.clear();
                tracing::warn!(error = %e, "price load failed, store cleared");
                return Err(e.into());
            }
        };

        let table = self.store.install(Ok(table))?;
        tracing::info!(
            dates = table.len(),
            tickers = table.tickers().len(),
            benchmark = %table.benchmark(),
            "installed price table"
        );
        Ok(table)
    }

    /// Load prices from a wide CSV reader.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<&PriceTable> {
        let loaded = read_price_csv(reader, self.tickers.clone(), self.benchmark.clone());
        self.install_prices(loaded)
    }

    /// Load prices from a wide CSV file.
    pub fn load_csv_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&PriceTable> {
        let loaded = read_price_file(path, self.tickers.clone(), self.benchmark.clone());
        self.install_prices(loaded)
    }

    /// Download prices from Yahoo Finance.
    pub async fn load_yahoo(
        &mut self,
        provider: &YahooQuoteProvider,
        options: &LoadOptions,
    ) -> Result<&PriceTable> {
        let loaded = provider
            .load(&self.tickers, &self.benchmark, options)
            .await;
        self.install_prices(loaded)
    }

    /// Estimate betas for windows `[start, end]` over each end date, in order.
    ///
    /// On success the table replaces any previous one; on failure the session
    /// holds no table.
    pub fn run<P: ProgressSink>(
        &mut self,
        start: NaiveDate,
        end_dates: Vec<NaiveDate>,
        progress: P,
    ) -> Result<&BetaTable> {
        self.betas = None;
        let prices = self.store.table()?;

        let mut scheduler = WindowScheduler::new(SchedulerConfig::new(start, end_dates));
        let table = scheduler.run(prices, progress)?.clone();
        Ok(&*self.betas.insert(table))
    }

    /// Write the beta chart into `dir` and return its path.
    pub fn render(&self, dir: &Path) -> Result<PathBuf> {
        let table = self.betas.as_ref().ok_or(SessionError::NotRun)?;
        Ok(render_to_dir(table, dir)?)
    }

    /// Export the beta table to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let table = self.betas.as_ref().ok_or(SessionError::NotRun)?;
        table.export_to_file(path, format)?;
        Ok(())
    }
}
