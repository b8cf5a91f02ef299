//! Rolling window scheduling.
//!
//! The scheduler walks an ordered list of window end dates. Every window starts
//! at the same fixed date, so each successive window grows. For each end date the
//! price table is sliced, returns are computed for the benchmark and every
//! ticker, and one [`BetaRecord`] is appended to the table.
//!
//! The first failing date aborts the whole run. A failed scheduler never hands
//! out its partially filled table.

use crate::error::{BetaError, Result};
use crate::estimator::{BetaEstimator, CovarianceBeta};
use crate::progress::ProgressSink;
use crate::record::{BetaRecord, BetaTable};
use crate::returns::window_returns;
use chrono::NaiveDate;
use fremantle_data::PriceTable;
use serde::{Deserialize, Serialize};

/// Window start and the ordered evaluation end dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// First date of every window (inclusive).
    pub start: NaiveDate,
    /// Window end dates (inclusive), processed in this order.
    pub end_dates: Vec<NaiveDate>,
}

impl SchedulerConfig {
    /// Create a configuration.
    pub const fn new(start: NaiveDate, end_dates: Vec<NaiveDate>) -> Self {
        Self { start, end_dates }
    }
}

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not yet run.
    Idle,
    /// Every date produced a record.
    Completed,
    /// A date failed and the run was aborted.
    Failed,
}

/// Runs one beta estimation per evaluation date.
#[derive(Debug)]
pub struct WindowScheduler<E = CovarianceBeta> {
    config: SchedulerConfig,
    estimator: E,
    state: SchedulerState,
    table: BetaTable,
}

impl WindowScheduler<CovarianceBeta> {
    /// A scheduler using the covariance estimator.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_estimator(config, CovarianceBeta::default())
    }
}

impl<E: BetaEstimator> WindowScheduler<E> {
    /// A scheduler using a custom estimator.
    pub const fn with_estimator(config: SchedulerConfig, estimator: E) -> Self {
        Self {
            config,
            estimator,
            state: SchedulerState::Idle,
            table: BetaTable::new(Vec::new()),
        }
    }

    /// The configuration this scheduler was built with.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// The finished table, available only after a successful run.
    pub fn table(&self) -> Option<&BetaTable> {
        (self.state == SchedulerState::Completed).then_some(&self.table)
    }

    /// Consume the scheduler and take the finished table.
    pub fn into_table(self) -> Option<BetaTable> {
        (self.state == SchedulerState::Completed).then_some(self.table)
    }

    /// Number of dates processed so far, including those of an aborted run.
    pub const fn processed(&self) -> usize {
        self.table.len()
    }

    /// Compute the record for a single window `[start, end]`.
    pub fn compute_window(&self, prices: &PriceTable, end: NaiveDate) -> Result<BetaRecord> {
        compute_window(&self.estimator, prices, self.config.start, end)
    }

    /// Process every end date in order.
    ///
    /// Fails with [`BetaError::EmptyDateRange`] before touching any prices when no
    /// end dates are configured, and with [`BetaError::AlreadyRun`] when called on a
    /// scheduler that has already completed or failed. Any per-date failure moves
    /// the scheduler to [`SchedulerState::Failed`] and is returned as is.
    pub fn run<P: ProgressSink>(
        &mut self,
        prices: &PriceTable,
        mut progress: P,
    ) -> Result<&BetaTable> {
        if self.state != SchedulerState::Idle {
            return Err(BetaError::AlreadyRun);
        }
        if self.config.end_dates.is_empty() {
            self.state = SchedulerState::Failed;
            return Err(BetaError::EmptyDateRange);
        }

        self.table = BetaTable::new(prices.tickers().iter().map(|t| t.to_string()).collect());
        let total = self.config.end_dates.len();
        tracing::debug!(
            estimator = self.estimator.name(),
            start = %self.config.start,
            total,
            "starting beta schedule"
        );

        for (index, &end) in self.config.end_dates.iter().enumerate() {
            match compute_window(&self.estimator, prices, self.config.start, end) {
                Ok(record) => {
                    progress.on_record(index, total, self.table.tickers(), &record);
                    self.table.push(record);
                }
                Err(e) => {
                    tracing::error!(date = %end, error = %e, "beta window failed, aborting run");
                    self.state = SchedulerState::Failed;
                    return Err(e);
                }
            }
        }

        self.state = SchedulerState::Completed;
        Ok(&self.table)
    }
}

/// Compute one [`BetaRecord`] for the window `[start, end]`.
///
/// Fails with [`BetaError::DataUnavailable`] if the window is empty or lacks the
/// benchmark, and with the first ticker error otherwise; one bad ticker fails the
/// whole date.
pub fn compute_window<E: BetaEstimator + ?Sized>(
    estimator: &E,
    prices: &PriceTable,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BetaRecord> {
    let window = prices.slice(start, end);
    if window.is_empty() {
        return Err(BetaError::unavailable(format!(
            "no prices between {} and {}",
            start, end
        )));
    }

    let benchmark = window.benchmark();
    if !window.contains(benchmark.as_str()) {
        return Err(BetaError::unavailable(format!(
            "data for the benchmark {} wasn't loaded",
            benchmark
        )));
    }
    let benchmark_returns = window_returns(&window, benchmark.as_str())?;

    let mut estimates = Vec::with_capacity(window.tickers().len());
    for ticker in window.tickers() {
        let stock_returns = window_returns(&window, ticker.as_str())?;
        let beta = estimator.estimate(&stock_returns, &benchmark_returns)?;
        tracing::debug!(%ticker, date = %end, beta, observations = stock_returns.len(), "estimated beta");
        estimates.push((ticker.to_string(), beta));
    }

    Ok(BetaRecord::from_estimates(end, estimates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::returns::ReturnSeries;
    use fremantle_data::{PriceSeries, Symbol};
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn prices() -> PriceTable {
        prices_for(["A", "B"])
    }

    /// Ten consecutive days; A mirrors IDX, B doubles its returns.
    fn prices_for(tickers: [&str; 2]) -> PriceTable {
        let idx_returns = [0.01, -0.02, 0.015, 0.005, -0.01, 0.02, -0.005, 0.01, -0.015];
        let walk = |scale: f64| {
            let mut p = 100.0;
            let mut out = vec![p];
            for r in idx_returns {
                p *= 1.0 + scale * r;
                out.push(p);
            }
            out
        };
        let days: Vec<NaiveDate> = (1..=10).map(|d| date(2024, 1, d)).collect();
        let series = |scale: f64| {
            PriceSeries::new(days.iter().copied().zip(walk(scale)).collect()).unwrap()
        };

        let mut map = BTreeMap::new();
        map.insert(Symbol::new("IDX").unwrap(), series(1.0));
        map.insert(Symbol::new("A").unwrap(), series(1.0));
        map.insert(Symbol::new("B").unwrap(), series(2.0));
        PriceTable::from_series(
            fremantle_data::symbols(tickers).unwrap(),
            Symbol::new("IDX").unwrap(),
            map,
        )
        .unwrap()
    }

    struct Recorder(Vec<(usize, usize, NaiveDate)>);

    impl ProgressSink for Recorder {
        fn on_record(&mut self, index: usize, total: usize, _tickers: &[String], record: &BetaRecord) {
            self.0.push((index, total, record.date));
        }
    }

    /// Collects the ticker names in the order a sink is asked to print them.
    struct TickerOrder(Vec<String>);

    impl ProgressSink for TickerOrder {
        fn on_record(&mut self, _index: usize, _total: usize, tickers: &[String], record: &BetaRecord) {
            self.0 = record.ordered(tickers).map(|(t, _)| t.to_string()).collect();
        }
    }

    #[test]
    fn test_compute_window() {
        let record =
            compute_window(&CovarianceBeta::default(), &prices(), date(2024, 1, 1), date(2024, 1, 5))
                .unwrap();
        assert_eq!(record.date, date(2024, 1, 5));
        assert_eq!(record.get("A"), Some(1.0));
        assert_eq!(record.get("B"), Some(2.0));
        assert!(record.get("IDX").is_none());
    }

    #[test]
    fn test_compute_window_too_short() {
        let result =
            compute_window(&CovarianceBeta::default(), &prices(), date(2024, 1, 1), date(2024, 1, 2));
        assert!(matches!(result, Err(BetaError::InsufficientData { .. })));
    }

    #[test]
    fn test_compute_window_end_before_start() {
        let result =
            compute_window(&CovarianceBeta::default(), &prices(), date(2024, 1, 5), date(2024, 1, 1));
        assert!(matches!(result, Err(BetaError::DataUnavailable { .. })));
    }

    #[test]
    fn test_run_preserves_date_order() {
        let ends = vec![date(2024, 1, 8), date(2024, 1, 4), date(2024, 1, 10)];
        let mut scheduler =
            WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), ends.clone()));
        let mut recorder = Recorder(Vec::new());

        let table = scheduler.run(&prices(), &mut recorder).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.dates(), ends);
        assert_eq!(table.tickers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(
            recorder.0,
            vec![
                (0, 3, date(2024, 1, 8)),
                (1, 3, date(2024, 1, 4)),
                (2, 3, date(2024, 1, 10))
            ]
        );
        assert_eq!(scheduler.state(), SchedulerState::Completed);
        assert!(scheduler.table().is_some());
    }

    #[test]
    fn test_run_reports_tickers_in_request_order() {
        let mut scheduler =
            WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), vec![date(2024, 1, 10)]));
        let mut order = TickerOrder(Vec::new());

        scheduler.run(&prices_for(["B", "A"]), &mut order).unwrap();
        assert_eq!(order.0, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_run_empty_dates() {
        let mut scheduler = WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), vec![]));
        let mut recorder = Recorder(Vec::new());

        assert_eq!(
            scheduler.run(&prices(), &mut recorder).unwrap_err(),
            BetaError::EmptyDateRange
        );
        assert!(recorder.0.is_empty());
        assert_eq!(scheduler.state(), SchedulerState::Failed);
    }

    #[test]
    fn test_run_aborts_on_first_failure() {
        let ends = vec![date(2024, 1, 5), date(2024, 1, 2), date(2024, 1, 10)];
        let mut scheduler = WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), ends));
        let mut recorder = Recorder(Vec::new());

        let result = scheduler.run(&prices(), &mut recorder);
        assert!(matches!(result, Err(BetaError::InsufficientData { .. })));
        assert_eq!(recorder.0.len(), 1);
        assert_eq!(scheduler.processed(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Failed);
        assert!(scheduler.table().is_none());
        assert!(scheduler.into_table().is_none());
    }

    #[test]
    fn test_run_twice() {
        let mut scheduler =
            WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), vec![date(2024, 1, 10)]));
        let table = prices();
        scheduler.run(&table, NoProgress).unwrap();
        assert_eq!(
            scheduler.run(&table, NoProgress).unwrap_err(),
            BetaError::AlreadyRun
        );
        assert_eq!(scheduler.into_table().unwrap().len(), 1);
    }

    struct FailingEstimator;

    impl BetaEstimator for FailingEstimator {
        fn name(&self) -> &str {
            "failing"
        }

        fn estimate(&self, _stock: &ReturnSeries, _benchmark: &ReturnSeries) -> Result<f64> {
            Err(BetaError::ZeroVariance)
        }
    }

    #[test]
    fn test_custom_estimator_failure_propagates() {
        let mut scheduler = WindowScheduler::with_estimator(
            SchedulerConfig::new(date(2024, 1, 1), vec![date(2024, 1, 10)]),
            FailingEstimator,
        );
        assert_eq!(
            scheduler.run(&prices(), NoProgress).unwrap_err(),
            BetaError::ZeroVariance
        );
    }

    #[test]
    fn test_scheduler_compute_window() {
        let scheduler =
            WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), vec![date(2024, 1, 10)]));
        let record = scheduler.compute_window(&prices(), date(2024, 1, 10)).unwrap();
        assert_eq!(record.get("B"), Some(2.0));
    }
}
