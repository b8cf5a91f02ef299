//! Per-date progress reporting for scheduler runs.

use crate::record::BetaRecord;

/// Receives each record as soon as its evaluation date completes.
pub trait ProgressSink {
    /// Called once per completed date; `index` is zero-based and `tickers` is the
    /// requested ticker order.
    fn on_record(&mut self, index: usize, total: usize, tickers: &[String], record: &BetaRecord);
}

/// Ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_record(&mut self, _index: usize, _total: usize, _tickers: &[String], _record: &BetaRecord) {
    }
}

/// Emits one `info` event per completed date and one per ticker beta.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_record(&mut self, index: usize, total: usize, tickers: &[String], record: &BetaRecord) {
        tracing::info!(date = %record.date, completed = index + 1, total, "current date");
        for (ticker, beta) in record.ordered(tickers) {
            tracing::info!(%ticker, beta, "ticker beta");
        }
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn on_record(&mut self, index: usize, total: usize, tickers: &[String], record: &BetaRecord) {
        (**self).on_record(index, total, tickers, record);
    }
}
