//! Terminal progress for scheduler runs.

use fremantle_beta::{BetaRecord, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Drives an indicatif bar and prints each date's betas above it.
#[derive(Debug)]
pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub(crate) fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub(crate) fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }
}

impl ProgressSink for BarProgress {
    fn on_record(&mut self, index: usize, _total: usize, tickers: &[String], record: &BetaRecord) {
        self.bar.println(format!("current date is {}", record.date));
        for (ticker, beta) in record.ordered(tickers) {
            self.bar.println(format!("Ticker: {} - with a beta of {:.2}", ticker, beta));
        }
        self.bar.set_position(index as u64 + 1);
        self.bar.set_message(record.date.to_string());
    }
}
