//! Integration tests for rolling beta windows over aligned prices.

use chrono::NaiveDate;
use fremantle_beta::{
    BetaError, LogProgress, NoProgress, SchedulerConfig, SchedulerState, WindowScheduler,
    month_ends,
};
use fremantle_data::{PriceTable, Symbol, read_price_csv, symbols};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A tracks IDX exactly, B moves twice as much.
const FIVE_DAYS: &str = "\
date,A,B,IDX
2024-01-01,50.0,20.0,100.0
2024-01-02,50.5,20.4,101.0
2024-01-03,49.995,19.992,99.99
2024-01-04,50.49495,20.39184,100.9899
2024-01-05,49.485051,19.5761664,98.970102
";

fn five_days() -> PriceTable {
    read_price_csv(
        FIVE_DAYS.as_bytes(),
        symbols(["A", "B"]).unwrap(),
        Symbol::new("IDX").unwrap(),
    )
    .unwrap()
}

#[test]
fn test_unit_and_double_beta() {
    let mut scheduler =
        WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), vec![date(2024, 1, 5)]));
    let table = scheduler.run(&five_days(), NoProgress).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.beta(date(2024, 1, 5), "A"), Some(1.0));
    assert_eq!(table.beta(date(2024, 1, 5), "B"), Some(2.0));
}

#[test]
fn test_growing_windows_share_start() {
    let ends = vec![date(2024, 1, 3), date(2024, 1, 4), date(2024, 1, 5)];
    let mut scheduler = WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), ends.clone()));
    let table = scheduler.run(&five_days(), LogProgress).unwrap();

    assert_eq!(table.dates(), ends);
    for record in table {
        assert_eq!(record.get("A"), Some(1.0));
        assert_eq!(record.get("B"), Some(2.0));
    }
}

#[test]
fn test_empty_evaluation_dates() {
    let mut scheduler = WindowScheduler::new(SchedulerConfig::new(date(2024, 1, 1), vec![]));
    assert_eq!(
        scheduler.run(&five_days(), NoProgress).unwrap_err(),
        BetaError::EmptyDateRange
    );
    assert_eq!(scheduler.state(), SchedulerState::Failed);
}

#[test]
fn test_window_before_any_prices() {
    let mut scheduler = WindowScheduler::new(SchedulerConfig::new(
        date(2020, 1, 1),
        month_ends(date(2020, 1, 31), 3),
    ));
    let result = scheduler.run(&five_days(), NoProgress);
    assert!(matches!(result, Err(BetaError::DataUnavailable { .. })));
    assert!(scheduler.table().is_none());
}
