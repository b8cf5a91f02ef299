//! Chart artifacts written to an output directory.

use crate::chart::BetaChart;
use chrono::{Local, NaiveDateTime};
use fremantle_beta::BetaTable;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Timestamp layout used in artifact file names.
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The beta table has no records to draw.
    #[error("Beta table is empty")]
    EmptyTable,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Path of the chart artifact for a render at `now`: `<dir>/beta_<YYYY-MM-DD_HH-MM-SS>.svg`.
pub fn artifact_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!("beta_{}.svg", now.format(STAMP_FORMAT)))
}

/// Render `table` into `dir`, stamped with the local time.
///
/// Creates `dir` if needed and returns the written path.
pub fn render_to_dir(table: &BetaTable, dir: &Path) -> Result<PathBuf, ReportError> {
    render_to_dir_at(table, dir, Local::now().naive_local())
}

/// Render `table` into `dir`, stamped with `now`.
pub fn render_to_dir_at(
    table: &BetaTable,
    dir: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf, ReportError> {
    let svg = BetaChart::new(table).to_svg()?;

    fs::create_dir_all(dir)?;
    let path = artifact_path(dir, now);
    fs::write(&path, svg)?;

    tracing::info!(path = %path.display(), records = table.len(), "wrote beta chart");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fremantle_beta::BetaRecord;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 30)
            .unwrap()
    }

    #[test]
    fn test_artifact_path() {
        let path = artifact_path(Path::new("output"), stamp());
        assert_eq!(path, Path::new("output").join("beta_2024-03-07_09-05-30.svg"));
    }

    #[test]
    fn test_render_to_dir_creates_directory() {
        let dir = std::env::temp_dir()
            .join("fremantle_report_test")
            .join("nested");
        std::fs::remove_dir_all(&dir).ok();

        let mut table = BetaTable::new(vec!["A".to_string()]);
        table.push(BetaRecord::from_estimates(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            [("A", 1.25)],
        ));

        let path = render_to_dir_at(&table, &dir, stamp()).unwrap();
        assert_eq!(path, artifact_path(&dir, stamp()));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Stock Beta over time"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_render_empty_table_writes_nothing() {
        let dir = std::env::temp_dir().join("fremantle_report_empty");
        std::fs::remove_dir_all(&dir).ok();

        let table = BetaTable::new(vec!["A".to_string()]);
        assert!(matches!(
            render_to_dir_at(&table, &dir, stamp()),
            Err(ReportError::EmptyTable)
        ));
        assert!(!dir.exists());
    }
}
