//! CSV and JSON export of beta tables.
//!
//! CSV output is wide, one row per evaluation date and one column per ticker:
//!
//! ```text
//! date,HSBC,BP
//! 2021-01-31,1.12,0.87
//! 2021-02-28,1.15,0.91
//! ```
//!
//! JSON output serializes the table with its ticker order and records.

use fremantle_beta::BetaTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for BetaTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);

                let mut header = vec!["date"];
                header.extend(self.tickers().iter().map(String::as_str));
                wtr.write_record(&header)?;

                for record in self {
                    let mut row = vec![record.date.to_string()];
                    row.extend(self.tickers().iter().map(|ticker| {
                        record
                            .get(ticker)
                            .map(|beta| format!("{:.2}", beta))
                            .unwrap_or_default()
                    }));
                    wtr.write_record(&row)?;
                }

                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes)
                    .map_err(|e| ExportError::InvalidFormat(format!("non UTF-8 CSV output: {}", e)))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fremantle_beta::BetaRecord;
    use rstest::rstest;

    fn table() -> BetaTable {
        let date = |m, d| NaiveDate::from_ymd_opt(2021, m, d).unwrap();
        let mut table = BetaTable::new(vec!["HSBC".to_string(), "BP".to_string()]);
        table.push(BetaRecord::from_estimates(date(1, 31), [("HSBC", 1.123), ("BP", 0.8)]));
        table.push(BetaRecord::from_estimates(date(2, 28), [("HSBC", 1.2), ("BP", 0.912)]));
        table
    }

    #[test]
    fn test_beta_table_export_csv() {
        let csv = table().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,HSBC,BP",
                "2021-01-31,1.12,0.80",
                "2021-02-28,1.20,0.91"
            ]
        );
    }

    #[test]
    fn test_beta_table_export_csv_missing_beta() {
        let mut table = BetaTable::new(vec!["A".to_string(), "B".to_string()]);
        table.push(BetaRecord::from_estimates(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            [("A", 1.0)],
        ));
        let csv = table.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("2024-01-31,1.00,\n"));
    }

    #[test]
    fn test_beta_table_export_json() {
        let json = table().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"tickers\":[\"HSBC\",\"BP\"]"));
        assert!(json.contains("\"2021-01-31\""));
        assert!(json.contains("1.12"));

        let parsed: BetaTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table());
    }

    #[test]
    fn test_beta_table_export_pretty_json() {
        let json = table().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("  "));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join("fremantle_export_test.csv");
        table().export_to_file(&path, ExportFormat::Csv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("date,HSBC,BP"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_export_format_parse(#[case] raw: &str, #[case] expected: ExportFormat) {
        assert_eq!(raw.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_export_format_parse_invalid() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }
}
