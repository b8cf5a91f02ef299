//! Console rendering of beta tables.

use fremantle_beta::BetaTable;

const DATE_WIDTH: usize = 12;
const MIN_COLUMN_WIDTH: usize = 8;

/// Render `table` as a fixed-width text table, one row per evaluation date.
///
/// Missing betas print as `-`.
pub fn to_ascii_table(table: &BetaTable) -> String {
    let widths: Vec<usize> = table
        .tickers()
        .iter()
        .map(|t| t.len().max(MIN_COLUMN_WIDTH))
        .collect();
    let total_width = DATE_WIDTH + widths.iter().map(|w| w + 1).sum::<usize>();

    let mut output = String::new();
    output.push_str("\nStock Beta over time\n");
    output.push_str(&"=".repeat(total_width));
    output.push('\n');

    output.push_str(&format!("{:<width$}", "Date", width = DATE_WIDTH));
    for (ticker, width) in table.tickers().iter().zip(widths.iter().copied()) {
        output.push_str(&format!(" {:>width$}", ticker, width = width));
    }
    output.push('\n');
    output.push_str(&"-".repeat(total_width));
    output.push('\n');

    for record in table {
        output.push_str(&format!("{:<width$}", record.date.to_string(), width = DATE_WIDTH));
        for (ticker, width) in table.tickers().iter().zip(widths.iter().copied()) {
            match record.get(ticker) {
                Some(beta) => output.push_str(&format!(" {:>width$.2}", beta, width = width)),
                None => output.push_str(&format!(" {:>width$}", "-", width = width)),
            }
        }
        output.push('\n');
    }

    if table.is_empty() {
        output.push_str("(no records)\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fremantle_beta::BetaRecord;

    #[test]
    fn test_ascii_table() {
        let mut table = BetaTable::new(vec!["HSBC".to_string(), "BP".to_string()]);
        table.push(BetaRecord::from_estimates(
            NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
            [("HSBC", 1.126), ("BP", 0.8)],
        ));
        table.push(BetaRecord::from_estimates(
            NaiveDate::from_ymd_opt(2021, 2, 28).unwrap(),
            [("HSBC", 1.2)],
        ));

        let ascii = to_ascii_table(&table);
        assert!(ascii.contains("Stock Beta over time"));
        assert!(ascii.contains("Date"));
        assert!(ascii.contains("2021-01-31"));
        assert!(ascii.contains("    1.13"));
        assert!(ascii.contains("    0.80"));

        let last = ascii.lines().last().unwrap();
        assert!(last.starts_with("2021-02-28"));
        assert!(last.ends_with('-'));
    }

    #[test]
    fn test_ascii_table_empty() {
        let ascii = to_ascii_table(&BetaTable::new(vec!["A".to_string()]));
        assert!(ascii.contains("(no records)"));
    }
}
