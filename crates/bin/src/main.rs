//! Fremantle CLI binary.
//!
//! Computes rolling market betas for a basket of tickers and writes a chart.

mod progress;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fremantle::BetaSession;
use fremantle_beta::{BetaError, DEFAULT_PERIODS, SchedulerConfig, month_ends};
use fremantle_data::yahoo::YahooQuoteProvider;
use fremantle_data::{Interval, LoadOptions};
use fremantle_output::{ExportFormat, to_ascii_table};
use progress::BarProgress;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fremantle")]
#[command(about = "Fremantle: rolling market beta for a basket of stocks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate betas over growing windows and chart them
    Run {
        /// Comma-separated ticker symbols
        #[arg(long, value_delimiter = ',', default_value = "HSBC,BP")]
        tickers: Vec<String>,

        /// Benchmark index symbol
        #[arg(long, default_value = "^GSPC")]
        index: String,

        /// First date of every window
        #[arg(long, default_value = "2020-01-01")]
        start: NaiveDate,

        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Price bar interval for downloads
        #[arg(long, default_value = "1d")]
        interval: String,

        /// Download unadjusted closes instead of adjusted ones
        #[arg(long)]
        no_auto_adjust: bool,

        /// Include pre- and post-market bars in downloads
        #[arg(long)]
        pre_post: bool,

        /// Directory for the chart and exports
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Read prices from a wide CSV file instead of downloading them
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Also write the beta table in this format
        #[arg(long, value_enum)]
        export: Option<ExportArg>,
    },

    /// Print the evaluation dates
    Dates {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
}

#[derive(clap::Args)]
struct ScheduleArgs {
    /// First evaluation date; later ones fall on following month ends
    #[arg(long, default_value = "2021-01-31")]
    first_end: NaiveDate,

    /// Number of monthly evaluation dates
    #[arg(long, default_value_t = DEFAULT_PERIODS)]
    periods: usize,
}

impl ScheduleArgs {
    fn end_dates(&self) -> Vec<NaiveDate> {
        month_ends(self.first_end, self.periods)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportArg {
    Csv,
    Json,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Csv => Self::Csv,
            ExportArg::Json => Self::PrettyJson,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            tickers,
            index,
            start,
            schedule,
            interval,
            no_auto_adjust,
            pre_post,
            output_dir,
            prices,
            export,
        } => {
            let options = LoadOptions::new(start, start)
                .interval(interval.parse::<Interval>()?)
                .auto_adjust(!no_auto_adjust)
                .pre_post(pre_post);
            let run = RunArgs {
                tickers,
                index,
                schedule: SchedulerConfig::new(start, schedule.end_dates()),
                options,
                output_dir,
                prices,
                export: export.map(ExportFormat::from),
            };
            run_betas(run).await?;
        }
        Commands::Dates { schedule } => {
            for date in schedule.end_dates() {
                println!("{}", date);
            }
        }
    }

    Ok(())
}

struct RunArgs {
    tickers: Vec<String>,
    index: String,
    schedule: SchedulerConfig,
    options: LoadOptions,
    output_dir: PathBuf,
    prices: Option<PathBuf>,
    export: Option<ExportFormat>,
}

async fn run_betas(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = BetaSession::new(args.tickers, args.index)?;
    let SchedulerConfig { start, end_dates } = args.schedule;
    if end_dates.is_empty() {
        return Err(BetaError::EmptyDateRange.into());
    }

    tracing::debug!(
        schedule = %serde_json::to_string(&SchedulerConfig::new(start, end_dates.clone()))?,
        "run configuration"
    );

    match &args.prices {
        Some(path) => {
            tracing::info!(path = %path.display(), "reading prices from file");
            session.load_csv_file(path)?;
        }
        None => {
            // Prices are needed up to the last evaluation date.
            let end = end_dates.iter().max().copied().unwrap_or(start);
            let options = LoadOptions { end, ..args.options };
            tracing::info!(
                tickers = ?session.tickers().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                benchmark = %session.benchmark(),
                options = %serde_json::to_string(&options)?,
                "downloading prices"
            );
            let provider = YahooQuoteProvider::new()?;
            session.load_yahoo(&provider, &options).await?;
        }
    }

    let mut bar = BarProgress::new(end_dates.len());
    let table = match session.run(start, end_dates, &mut bar) {
        Ok(table) => {
            bar.finish("Done");
            table
        }
        Err(e) => {
            bar.finish("Failed!");
            return Err(e.into());
        }
    };
    println!("{}", to_ascii_table(table));

    let chart = session.render(&args.output_dir)?;
    println!("Chart written to {}", chart.display());

    if let Some(format) = args.export {
        let path = chart.with_extension(format.extension());
        session.export(&path, format)?;
        println!("Table written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["fremantle", "run"]).unwrap();
        let Commands::Run {
            tickers,
            index,
            start,
            schedule,
            interval,
            output_dir,
            prices,
            export,
            ..
        } = cli.command
        else {
            panic!("expected run command");
        };

        assert_eq!(tickers, vec!["HSBC".to_string(), "BP".to_string()]);
        assert_eq!(index, "^GSPC");
        assert_eq!(start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(interval, "1d");
        assert_eq!(output_dir, PathBuf::from("output"));
        assert!(prices.is_none());
        assert!(export.is_none());

        let ends = schedule.end_dates();
        assert_eq!(ends.len(), 24);
        assert_eq!(ends[0], NaiveDate::from_ymd_opt(2021, 1, 31).unwrap());
        assert_eq!(ends[23], NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "fremantle",
            "run",
            "--tickers",
            "VOD,BARC",
            "--index",
            "^FTSE",
            "--prices",
            "prices.csv",
            "--export",
            "json",
        ])
        .unwrap();
        let Commands::Run {
            tickers,
            index,
            prices,
            export,
            ..
        } = cli.command
        else {
            panic!("expected run command");
        };

        assert_eq!(tickers, vec!["VOD".to_string(), "BARC".to_string()]);
        assert_eq!(index, "^FTSE");
        assert_eq!(prices, Some(PathBuf::from("prices.csv")));
        assert_eq!(
            export.map(ExportFormat::from),
            Some(ExportFormat::PrettyJson)
        );
    }

    #[tokio::test]
    async fn test_no_periods_fails_before_loading() {
        let args = RunArgs {
            tickers: vec!["HSBC".to_string()],
            index: "^GSPC".to_string(),
            schedule: SchedulerConfig::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), vec![]),
            options: LoadOptions::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            ),
            output_dir: std::env::temp_dir(),
            prices: Some(PathBuf::from("/nonexistent/fremantle_prices.csv")),
            export: None,
        };

        let err = run_betas(args).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BetaError>(),
            Some(BetaError::EmptyDateRange)
        ));
    }

    #[test]
    fn test_dates_command() {
        let cli =
            Cli::try_parse_from(["fremantle", "dates", "--first-end", "2021-06-15", "--periods", "2"])
                .unwrap();
        let Commands::Dates { schedule } = cli.command else {
            panic!("expected dates command");
        };
        assert_eq!(
            schedule.end_dates(),
            vec![
                NaiveDate::from_ymd_opt(2021, 6, 30).unwrap(),
                NaiveDate::from_ymd_opt(2021, 7, 31).unwrap()
            ]
        );
    }
}
