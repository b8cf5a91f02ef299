#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod error;
pub mod estimator;
pub mod progress;
pub mod record;
pub mod returns;
pub mod scheduler;

pub use calendar::{DEFAULT_PERIODS, month_end, month_ends};
pub use error::{BetaError, Result};
pub use estimator::{BetaConfig, BetaEstimator, CovarianceBeta, round_beta, sample_covariance};
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use record::{BetaRecord, BetaTable};
pub use returns::{MIN_PRICES, ReturnSeries, simple_returns, window_returns};
pub use scheduler::{SchedulerConfig, SchedulerState, WindowScheduler, compute_window};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
