//! Error types for beta estimation.

use thiserror::Error;

/// Result type for beta operations.
pub type Result<T> = std::result::Result<T, BetaError>;

/// Errors that can occur while estimating betas.
#[derive(Debug, Error, PartialEq)]
pub enum BetaError {
    /// A window has no prices or lacks the benchmark
    #[error("Data unavailable: {reason}")]
    DataUnavailable {
        /// What was missing
        reason: String,
    },

    /// A requested ticker has no prices in the window
    #[error("Unknown symbol: data for {0} wasn't loaded")]
    UnknownSymbol(String),

    /// Too few observations to estimate
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// No evaluation dates were supplied
    #[error("Empty date range: no evaluation dates to process")]
    EmptyDateRange,

    /// Stock and benchmark returns are not pointwise aligned
    #[error("Length mismatch: {stock} stock returns vs {benchmark} benchmark returns")]
    LengthMismatch {
        /// Number of stock returns
        stock: usize,
        /// Number of benchmark returns
        benchmark: usize,
    },

    /// Benchmark returns do not vary, so beta is undefined
    #[error("Benchmark returns have zero variance")]
    ZeroVariance,

    /// The scheduler already reached a terminal state
    #[error("Scheduler has already run")]
    AlreadyRun,
}

impl BetaError {
    /// Shorthand for [`BetaError::DataUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }
}
