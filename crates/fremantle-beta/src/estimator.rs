//! Covariance beta estimation.
//!
//! Beta measures how strongly a security moves with its benchmark:
//!
//! ```text
//! β = Cov(R_i, R_m) / Var(R_m)
//! ```
//!
//! Both moments come from the same 2x2 sample covariance matrix (`n - 1`
//! denominator), so the normalisation cancels and the ratio is the textbook
//! beta. β > 1 amplifies market moves, β = 1 tracks them, β < 1 dampens them.

use crate::error::{BetaError, Result};
use crate::returns::ReturnSeries;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Trait for beta estimators
pub trait BetaEstimator {
    /// Short estimator name used in logs
    fn name(&self) -> &str;

    /// Estimate beta from pointwise-aligned stock and benchmark returns.
    ///
    /// The result keeps full precision.
    fn estimate(&self, stock: &ReturnSeries, benchmark: &ReturnSeries) -> Result<f64>;
}

/// Configuration for [`CovarianceBeta`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetaConfig {
    /// Minimum number of return observations (default: 2, never lower)
    pub min_observations: usize,
}

impl Default for BetaConfig {
    fn default() -> Self {
        Self {
            min_observations: 2,
        }
    }
}

/// Beta as the ratio of sample covariance to sample variance
#[derive(Debug, Clone, Default)]
pub struct CovarianceBeta {
    config: BetaConfig,
}

impl CovarianceBeta {
    /// Create an estimator with the given configuration
    pub fn new(mut config: BetaConfig) -> Self {
        config.min_observations = config.min_observations.max(2);
        Self { config }
    }

    /// The active configuration
    pub const fn config(&self) -> &BetaConfig {
        &self.config
    }
}

impl BetaEstimator for CovarianceBeta {
    fn name(&self) -> &str {
        "covariance"
    }

    fn estimate(&self, stock: &ReturnSeries, benchmark: &ReturnSeries) -> Result<f64> {
        if stock.len() != benchmark.len() {
            return Err(BetaError::LengthMismatch {
                stock: stock.len(),
                benchmark: benchmark.len(),
            });
        }

        let n_obs = stock.len();
        if n_obs < self.config.min_observations {
            return Err(BetaError::InsufficientData {
                required: self.config.min_observations,
                actual: n_obs,
            });
        }

        let (stock, benchmark) = (stock.as_slice(), benchmark.as_slice());
        let returns =
            Array2::from_shape_fn((n_obs, 2), |(t, j)| if j == 0 { stock[t] } else { benchmark[t] });
        let cov = sample_covariance(&returns);

        let variance = cov[[1, 1]];
        // Constant benchmark returns leave only rounding noise in the variance.
        let scale = benchmark.iter().map(|r| r * r).sum::<f64>() / (n_obs - 1) as f64;
        if variance.is_nan() || variance <= f64::EPSILON * scale {
            return Err(BetaError::ZeroVariance);
        }

        Ok(cov[[0, 1]] / variance)
    }
}

/// Sample covariance matrix of the columns of `returns` (`n - 1` denominator).
///
/// Rows are observations, columns are series. Needs at least two rows.
pub fn sample_covariance(returns: &Array2<f64>) -> Array2<f64> {
    let n = returns.nrows() as f64;
    let means = returns.sum_axis(Axis(0)) / n;
    let centered = returns - &means.insert_axis(Axis(0));

    centered.t().dot(&centered) / (n - 1.0)
}

/// Round a beta to two decimals, halves away from zero.
pub fn round_beta(beta: f64) -> f64 {
    // Adding zero folds -0.0 into 0.0.
    (beta * 100.0).round() / 100.0 + 0.0
}
