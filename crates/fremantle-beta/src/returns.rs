//! Simple period-over-period returns.

use crate::error::{BetaError, Result};
use fremantle_data::PriceWindow;

/// Fewest prices that yield enough returns to estimate a beta.
pub const MIN_PRICES: usize = 3;

/// Simple returns `p[i + 1] / p[i] - 1`, one shorter than the prices they came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    /// Wrap precomputed returns.
    pub const fn new(returns: Vec<f64>) -> Self {
        Self(returns)
    }

    /// Returns as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of returns.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no returns.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(returns: Vec<f64>) -> Self {
        Self(returns)
    }
}

/// Compute simple returns from an ordered price slice.
///
/// Fails with [`BetaError::InsufficientData`] for fewer than [`MIN_PRICES`] prices.
pub fn simple_returns(prices: &[f64]) -> Result<ReturnSeries> {
    if prices.len() < MIN_PRICES {
        return Err(BetaError::InsufficientData {
            required: MIN_PRICES,
            actual: prices.len(),
        });
    }

    Ok(ReturnSeries(
        prices.windows(2).map(|p| p[1] / p[0] - 1.0).collect(),
    ))
}

/// Compute simple returns for `symbol` inside a price window.
pub fn window_returns(window: &PriceWindow<'_>, symbol: &str) -> Result<ReturnSeries> {
    let prices = window
        .prices(symbol)
        .ok_or_else(|| BetaError::UnknownSymbol(symbol.to_string()))?;
    simple_returns(prices)
}
