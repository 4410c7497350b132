//! # Sharpe Ratio
//!
//! $$
//! S=\frac{\overline{R_p-r_f}}{\sigma(R_p-r_f)},\qquad R_{p,t}=\sum_i w_i r_{t,i}
//! $$
//!
//! Per-period (not annualized) ratio. `sigma` is the population standard
//! deviation (divisor `N`), which gives a slightly larger ratio than the
//! sample convention for short histories.

use ndarray::ArrayView1;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::returns::ReturnsMatrix;
use crate::stats::mean;
use crate::stats::population_std;

/// Standard deviations at or below this are treated as zero.
pub(crate) const DEGENERATE_STD: f64 = 1e-12;

/// Sharpe ratio of the portfolio `weights` over the history in `returns`.
pub fn sharpe_ratio(
  returns: &ReturnsMatrix,
  weights: ArrayView1<f64>,
  risk_free_rate: f64,
) -> Result<f64> {
  let series = returns.portfolio_returns(weights)?;
  sharpe_ratio_of_series(&series, risk_free_rate)
}

/// Sharpe ratio of an already aggregated per-period return series.
pub fn sharpe_ratio_of_series(series: &[f64], risk_free_rate: f64) -> Result<f64> {
  if series.is_empty() {
    return Err(PortfolioError::InsufficientData(
      "Sharpe ratio of an empty return series".to_string(),
    ));
  }
  if !risk_free_rate.is_finite() {
    return Err(PortfolioError::InvalidInput(format!(
      "risk-free rate must be finite, got {risk_free_rate}"
    )));
  }

  let excess: Vec<f64> = series.iter().map(|r| r - risk_free_rate).collect();
  let sd = population_std(&excess);
  if sd <= DEGENERATE_STD {
    return Err(PortfolioError::DegenerateDistribution(format!(
      "excess returns have zero spread (std {sd:e}); Sharpe ratio is undefined"
    )));
  }

  Ok(mean(&excess) / sd)
}
