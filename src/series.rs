//! # Series
//!
//! $$
//! C_t=\prod_{s\le t}(1+r_s)-1,\qquad
//! \sigma^{ann}_t=\sqrt{P}\ \mathrm{sd}\big(r_{t-W+1},\dots,r_t\big)
//! $$
//!
//! Derived views of a portfolio return series used for charting: growth path,
//! rolling annualized volatility and a return histogram.

use crate::error::PortfolioError;
use crate::error::Result;
use crate::stats::sample_std;

/// Trading periods per year for daily data.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Trailing window of [`rolling_volatility`] in the report.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;
/// Bin count of the return histogram in the report.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Running compounded return `prod(1 + r) - 1`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
  returns
    .iter()
    .scan(1.0, |growth, r| {
      *growth *= 1.0 + r;
      Some(*growth - 1.0)
    })
    .collect()
}

/// Annualized sample volatility over each trailing `window`.
///
/// The first `window - 1` positions have no full window and are `None`.
pub fn rolling_volatility(
  returns: &[f64],
  window: usize,
  periods_per_year: f64,
) -> Result<Vec<Option<f64>>> {
  if window < 2 {
    return Err(PortfolioError::InvalidInput(format!(
      "rolling window must cover at least 2 periods, got {window}"
    )));
  }
  if !(periods_per_year.is_finite() && periods_per_year > 0.0) {
    return Err(PortfolioError::InvalidInput(format!(
      "periods per year must be positive, got {periods_per_year}"
    )));
  }

  let scale = periods_per_year.sqrt();
  let mut out = vec![None; returns.len().min(window - 1)];
  out.extend(
    returns
      .windows(window)
      .map(|w| Some(sample_std(w) * scale)),
  );
  Ok(out)
}

/// Equal-width histogram of a return series.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
  /// `bins + 1` ascending bin edges.
  pub edges: Vec<f64>,
  /// Observations per bin; the last bin is closed on the right.
  pub counts: Vec<usize>,
}

impl Histogram {
  pub fn bins(&self) -> usize {
    self.counts.len()
  }

  pub fn total(&self) -> usize {
    self.counts.iter().sum()
  }
}

/// Bin `returns` into `bins` equal-width buckets over `[min, max]`.
///
/// A constant series is binned over `[x - 0.5, x + 0.5]`.
pub fn histogram(returns: &[f64], bins: usize) -> Result<Histogram> {
  if bins == 0 {
    return Err(PortfolioError::InvalidInput(
      "histogram needs at least one bin".to_string(),
    ));
  }
  if returns.is_empty() {
    return Err(PortfolioError::InsufficientData(
      "histogram of an empty return series".to_string(),
    ));
  }
  if returns.iter().any(|r| !r.is_finite()) {
    return Err(PortfolioError::InvalidInput(
      "return series contains non-finite values".to_string(),
    ));
  }

  let (mut lo, mut hi) = returns
    .iter()
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
      (lo.min(r), hi.max(r))
    });
  if lo == hi {
    lo -= 0.5;
    hi += 0.5;
  }

  let width = (hi - lo) / bins as f64;
  let edges: Vec<f64> = (0..=bins)
    .map(|i| if i == bins { hi } else { lo + width * i as f64 })
    .collect();

  let mut counts = vec![0; bins];
  for &r in returns {
    let idx = (((r - lo) / width).floor() as usize).min(bins - 1);
    counts[idx] += 1;
  }

  Ok(Histogram { edges, counts })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn cumulative_returns_compound() {
    let c = cumulative_returns(&[0.1, -0.1, 0.05]);
    assert_abs_diff_eq!(c[0], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(c[1], 1.1 * 0.9 - 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(c[2], 1.1 * 0.9 * 1.05 - 1.0, epsilon = 1e-12);
    assert!(cumulative_returns(&[]).is_empty());
  }

  #[test]
  fn rolling_volatility_pads_and_annualizes() {
    let r = [0.01, -0.01, 0.01, -0.01, 0.02];
    let vol = rolling_volatility(&r, 3, TRADING_DAYS_PER_YEAR).unwrap();
    assert_eq!(vol.len(), r.len());
    assert!(vol[0].is_none() && vol[1].is_none());

    let expected = sample_std(&r[..3]) * TRADING_DAYS_PER_YEAR.sqrt();
    assert_abs_diff_eq!(vol[2].unwrap(), expected, epsilon = 1e-15);
    assert_abs_diff_eq!(
      vol[4].unwrap(),
      sample_std(&r[2..]) * TRADING_DAYS_PER_YEAR.sqrt(),
      epsilon = 1e-15
    );
  }

  #[test]
  fn rolling_volatility_on_short_series_is_all_none() {
    let vol = rolling_volatility(&[0.01, 0.02], DEFAULT_VOLATILITY_WINDOW, 252.0).unwrap();
    assert_eq!(vol, vec![None, None]);
    assert!(rolling_volatility(&[0.01; 10], 1, 252.0).is_err());
    assert!(rolling_volatility(&[0.01; 10], 5, 0.0).is_err());
  }

  #[test]
  fn histogram_counts_every_observation() {
    let r = [-0.05, -0.03, -0.01, 0.00, 0.01, 0.02, 0.03, 0.04, 0.05, 0.06];
    let h = histogram(&r, 4).unwrap();
    assert_eq!(h.bins(), 4);
    assert_eq!(h.edges.len(), 5);
    assert_eq!(h.total(), r.len());
    assert_abs_diff_eq!(h.edges[0], -0.05);
    assert_abs_diff_eq!(h.edges[4], 0.06);
    // the maximum lands in the last, right-closed bin
    assert!(h.counts[3] >= 1);
  }

  #[test]
  fn constant_series_gets_unit_range() {
    let h = histogram(&[0.01; 7], 5).unwrap();
    assert_abs_diff_eq!(h.edges[0], -0.49, epsilon = 1e-12);
    assert_abs_diff_eq!(h.edges[5], 0.51, epsilon = 1e-12);
    assert_eq!(h.counts, vec![0, 0, 7, 0, 0]);
  }

  #[test]
  fn histogram_rejects_bad_input() {
    assert!(matches!(
      histogram(&[], 10),
      Err(PortfolioError::InsufficientData(_))
    ));
    assert!(matches!(
      histogram(&[0.1], 0),
      Err(PortfolioError::InvalidInput(_))
    ));
  }
}
