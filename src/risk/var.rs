//! # Value at Risk
//!
//! $$
//! \mathrm{VaR}_c=Q_{R_p}(1-c),\qquad
//! \mathrm{VaR}^{\mathcal N}_c=\bar R_p+\sigma_{R_p}\,\Phi^{-1}(1-c)
//! $$
//!
//! Three estimators of the `(1 - c)` quantile of the per-period portfolio
//! return: empirical, Gaussian closed form and Gaussian simulation. All three
//! return a signed return (negative means loss) and share the same mean and
//! population standard deviation of the input series, so they are comparable
//! for a fixed confidence level and return frequency.

use std::fmt::Display;

use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal as StatNormal;

use super::confidence::ConfidenceLevel;
use super::sharpe::DEGENERATE_STD;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::stats::mean;
use crate::stats::population_std;
use crate::stats::quantile;

/// Simulation count used when none is configured.
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Estimation method of a VaR figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarMethod {
  Historical,
  Parametric,
  MonteCarlo,
}

impl Display for VarMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      VarMethod::Historical => write!(f, "Historical"),
      VarMethod::Parametric => write!(f, "Parametric"),
      VarMethod::MonteCarlo => write!(f, "Monte Carlo"),
    }
  }
}

/// Empirical `(1 - c)` quantile of `series` (linear interpolation between ranks).
pub fn var_historical(series: &[f64], confidence_level: f64) -> Result<f64> {
  let level = ConfidenceLevel::new(confidence_level)?;
  check_series(series)?;
  Ok(quantile(series, level.tail()))
}

/// Gaussian `(1 - c)` quantile fitted by mean and population standard deviation.
pub fn var_parametric(series: &[f64], confidence_level: f64) -> Result<f64> {
  let level = ConfidenceLevel::new(confidence_level)?;
  let (mu, sigma) = fit_normal(series)?;
  let normal = StatNormal::new(mu, sigma)
    .map_err(|e| PortfolioError::DegenerateDistribution(e.to_string()))?;
  Ok(normal.inverse_cdf(level.tail()))
}

/// Empirical `(1 - c)` quantile of `num_simulations` Gaussian draws with the
/// series' mean and population standard deviation.
///
/// The generator is supplied by the caller; seed it for reproducible output.
pub fn var_monte_carlo<R: Rng + ?Sized>(
  series: &[f64],
  confidence_level: f64,
  num_simulations: usize,
  rng: &mut R,
) -> Result<f64> {
  let level = ConfidenceLevel::new(confidence_level)?;
  if num_simulations == 0 {
    return Err(PortfolioError::InvalidInput(
      "Monte-Carlo VaR needs at least one simulation".to_string(),
    ));
  }

  let (mu, sigma) = fit_normal(series)?;
  let normal =
    Normal::new(mu, sigma).map_err(|e| PortfolioError::DegenerateDistribution(e.to_string()))?;
  let simulated = Array1::random_using(num_simulations, normal, rng).to_vec();

  Ok(quantile(&simulated, level.tail()))
}

fn check_series(series: &[f64]) -> Result<()> {
  if series.is_empty() {
    return Err(PortfolioError::InsufficientData(
      "VaR of an empty return series".to_string(),
    ));
  }
  if series.iter().any(|r| !r.is_finite()) {
    return Err(PortfolioError::InvalidInput(
      "return series contains non-finite values".to_string(),
    ));
  }
  Ok(())
}

fn fit_normal(series: &[f64]) -> Result<(f64, f64)> {
  check_series(series)?;
  let sigma = population_std(series);
  if sigma <= DEGENERATE_STD {
    return Err(PortfolioError::DegenerateDistribution(format!(
      "return series has zero spread (std {sigma:e}); Gaussian VaR is undefined"
    )));
  }
  Ok((mean(series), sigma))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  const SYNTHETIC: [f64; 10] = [
    -0.05, -0.03, -0.01, 0.00, 0.01, 0.02, 0.03, 0.04, 0.05, 0.06,
  ];

  /// Series with exact mean 0 and population standard deviation `sd`.
  fn symmetric_series(sd: f64) -> Vec<f64> {
    vec![-sd, sd, -sd, sd]
  }

  #[test]
  fn historical_var_interpolates_between_ranks() {
    // position 0.1 * 9 = 0.9 between -0.05 and -0.03
    let var = var_historical(&SYNTHETIC, 0.90).unwrap();
    assert_abs_diff_eq!(var, -0.032, epsilon = 1e-12);

    let var95 = var_historical(&SYNTHETIC, 0.95).unwrap();
    assert_abs_diff_eq!(var95, -0.041, epsilon = 1e-12);
  }

  #[test]
  fn historical_var_ignores_input_order() {
    let mut shuffled = SYNTHETIC.to_vec();
    shuffled.reverse();
    assert_abs_diff_eq!(
      var_historical(&shuffled, 0.90).unwrap(),
      var_historical(&SYNTHETIC, 0.90).unwrap()
    );
  }

  #[test]
  fn parametric_var_matches_normal_quantile() {
    let var = var_parametric(&symmetric_series(0.02), 0.95).unwrap();
    assert_abs_diff_eq!(var, 0.02 * -1.6448536269514722, epsilon = 1e-9);
    assert_abs_diff_eq!(var, -0.0329, epsilon = 1e-4);
  }

  #[test]
  fn higher_confidence_means_larger_loss() {
    let s = symmetric_series(0.015);
    let v90 = var_parametric(&s, 0.90).unwrap();
    let v95 = var_parametric(&s, 0.95).unwrap();
    let v99 = var_parametric(&s, 0.99).unwrap();
    assert!(v99 < v95 && v95 < v90);
  }

  #[test]
  fn monte_carlo_converges_to_parametric() {
    let series = symmetric_series(0.02);
    let parametric = var_parametric(&series, 0.95).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let simulated = var_monte_carlo(&series, 0.95, 100_000, &mut rng).unwrap();
    assert!(
      (simulated - parametric).abs() < 0.002,
      "monte carlo {simulated} vs parametric {parametric}"
    );
  }

  #[test]
  fn monte_carlo_is_reproducible_with_a_seed() {
    let a = var_monte_carlo(&SYNTHETIC, 0.99, 5_000, &mut StdRng::seed_from_u64(1)).unwrap();
    let b = var_monte_carlo(&SYNTHETIC, 0.99, 5_000, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn invalid_confidence_levels_are_rejected() {
    for bad in [0.0, 1.0, 1.2, -0.1] {
      assert!(matches!(
        var_historical(&SYNTHETIC, bad),
        Err(PortfolioError::InvalidConfidenceLevel(_))
      ));
      assert!(matches!(
        var_parametric(&SYNTHETIC, bad),
        Err(PortfolioError::InvalidConfidenceLevel(_))
      ));
      assert!(matches!(
        var_monte_carlo(&SYNTHETIC, bad, 100, &mut StdRng::seed_from_u64(0)),
        Err(PortfolioError::InvalidConfidenceLevel(_))
      ));
    }
  }

  #[test]
  fn constant_series_is_degenerate_for_gaussian_methods() {
    let flat = [0.001; 50];
    assert!(matches!(
      var_parametric(&flat, 0.95),
      Err(PortfolioError::DegenerateDistribution(_))
    ));
    assert!(matches!(
      var_monte_carlo(&flat, 0.95, 100, &mut StdRng::seed_from_u64(0)),
      Err(PortfolioError::DegenerateDistribution(_))
    ));
    // the empirical quantile of a constant series is well defined
    assert_abs_diff_eq!(var_historical(&flat, 0.95).unwrap(), 0.001, epsilon = 1e-15);
  }

  #[test]
  fn empty_series_and_zero_simulations_are_rejected() {
    assert!(matches!(
      var_historical(&[], 0.95),
      Err(PortfolioError::InsufficientData(_))
    ));
    assert!(matches!(
      var_monte_carlo(&SYNTHETIC, 0.95, 0, &mut StdRng::seed_from_u64(0)),
      Err(PortfolioError::InvalidInput(_))
    ));
  }
}
