//! # Risk Metrics
//!
//! $$
//! \big(\mathbb E[R_p],\ \sigma_p^2,\ S,\ \mathrm{VaR}^{H}_c,\ \mathrm{VaR}^{\mathcal N}_c,\ \mathrm{VaR}^{MC}_c\big)
//! $$
//!
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;

use super::confidence::ConfidenceLevel;
use super::sharpe::sharpe_ratio_of_series;
use super::var::var_historical;
use super::var::var_monte_carlo;
use super::var::var_parametric;
use super::var::VarMethod;
use super::var::DEFAULT_SIMULATIONS;
use super::variance::portfolio_variance;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::optimizer::OptimizationResult;
use crate::returns::ReturnsMatrix;

/// Runtime configuration for [`evaluate`].
#[derive(Clone, Debug)]
pub struct EvaluationConfig {
  /// Confidence level shared by the three VaR estimators.
  pub confidence_level: f64,
  /// Per-period risk-free rate subtracted in the Sharpe ratio.
  pub risk_free_rate: f64,
  /// Monte-Carlo sample size.
  pub num_simulations: usize,
  /// Seed of the Monte-Carlo generator; `None` draws from OS entropy.
  pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
  fn default() -> Self {
    Self {
      confidence_level: ConfidenceLevel::default().value(),
      risk_free_rate: 0.0,
      num_simulations: DEFAULT_SIMULATIONS,
      seed: None,
    }
  }
}

/// Risk and performance figures of an optimized portfolio.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskMetrics {
  /// Expected per-period return `w' mu`.
  pub expected_return: f64,
  /// Portfolio variance `w' Sigma w`.
  pub variance: f64,
  /// Per-period Sharpe ratio.
  pub sharpe_ratio: f64,
  /// Empirical VaR (signed return).
  pub var_historical: f64,
  /// Gaussian closed-form VaR (signed return).
  pub var_parametric: f64,
  /// Gaussian simulated VaR (signed return).
  pub var_monte_carlo: f64,
  /// Confidence level behind the three VaR figures.
  pub confidence_level: f64,
}

impl RiskMetrics {
  pub fn volatility(&self) -> f64 {
    self.variance.max(0.0).sqrt()
  }

  /// VaR figure of the given method.
  pub fn var(&self, method: VarMethod) -> f64 {
    match method {
      VarMethod::Historical => self.var_historical,
      VarMethod::Parametric => self.var_parametric,
      VarMethod::MonteCarlo => self.var_monte_carlo,
    }
  }
}

/// Evaluate the optimized portfolio over the history it was fitted on.
pub fn evaluate(
  returns: &ReturnsMatrix,
  optimized: &OptimizationResult,
  config: &EvaluationConfig,
) -> Result<RiskMetrics> {
  if optimized.assets.as_slice() != returns.assets() {
    return Err(PortfolioError::InvalidInput(
      "optimization result was computed for a different asset list".to_string(),
    ));
  }

  let series = returns.portfolio_returns(optimized.weights.view())?;
  let mut rng = match config.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  evaluate_series(
    &series,
    optimized.expected_return,
    portfolio_variance(optimized.weights.view(), optimized.covariance.view())?,
    config,
    &mut rng,
  )
}

/// Assemble [`RiskMetrics`] from a portfolio return series and its model moments.
pub fn evaluate_series<R: Rng + ?Sized>(
  series: &[f64],
  expected_return: f64,
  variance: f64,
  config: &EvaluationConfig,
  rng: &mut R,
) -> Result<RiskMetrics> {
  let level = ConfidenceLevel::new(config.confidence_level)?;

  let metrics = RiskMetrics {
    expected_return,
    variance,
    sharpe_ratio: sharpe_ratio_of_series(series, config.risk_free_rate)?,
    var_historical: var_historical(series, level.value())?,
    var_parametric: var_parametric(series, level.value())?,
    var_monte_carlo: var_monte_carlo(series, level.value(), config.num_simulations, rng)?,
    confidence_level: level.value(),
  };

  debug!(?metrics, "risk metrics evaluated");
  Ok(metrics)
}
