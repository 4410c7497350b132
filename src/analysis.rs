//! # Analysis
//!
//! $$
//! \mathbf w^\*=\operatorname{MinVar}(\Sigma),\qquad A_i=w_i^\*K,\qquad
//! L^{m}=\lvert\mathrm{VaR}^{m}_c\rvert K
//! $$
//!
//! End-to-end run: optimize, evaluate, and express the result in currency
//! for a capital amount `K`.

use std::collections::HashMap;

use ndarray::Array1;
use ndarray::Array2;
use tracing::info;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::optimizer::optimize;
use crate::optimizer::OptimizationResult;
use crate::optimizer::OptimizerConfig;
use crate::returns::ReturnsMatrix;
use crate::risk::evaluate;
use crate::risk::EvaluationConfig;
use crate::risk::RiskMetrics;
use crate::risk::VarMethod;
use crate::series::cumulative_returns;
use crate::series::histogram;
use crate::series::rolling_volatility;
use crate::series::Histogram;
use crate::series::DEFAULT_HISTOGRAM_BINS;
use crate::series::DEFAULT_VOLATILITY_WINDOW;
use crate::series::TRADING_DAYS_PER_YEAR;

/// Capital used when none is configured.
pub const DEFAULT_CAPITAL: f64 = 10_000_000.0;

/// Runtime configuration for [`analyze`].
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
  /// Amount invested, in currency units.
  pub capital: f64,
  /// Optimizer settings.
  pub optimizer: OptimizerConfig,
  /// Risk evaluator settings.
  pub evaluation: EvaluationConfig,
  /// Human-readable names keyed by asset identifier, shown next to the identifier.
  pub display_names: HashMap<String, String>,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      capital: DEFAULT_CAPITAL,
      optimizer: OptimizerConfig::default(),
      evaluation: EvaluationConfig::default(),
      display_names: HashMap::new(),
    }
  }
}

impl AnalysisConfig {
  /// Default configuration with both generators seeded by `seed`.
  pub fn seeded(seed: u64) -> Self {
    Self {
      optimizer: OptimizerConfig::seeded(seed),
      evaluation: EvaluationConfig {
        seed: Some(seed),
        ..EvaluationConfig::default()
      },
      ..Self::default()
    }
  }
}

/// Optimized portfolio with its risk report and derived series.
#[derive(Clone, Debug)]
pub struct PortfolioAnalysis {
  pub capital: f64,
  pub optimization: OptimizationResult,
  pub metrics: RiskMetrics,
  /// Currency amount per asset, `weights * capital`.
  pub allocations: Array1<f64>,
  /// Per-period return of the optimized portfolio.
  pub portfolio_returns: Vec<f64>,
  /// Pearson correlation of the input asset returns.
  pub correlation: Array2<f64>,
  /// Display names of the analysed assets that have one.
  pub display_names: HashMap<String, String>,
}

impl PortfolioAnalysis {
  pub fn assets(&self) -> &[String] {
    &self.optimization.assets
  }

  pub fn weights(&self) -> &Array1<f64> {
    &self.optimization.weights
  }

  pub fn display_name(&self, asset: &str) -> Option<&str> {
    self.display_names.get(asset).map(String::as_str)
  }

  /// Loss in currency at the configured confidence level, per VaR method.
  pub fn var_amounts(&self) -> [(VarMethod, f64); 3] {
    [
      VarMethod::Historical,
      VarMethod::Parametric,
      VarMethod::MonteCarlo,
    ]
    .map(|m| (m, (self.metrics.var(m) * self.capital).abs()))
  }

  pub fn cumulative_returns(&self) -> Vec<f64> {
    cumulative_returns(&self.portfolio_returns)
  }

  /// Annualized 30-period rolling volatility of the portfolio.
  pub fn rolling_volatility(&self) -> Result<Vec<Option<f64>>> {
    rolling_volatility(
      &self.portfolio_returns,
      DEFAULT_VOLATILITY_WINDOW,
      TRADING_DAYS_PER_YEAR,
    )
  }

  pub fn histogram(&self) -> Result<Histogram> {
    histogram(&self.portfolio_returns, DEFAULT_HISTOGRAM_BINS)
  }
}

/// Optimize `returns`, evaluate the optimum and scale it to `config.capital`.
///
/// Any failure of the optimizer or the evaluator is returned unchanged.
pub fn analyze(returns: &ReturnsMatrix, config: &AnalysisConfig) -> Result<PortfolioAnalysis> {
  if !(config.capital.is_finite() && config.capital > 0.0) {
    return Err(PortfolioError::InvalidInput(format!(
      "capital must be positive, got {}",
      config.capital
    )));
  }

  let optimization = optimize(returns, &config.optimizer)?;
  let metrics = evaluate(returns, &optimization, &config.evaluation)?;
  let portfolio_returns = returns.portfolio_returns(optimization.weights.view())?;
  let correlation = returns.correlation()?;
  let allocations = &optimization.weights * config.capital;
  let display_names = config
    .display_names
    .iter()
    .filter(|(asset, _)| optimization.assets.contains(*asset))
    .map(|(asset, name)| (asset.clone(), name.clone()))
    .collect();

  info!(
    assets = optimization.assets.len(),
    capital = config.capital,
    sharpe = metrics.sharpe_ratio,
    "portfolio analysis complete"
  );

  Ok(PortfolioAnalysis {
    capital: config.capital,
    optimization,
    metrics,
    allocations,
    portfolio_returns,
    correlation,
    display_names,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use rand_distr::Distribution;
  use rand_distr::Normal;

  use super::*;

  fn market(seed: u64) -> ReturnsMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let z = Normal::new(0.0, 1.0).unwrap();
    let data = Array2::from_shape_fn((500, 4), |(_, j)| {
      0.0005 + (0.006 + 0.003 * j as f64) * z.sample(&mut rng)
    });
    let assets = ["AAPL", "MSFT", "GOOGL", "AMZN"]
      .iter()
      .map(|s| s.to_string())
      .collect();
    ReturnsMatrix::new(assets, data).unwrap()
  }

  #[test]
  fn allocations_sum_to_capital() {
    let returns = market(1);
    let res = analyze(&returns, &AnalysisConfig::seeded(1)).unwrap();
    assert_abs_diff_eq!(res.allocations.sum(), DEFAULT_CAPITAL, epsilon = 1e-3);
    assert_eq!(res.assets(), returns.assets());
    assert_eq!(res.portfolio_returns.len(), returns.n_periods());
    assert_eq!(res.correlation.dim(), (4, 4));
  }

  #[test]
  fn var_amounts_are_absolute_currency_losses() {
    let returns = market(2);
    let config = AnalysisConfig {
      capital: 1_000_000.0,
      ..AnalysisConfig::seeded(2)
    };
    let res = analyze(&returns, &config).unwrap();
    for (method, amount) in res.var_amounts() {
      assert!(amount >= 0.0);
      assert_abs_diff_eq!(
        amount,
        res.metrics.var(method).abs() * 1_000_000.0,
        epsilon = 1e-6
      );
    }
  }

  #[test]
  fn derived_series_cover_the_history() {
    let res = analyze(&market(3), &AnalysisConfig::seeded(3)).unwrap();
    assert_eq!(res.cumulative_returns().len(), 500);
    let vol = res.rolling_volatility().unwrap();
    assert_eq!(vol.iter().filter(|v| v.is_none()).count(), DEFAULT_VOLATILITY_WINDOW - 1);
    assert_eq!(res.histogram().unwrap().total(), 500);
  }

  #[test]
  fn display_names_are_kept_for_analysed_assets_only() {
    let mut config = AnalysisConfig::seeded(6);
    config
      .display_names
      .insert("MSFT".to_string(), "Microsoft Corp.".to_string());
    config
      .display_names
      .insert("TSLA".to_string(), "Tesla Inc.".to_string());
    let res = analyze(&market(6), &config).unwrap();
    assert_eq!(res.display_name("MSFT"), Some("Microsoft Corp."));
    assert_eq!(res.display_name("AAPL"), None);
    assert!(!res.display_names.contains_key("TSLA"));
  }

  #[test]
  fn non_positive_capital_is_rejected() {
    for capital in [0.0, -1.0, f64::NAN] {
      let config = AnalysisConfig {
        capital,
        ..AnalysisConfig::default()
      };
      assert!(matches!(
        analyze(&market(4), &config),
        Err(PortfolioError::InvalidInput(_))
      ));
    }
  }

  #[test]
  fn optimizer_failure_is_propagated() {
    let returns = market(5);
    let mut config = AnalysisConfig::seeded(5);
    config.optimizer.max_iters = 1;
    config.optimizer.tolerance = 1e-15;
    config.optimizer.initial_guess =
      crate::optimizer::InitialGuess::Explicit(vec![1.0, 0.0, 0.0, 0.0]);
    assert!(matches!(
      analyze(&returns, &config),
      Err(PortfolioError::OptimizationFailed(_))
    ));
  }
}
