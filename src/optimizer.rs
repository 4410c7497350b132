//! # Optimizer
//!
//! $$
//! \mathbf w^\*=\arg\min_{\mathbf w}\ \mathbf w^\top\Sigma\mathbf w
//! \quad\text{s.t.}\quad \mathbf 1^\top\mathbf w=1,\ \ 0\le w_i\le 1
//! $$
//!
//! Long-only, fully-invested minimum-variance portfolio over the sample
//! covariance of a [`ReturnsMatrix`]. The objective is convex, so every
//! feasible starting point reaches the same optimum up to solver tolerance.

pub mod bounds;
pub mod problem;
pub mod solver;

use argmin::core::State;
use ndarray::Array1;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Dirichlet;
use rand_distr::Distribution;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub use bounds::WeightBounds;
pub use problem::MinVarianceProblem;
pub use solver::ProjectedGradient;
pub use solver::SolverState;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::returns::ReturnsMatrix;
use crate::risk::portfolio_variance;

/// Slack allowed on the budget and box constraints of returned weights.
const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// Starting point policy for the solver.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InitialGuess {
  /// Equal weights `1/n`.
  Uniform,
  /// Uniform draw on the simplex, `Dirichlet(1, ..., 1)`.
  #[default]
  Dirichlet,
  /// Caller-supplied weights, projected onto the feasible set before use.
  Explicit(Vec<f64>),
}

/// Runtime configuration for [`optimize`].
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
  /// Starting point policy.
  pub initial_guess: InitialGuess,
  /// Seed for the Dirichlet draw; `None` draws from OS entropy.
  pub seed: Option<u64>,
  /// Per-asset limits; `None` means `[0, 1]` for every asset.
  pub bounds: Option<WeightBounds>,
  /// Iteration limit before the solve is reported as failed.
  pub max_iters: u64,
  /// Projected-gradient residual treated as converged.
  pub tolerance: f64,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      initial_guess: InitialGuess::Dirichlet,
      seed: None,
      bounds: None,
      max_iters: 10_000,
      tolerance: 1e-10,
    }
  }
}

impl OptimizerConfig {
  /// Default configuration with a fixed seed.
  pub fn seeded(seed: u64) -> Self {
    Self {
      seed: Some(seed),
      ..Self::default()
    }
  }

  fn initial_point(&self, n: usize) -> Result<Array1<f64>> {
    match &self.initial_guess {
      InitialGuess::Uniform => Ok(Array1::from_elem(n, 1.0 / n as f64)),
      InitialGuess::Dirichlet => {
        let mut rng = match self.seed {
          Some(seed) => StdRng::seed_from_u64(seed),
          None => StdRng::from_entropy(),
        };
        let dirichlet = Dirichlet::new(&vec![1.0; n])
          .map_err(|e| PortfolioError::InvalidInput(format!("dirichlet start: {e}")))?;
        let draw: Vec<f64> = dirichlet.sample(&mut rng);
        Ok(Array1::from(draw))
      }
      InitialGuess::Explicit(w) => {
        if w.len() != n {
          return Err(PortfolioError::InvalidInput(format!(
            "initial guess has {} weights for {n} assets",
            w.len()
          )));
        }
        if w.iter().any(|x| !x.is_finite()) {
          return Err(PortfolioError::InvalidInput(
            "initial guess contains non-finite weights".to_string(),
          ));
        }
        Ok(Array1::from(w.clone()))
      }
    }
  }
}

/// Optimized weights together with the moments they were computed from.
#[derive(Clone, Debug)]
pub struct OptimizationResult {
  /// Asset identifiers in weight order.
  pub assets: Vec<String>,
  /// Minimum-variance weights.
  pub weights: Array1<f64>,
  /// Arithmetic mean return per asset.
  pub mean_returns: Array1<f64>,
  /// Sample covariance matrix.
  pub covariance: Array2<f64>,
  /// `w' Sigma w` at the optimum.
  pub variance: f64,
  /// `w' mu` at the optimum.
  pub expected_return: f64,
  /// Solver iterations.
  pub iterations: u64,
  /// Projected-gradient residual at the returned weights.
  pub stationarity: f64,
}

/// Solve the long-only minimum-variance problem for `returns`.
///
/// # Errors
/// - [`PortfolioError::InsufficientData`] for fewer than 2 assets or 2 periods.
/// - [`PortfolioError::OptimizationFailed`] when the constraints are incompatible or the
///   solver stops short of a stationary point. No weights are returned in that case.
pub fn optimize(returns: &ReturnsMatrix, config: &OptimizerConfig) -> Result<OptimizationResult> {
  let n = returns.n_assets();
  let t = returns.n_periods();

  if n < 2 {
    return Err(PortfolioError::InsufficientData(format!(
      "at least 2 assets are required, got {n}"
    )));
  }
  if t < 2 {
    return Err(PortfolioError::InsufficientData(format!(
      "at least 2 periods are required, got {t}"
    )));
  }
  if t <= n {
    warn!(
      periods = t,
      assets = n,
      "fewer periods than assets; covariance estimate is singular"
    );
  }
  if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
    return Err(PortfolioError::InvalidInput(format!(
      "tolerance must be positive, got {}",
      config.tolerance
    )));
  }

  let bounds = match &config.bounds {
    Some(b) if b.len() != n => {
      return Err(PortfolioError::InvalidInput(format!(
        "bounds given for {} assets, returns have {n}",
        b.len()
      )));
    }
    Some(b) => b.clone(),
    None => WeightBounds::long_only(n),
  };
  bounds.check_feasible()?;

  let mean_returns = returns.mean_returns()?;
  let covariance = returns.covariance()?;
  let x0 = config.initial_point(n)?;
  debug!(start = ?x0.to_vec(), "starting minimum-variance solve");

  let problem = MinVarianceProblem::new(covariance);
  let solver = ProjectedGradient::new(bounds.clone(), problem.lipschitz(), config.tolerance);
  let mut run = solver.solve(problem, x0, config.max_iters)?;

  let iterations = run.state.get_iter();
  let stationarity = run.solver().residual();
  let weights = run.state.take_param().ok_or_else(|| {
    PortfolioError::OptimizationFailed("solver finished without an iterate".to_string())
  })?;
  if !bounds.contains(weights.view(), FEASIBILITY_TOLERANCE) {
    return Err(PortfolioError::OptimizationFailed(format!(
      "solver returned infeasible weights {:?}",
      weights.to_vec()
    )));
  }
  let covariance = run
    .problem
    .take_problem()
    .map(|p| p.covariance)
    .ok_or_else(|| PortfolioError::OptimizationFailed("solver kept the problem".to_string()))?;
  let variance = portfolio_variance(weights.view(), covariance.view())?;
  let expected_return = weights.dot(&mean_returns);

  info!(
    iterations,
    stationarity, variance, expected_return, "minimum-variance portfolio found"
  );

  Ok(OptimizationResult {
    assets: returns.assets().to_vec(),
    weights,
    mean_returns,
    covariance,
    variance,
    expected_return,
    iterations,
    stationarity,
  })
}
