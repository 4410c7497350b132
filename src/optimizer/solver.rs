//! # Projected Gradient
//!
//! $$
//! \mathbf w_{k+1}=P_{\mathcal W}\big(\mathbf w_k-t_k\nabla f(\mathbf w_k)\big),\qquad
//! t_k^{BB}=\frac{\mathbf s^\top\mathbf s}{\mathbf s^\top\mathbf y}
//! $$
//!
//! argmin solver for smooth objectives over the fully-invested box.
//! Barzilai-Borwein trial steps, Armijo backtracking along the projection arc,
//! convergence measured by the scaled projected-gradient residual
//! `|w - P(w - grad f(w) / L)|_inf`.

use argmin::core::CostFunction;
use argmin::core::Error;
use argmin::core::Executor;
use argmin::core::Gradient;
use argmin::core::IterState;
use argmin::core::OptimizationResult as Run;
use argmin::core::Problem;
use argmin::core::Solver;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::core::KV;
use ndarray::Array1;
use tracing::debug;
use tracing::trace;

use super::bounds::WeightBounds;
use crate::error::PortfolioError;
use crate::error::Result;

const ARMIJO: f64 = 1e-4;
const MIN_STEP: f64 = 1e-20;

/// Iteration state carried by the executor: parameter, gradient and cost.
pub type SolverState = IterState<Array1<f64>, Array1<f64>, (), (), (), f64>;

/// Projected-gradient solver with Barzilai-Borwein steps.
#[derive(Clone, Debug)]
pub struct ProjectedGradient {
  bounds: WeightBounds,
  lipschitz: f64,
  tolerance: f64,
  step: f64,
  residual: f64,
}

impl ProjectedGradient {
  /// `lipschitz` is an upper bound on the gradient's Lipschitz constant; it
  /// scales the first step and the stationarity residual.
  pub fn new(bounds: WeightBounds, lipschitz: f64, tolerance: f64) -> Self {
    let lipschitz = if lipschitz.is_finite() && lipschitz > 0.0 {
      lipschitz
    } else {
      1.0
    };

    Self {
      bounds,
      lipschitz,
      tolerance,
      step: 1.0 / lipschitz,
      residual: f64::INFINITY,
    }
  }

  /// Projected-gradient residual at the last checked iterate.
  pub fn residual(&self) -> f64 {
    self.residual
  }

  /// Run the solver on `problem` from `x0` (projected first).
  ///
  /// Anything short of a converged run is an [`PortfolioError::OptimizationFailed`]
  /// carrying the solver diagnostic.
  pub fn solve<O>(self, problem: O, x0: Array1<f64>, max_iters: u64) -> Result<Run<O, Self, SolverState>>
  where
    O: CostFunction<Param = Array1<f64>, Output = f64>
      + Gradient<Param = Array1<f64>, Gradient = Array1<f64>>,
  {
    let tolerance = self.tolerance;
    let run = Executor::new(problem, self)
      .configure(|state| state.param(x0).max_iters(max_iters))
      .run()
      .map_err(into_portfolio_error)?;

    let iterations = run.state.get_iter();
    let residual = run.solver().residual();
    match run.state.get_termination_reason().cloned() {
      Some(TerminationReason::SolverConverged) => {
        debug!(iterations, cost = run.state.get_cost(), residual, "projected gradient converged");
        Ok(run)
      }
      Some(TerminationReason::MaxItersReached) => Err(PortfolioError::OptimizationFailed(format!(
        "iteration limit of {max_iters} reached: projected-gradient residual {residual:.3e} \
         exceeds tolerance {tolerance:.1e}"
      ))),
      other => Err(PortfolioError::OptimizationFailed(format!(
        "solver stopped after {iterations} iterations ({other:?}) with residual {residual:.3e}"
      ))),
    }
  }

  fn stationarity(&self, x: &Array1<f64>, g: &Array1<f64>) -> Result<f64> {
    let projected = self.bounds.project((x - &(g / self.lipschitz)).view())?;
    Ok(
      (x - &projected)
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs())),
    )
  }
}

impl<O> Solver<O, SolverState> for ProjectedGradient
where
  O: CostFunction<Param = Array1<f64>, Output = f64>
    + Gradient<Param = Array1<f64>, Gradient = Array1<f64>>,
{
  const NAME: &'static str = "Projected Gradient";

  fn init(
    &mut self,
    problem: &mut Problem<O>,
    state: SolverState,
  ) -> std::result::Result<(SolverState, Option<KV>), Error> {
    let x0 = state.get_param().ok_or_else(|| {
      PortfolioError::OptimizationFailed("no starting point supplied".to_string())
    })?;
    let x = self.bounds.project(x0.view())?;
    let (f, g) = evaluate(problem, &x)?;
    self.step = 1.0 / self.lipschitz;

    Ok((state.param(x).cost(f).gradient(g), None))
  }

  fn next_iter(
    &mut self,
    problem: &mut Problem<O>,
    state: SolverState,
  ) -> std::result::Result<(SolverState, Option<KV>), Error> {
    let iter = state.get_iter();
    let f = state.get_cost();
    let (x, g) = match (state.get_param(), state.get_gradient()) {
      (Some(x), Some(g)) => (x.clone(), g.clone()),
      _ => {
        return Err(
          PortfolioError::OptimizationFailed("solver state lost its iterate".to_string()).into(),
        )
      }
    };

    let noise = 4.0 * f64::EPSILON * f.abs().max(f64::MIN_POSITIVE);
    let mut t = self.step;
    let (x_next, f_next, g_next) = loop {
      let trial = self.bounds.project((&x - &(&g * t)).view())?;
      let (f_trial, g_trial) = evaluate(problem, &trial)?;
      let decrease = g.dot(&(&trial - &x));
      if f_trial <= f + ARMIJO * decrease + noise {
        break (trial, f_trial, g_trial);
      }
      t *= 0.5;
      if t < MIN_STEP {
        return Err(
          PortfolioError::OptimizationFailed(format!(
            "line search failed at iteration {iter}: no decrease from objective {f:.6e} \
             (residual {:.3e})",
            self.residual
          ))
          .into(),
        );
      }
    };

    let s = &x_next - &x;
    let y = &g_next - &g;
    let sy = s.dot(&y);
    self.step = if sy > 0.0 {
      (s.dot(&s) / sy).clamp(1e-6 / self.lipschitz, 1e6 / self.lipschitz)
    } else {
      1.0 / self.lipschitz
    };

    Ok((state.param(x_next).cost(f_next).gradient(g_next), None))
  }

  fn terminate(&mut self, state: &SolverState) -> TerminationStatus {
    let (Some(x), Some(g)) = (state.get_param(), state.get_gradient()) else {
      return TerminationStatus::NotTerminated;
    };
    let Ok(residual) = self.stationarity(x, g) else {
      return TerminationStatus::NotTerminated;
    };

    self.residual = residual;
    trace!(
      iter = state.get_iter(),
      cost = state.get_cost(),
      residual,
      step = self.step,
      "projected gradient iterate"
    );
    if residual <= self.tolerance {
      TerminationStatus::Terminated(TerminationReason::SolverConverged)
    } else {
      TerminationStatus::NotTerminated
    }
  }
}

fn evaluate<O>(problem: &mut Problem<O>, x: &Array1<f64>) -> Result<(f64, Array1<f64>)>
where
  O: CostFunction<Param = Array1<f64>, Output = f64>
    + Gradient<Param = Array1<f64>, Gradient = Array1<f64>>,
{
  let f = problem
    .cost(x)
    .map_err(|e| PortfolioError::OptimizationFailed(format!("objective evaluation: {e}")))?;
  let g = problem
    .gradient(x)
    .map_err(|e| PortfolioError::OptimizationFailed(format!("gradient evaluation: {e}")))?;

  if !f.is_finite() || g.iter().any(|v| !v.is_finite()) {
    return Err(PortfolioError::OptimizationFailed(
      "objective or gradient is not finite".to_string(),
    ));
  }

  Ok((f, g))
}

/// Recover the crate error raised inside the executor, or wrap argmin's own.
fn into_portfolio_error(e: Error) -> PortfolioError {
  match e.downcast::<PortfolioError>() {
    Ok(err) => err,
    Err(e) => PortfolioError::OptimizationFailed(e.to_string()),
  }
}
