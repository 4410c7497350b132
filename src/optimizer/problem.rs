//! # Minimum-Variance Problem
//!
//! $$
//! f(\mathbf w)=\mathbf w^\top\Sigma\mathbf w,\qquad \nabla f(\mathbf w)=2\Sigma\mathbf w
//! $$
//!
use argmin::core::CostFunction;
use argmin::core::Error;
use argmin::core::Gradient;
use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray::Array2;

/// Portfolio variance objective over a fixed covariance matrix.
#[derive(ImplNew, Clone, Debug)]
pub struct MinVarianceProblem {
  pub covariance: Array2<f64>,
}

impl MinVarianceProblem {
  /// Gershgorin upper bound on the largest eigenvalue of `2 Sigma`,
  /// i.e. on the Lipschitz constant of the gradient.
  pub fn lipschitz(&self) -> f64 {
    let bound = self
      .covariance
      .rows()
      .into_iter()
      .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
      .fold(0.0, f64::max);
    2.0 * bound
  }
}

impl CostFunction for MinVarianceProblem {
  type Param = Array1<f64>;
  type Output = f64;

  fn cost(&self, w: &Self::Param) -> Result<Self::Output, Error> {
    Ok(w.dot(&self.covariance.dot(w)))
  }
}

impl Gradient for MinVarianceProblem {
  type Param = Array1<f64>;
  type Gradient = Array1<f64>;

  fn gradient(&self, w: &Self::Param) -> Result<Self::Gradient, Error> {
    Ok(self.covariance.dot(w) * 2.0)
  }
}
