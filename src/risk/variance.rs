//! # Portfolio Variance
//!
//! $$
//! \sigma_p^2=\mathbf w^\top\Sigma\mathbf w
//! $$
//!
use ndarray::ArrayView1;
use ndarray::ArrayView2;

use crate::error::PortfolioError;
use crate::error::Result;

/// Quadratic form `w' Sigma w`.
pub fn portfolio_variance(weights: ArrayView1<f64>, covariance: ArrayView2<f64>) -> Result<f64> {
  let (rows, cols) = covariance.dim();
  if rows != cols {
    return Err(PortfolioError::InvalidInput(format!(
      "covariance matrix must be square, got {rows}x{cols}"
    )));
  }
  if weights.len() != rows {
    return Err(PortfolioError::InvalidInput(format!(
      "{} weights supplied for a {rows}x{rows} covariance matrix",
      weights.len()
    )));
  }

  Ok(weights.dot(&covariance.dot(&weights)))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use ndarray::Array1;
  use ndarray::Array2;
  use rand::rngs::StdRng;
  use rand::Rng;
  use rand::SeedableRng;

  use super::*;
  use crate::returns::ReturnsMatrix;

  #[test]
  fn equal_weights_two_assets() {
    let (v1, v2, c12) = (0.04, 0.09, 0.012);
    let cov = array![[v1, c12], [c12, v2]];
    let var = portfolio_variance(array![0.5, 0.5].view(), cov.view()).unwrap();
    assert_abs_diff_eq!(var, 0.25 * v1 + 0.25 * v2 + 0.5 * c12, epsilon = 1e-15);
  }

  #[test]
  fn non_negative_for_sample_covariances() {
    let mut rng = StdRng::seed_from_u64(17);
    for trial in 0..25 {
      let n = 2 + trial % 6;
      let t = 3 * n + 10;
      let data = Array2::from_shape_fn((t, n), |_| rng.gen_range(-0.05..0.05));
      let returns = ReturnsMatrix::new((0..n).map(|i| format!("X{i}")).collect(), data).unwrap();
      let cov = returns.covariance().unwrap();

      // arbitrary (not necessarily feasible) weight vectors
      for _ in 0..10 {
        let w = Array1::from_shape_fn(n, |_| rng.gen_range(-2.0..2.0));
        let var = portfolio_variance(w.view(), cov.view()).unwrap();
        assert!(var >= 0.0, "negative variance {var} for trial {trial}");
      }
    }
  }

  #[test]
  fn shape_mismatches_are_rejected() {
    let cov = array![[0.04, 0.0], [0.0, 0.09]];
    assert!(portfolio_variance(array![1.0].view(), cov.view()).is_err());
    let rect = array![[0.04, 0.0, 0.0], [0.0, 0.09, 0.0]];
    assert!(portfolio_variance(array![0.5, 0.5].view(), rect.view()).is_err());
  }
}
