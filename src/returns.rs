//! # Returns
//!
//! $$
//! r_{t,i}=\ln\frac{p_{t,i}}{p_{t-1,i}},\qquad
//! \Sigma_{ij}=\frac{1}{T-1}\sum_{t=1}^{T}(r_{t,i}-\bar r_i)(r_{t,j}-\bar r_j)
//! $$
//!
//! Validated table of per-asset periodic log returns together with the
//! moments the optimizer consumes and the correlation matrix used for charting.

use std::collections::HashSet;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;

use crate::error::PortfolioError;
use crate::error::Result;

/// Time-indexed table of log returns, one column per asset.
///
/// Rows are periods in chronological order, columns follow [`ReturnsMatrix::assets`].
/// The table never holds missing values.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnsMatrix {
  assets: Vec<String>,
  data: Array2<f64>,
}

impl ReturnsMatrix {
  /// Build a returns table from asset identifiers and a `periods x assets` array.
  pub fn new(assets: Vec<String>, data: Array2<f64>) -> Result<Self> {
    if data.ncols() != assets.len() {
      return Err(PortfolioError::InvalidInput(format!(
        "{} asset identifiers supplied for {} return columns",
        assets.len(),
        data.ncols()
      )));
    }

    let mut seen = HashSet::with_capacity(assets.len());
    for asset in &assets {
      if asset.trim().is_empty() {
        return Err(PortfolioError::InvalidInput(
          "asset identifiers must be non-empty".to_string(),
        ));
      }
      if !seen.insert(asset.as_str()) {
        return Err(PortfolioError::InvalidInput(format!(
          "duplicate asset identifier '{asset}'"
        )));
      }
    }

    if let Some(((t, i), v)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
      return Err(PortfolioError::InvalidInput(format!(
        "missing or non-finite return {v} at period {t} for asset '{}'",
        assets[i]
      )));
    }

    Ok(Self { assets, data })
  }

  /// Convert a `periods x assets` table of closing prices into log returns.
  ///
  /// Price rows with a missing (non-finite or non-positive) entry are dropped
  /// before differencing, so each return spans two consecutive complete rows.
  pub fn from_prices(assets: Vec<String>, prices: ArrayView2<f64>) -> Result<Self> {
    if prices.ncols() != assets.len() {
      return Err(PortfolioError::InvalidInput(format!(
        "{} asset identifiers supplied for {} price columns",
        assets.len(),
        prices.ncols()
      )));
    }

    let complete: Vec<ArrayView1<f64>> = prices
      .axis_iter(Axis(0))
      .filter(|row| row.iter().all(|&p| p.is_finite() && p > 0.0))
      .collect();

    let n_periods = complete.len().saturating_sub(1);
    let mut flat = Vec::with_capacity(n_periods * assets.len());
    for pair in complete.windows(2) {
      for (prev, next) in pair[0].iter().zip(pair[1].iter()) {
        flat.push((next / prev).ln());
      }
    }

    let data = Array2::from_shape_vec((n_periods, assets.len()), flat)
      .map_err(|e| PortfolioError::InvalidInput(e.to_string()))?;

    Self::new(assets, data)
  }

  /// Restrict the table to a user-selected list of assets, in the given order.
  pub fn select(&self, selection: &[&str]) -> Result<Self> {
    if selection.len() < 2 {
      return Err(PortfolioError::InsufficientData(format!(
        "at least 2 assets must be selected, got {}",
        selection.len()
      )));
    }

    let mut indices = Vec::with_capacity(selection.len());
    for name in selection {
      let idx = self
        .assets
        .iter()
        .position(|a| a == name)
        .ok_or_else(|| PortfolioError::InvalidInput(format!("unknown asset '{name}'")))?;
      if indices.contains(&idx) {
        return Err(PortfolioError::InvalidInput(format!(
          "asset '{name}' selected more than once"
        )));
      }
      indices.push(idx);
    }

    Ok(Self {
      assets: indices.iter().map(|&i| self.assets[i].clone()).collect(),
      data: self.data.select(Axis(1), &indices),
    })
  }

  /// Asset identifiers in column order.
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Raw `periods x assets` view.
  pub fn data(&self) -> ArrayView2<'_, f64> {
    self.data.view()
  }

  pub fn n_assets(&self) -> usize {
    self.data.ncols()
  }

  pub fn n_periods(&self) -> usize {
    self.data.nrows()
  }

  /// Return series of the asset in column `i`.
  pub fn column(&self, i: usize) -> Option<ArrayView1<'_, f64>> {
    (i < self.n_assets()).then(|| self.data.column(i))
  }

  /// Arithmetic mean of every column.
  pub fn mean_returns(&self) -> Result<Array1<f64>> {
    self
      .data
      .mean_axis(Axis(0))
      .ok_or_else(|| PortfolioError::InsufficientData("returns table has no periods".to_string()))
  }

  /// Sample covariance matrix (divisor `T - 1`).
  pub fn covariance(&self) -> Result<Array2<f64>> {
    if self.n_periods() < 2 {
      return Err(PortfolioError::InsufficientData(format!(
        "covariance needs at least 2 periods, got {}",
        self.n_periods()
      )));
    }

    self
      .data
      .t()
      .cov(1.0)
      .map_err(|e| PortfolioError::InsufficientData(e.to_string()))
  }

  /// Pearson correlation matrix of the raw asset returns.
  pub fn correlation(&self) -> Result<Array2<f64>> {
    if self.n_periods() < 2 {
      return Err(PortfolioError::InsufficientData(format!(
        "correlation needs at least 2 periods, got {}",
        self.n_periods()
      )));
    }

    self
      .data
      .t()
      .pearson_correlation()
      .map_err(|e| PortfolioError::InsufficientData(e.to_string()))
  }

  /// Per-period portfolio return `sum_i w_i r_{t,i}`.
  pub fn portfolio_returns(&self, weights: ArrayView1<f64>) -> Result<Vec<f64>> {
    if weights.len() != self.n_assets() {
      return Err(PortfolioError::InvalidInput(format!(
        "{} weights supplied for {} assets",
        weights.len(),
        self.n_assets()
      )));
    }

    Ok(self.data.dot(&weights).to_vec())
  }
}
