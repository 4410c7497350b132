//! # Report
//!
//! Plain-text tables of a [`PortfolioAnalysis`].

use std::fmt::Display;

use prettytable::format;
use prettytable::row;
use prettytable::Table;

use crate::analysis::PortfolioAnalysis;

fn table() -> Table {
  let mut table = Table::new();
  table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
  table
}

/// Asset, weight and currency allocation, one row per asset.
///
/// A name column is added when the analysis carries display names.
pub fn weights_table(analysis: &PortfolioAnalysis) -> Table {
  let named = !analysis.display_names.is_empty();
  let mut t = table();
  if named {
    t.set_titles(row!["Asset", "Name", "Weight", "Allocation"]);
  } else {
    t.set_titles(row!["Asset", "Weight", "Allocation"]);
  }

  for ((asset, w), amount) in analysis
    .assets()
    .iter()
    .zip(analysis.weights().iter())
    .zip(analysis.allocations.iter())
  {
    let weight = format!("{:.2}%", w * 100.0);
    let amount = format!("{amount:.2}");
    if named {
      let name = analysis.display_name(asset).unwrap_or("");
      t.add_row(row![asset, name, r->weight, r->amount]);
    } else {
      t.add_row(row![asset, r->weight, r->amount]);
    }
  }
  t
}

/// Expected return, Sharpe ratio, variance and the three VaR figures.
pub fn metrics_table(analysis: &PortfolioAnalysis) -> Table {
  let m = &analysis.metrics;
  let level = m.confidence_level * 100.0;

  let mut t = table();
  t.set_titles(row!["Metric", "Value", "Amount"]);
  t.add_row(row![
    "Expected daily return",
    r->format!("{:.4}%", m.expected_return * 100.0),
    ""
  ]);
  t.add_row(row!["Sharpe ratio", r->format!("{:.4}", m.sharpe_ratio), ""]);
  t.add_row(row!["Portfolio variance", r->format!("{:.6e}", m.variance), ""]);
  t.add_row(row!["Daily volatility", r->format!("{:.4}%", m.volatility() * 100.0), ""]);
  for (method, amount) in analysis.var_amounts() {
    t.add_row(row![
      format!("VaR {level:.0}% ({method})"),
      r->format!("{:.4}%", m.var(method) * 100.0),
      r->format!("{amount:.2}")
    ]);
  }
  t
}

impl Display for PortfolioAnalysis {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Capital: {:.2}", self.capital)?;
    writeln!(f)?;
    writeln!(f, "{}", weights_table(self))?;
    write!(f, "{}", metrics_table(self))
  }
}
