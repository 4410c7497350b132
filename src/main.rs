//! Minimum-variance portfolio and risk report from a CSV of closing prices.
//!
//! ```bash
//! portfolio-risk --prices prices.csv --assets AAPL,MSFT,GOOGL --confidence 0.99 --seed 7
//! ```

use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use ndarray::Array2;
use portfolio_risk_rs::analysis::DEFAULT_CAPITAL;
use portfolio_risk_rs::risk::ConfidenceLevel;
use portfolio_risk_rs::risk::DEFAULT_SIMULATIONS;
use portfolio_risk_rs::AnalysisConfig;
use portfolio_risk_rs::ReturnsMatrix;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Minimum-variance portfolio optimizer with Sharpe ratio and Value-at-Risk
#[derive(Parser, Debug)]
#[command(name = "portfolio-risk")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// CSV of closing prices: header of asset identifiers, optional leading date column
  #[arg(short, long)]
  prices: PathBuf,

  /// Comma-separated subset of assets (default: every column)
  #[arg(short, long, value_delimiter = ',')]
  assets: Vec<String>,

  /// Capital to allocate
  #[arg(short, long, default_value_t = DEFAULT_CAPITAL)]
  capital: f64,

  /// VaR confidence level
  #[arg(long, default_value_t = 0.95, value_parser = parse_confidence)]
  confidence: f64,

  /// Per-period risk-free rate for the Sharpe ratio
  #[arg(long, default_value_t = 0.0)]
  risk_free: f64,

  /// Monte-Carlo VaR sample size
  #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
  simulations: usize,

  /// Display name for an asset, as TICKER=NAME (repeatable)
  #[arg(long = "name", value_parser = parse_display_name)]
  names: Vec<(String, String)>,

  /// Seed for the starting point and the Monte-Carlo draws
  #[arg(long)]
  seed: Option<u64>,

  /// Debug logging unless RUST_LOG is set
  #[arg(short, long)]
  verbose: bool,
}

fn parse_confidence(s: &str) -> std::result::Result<f64, String> {
  let level: f64 = s.parse().map_err(|e| format!("{e}"))?;
  ConfidenceLevel::PRESETS
    .iter()
    .find(|p| (p.value() - level).abs() < 1e-12)
    .map(|p| p.value())
    .ok_or_else(|| format!("confidence must be one of 0.90, 0.95, 0.99, got {s}"))
}

fn parse_display_name(s: &str) -> std::result::Result<(String, String), String> {
  match s.split_once('=') {
    Some((asset, name)) if !asset.trim().is_empty() && !name.trim().is_empty() => {
      Ok((asset.trim().to_string(), name.trim().to_string()))
    }
    _ => Err(format!("expected TICKER=NAME, got '{s}'")),
  }
}

/// Asset identifiers and a `rows x assets` price table; empty cells are NaN.
fn read_prices(path: &Path) -> Result<(Vec<String>, Array2<f64>)> {
  let mut reader =
    csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
  let headers = reader.headers()?.clone();
  let records = reader
    .records()
    .collect::<std::result::Result<Vec<_>, _>>()
    .with_context(|| format!("reading {}", path.display()))?;

  let first_is_label = headers
    .get(0)
    .is_some_and(|h| h.eq_ignore_ascii_case("date"))
    || records
      .first()
      .and_then(|r| r.get(0))
      .is_some_and(|v| v.trim().parse::<f64>().is_err());
  let skip = usize::from(first_is_label);

  let assets: Vec<String> = headers.iter().skip(skip).map(|h| h.trim().to_string()).collect();
  if assets.is_empty() {
    bail!("{} has no price columns", path.display());
  }

  let mut flat = Vec::with_capacity(records.len() * assets.len());
  for (row, record) in records.iter().enumerate() {
    if record.len() != headers.len() {
      bail!(
        "row {} has {} fields, header has {}",
        row + 2,
        record.len(),
        headers.len()
      );
    }
    for (col, field) in record.iter().skip(skip).enumerate() {
      let field = field.trim();
      let price = if field.is_empty() {
        f64::NAN
      } else {
        field
          .parse()
          .with_context(|| format!("row {} asset '{}': bad price '{field}'", row + 2, assets[col]))?
      };
      flat.push(price);
    }
  }

  let prices = Array2::from_shape_vec((records.len(), assets.len()), flat)?;
  Ok((assets, prices))
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "portfolio_risk_rs=debug" } else { "portfolio_risk_rs=info" };
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let (assets, prices) = read_prices(&cli.prices)?;
  info!(assets = assets.len(), rows = prices.nrows(), "prices loaded");

  let mut returns = ReturnsMatrix::from_prices(assets, prices.view())?;
  if !cli.assets.is_empty() {
    let selection: Vec<&str> = cli.assets.iter().map(String::as_str).collect();
    returns = returns.select(&selection)?;
  }

  let mut config = AnalysisConfig {
    capital: cli.capital,
    ..AnalysisConfig::default()
  };
  config.optimizer.seed = cli.seed;
  config.evaluation.seed = cli.seed;
  config.evaluation.confidence_level = cli.confidence;
  config.evaluation.risk_free_rate = cli.risk_free;
  config.evaluation.num_simulations = cli.simulations;
  config.display_names = cli.names.into_iter().collect();

  let analysis = portfolio_risk_rs::analyze(&returns, &config).context("portfolio analysis failed")?;
  println!("{analysis}");

  Ok(())
}
