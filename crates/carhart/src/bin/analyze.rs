//! Four-factor risk report from CSV files.
//!
//! Usage:
//! `cargo run --features cli --bin analyze -- --prices prices.csv --benchmark spx.csv
//!  --book-equity book.csv --shares shares.csv [--weights w.csv] [--config model.toml]`

use std::{error::Error, fs, path::PathBuf, process};

use carhart::{
    model::{Pipeline, PipelineConfig},
    primitives::Symbol,
    utils::{FrameProvider, market_caps_from_shares, read_csv},
};
use clap::{ArgGroup, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "analyze")]
#[command(version, about = "Four-factor equity risk report", long_about = None)]
#[command(group(ArgGroup::new("caps").required(true).args(["market_caps", "shares"])))]
struct Cli {
    /// Close prices: date,symbol,close
    #[arg(long)]
    prices: PathBuf,

    /// Benchmark index closes: date,close
    #[arg(long)]
    benchmark: PathBuf,

    /// Book equity on filing dates: date,symbol,book_equity
    #[arg(long)]
    book_equity: PathBuf,

    /// Market capitalization: date,symbol,market_cap
    #[arg(long)]
    market_caps: Option<PathBuf>,

    /// Shares outstanding, used to derive market caps: date,symbol,shares
    #[arg(long)]
    shares: Option<PathBuf>,

    /// Portfolio weights: date,symbol,weight (cap weighted when omitted)
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Model configuration TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a return attribution for this symbol
    #[arg(long)]
    attribute: Option<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!(error = %e, "analysis failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_str(&fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };

    let prices = read_csv(&cli.prices)?;
    let market_caps = match (&cli.market_caps, &cli.shares) {
        (Some(path), _) => read_csv(path)?.collect()?,
        (None, Some(path)) => market_caps_from_shares(prices.clone(), read_csv(path)?).collect()?,
        (None, None) => return Err("either --market-caps or --shares is required".into()),
    };

    let mut provider = FrameProvider::new(
        prices.collect()?,
        read_csv(&cli.benchmark)?.collect()?,
        market_caps,
        read_csv(&cli.book_equity)?.collect()?,
    );
    if let Some(path) = &cli.weights {
        provider = provider.with_weights(read_csv(path)?.collect()?);
    }
    info!(prices = %cli.prices.display(), "read input files");

    let report = Pipeline::with_config(config).run(&provider)?;
    report.print_summary();

    if let Some(symbol) = &cli.attribute {
        let symbol = Symbol::new(symbol.to_uppercase());
        let attribution =
            report.attribution(&symbol).ok_or_else(|| format!("no estimates for {symbol}"))?;
        attribution.print_summary(symbol.as_str());
    }
    Ok(())
}
