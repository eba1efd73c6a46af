use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use market_data_ingestor::{models::timeframe::Interval, providers::alpaca_rest::AlpacaProvider};
use price_analytics::{
    Analyzer, ComparisonRequest, DateRange, ReportOptions,
    config::{AnalyzerConfig, load_config_path},
    fundamentals::{FundamentalsSource, StaticFundamentals},
};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Compare equities by percent change since the start of a range")]
struct Cli {
    /// Analyzer TOML; defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,
    /// Primary ticker.
    #[arg(long)]
    symbol: String,
    /// Extra tickers to compare against, comma separated.
    #[arg(long, value_delimiter = ',')]
    compare: Vec<String>,
    /// Add the configured benchmark column.
    #[arg(long)]
    benchmark: bool,
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: NaiveDate,
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: NaiveDate,
    /// 1d, 1wk or 1mo. Falls back to the config value.
    #[arg(long)]
    interval: Option<Interval>,
    #[arg(long)]
    sma: bool,
    #[arg(long)]
    bollinger: bool,
    #[arg(long)]
    fundamentals: bool,
    #[arg(long)]
    volume: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    shared_utils::logging::init_tracing("info");
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => AnalyzerConfig::default(),
    };

    let range = DateRange::from_dates(cli.start, cli.end)?;
    let mut request = ComparisonRequest::new(
        cli.symbol.trim().to_uppercase(),
        range,
        cli.interval.unwrap_or(cfg.interval),
    )
    .with_comparisons(
        cli.compare
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty()),
    );
    if cli.benchmark {
        request = request.with_benchmark(cfg.benchmark.clone());
    }

    let options = ReportOptions {
        indicators: cfg.indicators.settings(cli.sma, cli.bollinger),
        volume: cli.volume,
        fundamentals: cli.fundamentals,
    };
    let fundamentals = StaticFundamentals::new(&cfg.fundamentals);

    let provider = AlpacaProvider::new().context("alpaca credentials")?;
    let analyzer = Analyzer::new(provider);
    info!(symbols = ?request.symbols(), interval = %request.interval, "running analysis");

    let report = analyzer
        .run(&request, &options, Some(&fundamentals as &dyn FundamentalsSource))
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
