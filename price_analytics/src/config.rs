//! Analyzer configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! dashboard's stock behaviour: daily bars, a 20-bar SMA, 20-bar Bollinger
//! bands at two standard deviations, and `SPY` as the benchmark.
//!
//! ```toml
//! benchmark = "SPY"
//! interval = "daily"
//!
//! [indicators]
//! sma_window = 20
//! bollinger_window = 20
//! bollinger_k = 2.0
//!
//! [fundamentals.AAPL]
//! trailing_pe = 29.5
//! beta = 1.2
//! ```
//!
//! API credentials never live here; the provider reads them from the
//! environment.

use anyhow::{Context, bail};
use indexmap::IndexMap;
use market_data_ingestor::models::timeframe::Interval;
use serde::{Deserialize, Serialize};

use crate::{
    fundamentals::FundamentalsCfg,
    indicators::{BandSettings, DEFAULT_BAND_WIDTH, IndicatorSettings},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnalyzerConfig {
    /// Symbol used for the "compare with the market" column.
    pub benchmark: String,
    pub interval: Interval,
    pub indicators: IndicatorConfig,
    pub fundamentals: IndexMap<String, FundamentalsCfg>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            benchmark: "SPY".to_string(),
            interval: Interval::Daily,
            indicators: IndicatorConfig::default(),
            fundamentals: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IndicatorConfig {
    pub sma_window: usize,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_window: 20,
            bollinger_window: 20,
            bollinger_k: DEFAULT_BAND_WIDTH,
        }
    }
}

impl IndicatorConfig {
    /// Settings with only the requested indicators switched on.
    pub fn settings(&self, sma: bool, bollinger: bool) -> IndicatorSettings {
        IndicatorSettings {
            sma_window: sma.then_some(self.sma_window),
            bollinger: bollinger.then_some(BandSettings {
                window: self.bollinger_window,
                k: self.bollinger_k,
            }),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.benchmark.trim().is_empty() {
            bail!("benchmark symbol cannot be empty");
        }
        let ind = &self.indicators;
        if ind.sma_window == 0 {
            bail!("indicators.sma_window must be > 0");
        }
        if ind.bollinger_window == 0 {
            bail!("indicators.bollinger_window must be > 0");
        }
        if !ind.bollinger_k.is_finite() || ind.bollinger_k <= 0.0 {
            bail!("indicators.bollinger_k must be a positive number, got {}", ind.bollinger_k);
        }
        Ok(())
    }
}

/// Parse and validate a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AnalyzerConfig> {
    let cfg: AnalyzerConfig = toml::from_str(toml_str).context("failed to parse analyzer TOML")?;
    cfg.validate().context("invalid analyzer config")?;
    Ok(cfg)
}

/// Read, parse and validate a config file.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<AnalyzerConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
