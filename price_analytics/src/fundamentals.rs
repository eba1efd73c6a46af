//! Point-in-time fundamentals (trailing P/E, beta) for the bar-chart
//! comparison. Missing values stay `None` and render as "N/A".

use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use market_data_ingestor::providers::ProviderError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub trailing_pe: Option<f64>,
    pub beta: Option<f64>,
}

impl Fundamentals {
    pub fn unknown(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            trailing_pe: None,
            beta: None,
        }
    }
}

#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError>;
}

/// Values for one symbol as written in the `[fundamentals.<SYMBOL>]` config table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FundamentalsCfg {
    pub trailing_pe: Option<f64>,
    pub beta: Option<f64>,
}

/// In-memory fundamentals keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticFundamentals {
    entries: IndexMap<String, FundamentalsCfg>,
}

impl StaticFundamentals {
    pub fn new(entries: &IndexMap<String, FundamentalsCfg>) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(symbol, cfg)| (symbol.trim().to_uppercase(), *cfg))
                .collect(),
        }
    }
}

#[async_trait]
impl FundamentalsSource for StaticFundamentals {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError> {
        Ok(match self.entries.get(&symbol.to_uppercase()) {
            Some(cfg) => Fundamentals {
                symbol: symbol.to_string(),
                trailing_pe: cfg.trailing_pe,
                beta: cfg.beta,
            },
            None => Fundamentals::unknown(symbol),
        })
    }
}

/// Looks up fundamentals for every symbol; output order matches `symbols`.
pub async fn fundamentals_comparison<S>(source: &S, symbols: &[&str]) -> Result<Vec<Fundamentals>>
where
    S: FundamentalsSource + ?Sized,
{
    let entries = try_join_all(symbols.iter().map(|s| source.fundamentals(s))).await?;
    debug!(count = entries.len(), "fundamentals collected");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> StaticFundamentals {
        let mut cfg = IndexMap::new();
        cfg.insert(
            "aapl".to_string(),
            FundamentalsCfg {
                trailing_pe: Some(29.5),
                beta: Some(1.2),
            },
        );
        cfg.insert(
            "MSFT".to_string(),
            FundamentalsCfg {
                trailing_pe: None,
                beta: Some(0.9),
            },
        );
        StaticFundamentals::new(&cfg)
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let f = source().fundamentals("AAPL").await.unwrap();
        assert_eq!(f.trailing_pe, Some(29.5));
        assert_eq!(f.beta, Some(1.2));
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_an_error() {
        let f = source().fundamentals("TSLA").await.unwrap();
        assert_eq!(f, Fundamentals::unknown("TSLA"));
    }

    #[tokio::test]
    async fn comparison_keeps_input_order() {
        let out = fundamentals_comparison(&source(), &["MSFT", "TSLA", "AAPL"])
            .await
            .unwrap();
        let symbols: Vec<_> = out.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "TSLA", "AAPL"]);
        assert_eq!(out[0].trailing_pe, None);
        assert_eq!(out[0].beta, Some(0.9));
    }
}
