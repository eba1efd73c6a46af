use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use market_data_ingestor::{
    models::{bar::Bar, bar::BarSeries, request_params::BarsRequestParams},
    providers::{ApiSnafu, DataProvider, ProviderError},
};

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn approx(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

/// Serves canned bars per symbol, honouring the request range.
#[derive(Default)]
pub struct StubProvider {
    bars: HashMap<String, Vec<Bar>>,
    failing: Vec<String>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(timestamp, close, volume)` per bar.
    pub fn with(mut self, symbol: &str, rows: &[(DateTime<Utc>, f64, f64)]) -> Self {
        let bars = rows
            .iter()
            .map(|(ts, close, volume)| Bar::ohlcv(*ts, *close, *close, *close, *close, *volume))
            .collect();
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.push(symbol.to_string());
        self
    }
}

#[async_trait]
impl DataProvider for StubProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let mut out = Vec::new();
        for symbol in &params.symbols {
            if self.failing.contains(symbol) {
                return ApiSnafu {
                    message: format!("upstream refused {symbol}"),
                }
                .fail();
            }
            let Some(bars) = self.bars.get(symbol) else {
                continue;
            };
            let in_range = bars
                .iter()
                .filter(|b| b.timestamp >= params.start && b.timestamp < params.end)
                .cloned()
                .collect();
            out.push(BarSeries::new(symbol.clone(), params.timeframe, in_range).unwrap());
        }
        Ok(out)
    }
}
