//! Cross-instrument comparison: fetch every selected instrument, normalize
//! each one and merge them into a single [`ComparisonTable`].
//!
//! Column order is part of the contract: primary first, then comparison
//! instruments in the order given, then the benchmark.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::try_join_all;
use market_data_ingestor::{
    fetch_series,
    models::{bar::BarSeries, timeframe::Interval},
    providers::DataProvider,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    errors::{AnalyticsError, Result},
    fundamentals::{Fundamentals, FundamentalsSource, fundamentals_comparison},
    indicators::{IndicatorSeries, IndicatorSettings},
    normalize::{ComparisonTable, merge, normalize},
};

/// Inclusive-start, exclusive-end UTC range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Midnight UTC on both dates.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(
            start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end.and_time(chrono::NaiveTime::MIN).and_utc(),
        )
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// One user selection: what to fetch and over which range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRequest {
    pub primary: String,
    pub comparisons: Vec<String>,
    pub benchmark: Option<String>,
    pub range: DateRange,
    pub interval: Interval,
}

impl ComparisonRequest {
    pub fn new(primary: impl Into<String>, range: DateRange, interval: Interval) -> Self {
        Self {
            primary: primary.into(),
            comparisons: Vec::new(),
            benchmark: None,
            range,
            interval,
        }
    }

    pub fn with_comparisons<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comparisons.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn with_benchmark(mut self, symbol: impl Into<String>) -> Self {
        self.benchmark = Some(symbol.into());
        self
    }

    /// Primary followed by comparison instruments, repeats removed.
    pub fn peer_symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(1 + self.comparisons.len());
        for symbol in std::iter::once(&self.primary).chain(&self.comparisons) {
            if !out.contains(&symbol.as_str()) {
                out.push(symbol);
            }
        }
        out
    }

    /// The benchmark, unless it is already one of the peers.
    pub fn benchmark_symbol(&self) -> Option<&str> {
        let benchmark = self.benchmark.as_deref()?;
        (!self.peer_symbols().contains(&benchmark)).then_some(benchmark)
    }

    /// Every distinct symbol in output column order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols = self.peer_symbols();
        symbols.extend(self.benchmark_symbol());
        symbols
    }
}

/// Normalizes every series and merges them, keeping slice order as column order.
pub fn compare_series(series: &[BarSeries]) -> Result<ComparisonTable> {
    let columns = series
        .iter()
        .map(|s| normalize(s).map(|points| (s.symbol().to_string(), points)))
        .collect::<Result<Vec<_>>>()?;
    merge(columns)
}

/// Raw volume of every series, outer-joined on timestamp.
pub fn volume_table(series: &[BarSeries]) -> Result<ComparisonTable> {
    merge(series.iter().map(|s| {
        let points: Vec<(DateTime<Utc>, f64)> =
            s.bars().iter().map(|b| (b.timestamp, b.volume)).collect();
        (s.symbol().to_string(), points)
    }))
}

/// What [`Analyzer::run`] should derive besides the comparison table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportOptions {
    pub indicators: IndicatorSettings,
    pub volume: bool,
    pub fundamentals: bool,
}

/// Everything the rendering layer needs for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request: ComparisonRequest,
    /// Raw bars of the primary instrument, for the price chart.
    pub primary: BarSeries,
    pub indicators: IndicatorSeries,
    pub comparison: ComparisonTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<ComparisonTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentals: Option<Vec<Fundamentals>>,
}

/// Sequences fetches and computations for a [`ComparisonRequest`].
pub struct Analyzer<P> {
    provider: P,
}

impl<P: DataProvider> Analyzer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetches `symbols` concurrently and waits for all of them. The first
    /// failure fails the whole call; output order matches `symbols`.
    async fn fetch_all(&self, symbols: &[&str], request: &ComparisonRequest) -> Result<Vec<BarSeries>> {
        let range = request.range;
        let fetches = symbols.iter().map(|symbol| {
            fetch_series(&self.provider, symbol, range.start(), range.end(), request.interval)
        });
        let series = try_join_all(fetches).await?;
        debug!(count = series.len(), "all series fetched");
        Ok(series)
    }

    async fn fetch_primary(&self, request: &ComparisonRequest) -> Result<BarSeries> {
        let range = request.range;
        Ok(fetch_series(
            &self.provider,
            &request.primary,
            range.start(),
            range.end(),
            request.interval,
        )
        .await?)
    }

    /// Percent-change comparison of primary, comparisons and benchmark.
    pub async fn compare(&self, request: &ComparisonRequest) -> Result<ComparisonTable> {
        let series = self.fetch_all(&request.symbols(), request).await?;
        let table = compare_series(&series)?;
        info!(columns = table.column_count(), rows = table.len(), "comparison built");
        Ok(table)
    }

    /// Indicator columns for the primary instrument.
    pub async fn indicators(
        &self,
        request: &ComparisonRequest,
        settings: &IndicatorSettings,
    ) -> Result<IndicatorSeries> {
        let primary = self.fetch_primary(request).await?;
        IndicatorSeries::compute(&primary, settings)
    }

    /// Volume of primary and comparison instruments. The benchmark is left out.
    pub async fn volume_comparison(&self, request: &ComparisonRequest) -> Result<ComparisonTable> {
        let series = self.fetch_all(&request.peer_symbols(), request).await?;
        volume_table(&series)
    }

    /// Fetches every instrument once and derives all requested outputs from
    /// the same bars.
    pub async fn run(
        &self,
        request: &ComparisonRequest,
        options: &ReportOptions,
        fundamentals: Option<&dyn FundamentalsSource>,
    ) -> Result<AnalysisReport> {
        let peers = request.peer_symbols();
        let symbols = request.symbols();
        if symbols.len() < 1 + request.comparisons.len() + usize::from(request.benchmark.is_some()) {
            warn!(?symbols, "repeated symbols dropped from selection");
        }
        let series = self.fetch_all(&symbols, request).await?;

        let comparison = compare_series(&series)?;
        let indicators = IndicatorSeries::compute(&series[0], &options.indicators)?;
        let volume = if options.volume {
            Some(volume_table(&series[..peers.len()])?)
        } else {
            None
        };
        let fundamentals = match fundamentals {
            Some(source) if options.fundamentals => {
                Some(fundamentals_comparison(source, &peers).await?)
            }
            _ => None,
        };

        info!(
            primary = %request.primary,
            columns = comparison.column_count(),
            rows = comparison.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            request: request.clone(),
            primary: series[0].clone(),
            indicators,
            comparison,
            volume,
            fundamentals,
        })
    }
}
