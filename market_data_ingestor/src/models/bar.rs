//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! These types are the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations, regardless of which vendor produced the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::timeframe::TimeFrame;

/// A single time-series bar (OHLCV) for a given timestamp.
///
/// This struct is vendor-agnostic and is used throughout the data ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,

    /// Trade count for the bar. Not all providers supply this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_count: Option<u64>,

    /// Volume-weighted average price. Not all providers supply this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
}

impl Bar {
    /// Bar with only OHLCV populated.
    pub fn ohlcv(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            trade_count: None,
            vwap: None,
        }
    }

    fn first_invalid_field(&self) -> Option<(&'static str, f64)> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
    }
}

/// Invariant violations detected while assembling a [`BarSeries`].
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("{symbol}: bar {index} at {timestamp} is not after the previous bar")]
    OutOfOrder {
        symbol: String,
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("{symbol}: bar {index} has invalid {field} value {value}")]
    InvalidValue {
        symbol: String,
        index: usize,
        field: &'static str,
        value: f64,
    },
}

/// A complete set of time-series data for a single symbol.
///
/// Bars are strictly ascending by timestamp with no duplicates, and every
/// price and volume is finite and non-negative. Both are checked in
/// [`BarSeries::new`]; the series cannot be mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: String,
    timeframe: TimeFrame,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: TimeFrame,
        bars: Vec<Bar>,
    ) -> Result<Self, SeriesError> {
        let symbol = symbol.into();

        for (index, bar) in bars.iter().enumerate() {
            if let Some((field, value)) = bar.first_invalid_field() {
                return Err(SeriesError::InvalidValue {
                    symbol,
                    index,
                    field,
                    value,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::OutOfOrder {
                    symbol,
                    index,
                    timestamp: bar.timestamp,
                });
            }
        }

        Ok(Self {
            symbol,
            timeframe,
            bars,
        })
    }

    /// The symbol this data represents (e.g., "AAPL").
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The time interval for each bar in the series.
    pub fn timeframe(&self) -> TimeFrame {
        self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.bars.iter().map(|b| b.timestamp)
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::timeframe::Interval;

    fn bar(day: i64, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        Bar::ohlcv(ts, close, close, close, close, 1_000.0)
    }

    #[test]
    fn accepts_strictly_ascending_bars() {
        let series =
            BarSeries::new("AAPL", Interval::Daily.timeframe(), vec![bar(0, 1.0), bar(1, 2.0)])
                .unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn empty_series_is_valid() {
        let series = BarSeries::new("AAPL", Interval::Daily.timeframe(), vec![]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = BarSeries::new("AAPL", Interval::Daily.timeframe(), vec![bar(0, 1.0), bar(0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_descending_timestamps() {
        let err = BarSeries::new("AAPL", Interval::Daily.timeframe(), vec![bar(2, 1.0), bar(1, 2.0)])
            .unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { .. }));
    }

    #[test]
    fn rejects_negative_and_nan_values() {
        let err = BarSeries::new("X", Interval::Daily.timeframe(), vec![bar(0, -1.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidValue { field: "open", .. }));

        let mut b = bar(0, 1.0);
        b.volume = f64::NAN;
        let err = BarSeries::new("X", Interval::Daily.timeframe(), vec![b]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidValue { field: "volume", .. }));
    }

    #[test]
    fn zero_close_is_allowed() {
        // halted instruments can print a zero close; rejecting it is the consumer's call
        assert!(BarSeries::new("X", Interval::Daily.timeframe(), vec![bar(0, 0.0)]).is_ok());
    }
}
