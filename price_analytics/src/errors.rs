use chrono::{DateTime, Utc};
use market_data_ingestor::providers::ProviderError;
use thiserror::Error;

/// Errors surfaced by normalization, indicator computation and comparison
/// orchestration. None of them are retried; the caller decides what to do.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Normalization was requested on a series with zero bars.
    #[error("series {symbol} has no bars")]
    EmptySeries { symbol: String },

    /// The baseline close of a series is zero.
    #[error("series {symbol} has a zero baseline close at {timestamp}")]
    DivisionByZero {
        symbol: String,
        timestamp: DateTime<Utc>,
    },

    /// A rolling window of zero bars was requested.
    #[error("rolling window must be positive, got {window}")]
    InvalidWindow { window: usize },

    /// The band multiplier is not a finite positive number.
    #[error("band multiplier must be finite and positive, got {k}")]
    InvalidMultiplier { k: f64 },

    /// Two columns with the same name were passed to one merge.
    #[error("duplicate column {name} in comparison")]
    DuplicateColumn { name: String },

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Failure reported by the market-data source, including
    /// [`ProviderError::DataUnavailable`].
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AnalyticsError {
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, AnalyticsError::Provider(e) if e.is_data_unavailable())
    }
}

pub type Result<T, E = AnalyticsError> = std::result::Result<T, E>;
