//! Percent-change normalization, multi-instrument alignment and technical
//! indicators for an equity comparison dashboard.
//!
//! The usual entry point is [`Analyzer::run`], which fetches every selected
//! instrument through a [`DataProvider`](market_data_ingestor::providers::DataProvider)
//! and returns an [`AnalysisReport`] ready for rendering.

pub mod comparison;
pub mod config;
pub mod errors;
pub mod fundamentals;
pub mod indicators;
pub mod normalize;

pub use comparison::{AnalysisReport, Analyzer, ComparisonRequest, DateRange, ReportOptions};
pub use errors::{AnalyticsError, Result};
pub use indicators::{IndicatorSeries, IndicatorSettings, bollinger_bands, simple_moving_average};
pub use normalize::{ComparisonTable, PercentPoint, merge, normalize};
