//! Vendor-agnostic historical bar data: the canonical OHLCV model, the
//! [`DataProvider`](providers::DataProvider) abstraction and its Alpaca REST
//! implementation.

pub mod models;
pub mod providers;

pub use providers::fetch_series;
