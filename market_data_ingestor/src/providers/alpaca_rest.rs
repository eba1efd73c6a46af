//! Alpaca Market Data v2 REST provider (historical stock bars).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::AlpacaProvider;
