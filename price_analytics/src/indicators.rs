//! Trailing rolling indicators over a single series' closes.
//!
//! Every output is aligned 1:1 with the input bars. Positions without a
//! full trailing window are `None`.
//!
//! Bollinger bands use the **sample** standard deviation (divide by
//! `window - 1`). With `window == 1` that is 0/0, so the bands are
//! undefined everywhere even though the moving average is not.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use market_data_ingestor::models::bar::BarSeries;
use serde::{Deserialize, Serialize};

use crate::errors::{AnalyticsError, Result};

pub const DEFAULT_BAND_WIDTH: f64 = 2.0;

/// One indicator value; `value` is `None` where it is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: Vec<IndicatorPoint>,
    /// The simple moving average the bands are centred on.
    pub middle: Vec<IndicatorPoint>,
    pub lower: Vec<IndicatorPoint>,
    /// Sample standard deviation of each window.
    pub std_dev: Vec<IndicatorPoint>,
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindow { window });
    }
    Ok(())
}

fn check_multiplier(k: f64) -> Result<()> {
    if !k.is_finite() || k <= 0.0 {
        return Err(AnalyticsError::InvalidMultiplier { k });
    }
    Ok(())
}

fn rolling_mean(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            (i + 1 >= window).then(|| {
                let slice = &closes[i + 1 - window..=i];
                slice.iter().sum::<f64>() / window as f64
            })
        })
        .collect()
}

fn rolling_sample_std(closes: &[f64], means: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; closes.len()];
    }
    means
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            mean.map(|m| {
                let slice = &closes[i + 1 - window..=i];
                let ss: f64 = slice.iter().map(|x| (x - m).powi(2)).sum();
                (ss / (window - 1) as f64).sqrt()
            })
        })
        .collect()
}

fn attach(series: &BarSeries, values: Vec<Option<f64>>) -> Vec<IndicatorPoint> {
    series
        .timestamps()
        .zip(values)
        .map(|(timestamp, value)| IndicatorPoint { timestamp, value })
        .collect()
}

/// Trailing simple moving average of closes.
///
/// Index `i` is the mean of closes `i + 1 - window ..= i`, or `None` when
/// `i < window - 1`. A window longer than the series yields all `None`.
///
/// # Errors
/// [`AnalyticsError::InvalidWindow`] when `window == 0`.
pub fn simple_moving_average(series: &BarSeries, window: usize) -> Result<Vec<IndicatorPoint>> {
    check_window(window)?;
    let closes: Vec<f64> = series.closes().collect();
    Ok(attach(series, rolling_mean(&closes, window)))
}

/// Bands at `SMA ± k · σ` where σ is the sample standard deviation of the
/// same trailing window.
///
/// # Errors
/// * [`AnalyticsError::InvalidWindow`] when `window == 0`.
/// * [`AnalyticsError::InvalidMultiplier`] when `k` is not finite and positive.
pub fn bollinger_bands(series: &BarSeries, window: usize, k: f64) -> Result<BollingerBands> {
    check_window(window)?;
    check_multiplier(k)?;

    let closes: Vec<f64> = series.closes().collect();
    let means = rolling_mean(&closes, window);
    let stds = rolling_sample_std(&closes, &means, window);

    let band = |sign: f64| -> Vec<Option<f64>> {
        means
            .iter()
            .zip(&stds)
            .map(|(m, s)| Some((*m)? + sign * k * (*s)?))
            .collect()
    };

    Ok(BollingerBands {
        upper: attach(series, band(1.0)),
        lower: attach(series, band(-1.0)),
        middle: attach(series, means),
        std_dev: attach(series, stds),
    })
}

/// Bollinger band parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSettings {
    pub window: usize,
    pub k: f64,
}

/// Which indicator columns to derive for the primary instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub sma_window: Option<usize>,
    pub bollinger: Option<BandSettings>,
}

/// Derived indicator columns aligned with one series' timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    symbol: String,
    timestamps: Vec<DateTime<Utc>>,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl IndicatorSeries {
    pub fn builder(series: &BarSeries) -> IndicatorSeriesBuilder<'_> {
        IndicatorSeriesBuilder {
            series,
            columns: IndexMap::new(),
        }
    }

    /// Computes every indicator enabled in `settings`, SMA first.
    pub fn compute(series: &BarSeries, settings: &IndicatorSettings) -> Result<Self> {
        let mut builder = Self::builder(series);
        if let Some(window) = settings.sma_window {
            builder = builder.sma(window)?;
        }
        if let Some(BandSettings { window, k }) = settings.bollinger {
            builder = builder.bollinger(window, k)?;
        }
        Ok(builder.build())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Column names in the order they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[derive(Debug)]
pub struct IndicatorSeriesBuilder<'a> {
    series: &'a BarSeries,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl IndicatorSeriesBuilder<'_> {
    fn push(mut self, name: String, points: Vec<IndicatorPoint>) -> Result<Self> {
        if self.columns.contains_key(&name) {
            return Err(AnalyticsError::DuplicateColumn { name });
        }
        self.columns
            .insert(name, points.into_iter().map(|p| p.value).collect());
        Ok(self)
    }

    /// Adds `SMA{window}`.
    pub fn sma(self, window: usize) -> Result<Self> {
        let points = simple_moving_average(self.series, window)?;
        self.push(format!("SMA{window}"), points)
    }

    /// Adds `BollingerUpper` and `BollingerLower`.
    pub fn bollinger(self, window: usize, k: f64) -> Result<Self> {
        let bands = bollinger_bands(self.series, window, k)?;
        self.push("BollingerUpper".to_string(), bands.upper)?
            .push("BollingerLower".to_string(), bands.lower)
    }

    pub fn build(self) -> IndicatorSeries {
        IndicatorSeries {
            symbol: self.series.symbol().to_string(),
            timestamps: self.series.timestamps().collect(),
            columns: self.columns,
        }
    }
}
