//! Percentage-change normalization and the timestamp outer join used to put
//! several instruments on one axis.
//!
//! Each instrument is rebased on its own first close, so instruments with
//! different price levels and different calendars become comparable. The
//! merge joins by timestamp identity; an instrument with no bar at a given
//! timestamp gets an undefined (`None`) cell, never a forward-filled or
//! interpolated one.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use market_data_ingestor::models::bar::BarSeries;
use serde::Serialize;

use crate::errors::{AnalyticsError, Result};

/// Percentage change of one bar's close relative to the series baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentPoint {
    pub timestamp: DateTime<Utc>,
    pub percentage: f64,
}

/// Anything that can be placed in a [`ComparisonTable`] column.
pub trait TimedValue {
    fn timestamp(&self) -> DateTime<Utc>;
    fn value(&self) -> f64;
}

impl TimedValue for PercentPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    fn value(&self) -> f64 {
        self.percentage
    }
}

impl TimedValue for (DateTime<Utc>, f64) {
    fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }
    fn value(&self) -> f64 {
        self.1
    }
}

/// Rebases `series` onto "percent change since the first bar".
///
/// Output has one point per bar, in bar order, and the first point is
/// exactly `0.0`.
///
/// # Errors
/// * [`AnalyticsError::EmptySeries`] if the series has no bars.
/// * [`AnalyticsError::DivisionByZero`] if the first close is `0.0`.
pub fn normalize(series: &BarSeries) -> Result<Vec<PercentPoint>> {
    let first = series
        .bars()
        .first()
        .ok_or_else(|| AnalyticsError::EmptySeries {
            symbol: series.symbol().to_string(),
        })?;

    let base = first.close;
    if base == 0.0 {
        return Err(AnalyticsError::DivisionByZero {
            symbol: series.symbol().to_string(),
            timestamp: first.timestamp,
        });
    }

    Ok(series
        .bars()
        .iter()
        .map(|bar| PercentPoint {
            timestamp: bar.timestamp,
            percentage: (bar.close / base - 1.0) * 100.0,
        })
        .collect())
}

/// A unified timestamp axis with one value column per instrument.
///
/// Columns keep the order they were merged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonTable {
    timestamps: Vec<DateTime<Utc>>,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl ComparisonTable {
    /// Row index, ascending and without duplicates.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Column names in merge order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Cell lookup by column name and timestamp. `None` covers both an
    /// unknown column or row and an undefined cell.
    pub fn value(&self, name: &str, timestamp: DateTime<Utc>) -> Option<f64> {
        let row = self.timestamps.binary_search(&timestamp).ok()?;
        self.columns.get(name)?[row]
    }

    /// Iterates rows as `(timestamp, cells)` with cells in column order.
    pub fn rows(&self) -> impl Iterator<Item = (DateTime<Utc>, Vec<Option<f64>>)> + '_ {
        self.timestamps.iter().enumerate().map(|(row, ts)| {
            let cells = self.columns.values().map(|col| col[row]).collect();
            (*ts, cells)
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Outer-joins tagged series on timestamp.
///
/// The row axis is the sorted union of all timestamps. A column holds `None`
/// wherever its series has no point. Columns appear in input order. Within
/// one series the points are expected to be unique per timestamp; if a
/// timestamp repeats, the later point wins.
///
/// # Errors
/// [`AnalyticsError::DuplicateColumn`] if two inputs share a name.
pub fn merge<P, I>(columns: I) -> Result<ComparisonTable>
where
    P: TimedValue,
    I: IntoIterator<Item = (String, Vec<P>)>,
{
    let columns: Vec<(String, Vec<P>)> = columns.into_iter().collect();

    let axis: BTreeSet<DateTime<Utc>> = columns
        .iter()
        .flat_map(|(_, points)| points.iter().map(TimedValue::timestamp))
        .collect();
    let timestamps: Vec<DateTime<Utc>> = axis.into_iter().collect();

    let mut table = ComparisonTable {
        columns: IndexMap::with_capacity(columns.len()),
        timestamps,
    };

    for (name, points) in columns {
        if table.columns.contains_key(&name) {
            return Err(AnalyticsError::DuplicateColumn { name });
        }

        let mut cells = vec![None; table.timestamps.len()];
        for point in &points {
            if let Ok(row) = table.timestamps.binary_search(&point.timestamp()) {
                cells[row] = Some(point.value());
            }
        }
        table.columns.insert(name, cells);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use market_data_ingestor::models::{bar::Bar, timeframe::Interval};
    use proptest::prelude::*;

    use super::*;

    fn t(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn series_at(symbol: &str, days: &[i64], closes: &[f64]) -> BarSeries {
        let bars = days
            .iter()
            .zip(closes)
            .map(|(d, c)| Bar::ohlcv(t(*d), *c, *c, *c, *c, 100.0))
            .collect();
        BarSeries::new(symbol, Interval::Daily.timeframe(), bars).unwrap()
    }

    fn series(symbol: &str, closes: &[f64]) -> BarSeries {
        let days: Vec<i64> = (0..closes.len() as i64).collect();
        series_at(symbol, &days, closes)
    }

    fn percentages(points: &[PercentPoint]) -> Vec<f64> {
        points.iter().map(|p| p.percentage).collect()
    }

    #[test]
    fn rebases_on_first_close() {
        let out = normalize(&series("A", &[10.0, 12.0, 11.0])).unwrap();
        let pct = percentages(&out);
        assert_eq!(pct[0], 0.0);
        assert!((pct[1] - 20.0).abs() < 1e-9);
        assert!((pct[2] - 10.0).abs() < 1e-9);
        assert_eq!(out[2].timestamp, t(2));
    }

    #[test]
    fn empty_series_fails() {
        let err = normalize(&series("EMPTY", &[])).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptySeries { ref symbol } if symbol == "EMPTY"));
    }

    #[test]
    fn zero_baseline_fails() {
        let err = normalize(&series("HALT", &[0.0, 1.0])).unwrap_err();
        assert!(matches!(err, AnalyticsError::DivisionByZero { .. }));
    }

    #[test]
    fn zero_after_baseline_is_minus_hundred() {
        let pct = percentages(&normalize(&series("X", &[5.0, 0.0])).unwrap());
        assert_eq!(pct, vec![0.0, -100.0]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let s = series("A", &[3.3, 7.1, 2.9, 4.4]);
        assert_eq!(normalize(&s).unwrap(), normalize(&s).unwrap());
    }

    #[test]
    fn merge_outer_joins_with_gaps() {
        let a = normalize(&series_at("A", &[0, 1, 2], &[1.0, 2.0, 3.0])).unwrap();
        let b = normalize(&series_at("B", &[0, 2], &[4.0, 2.0])).unwrap();

        let table = merge(vec![("A".to_string(), a), ("B".to_string(), b)]).unwrap();

        assert_eq!(table.timestamps(), &[t(0), t(1), t(2)]);
        assert_eq!(table.column("A").unwrap(), &[Some(0.0), Some(100.0), Some(200.0)]);
        assert_eq!(table.column("B").unwrap(), &[Some(0.0), None, Some(-50.0)]);
        assert_eq!(table.value("B", t(1)), None);
        assert_eq!(table.value("B", t(2)), Some(-50.0));
    }

    #[test]
    fn merge_joins_by_timestamp_not_position() {
        // B starts later; positional zipping would put B's baseline on t0
        let a = normalize(&series_at("A", &[0, 1, 2, 3], &[1.0, 1.0, 1.0, 1.0])).unwrap();
        let b = normalize(&series_at("B", &[2, 3, 4], &[10.0, 11.0, 12.0])).unwrap();

        let table = merge(vec![("A".to_string(), a), ("B".to_string(), b)]).unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(&table.column("B").unwrap()[..2], &[None::<f64>, None]);
        assert_eq!(table.value("B", t(2)), Some(0.0));
        assert_eq!(table.value("A", t(4)), None);
    }

    #[test]
    fn merge_preserves_column_order() {
        let cols = ["MSFT", "AAPL", "SPY"]
            .iter()
            .map(|s| (s.to_string(), normalize(&series(s, &[1.0, 2.0])).unwrap()))
            .collect::<Vec<_>>();
        let table = merge(cols).unwrap();
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec!["MSFT", "AAPL", "SPY"]);

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[1].1, vec![Some(100.0); 3]);
    }

    #[test]
    fn merge_rejects_duplicate_names() {
        let a = normalize(&series("A", &[1.0])).unwrap();
        let err = merge(vec![("A".to_string(), a.clone()), ("A".to_string(), a)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::DuplicateColumn { ref name } if name == "A"));
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let table = merge(Vec::<(String, Vec<PercentPoint>)>::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn merge_accepts_raw_pairs() {
        let table = merge(vec![("VOL".to_string(), vec![(t(1), 5.0), (t(0), 3.0)])]).unwrap();
        assert_eq!(table.timestamps(), &[t(0), t(1)]);
        assert_eq!(table.column("VOL").unwrap(), &[Some(3.0), Some(5.0)]);
    }

    fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(0.01f64..10_000.0, 1..64)
    }

    proptest! {
        #[test]
        fn first_point_is_exactly_zero(closes in arb_closes()) {
            let out = normalize(&series("P", &closes)).unwrap();
            prop_assert_eq!(out[0].percentage, 0.0);
        }

        #[test]
        fn length_and_timestamps_preserved(closes in arb_closes()) {
            let s = series("P", &closes);
            let out = normalize(&s).unwrap();
            prop_assert_eq!(out.len(), s.len());
            let ts: Vec<_> = s.timestamps().collect();
            prop_assert_eq!(out.iter().map(|p| p.timestamp).collect::<Vec<_>>(), ts);
        }

        #[test]
        fn column_content_independent_of_order(
            a in arb_closes(),
            b in arb_closes(),
            offset in 0i64..10,
        ) {
            let days_b: Vec<i64> = (offset..offset + b.len() as i64).collect();
            let na = normalize(&series("A", &a)).unwrap();
            let nb = normalize(&series_at("B", &days_b, &b)).unwrap();

            let ab = merge(vec![("A".to_string(), na.clone()), ("B".to_string(), nb.clone())]).unwrap();
            let ba = merge(vec![("B".to_string(), nb), ("A".to_string(), na)]).unwrap();

            prop_assert_eq!(ab.timestamps(), ba.timestamps());
            prop_assert_eq!(ab.column("A"), ba.column("A"));
            prop_assert_eq!(ab.column("B"), ba.column("B"));
            prop_assert_eq!(ab.symbols().collect::<Vec<_>>(), vec!["A", "B"]);
            prop_assert_eq!(ba.symbols().collect::<Vec<_>>(), vec!["B", "A"]);
        }
    }
}
