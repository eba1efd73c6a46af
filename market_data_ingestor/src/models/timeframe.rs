//! Bar interval types.
//!
//! [`TimeFrame`] is the general `amount × unit` description that providers
//! validate against their own API rules. [`Interval`] is the closed set of
//! sampling intervals the comparison dashboard exposes (daily, weekly,
//! monthly) and converts losslessly into a [`TimeFrame`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        if amount == 0 {
            return Err(TimeFrameError::InvalidAmount {
                unit,
                message: "amount must be at least 1".into(),
            });
        }
        Ok(Self { amount, unit })
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeFrameUnit::Minute => "Min",
            TimeFrameUnit::Hour => "Hour",
            TimeFrameUnit::Day => "Day",
            TimeFrameUnit::Week => "Week",
            TimeFrameUnit::Month => "Month",
        };
        write!(f, "{}{}", self.amount, unit)
    }
}

/// Sampling interval of a requested series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    pub const fn timeframe(self) -> TimeFrame {
        let unit = match self {
            Interval::Daily => TimeFrameUnit::Day,
            Interval::Weekly => TimeFrameUnit::Week,
            Interval::Monthly => TimeFrameUnit::Month,
        };
        TimeFrame { amount: 1, unit }
    }
}

impl From<Interval> for TimeFrame {
    fn from(interval: Interval) -> Self {
        interval.timeframe()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        };
        f.write_str(s)
    }
}

/// Accepts `1d`/`d`/`daily`, `1wk`/`w`/`weekly` and `1mo`/`mo`/`monthly`.
impl FromStr for Interval {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "d" | "day" | "daily" => Ok(Interval::Daily),
            "1wk" | "w" | "wk" | "week" | "weekly" => Ok(Interval::Weekly),
            "1mo" | "mo" | "month" | "monthly" => Ok(Interval::Monthly),
            _ => Err(TimeFrameError::InvalidInput {
                message: format!("unknown interval: {s}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_rejected() {
        match TimeFrame::new(0, TimeFrameUnit::Minute) {
            Err(TimeFrameError::InvalidAmount { unit, message }) => {
                assert_eq!(unit, TimeFrameUnit::Minute);
                assert!(message.contains("at least 1"));
            }
            other => panic!("Expected InvalidAmount error, got {other:?}"),
        }
    }

    #[test]
    fn interval_maps_to_single_unit_timeframe() {
        assert_eq!(
            Interval::Daily.timeframe(),
            TimeFrame::new(1, TimeFrameUnit::Day).unwrap()
        );
        assert_eq!(TimeFrame::from(Interval::Weekly).unit, TimeFrameUnit::Week);
        assert_eq!(Interval::Monthly.timeframe().to_string(), "1Month");
    }

    #[test]
    fn parse_interval_aliases() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!(" Weekly ".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("1mo".parse::<Interval>().unwrap(), Interval::Monthly);
        assert!("5m".parse::<Interval>().is_err());
    }

    #[test]
    fn display_matches_dashboard_codes() {
        for interval in [Interval::Daily, Interval::Weekly, Interval::Monthly] {
            let code = interval.to_string();
            assert_eq!(code.parse::<Interval>().unwrap(), interval);
        }
    }
}
