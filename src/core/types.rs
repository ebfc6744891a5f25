use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::error::ChartResult;

/// Layout size of a drawing surface, in CSS-like layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One sample of a time series: unix time in milliseconds and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub time: i64,
    pub value: f64,
}

impl DataPoint {
    #[must_use]
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }

    #[must_use]
    pub fn from_datetime(time: DateTime<Utc>, value: f64) -> Self {
        Self {
            time: datetime_to_unix_millis(time),
            value,
        }
    }

    pub fn from_decimal_value(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Ok(Self {
            time: datetime_to_unix_millis(time),
            value: decimal_to_f64(value, "value")?,
        })
    }
}
