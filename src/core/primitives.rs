use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

/// Aligns a coordinate to the device pixel grid for a stroke of `stroke_width`.
///
/// Even integer widths cover whole pixels when centered on an integer
/// coordinate, so the position is rounded. Every other width is centered on a
/// pixel (`floor + 0.5`) so a 1px line lights exactly one row or column.
/// Ties round toward positive infinity, which keeps the mapping
/// translation-invariant: `pixel_snap(x + k, w) == pixel_snap(x, w) + k` for
/// integer `k`.
#[must_use]
pub fn pixel_snap(position: f64, stroke_width: f64) -> f64 {
    if stroke_width % 2.0 == 0.0 {
        let rounded = position.round();
        // `round` breaks ties away from zero; negative ties go up instead.
        if position - rounded == 0.5 {
            rounded + 1.0
        } else {
            rounded
        }
    } else {
        position.floor() + 0.5
    }
}

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}
