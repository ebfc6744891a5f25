use serde::{Deserialize, Serialize};

use crate::core::ScaleState;
use crate::core::primitives::pixel_snap;
use crate::error::{ChartError, ChartResult};

/// Smallest value range used when mapping values to pixels.
///
/// A series whose min equals its max drives the smoothed range toward zero;
/// the mapper floors the range here so the division stays finite. Values at
/// the scale minimum then map onto the bottom edge.
pub const MIN_VALUE_RANGE: f64 = 1e-9;

/// Time window geometry of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Chart time painted at the leading edge, in unix milliseconds.
    pub time: f64,
    pub millis_per_pixel: f64,
    pub width: f64,
    pub height: f64,
    /// Scroll left-to-right instead of right-to-left.
    pub reverse: bool,
}

impl FrameGeometry {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.width.is_finite()
            || !self.height.is_finite()
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(ChartError::InvalidData(
                "frame width and height must be finite and > 0".to_owned(),
            ));
        }
        if !self.millis_per_pixel.is_finite() || self.millis_per_pixel <= 0.0 {
            return Err(ChartError::InvalidData(
                "millis per pixel must be finite and > 0".to_owned(),
            ));
        }
        if !self.time.is_finite() {
            return Err(ChartError::InvalidData(
                "frame time must be finite".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Oldest time still mapped onto the surface.
    #[must_use]
    pub fn oldest_valid_time(self) -> f64 {
        self.time - self.width * self.millis_per_pixel
    }
}

/// Time/value to pixel mapping for a single frame.
///
/// Built fresh from the frame geometry and the current scale state, then
/// dropped when the frame is done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    geometry: FrameGeometry,
    value_min: f64,
    value_range: f64,
}

impl CoordinateMapper {
    pub fn new(geometry: FrameGeometry, scale: ScaleState) -> ChartResult<Self> {
        let geometry = geometry.validate()?;
        if !scale.min.is_finite() || !scale.range.is_finite() {
            return Err(ChartError::InvalidData(
                "scale state must be finite".to_owned(),
            ));
        }

        Ok(Self {
            geometry,
            value_min: scale.min,
            value_range: scale.range.max(MIN_VALUE_RANGE),
        })
    }

    #[must_use]
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Range actually used for value mapping, after the epsilon floor.
    #[must_use]
    pub fn value_range(&self) -> f64 {
        self.value_range
    }

    #[must_use]
    pub fn oldest_valid_time(&self) -> f64 {
        self.geometry.oldest_valid_time()
    }

    /// Maps a timestamp to a snapped x coordinate.
    #[must_use]
    pub fn time_to_x(&self, time: f64, stroke_width: f64) -> f64 {
        // Dividing both terms before subtracting keeps the fractional part of
        // `offset` independent of the magnitude of the frame time. Computing
        // `(frame - time) / mpp` leaves residue that lands on either side of a
        // pixel boundary from one frame to the next and makes pixel_snap jump.
        let mpp = self.geometry.millis_per_pixel;
        let offset = self.geometry.time / mpp - time / mpp;
        let x = if self.geometry.reverse {
            offset
        } else {
            self.geometry.width - offset
        };
        pixel_snap(x, stroke_width)
    }

    /// Maps a value to a snapped y coordinate; larger values sit higher.
    #[must_use]
    pub fn value_to_y(&self, value: f64, stroke_width: f64) -> f64 {
        let offset = value - self.value_min;
        let y = self.geometry.height * (1.0 - offset / self.value_range);
        pixel_snap(y, stroke_width)
    }
}
