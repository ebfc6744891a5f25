use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::SeriesBounds;
use crate::error::{ChartError, ChartResult};

/// Deltas above this mark the scale as still animating.
pub const SCALE_ANIMATION_THRESHOLD: f64 = 0.1;

/// Smoothed visible value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleState {
    pub min: f64,
    pub range: f64,
    pub is_animating: bool,
}

impl Default for ScaleState {
    fn default() -> Self {
        Self {
            min: 0.0,
            range: 1.0,
            is_animating: false,
        }
    }
}

impl ScaleState {
    /// `true` when the range cannot be used for value mapping as-is.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !self.min.is_finite() || !self.range.is_finite() || self.range <= 0.0
    }
}

/// Unsmoothed target bounds computed for the latest frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }
}

/// Padding, overrides and smoothing applied to the value axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleSettings {
    pub max_value_scale: f64,
    pub min_value_scale: f64,
    pub fixed_max: Option<f64>,
    pub fixed_min: Option<f64>,
    /// Fraction of the remaining distance covered per frame, in (0, 1].
    pub smoothing: f64,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            max_value_scale: 1.0,
            min_value_scale: 1.0,
            fixed_max: None,
            fixed_min: None,
            smoothing: 0.125,
        }
    }
}

impl ScaleSettings {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 || self.smoothing > 1.0 {
            return Err(ChartError::InvalidConfig(
                "scale smoothing must be in (0, 1]".to_owned(),
            ));
        }
        if !self.max_value_scale.is_finite() || !self.min_value_scale.is_finite() {
            return Err(ChartError::InvalidConfig(
                "value scale padding must be finite".to_owned(),
            ));
        }
        if self.fixed_max.is_some_and(|max| !max.is_finite())
            || self.fixed_min.is_some_and(|min| !min.is_finite())
        {
            return Err(ChartError::InvalidConfig(
                "fixed value bounds must be finite".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Outcome of one scale update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleUpdate {
    /// The state moved toward this target.
    Smoothed(ValueRange),
    /// Nothing defined a bound; the state was left untouched.
    NoData,
}

/// Exponentially smooths the value axis toward the union of series bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleController {
    settings: ScaleSettings,
    state: ScaleState,
    target: Option<ValueRange>,
}

impl ScaleController {
    pub fn new(settings: ScaleSettings) -> ChartResult<Self> {
        Ok(Self {
            settings: settings.validate()?,
            state: ScaleState::default(),
            target: None,
        })
    }

    #[must_use]
    pub fn settings(&self) -> ScaleSettings {
        self.settings
    }

    #[must_use]
    pub fn state(&self) -> ScaleState {
        self.state
    }

    /// Target of the latest update that found data.
    #[must_use]
    pub fn target(&self) -> Option<ValueRange> {
        self.target
    }

    /// Moves the state one smoothing step toward the bounds of `series`.
    ///
    /// `series` should only contain enabled series. Series without data are
    /// ignored; when nothing defines both bounds the state is left as-is.
    pub fn update<I>(&mut self, series: I) -> ScaleUpdate
    where
        I: IntoIterator<Item = SeriesBounds>,
    {
        let (raw_min, raw_max) = series.into_iter().fold(
            (None::<f64>, None::<f64>),
            |(min, max), bounds| {
                (
                    merge_bound(min, bounds.min, f64::min),
                    merge_bound(max, bounds.max, f64::max),
                )
            },
        );

        let max = match self.settings.fixed_max {
            Some(fixed) => Some(fixed),
            None => raw_max.map(|max| max * self.settings.max_value_scale),
        };
        let min = match self.settings.fixed_min {
            Some(fixed) => Some(fixed),
            None => raw_min.map(|min| min - (min * self.settings.min_value_scale - min).abs()),
        };

        let (Some(min), Some(max)) = (min, max) else {
            return ScaleUpdate::NoData;
        };
        let range = max - min;
        if !range.is_finite() || !min.is_finite() {
            return ScaleUpdate::NoData;
        }

        let range_diff = range - self.state.range;
        let min_diff = min - self.state.min;
        self.state.is_animating = range_diff.abs() > SCALE_ANIMATION_THRESHOLD
            || min_diff.abs() > SCALE_ANIMATION_THRESHOLD;
        self.state.range += self.settings.smoothing * range_diff;
        self.state.min += self.settings.smoothing * min_diff;

        let target = ValueRange { min, max };
        self.target = Some(target);
        trace!(
            target_min = min,
            target_max = max,
            state_min = self.state.min,
            state_range = self.state.range,
            animating = self.state.is_animating,
            "scale update"
        );
        ScaleUpdate::Smoothed(target)
    }
}

fn merge_bound(current: Option<f64>, next: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (current, next) {
        (Some(current), Some(next)) => Some(pick(current, next)),
        (current, None) => current,
        (None, next) => next,
    }
}
