use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, Interpolation};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// How `append` treats a sample whose timestamp already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AppendMode {
    /// The new value replaces the stored one.
    #[default]
    Replace,
    /// The new value is added to the stored one.
    Sum,
}

/// Bounds bookkeeping options of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesOptions {
    /// Periodically recompute min/max from the retained points once attached
    /// to a chart.
    pub reset_bounds: bool,
    pub reset_bounds_interval: Duration,
}

impl Default for TimeSeriesOptions {
    fn default() -> Self {
        Self {
            reset_bounds: true,
            reset_bounds_interval: Duration::from_millis(3_000),
        }
    }
}

/// Display style of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// `None` disables the stroke.
    pub stroke: Option<Color>,
    /// `None` disables the fill.
    pub fill: Option<Color>,
    pub line_width: f64,
    /// Overrides the chart-wide interpolation when set.
    pub interpolation: Option<Interpolation>,
    /// Fill down to the bottom edge instead of the zero-value line.
    pub fill_to_bottom: bool,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            stroke: Some(Color::WHITE),
            fill: None,
            line_width: 1.0,
            interpolation: None,
            fill_to_bottom: true,
        }
    }
}

impl SeriesStyle {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.line_width.is_finite() || self.line_width < 0.0 {
            return Err(ChartError::InvalidData(
                "series line width must be finite and >= 0".to_owned(),
            ));
        }
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        Ok(self)
    }
}

/// Partial style merged over a series' style when it is attached to a chart.
///
/// `Some(None)` for `stroke`/`fill` explicitly disables that paint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesDisplayOptions {
    #[serde(default)]
    pub stroke: Option<Option<Color>>,
    #[serde(default)]
    pub fill: Option<Option<Color>>,
    #[serde(default)]
    pub line_width: Option<f64>,
    #[serde(default)]
    pub interpolation: Option<Interpolation>,
    #[serde(default)]
    pub fill_to_bottom: Option<bool>,
}

impl SeriesDisplayOptions {
    #[must_use]
    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke = Some(Some(color));
        self
    }

    #[must_use]
    pub fn without_stroke(mut self) -> Self {
        self.stroke = Some(None);
        self
    }

    #[must_use]
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(Some(color));
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = Some(line_width);
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    #[must_use]
    pub fn with_fill_to_bottom(mut self, fill_to_bottom: bool) -> Self {
        self.fill_to_bottom = Some(fill_to_bottom);
        self
    }

    #[must_use]
    pub fn apply_to(self, mut style: SeriesStyle) -> SeriesStyle {
        if let Some(stroke) = self.stroke {
            style.stroke = stroke;
        }
        if let Some(fill) = self.fill {
            style.fill = fill;
        }
        if let Some(line_width) = self.line_width {
            style.line_width = line_width;
        }
        if let Some(interpolation) = self.interpolation {
            style.interpolation = Some(interpolation);
        }
        if let Some(fill_to_bottom) = self.fill_to_bottom {
            style.fill_to_bottom = fill_to_bottom;
        }
        style
    }
}

/// Running value bounds of a series; `None` means the series has no data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Time-ordered samples with running bounds.
///
/// Bounds grow incrementally on `append` and only shrink on `reset_bounds`,
/// which a chart calls periodically when `options.reset_bounds` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    data: Vec<DataPoint>,
    bounds: SeriesBounds,
    disabled: bool,
    options: TimeSeriesOptions,
    style: SeriesStyle,
}

impl TimeSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: TimeSeriesOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }

    pub fn append(&mut self, point: DataPoint) -> ChartResult<()> {
        self.append_with(point, AppendMode::Replace)
    }

    /// Inserts a sample keeping timestamps ordered.
    ///
    /// The insertion point is searched from the end since samples usually
    /// arrive in order.
    pub fn append_with(&mut self, point: DataPoint, mode: AppendMode) -> ChartResult<()> {
        if !point.value.is_finite() {
            return Err(ChartError::InvalidData(
                "series value must be finite".to_owned(),
            ));
        }

        let mut stored_value = point.value;
        let insert_at = self
            .data
            .iter()
            .rposition(|existing| existing.time <= point.time)
            .map_or(0, |index| index + 1);

        if insert_at > 0 && self.data[insert_at - 1].time == point.time {
            let existing = &mut self.data[insert_at - 1];
            match mode {
                AppendMode::Replace => existing.value = point.value,
                AppendMode::Sum => {
                    existing.value += point.value;
                    stored_value = existing.value;
                }
            }
        } else {
            self.data.insert(insert_at, point);
        }

        self.bounds.max = Some(self.bounds.max.map_or(stored_value, |max| max.max(stored_value)));
        self.bounds.min = Some(self.bounds.min.map_or(stored_value, |min| min.min(stored_value)));
        Ok(())
    }

    /// Recomputes min/max from the retained points.
    pub fn reset_bounds(&mut self) {
        self.bounds = self
            .data
            .iter()
            .fold(SeriesBounds::default(), |bounds, point| SeriesBounds {
                min: Some(bounds.min.map_or(point.value, |min| min.min(point.value))),
                max: Some(bounds.max.map_or(point.value, |max| max.max(point.value))),
            });
    }

    /// Drops leading samples older than `oldest_valid_time`.
    ///
    /// The newest sample at or before `oldest_valid_time` is kept so the left
    /// edge of the visible window can still interpolate into view, and no
    /// more samples are dropped once only `max_data_set_length` remain.
    /// Returns the number of samples removed.
    pub fn remove_old_data(&mut self, oldest_valid_time: f64, max_data_set_length: usize) -> usize {
        let mut remove_count = 0;
        while self.data.len() - remove_count > max_data_set_length
            && remove_count + 1 < self.data.len()
            && (self.data[remove_count + 1].time as f64) < oldest_valid_time
        {
            remove_count += 1;
        }
        if remove_count > 0 {
            self.data.drain(..remove_count);
        }
        remove_count
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.reset_bounds();
    }

    #[must_use]
    pub fn data(&self) -> &[DataPoint] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn bounds(&self) -> SeriesBounds {
        self.bounds
    }

    #[must_use]
    pub fn latest_time(&self) -> Option<i64> {
        self.data.last().map(|point| point.time)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    #[must_use]
    pub fn options(&self) -> TimeSeriesOptions {
        self.options
    }

    #[must_use]
    pub fn style(&self) -> SeriesStyle {
        self.style
    }

    pub fn set_style(&mut self, style: SeriesStyle) -> ChartResult<()> {
        self.style = style.validate()?;
        Ok(())
    }

    pub fn apply_display_options(&mut self, options: SeriesDisplayOptions) -> ChartResult<()> {
        self.set_style(options.apply_to(self.style))
    }
}

/// Process-unique identity of a [`SeriesHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(u64);

impl SeriesId {
    fn next() -> Self {
        static NEXT_SERIES_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_SERIES_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Shared handle to a [`TimeSeries`].
///
/// The producer appends through one clone while a chart reads and prunes
/// through another; the reset-bounds timer holds a third. Clones share the
/// same identity.
#[derive(Debug, Clone)]
pub struct SeriesHandle {
    id: SeriesId,
    inner: Arc<Mutex<TimeSeries>>,
}

impl SeriesHandle {
    #[must_use]
    pub fn new(series: TimeSeries) -> Self {
        Self {
            id: SeriesId::next(),
            inner: Arc::new(Mutex::new(series)),
        }
    }

    #[must_use]
    pub fn id(&self) -> SeriesId {
        self.id
    }

    /// Locks the series. A poisoned lock is recovered since every mutation
    /// leaves the series consistent.
    pub fn lock(&self) -> MutexGuard<'_, TimeSeries> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, point: DataPoint) -> ChartResult<()> {
        self.lock().append(point)
    }

    pub fn reset_bounds(&self) {
        self.lock().reset_bounds();
    }

    #[must_use]
    pub fn bounds(&self) -> SeriesBounds {
        self.lock().bounds()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.lock().set_disabled(disabled);
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.lock().is_disabled()
    }
}

impl Default for SeriesHandle {
    fn default() -> Self {
        Self::new(TimeSeries::new())
    }
}

impl From<TimeSeries> for SeriesHandle {
    fn from(series: TimeSeries) -> Self {
        Self::new(series)
    }
}
