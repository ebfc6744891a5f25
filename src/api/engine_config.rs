use serde::{Deserialize, Serialize};

use crate::core::{Interpolation, ScaleSettings};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, FontSpec};

/// Value label style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    pub fill_color: Color,
    pub disabled: bool,
    pub font_size: f64,
    pub font_family: String,
    /// Decimal places of the formatted values.
    pub precision: usize,
    /// Also label each horizontal grid divider.
    pub show_intermediate_labels: bool,
    /// Put intermediate labels on the same side as the min/max labels.
    pub intermediate_label_same_axis: bool,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            fill_color: Color::WHITE,
            disabled: false,
            font_size: 10.0,
            font_family: "monospace".to_owned(),
            precision: 2,
            show_intermediate_labels: false,
            intermediate_label_same_axis: true,
        }
    }
}

impl LabelOptions {
    #[must_use]
    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.font_size, self.font_family.clone())
    }
}

/// Background and grid style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub line_width: f64,
    /// Time between vertical dividers; `0` hides them.
    pub millis_per_line: f64,
    /// When set, splits the visible window into this many equal sections
    /// instead of using `millis_per_line`.
    pub horizontal_sections: Option<u32>,
    /// Number of horizontal bands; dividers are drawn between them.
    pub vertical_sections: u32,
    pub border: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::rgb(119.0 / 255.0, 119.0 / 255.0, 119.0 / 255.0),
            line_width: 2.0,
            millis_per_line: 1_000.0,
            horizontal_sections: None,
            vertical_sections: 2,
            border: true,
        }
    }
}

impl GridOptions {
    /// Time between vertical dividers for a window of `duration_ms`.
    #[must_use]
    pub fn resolved_millis_per_line(&self, duration_ms: f64) -> f64 {
        match self.horizontal_sections {
            Some(sections) if sections > 0 => duration_ms / f64::from(sections),
            _ => self.millis_per_line,
        }
    }
}

/// Label fields a partial configuration may set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialLabelOptions {
    pub fill_color: Option<Color>,
    pub disabled: Option<bool>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub precision: Option<usize>,
    pub show_intermediate_labels: Option<bool>,
    pub intermediate_label_same_axis: Option<bool>,
}

/// Grid fields a partial configuration may set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialGridOptions {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub line_width: Option<f64>,
    pub millis_per_line: Option<f64>,
    pub horizontal_sections: Option<u32>,
    pub vertical_sections: Option<u32>,
    pub border: Option<bool>,
}

/// Configuration overrides; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialChartConfig {
    pub responsive: Option<bool>,
    #[serde(alias = "limit_fps")]
    pub frame_rate: Option<f64>,
    pub duration_ms: Option<f64>,
    pub max_value_scale: Option<f64>,
    pub min_value_scale: Option<f64>,
    pub max_data_set_length: Option<usize>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub scale_smoothing: Option<f64>,
    pub interpolation: Option<Interpolation>,
    pub reverse: Option<bool>,
    pub non_realtime_data: Option<bool>,
    pub labels: Option<PartialLabelOptions>,
    pub grid: Option<PartialGridOptions>,
}

fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Chart configuration.
///
/// Built once from the defaults and a [`PartialChartConfig`] overlay (nested
/// `labels` and `grid` groups merge field by field). The chart takes the
/// value at construction and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Follow layout size changes of the surface and apply its device pixel ratio.
    pub responsive: bool,
    /// Upper bound on paints per second; `0` disables throttling.
    #[serde(alias = "limit_fps")]
    pub frame_rate: f64,
    /// Visible time window in milliseconds.
    pub duration_ms: f64,
    pub max_value_scale: f64,
    pub min_value_scale: f64,
    /// Samples kept per series regardless of age.
    pub max_data_set_length: usize,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub scale_smoothing: f64,
    pub interpolation: Interpolation,
    pub reverse: bool,
    /// Replay data against a clock latched to the newest sample.
    pub non_realtime_data: bool,
    pub labels: LabelOptions,
    pub grid: GridOptions,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            frame_rate: 0.0,
            duration_ms: 20_000.0,
            max_value_scale: 1.0,
            min_value_scale: 1.0,
            max_data_set_length: 2,
            max: None,
            min: None,
            scale_smoothing: 0.125,
            interpolation: Interpolation::Bezier,
            reverse: false,
            non_realtime_data: false,
            labels: LabelOptions::default(),
            grid: GridOptions::default(),
        }
    }
}

impl ChartConfig {
    /// Overlays `partial` onto the defaults field by field and validates.
    pub fn from_partial(partial: PartialChartConfig) -> ChartResult<Self> {
        Self::default().merged(partial).validate()
    }

    /// Returns a copy with every field set in `partial` replaced.
    #[must_use]
    pub fn merged(mut self, partial: PartialChartConfig) -> Self {
        overlay(&mut self.responsive, partial.responsive);
        overlay(&mut self.frame_rate, partial.frame_rate);
        overlay(&mut self.duration_ms, partial.duration_ms);
        overlay(&mut self.max_value_scale, partial.max_value_scale);
        overlay(&mut self.min_value_scale, partial.min_value_scale);
        overlay(&mut self.max_data_set_length, partial.max_data_set_length);
        if partial.max.is_some() {
            self.max = partial.max;
        }
        if partial.min.is_some() {
            self.min = partial.min;
        }
        overlay(&mut self.scale_smoothing, partial.scale_smoothing);
        overlay(&mut self.interpolation, partial.interpolation);
        overlay(&mut self.reverse, partial.reverse);
        overlay(&mut self.non_realtime_data, partial.non_realtime_data);

        if let Some(labels) = partial.labels {
            let target = &mut self.labels;
            overlay(&mut target.fill_color, labels.fill_color);
            overlay(&mut target.disabled, labels.disabled);
            overlay(&mut target.font_size, labels.font_size);
            overlay(&mut target.font_family, labels.font_family);
            overlay(&mut target.precision, labels.precision);
            overlay(&mut target.show_intermediate_labels, labels.show_intermediate_labels);
            overlay(
                &mut target.intermediate_label_same_axis,
                labels.intermediate_label_same_axis,
            );
        }
        if let Some(grid) = partial.grid {
            let target = &mut self.grid;
            overlay(&mut target.fill_color, grid.fill_color);
            overlay(&mut target.stroke_color, grid.stroke_color);
            overlay(&mut target.line_width, grid.line_width);
            overlay(&mut target.millis_per_line, grid.millis_per_line);
            if grid.horizontal_sections.is_some() {
                target.horizontal_sections = grid.horizontal_sections;
            }
            overlay(&mut target.vertical_sections, grid.vertical_sections);
            overlay(&mut target.border, grid.border);
        }
        self
    }

    /// Parses a (possibly partial) JSON configuration over the defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let partial: PartialChartConfig = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse chart config: {e}")))?;
        Self::from_partial(partial)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to serialize chart config: {e}")))
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    #[must_use]
    pub fn with_value_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_value_scale_padding(mut self, min_value_scale: f64, max_value_scale: f64) -> Self {
        self.min_value_scale = min_value_scale;
        self.max_value_scale = max_value_scale;
        self
    }

    #[must_use]
    pub fn with_scale_smoothing(mut self, scale_smoothing: f64) -> Self {
        self.scale_smoothing = scale_smoothing;
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    #[must_use]
    pub fn with_non_realtime_data(mut self, non_realtime_data: bool) -> Self {
        self.non_realtime_data = non_realtime_data;
        self
    }

    #[must_use]
    pub fn with_responsive(mut self, responsive: bool) -> Self {
        self.responsive = responsive;
        self
    }

    #[must_use]
    pub fn with_max_data_set_length(mut self, max_data_set_length: usize) -> Self {
        self.max_data_set_length = max_data_set_length;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: LabelOptions) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: GridOptions) -> Self {
        self.grid = grid;
        self
    }

    /// Minimum time between admitted paints, `0` when unthrottled.
    #[must_use]
    pub fn frame_time_ms(&self) -> f64 {
        if self.frame_rate > 0.0 {
            1_000.0 / self.frame_rate
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn scale_settings(&self) -> ScaleSettings {
        ScaleSettings {
            max_value_scale: self.max_value_scale,
            min_value_scale: self.min_value_scale,
            fixed_max: self.max,
            fixed_min: self.min,
            smoothing: self.scale_smoothing,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "duration must be finite and > 0".to_owned(),
            ));
        }
        if !self.frame_rate.is_finite() || self.frame_rate < 0.0 {
            return Err(ChartError::InvalidConfig(
                "frame rate must be finite and >= 0".to_owned(),
            ));
        }
        self.scale_settings().validate()?;

        let grid = self.grid;
        if !grid.line_width.is_finite() || grid.line_width < 0.0 {
            return Err(ChartError::InvalidConfig(
                "grid line width must be finite and >= 0".to_owned(),
            ));
        }
        if !grid.millis_per_line.is_finite() || grid.millis_per_line < 0.0 {
            return Err(ChartError::InvalidConfig(
                "grid millis per line must be finite and >= 0".to_owned(),
            ));
        }
        if grid.horizontal_sections == Some(0) {
            return Err(ChartError::InvalidConfig(
                "grid horizontal sections must be > 0 when set".to_owned(),
            ));
        }
        grid.fill_color.validate()?;
        grid.stroke_color.validate()?;

        if !self.labels.font_size.is_finite() || self.labels.font_size <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "label font size must be finite and > 0".to_owned(),
            ));
        }
        self.labels.fill_color.validate()?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartConfig, PartialChartConfig, PartialGridOptions};

    #[test]
    fn default_config_is_valid() {
        let config = ChartConfig::default().validate().expect("defaults");
        assert_eq!(config.frame_time_ms(), 0.0);
        assert_eq!(config.grid.resolved_millis_per_line(config.duration_ms), 1_000.0);
    }

    #[test]
    fn horizontal_sections_override_millis_per_line() {
        let mut config = ChartConfig::default();
        config.grid.horizontal_sections = Some(4);
        assert_eq!(config.grid.resolved_millis_per_line(20_000.0), 5_000.0);
    }

    #[test]
    fn partial_grid_keeps_unset_fields() {
        let config = ChartConfig::from_partial(PartialChartConfig {
            grid: Some(PartialGridOptions {
                vertical_sections: Some(4),
                ..PartialGridOptions::default()
            }),
            ..PartialChartConfig::default()
        })
        .expect("config");
        assert_eq!(config.grid.vertical_sections, 4);
        assert_eq!(config.grid.line_width, 2.0);
        assert!(config.grid.border);
    }
}
