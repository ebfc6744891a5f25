use serde::{Deserialize, Serialize};

use crate::core::{ScaleState, ValueRange, Viewport};

/// Why a tick produced no frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameSkipReason {
    SurfaceNotAttached,
    EmptySurface { width: u32, height: u32 },
    /// A surface or configuration error aborted the pass.
    Failed(String),
}

/// Facts about one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Quantized chart time at the leading edge.
    pub chart_time: f64,
    pub oldest_valid_time: f64,
    pub millis_per_pixel: f64,
    pub viewport: Viewport,
    /// Scale state after this frame's smoothing step.
    pub scale: ScaleState,
    pub value_target: Option<ValueRange>,
    /// Value-dependent drawing was skipped because the scale range was
    /// zero or not a number.
    pub degenerate_scale: bool,
    pub series_drawn: usize,
    /// Enabled series with fewer than two retained points.
    pub series_skipped: usize,
    pub points_pruned: usize,
    pub labels_drawn: usize,
}

/// Result of handling one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameOutcome {
    /// The handle was not the outstanding tick.
    Stale,
    Throttled,
    Rendered(FrameReport),
    Skipped(FrameSkipReason),
}

impl FrameOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Rendered(report) => Some(report),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

/// State carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameState {
    /// Wall-clock time of the last admitted paint.
    pub last_render_time: Option<f64>,
    /// Chart time of the last painted frame.
    pub last_chart_time: Option<f64>,
    pub millis_per_pixel: Option<f64>,
    /// Layout size seen by the last resize.
    pub layout_cache: Option<Viewport>,
}
