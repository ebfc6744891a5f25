use serde::{Deserialize, Serialize};

use crate::api::{FrameReport, FrameSkipReason};
use crate::core::{ScaleState, SeriesId, Viewport};

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub viewport: Option<Viewport>,
    pub series_count: usize,
    pub scale: ScaleState,
    pub is_running: bool,
}

/// Event stream exposed to plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PluginEvent {
    Started,
    Stopped,
    SeriesAdded { series: SeriesId },
    SeriesRemoved { series: SeriesId },
    FrameRendered(FrameReport),
    FrameSkipped(FrameSkipReason),
    FrameThrottled { now: f64 },
}

/// Requests a plugin can make from inside a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameControl {
    stop_requested: bool,
}

impl FrameControl {
    /// Stops the repaint loop once the current pass finishes.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

/// Extension hook interface for bounded custom logic.
///
/// Plugins observe events and read chart context without mutating core
/// internals directly; the only lever they hold is [`FrameControl`].
pub trait ChartPlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &PluginEvent, context: PluginContext, control: &mut FrameControl);
}

/// Stops the chart on the first skipped frame.
#[derive(Debug, Clone, Default)]
pub struct StopOnSkip {
    id: String,
    triggered: bool,
}

impl StopOnSkip {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            triggered: false,
        }
    }

    #[must_use]
    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

impl ChartPlugin for StopOnSkip {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &PluginEvent, _context: PluginContext, control: &mut FrameControl) {
        if matches!(event, PluginEvent::FrameSkipped(_)) {
            self.triggered = true;
            control.request_stop();
        }
    }
}
