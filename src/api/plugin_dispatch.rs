use tracing::debug;

use crate::extensions::{FrameControl, PluginContext, PluginEvent};
use crate::render::DrawingSurface;

use super::{StreamingChart, TickSource};

impl<S: DrawingSurface, T: TickSource> StreamingChart<S, T> {
    pub(super) fn plugin_context(&self) -> PluginContext {
        PluginContext {
            viewport: self.frame_state().layout_cache,
            series_count: self.series_count(),
            scale: self.scale_state(),
            is_running: self.is_running(),
        }
    }

    /// Delivers `event` to every plugin. Returns `true` when any of them
    /// asked for the loop to stop.
    pub(super) fn emit_plugin_event(&mut self, event: &PluginEvent) -> bool {
        if self.plugins.is_empty() {
            return false;
        }
        let context = self.plugin_context();
        let mut control = FrameControl::default();
        for plugin in &mut self.plugins {
            plugin.on_event(event, context, &mut control);
        }
        if control.stop_requested() {
            debug!(?event, "plugin requested stop");
        }
        control.stop_requested()
    }
}
