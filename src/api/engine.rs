use tracing::{debug, trace, warn};

use crate::core::{
    CoordinateMapper, FrameGeometry, ScaleController, ScaleState, ScaleUpdate, SeriesDisplayOptions,
    SeriesHandle, ValueRange, Viewport,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{ChartPlugin, PluginEvent};
use crate::render::DrawingSurface;

use super::render_pass::paint_frame;
use super::{
    ChartConfig, Clock, FrameOutcome, FrameReport, FrameScheduler, FrameSkipReason, FrameState,
    IntervalScheduler, SeriesRegistry, SystemClock, ThreadIntervalScheduler, TickHandle,
    TickSource,
};

/// Real-time scrolling line chart.
///
/// The chart owns its drawing surface and repaint loop. The host feeds it
/// paint opportunities through [`TickSource`]: every handle returned by the
/// source must eventually be passed back to [`StreamingChart::on_tick`].
/// Series are shared with producers through [`SeriesHandle`] and may be
/// appended to from any thread between ticks.
pub struct StreamingChart<S: DrawingSurface, T: TickSource> {
    config: ChartConfig,
    surface: Option<S>,
    delay_ms: f64,
    registry: SeriesRegistry,
    scheduler: FrameScheduler<T>,
    clock: Box<dyn Clock>,
    scale: ScaleController,
    frame: FrameState,
    pub(super) plugins: Vec<Box<dyn ChartPlugin>>,
}

impl<S: DrawingSurface, T: TickSource> StreamingChart<S, T> {
    pub fn new(config: ChartConfig, tick_source: T) -> ChartResult<Self> {
        let config = config.validate()?;
        let scale = ScaleController::new(config.scale_settings())?;
        let scheduler = FrameScheduler::new(tick_source, config.frame_time_ms());

        debug!(
            duration_ms = config.duration_ms,
            frame_rate = config.frame_rate,
            non_realtime = config.non_realtime_data,
            "streaming chart created"
        );
        Ok(Self {
            config,
            surface: None,
            delay_ms: 0.0,
            registry: SeriesRegistry::new(Box::new(ThreadIntervalScheduler::new())),
            scheduler,
            clock: Box::new(SystemClock),
            scale,
            frame: FrameState::default(),
            plugins: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the timer source used for reset-bounds timers.
    ///
    /// Must be called before any series is added.
    pub fn with_interval_scheduler(
        mut self,
        timers: impl IntervalScheduler + 'static,
    ) -> ChartResult<Self> {
        if !self.registry.is_empty() {
            return Err(ChartError::InvalidConfig(
                "interval scheduler must be set before series are added".to_owned(),
            ));
        }
        self.registry = SeriesRegistry::new(Box::new(timers));
        Ok(self)
    }

    /// Attaches `surface`, renders `delay_ms` behind the clock and starts the
    /// repaint loop.
    pub fn stream_to(&mut self, surface: S, delay_ms: f64) -> ChartResult<()> {
        if !delay_ms.is_finite() || delay_ms < 0.0 {
            return Err(ChartError::InvalidConfig(
                "stream delay must be finite and >= 0".to_owned(),
            ));
        }
        self.attach_surface(surface);
        self.delay_ms = delay_ms;
        self.start();
        Ok(())
    }

    /// Attaches `surface`, returning the previously attached one.
    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        self.frame.layout_cache = None;
        self.surface.replace(surface)
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.frame.layout_cache = None;
        self.surface.take()
    }

    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    #[must_use]
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Adds `series` to the chart, merging `options` into its style.
    ///
    /// Adding a series twice only merges the options again. Returns `true`
    /// when the series was newly added.
    pub fn add(&mut self, series: &SeriesHandle, options: SeriesDisplayOptions) -> ChartResult<bool> {
        let added = self.registry.add(series, options)?;
        if added {
            self.emit_plugin_event(&PluginEvent::SeriesAdded {
                series: series.id(),
            });
        }
        Ok(added)
    }

    /// Removes `series` and cancels its reset-bounds timer.
    pub fn remove(&mut self, series: &SeriesHandle) -> bool {
        let removed = self.registry.remove(series);
        if removed {
            self.emit_plugin_event(&PluginEvent::SeriesRemoved {
                series: series.id(),
            });
        }
        removed
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn series_registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    /// Starts the repaint loop. Returns `false` when it was already running.
    pub fn start(&mut self) -> bool {
        let started = self.scheduler.start();
        if started {
            self.emit_plugin_event(&PluginEvent::Started);
        }
        started
    }

    /// Stops the repaint loop; safe from inside a tick.
    pub fn stop(&mut self) -> bool {
        let stopped = self.scheduler.stop();
        if stopped {
            self.frame.last_render_time = None;
            self.emit_plugin_event(&PluginEvent::Stopped);
        }
        stopped
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    #[must_use]
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.scheduler.pending_tick()
    }

    #[must_use]
    pub fn tick_source(&self) -> &T {
        self.scheduler.source()
    }

    /// Handles a tick at the chart clock's current time.
    pub fn on_tick(&mut self, handle: TickHandle) -> FrameOutcome {
        let now = self.clock.now_millis();
        self.on_tick_at(handle, now)
    }

    /// Handles a tick at `now`.
    ///
    /// Renders, notifies plugins and requests the next tick unless the loop
    /// was stopped meanwhile. Failures are reported in the outcome; they never
    /// end the loop.
    pub fn on_tick_at(&mut self, handle: TickHandle, now: f64) -> FrameOutcome {
        if !self.scheduler.begin_tick(handle) {
            return FrameOutcome::Stale;
        }

        let outcome = self.render_at(now);
        let event = match &outcome {
            FrameOutcome::Rendered(report) => Some(PluginEvent::FrameRendered(report.clone())),
            FrameOutcome::Skipped(reason) => Some(PluginEvent::FrameSkipped(reason.clone())),
            FrameOutcome::Throttled => Some(PluginEvent::FrameThrottled { now }),
            FrameOutcome::Stale => None,
        };
        let stop_requested = event.is_some_and(|event| self.emit_plugin_event(&event));
        if stop_requested {
            self.stop();
        }

        self.scheduler.finish_tick();
        outcome
    }

    /// Renders one frame at wall-clock time `now`, subject to the frame-rate
    /// limit.
    pub fn render_at(&mut self, now: f64) -> FrameOutcome {
        if !self.scheduler.admit(now) {
            trace!(now, "frame throttled");
            return FrameOutcome::Throttled;
        }
        self.frame.last_render_time = Some(now);

        match self.render_frame(now) {
            Ok(report) => {
                trace!(
                    chart_time = report.chart_time,
                    series_drawn = report.series_drawn,
                    series_skipped = report.series_skipped,
                    points_pruned = report.points_pruned,
                    "frame rendered"
                );
                FrameOutcome::Rendered(report)
            }
            Err(ChartError::SurfaceNotAttached) => {
                warn!("render skipped: no surface attached");
                FrameOutcome::Skipped(FrameSkipReason::SurfaceNotAttached)
            }
            Err(ChartError::InvalidViewport { width, height }) => {
                debug!(width, height, "render skipped: empty surface");
                FrameOutcome::Skipped(FrameSkipReason::EmptySurface { width, height })
            }
            Err(err) => {
                warn!(error = %err, "render pass failed");
                FrameOutcome::Skipped(FrameSkipReason::Failed(err.to_string()))
            }
        }
    }

    fn render_frame(&mut self, now: f64) -> ChartResult<FrameReport> {
        let viewport = self.resize()?;
        let millis_per_pixel = self.config.duration_ms / f64::from(viewport.width);

        let mut time = if self.config.non_realtime_data {
            let latest = self.registry.latest_time();
            self.scheduler
                .alignment_mut()
                .chart_time(now, self.delay_ms, latest)
        } else {
            now - self.delay_ms
        };
        time -= time % millis_per_pixel;
        self.frame.last_chart_time = Some(time);
        self.frame.millis_per_pixel = Some(millis_per_pixel);

        let geometry = FrameGeometry {
            time,
            millis_per_pixel,
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
            reverse: self.config.reverse,
        };

        let value_target = match self.scale.update(self.registry.enabled_bounds()) {
            ScaleUpdate::Smoothed(target) => Some(target),
            ScaleUpdate::NoData => None,
        };
        let scale = self.scale.state();
        let degenerate_scale = scale.is_degenerate();
        if degenerate_scale {
            debug!(
                min = scale.min,
                range = scale.range,
                "degenerate value scale, skipping value layers"
            );
        }
        let mapper = CoordinateMapper::new(
            geometry,
            if degenerate_scale {
                ScaleState::default()
            } else {
                scale
            },
        )?;

        let surface = self
            .surface
            .as_mut()
            .ok_or(ChartError::SurfaceNotAttached)?;
        let tally = paint_frame(
            surface,
            &self.config,
            &self.registry,
            &mapper,
            value_target,
            degenerate_scale,
        )?;

        Ok(FrameReport {
            chart_time: time,
            oldest_valid_time: mapper.oldest_valid_time(),
            millis_per_pixel,
            viewport,
            scale,
            value_target,
            degenerate_scale,
            series_drawn: tally.series_drawn,
            series_skipped: tally.series_skipped,
            points_pruned: tally.points_pruned,
            labels_drawn: tally.labels_drawn,
        })
    }

    /// Follows the surface's layout size, applying the device pixel ratio
    /// when responsive. Fails before any per-pixel division when the surface
    /// is missing or empty.
    fn resize(&mut self) -> ChartResult<Viewport> {
        let surface = self
            .surface
            .as_mut()
            .ok_or(ChartError::SurfaceNotAttached)?;
        let layout = surface.layout_size();
        if !layout.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: layout.width,
                height: layout.height,
            });
        }

        if self.config.responsive && self.frame.layout_cache != Some(layout) {
            let ratio = surface.device_pixel_ratio();
            let device_width = (f64::from(layout.width) * ratio).floor() as u32;
            let device_height = (f64::from(layout.height) * ratio).floor() as u32;
            surface.set_device_resolution(device_width, device_height)?;
            surface.scale(ratio, ratio);
            debug!(
                width = layout.width,
                height = layout.height,
                device_pixel_ratio = ratio,
                "surface resized"
            );
        }
        self.frame.layout_cache = Some(layout);
        Ok(layout)
    }

    #[must_use]
    pub fn scale_state(&self) -> ScaleState {
        self.scale.state()
    }

    /// Unsmoothed value bounds of the latest frame that found data.
    #[must_use]
    pub fn value_target(&self) -> Option<ValueRange> {
        self.scale.target()
    }

    #[must_use]
    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }
}

impl<S: DrawingSurface, T: TickSource> std::fmt::Debug for StreamingChart<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingChart")
            .field("config", &self.config)
            .field("surface_attached", &self.surface.is_some())
            .field("delay_ms", &self.delay_ms)
            .field("registry", &self.registry)
            .field("scheduler_state", &self.scheduler.state())
            .field("scale", &self.scale.state())
            .field("frame", &self.frame)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}
