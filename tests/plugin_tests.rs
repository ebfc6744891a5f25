use std::sync::{Arc, Mutex};

use stream_chart::api::{
    ChartConfig, FrameOutcome, FrameSkipReason, ManualIntervalScheduler, ManualTickSource,
    StreamingChart,
};
use stream_chart::core::{DataPoint, SeriesDisplayOptions, SeriesHandle};
use stream_chart::extensions::{
    ChartPlugin, FrameControl, PluginContext, PluginEvent, StopOnSkip,
};
use stream_chart::render::RecordingSurface;

type Chart = StreamingChart<RecordingSurface, ManualTickSource>;

fn chart() -> Chart {
    StreamingChart::new(ChartConfig::default(), ManualTickSource::new())
        .expect("chart init")
        .with_interval_scheduler(ManualIntervalScheduler::new())
        .expect("timers")
}

#[derive(Clone, Default)]
struct EventLog {
    id: String,
    events: Arc<Mutex<Vec<(PluginEvent, PluginContext)>>>,
}

impl EventLog {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            events: Arc::default(),
        }
    }

    fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .expect("log")
            .iter()
            .map(|(event, _)| match event {
                PluginEvent::Started => "started",
                PluginEvent::Stopped => "stopped",
                PluginEvent::SeriesAdded { .. } => "series_added",
                PluginEvent::SeriesRemoved { .. } => "series_removed",
                PluginEvent::FrameRendered(_) => "frame_rendered",
                PluginEvent::FrameSkipped(_) => "frame_skipped",
                PluginEvent::FrameThrottled { .. } => "frame_throttled",
            })
            .collect()
    }
}

impl ChartPlugin for EventLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &PluginEvent, context: PluginContext, _control: &mut FrameControl) {
        self.events
            .lock()
            .expect("log")
            .push((event.clone(), context));
    }
}

#[test]
fn registration_requires_unique_non_empty_ids() {
    let mut chart = chart();
    chart
        .register_plugin(Box::new(EventLog::new("log")))
        .expect("register");
    assert!(chart.has_plugin("log"));
    assert_eq!(chart.plugin_count(), 1);

    assert!(chart.register_plugin(Box::new(EventLog::new("log"))).is_err());
    assert!(chart.register_plugin(Box::new(EventLog::new(""))).is_err());
    assert_eq!(chart.plugin_count(), 1);

    assert!(chart.unregister_plugin("log"));
    assert!(!chart.unregister_plugin("log"));
    assert_eq!(chart.plugin_count(), 0);
}

#[test]
fn lifecycle_events_arrive_in_order() {
    let log = EventLog::new("log");
    let mut chart = chart();
    chart
        .register_plugin(Box::new(log.clone()))
        .expect("register");

    let series = SeriesHandle::default();
    series.append(DataPoint::new(0, 1.0)).expect("append");
    series.append(DataPoint::new(500, 2.0)).expect("append");
    chart
        .add(&series, SeriesDisplayOptions::default())
        .expect("add");
    chart
        .add(&series, SeriesDisplayOptions::default())
        .expect("re-add");
    chart
        .stream_to(RecordingSurface::new(200, 100), 0.0)
        .expect("stream");

    let handle = chart.pending_tick().expect("tick");
    assert!(chart.on_tick_at(handle, 1_000.0).is_rendered());
    assert!(chart.remove(&series));
    chart.stop();

    assert_eq!(
        log.names(),
        vec![
            "series_added",
            "started",
            "frame_rendered",
            "series_removed",
            "stopped",
        ]
    );

    let events = log.events.lock().expect("log");
    assert_eq!(
        events[0].0,
        PluginEvent::SeriesAdded {
            series: series.id()
        }
    );
    let (rendered, context) = &events[2];
    let PluginEvent::FrameRendered(report) = rendered else {
        panic!("expected a frame event");
    };
    assert_eq!(report.series_drawn, 1);
    assert_eq!(context.series_count, 1);
    assert_eq!(context.viewport.map(|viewport| viewport.width), Some(200));
    assert!(!events[4].1.is_running);
}

#[test]
fn stop_on_skip_halts_the_loop() {
    let log = EventLog::new("log");
    let mut chart = chart();
    chart
        .register_plugin(Box::new(StopOnSkip::new("stop-on-skip")))
        .expect("register");
    chart
        .register_plugin(Box::new(log.clone()))
        .expect("register");

    chart.start();
    let handle = chart.pending_tick().expect("tick");
    assert_eq!(
        chart.on_tick_at(handle, 1_000.0),
        FrameOutcome::Skipped(FrameSkipReason::SurfaceNotAttached)
    );

    assert!(!chart.is_running());
    assert_eq!(chart.pending_tick(), None);
    assert_eq!(chart.tick_source().requested_count(), 1);
    assert_eq!(log.names(), vec!["started", "frame_skipped", "stopped"]);
}

#[test]
fn stop_on_skip_ignores_rendered_frames() {
    let mut plugin = StopOnSkip::new("stop-on-skip");
    let mut control = FrameControl::default();
    let context = PluginContext {
        viewport: None,
        series_count: 0,
        scale: Default::default(),
        is_running: true,
    };

    plugin.on_event(&PluginEvent::Started, context, &mut control);
    plugin.on_event(&PluginEvent::FrameThrottled { now: 1.0 }, context, &mut control);
    assert!(!control.stop_requested());
    assert!(!plugin.triggered());

    plugin.on_event(
        &PluginEvent::FrameSkipped(FrameSkipReason::SurfaceNotAttached),
        context,
        &mut control,
    );
    assert!(control.stop_requested());
    assert!(plugin.triggered());
}
