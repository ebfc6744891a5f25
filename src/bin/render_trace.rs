use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use stream_chart::api::{
    ChartConfig, Clock, FrameOutcome, FrameReport, ManualClock, ManualIntervalScheduler,
    ManualTickSource, StreamingChart,
};
use stream_chart::core::{DataPoint, SeriesDisplayOptions, SeriesHandle};
use stream_chart::render::{Color, RecordingSurface, SurfaceCommand};

const USAGE: &str = "usage: render_trace [--frames <n>] [--width <px>] [--height <px>] \
[--interval <ms>] [--config <path>] [--output <path>]";

#[derive(Debug)]
struct CliArgs {
    frames: usize,
    width: u32,
    height: u32,
    interval_ms: f64,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TraceOutput {
    frames: usize,
    rendered: usize,
    throttled: usize,
    skipped: usize,
    last_report: Option<FrameReport>,
    commands: Vec<SurfaceCommand>,
}

fn main() {
    let _ = stream_chart::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            ChartConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => ChartConfig::default(),
    };

    let start = 1_700_000_000_000.0;
    let clock = ManualClock::new(start);
    let timers = ManualIntervalScheduler::new();
    let mut chart = StreamingChart::new(config, ManualTickSource::new())
        .map_err(|err| err.to_string())?
        .with_clock(clock.clone())
        .with_interval_scheduler(timers.clone())
        .map_err(|err| err.to_string())?;

    let series = SeriesHandle::default();
    chart
        .add(
            &series,
            SeriesDisplayOptions::default()
                .with_stroke(Color::rgb(0.0, 1.0, 0.0))
                .with_fill(Color::rgba(0.0, 1.0, 0.0, 0.2)),
        )
        .map_err(|err| err.to_string())?;
    chart
        .stream_to(RecordingSurface::new(args.width, args.height), 0.0)
        .map_err(|err| err.to_string())?;

    let mut output = TraceOutput {
        frames: args.frames,
        rendered: 0,
        throttled: 0,
        skipped: 0,
        last_report: None,
        commands: Vec::new(),
    };

    for frame in 0..args.frames {
        let now = clock.now_millis();
        let value = (frame as f64 / 8.0).sin() * 10.0;
        series
            .append(DataPoint::new(now as i64, value))
            .map_err(|err| err.to_string())?;

        let handle = chart
            .pending_tick()
            .ok_or_else(|| "repaint loop stopped unexpectedly".to_owned())?;
        if let Some(surface) = chart.surface_mut() {
            surface.clear_commands();
        }
        match chart.on_tick(handle) {
            FrameOutcome::Rendered(report) => {
                output.rendered += 1;
                output.last_report = Some(report);
            }
            FrameOutcome::Throttled => output.throttled += 1,
            FrameOutcome::Skipped(_) | FrameOutcome::Stale => output.skipped += 1,
        }

        clock.advance(args.interval_ms);
        timers.advance(Duration::from_secs_f64(args.interval_ms / 1_000.0));
    }

    output.commands = chart
        .surface_mut()
        .map(RecordingSurface::take_commands)
        .unwrap_or_default();

    let json = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("failed to serialize trace: {err}"))?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs {
        frames: 60,
        width: 400,
        height: 100,
        interval_ms: 1_000.0 / 60.0,
        config: None,
        output: None,
    };

    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("missing value for {name}"))
        };
        match flag.as_str() {
            "--frames" => parsed.frames = parse_number(&value("--frames")?, "--frames")?,
            "--width" => parsed.width = parse_number(&value("--width")?, "--width")?,
            "--height" => parsed.height = parse_number(&value("--height")?, "--height")?,
            "--interval" => {
                parsed.interval_ms = parse_number(&value("--interval")?, "--interval")?;
                if !(parsed.interval_ms.is_finite() && parsed.interval_ms > 0.0) {
                    return Err("--interval must be > 0".to_owned());
                }
            }
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--output" => parsed.output = Some(PathBuf::from(value("--output")?)),
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("invalid value `{raw}` for {name}"))
}
