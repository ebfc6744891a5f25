use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use stream_chart::api::{ChartConfig, ManualIntervalScheduler, ManualTickSource, StreamingChart};
use stream_chart::core::{
    CoordinateMapper, DataPoint, FrameGeometry, Interpolation, PixelPoint, ScaleState,
    SeriesDisplayOptions, SeriesHandle, SeriesPath,
};
use stream_chart::render::RecordingSurface;

const EPOCH_MS: f64 = 1_700_000_000_000.0;

fn geometry() -> FrameGeometry {
    FrameGeometry {
        time: EPOCH_MS,
        millis_per_pixel: 20_000.0 / 1_920.0,
        width: 1_920.0,
        height: 1_080.0,
        reverse: false,
    }
}

fn bench_time_value_projection(c: &mut Criterion) {
    let mapper = CoordinateMapper::new(
        geometry(),
        ScaleState {
            min: -10.0,
            range: 20.0,
            is_animating: false,
        },
    )
    .expect("valid mapper");

    c.bench_function("time_value_projection", |b| {
        b.iter(|| {
            let x = mapper.time_to_x(black_box(EPOCH_MS - 4_321.0), 1.0);
            let y = mapper.value_to_y(black_box(3.25), 1.0);
            black_box((x, y))
        })
    });
}

fn bench_bezier_trace_2k(c: &mut Criterion) {
    let points: Vec<PixelPoint> = (0..2_000)
        .map(|i| {
            let x = f64::from(i);
            PixelPoint::new(x, 500.0 + (x / 40.0).sin() * 300.0)
        })
        .collect();

    c.bench_function("bezier_trace_2k", |b| {
        b.iter(|| {
            let path = SeriesPath::trace(black_box(&points), Interpolation::Bezier)
                .expect("two or more points");
            black_box(path.ops.len())
        })
    });
}

fn bench_render_frame_2k(c: &mut Criterion) {
    let mut chart = StreamingChart::new(ChartConfig::default(), ManualTickSource::new())
        .expect("chart init")
        .with_interval_scheduler(ManualIntervalScheduler::new())
        .expect("timers");
    let series = SeriesHandle::default();
    for i in 0..2_000_i64 {
        series
            .append(DataPoint::new(
                EPOCH_MS as i64 - 20_000 + i * 10,
                (i as f64 / 50.0).sin(),
            ))
            .expect("append");
    }
    chart
        .add(&series, SeriesDisplayOptions::default())
        .expect("add series");
    chart.attach_surface(RecordingSurface::new(1_920, 1_080));

    c.bench_function("render_frame_2k", |b| {
        b.iter(|| {
            if let Some(surface) = chart.surface_mut() {
                surface.clear_commands();
            }
            black_box(chart.render_at(black_box(EPOCH_MS)))
        })
    });
}

criterion_group!(
    benches,
    bench_time_value_projection,
    bench_bezier_trace_2k,
    bench_render_frame_2k
);
criterion_main!(benches);
