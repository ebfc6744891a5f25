use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use stream_chart::core::{
    AppendMode, DataPoint, SeriesBounds, SeriesDisplayOptions, SeriesHandle, SeriesStyle,
    TimeSeries,
};
use stream_chart::render::Color;

fn series_of(times: &[i64]) -> TimeSeries {
    let mut series = TimeSeries::new();
    for &time in times {
        series
            .append(DataPoint::new(time, time as f64 / 1_000.0))
            .expect("append");
    }
    series
}

fn times(series: &TimeSeries) -> Vec<i64> {
    series.data().iter().map(|point| point.time).collect()
}

#[test]
fn out_of_order_samples_are_inserted_in_place() {
    let series = series_of(&[1_000, 3_000, 2_000, 0, 3_500]);
    assert_eq!(times(&series), vec![0, 1_000, 2_000, 3_000, 3_500]);
    assert_eq!(
        series.bounds(),
        SeriesBounds {
            min: Some(0.0),
            max: Some(3.5)
        }
    );
    assert_eq!(series.latest_time(), Some(3_500));
}

#[test]
fn duplicate_timestamps_replace_or_sum() {
    let mut series = TimeSeries::new();
    series.append(DataPoint::new(10, 1.0)).expect("append");
    series.append(DataPoint::new(10, 4.0)).expect("replace");
    assert_eq!(series.len(), 1);
    assert_eq!(series.data()[0].value, 4.0);

    series
        .append_with(DataPoint::new(10, 2.5), AppendMode::Sum)
        .expect("sum");
    assert_eq!(series.len(), 1);
    assert_eq!(series.data()[0].value, 6.5);
    assert_eq!(series.bounds().max, Some(6.5));
}

#[test]
fn non_finite_values_are_rejected() {
    let mut series = TimeSeries::new();
    assert!(series.append(DataPoint::new(0, f64::NAN)).is_err());
    assert!(series.append(DataPoint::new(0, f64::INFINITY)).is_err());
    assert!(series.is_empty());
    assert_eq!(series.bounds(), SeriesBounds::default());
}

#[test]
fn pruning_keeps_one_sample_before_the_window() {
    let mut series = series_of(&[0, 1_000, 2_000, 3_000, 4_000]);
    assert_eq!(series.remove_old_data(2_500.0, 2), 2);
    assert_eq!(times(&series), vec![2_000, 3_000, 4_000]);
}

#[test]
fn pruning_respects_max_data_set_length() {
    let mut series = series_of(&[0, 1_000, 2_000, 3_000, 4_000]);
    assert_eq!(series.remove_old_data(10_000.0, 4), 1);
    assert_eq!(times(&series), vec![1_000, 2_000, 3_000, 4_000]);

    assert_eq!(series.remove_old_data(10_000.0, 0), 3);
    assert_eq!(times(&series), vec![4_000]);
}

#[test]
fn reset_bounds_forgets_pruned_extremes() {
    let mut series = TimeSeries::new();
    series.append(DataPoint::new(0, 100.0)).expect("append");
    series.append(DataPoint::new(1_000, 1.0)).expect("append");
    series.append(DataPoint::new(2_000, 2.0)).expect("append");

    series.remove_old_data(1_500.0, 0);
    assert_eq!(series.bounds().max, Some(100.0));

    series.reset_bounds();
    assert_eq!(
        series.bounds(),
        SeriesBounds {
            min: Some(1.0),
            max: Some(2.0)
        }
    );

    series.clear();
    assert_eq!(series.bounds(), SeriesBounds::default());
}

#[test]
fn display_options_merge_over_style() {
    let mut series = TimeSeries::new().with_style(SeriesStyle {
        line_width: 3.0,
        ..SeriesStyle::default()
    });
    series
        .apply_display_options(
            SeriesDisplayOptions::default()
                .without_stroke()
                .with_fill(Color::rgba(0.0, 0.0, 1.0, 0.5)),
        )
        .expect("valid options");

    let style = series.style();
    assert_eq!(style.stroke, None);
    assert_eq!(style.fill, Some(Color::rgba(0.0, 0.0, 1.0, 0.5)));
    assert_eq!(style.line_width, 3.0);
    assert!(style.fill_to_bottom);

    assert!(
        series
            .apply_display_options(SeriesDisplayOptions::default().with_line_width(-1.0))
            .is_err()
    );
}

#[test]
fn handles_share_one_series() {
    let handle = SeriesHandle::default();
    let producer = handle.clone();
    assert_eq!(handle.id(), producer.id());
    assert_ne!(handle.id(), SeriesHandle::default().id());

    producer.append(DataPoint::new(5, 7.0)).expect("append");
    assert_eq!(handle.lock().len(), 1);
    assert_eq!(handle.bounds().max, Some(7.0));

    handle.set_disabled(true);
    assert!(producer.is_disabled());
}

#[test]
fn points_from_chrono_and_decimal() {
    let at = Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("valid time");
    let point = DataPoint::from_datetime(at, 1.5);
    assert_eq!(point.time, at.timestamp_millis());

    let point = DataPoint::from_decimal_value(at, Decimal::new(12_345, 2)).expect("decimal");
    assert_relative_eq!(point.value, 123.45);
}

proptest! {
    #[test]
    fn pruning_is_idempotent(
        mut raw_times in prop::collection::vec(-50_000i64..50_000, 0..64),
        oldest in -60_000.0f64..60_000.0,
        max_len in 0usize..8,
    ) {
        raw_times.sort_unstable();
        raw_times.dedup();
        let mut series = series_of(&raw_times);

        series.remove_old_data(oldest, max_len);
        let once = times(&series);
        prop_assert_eq!(series.remove_old_data(oldest, max_len), 0);
        prop_assert_eq!(times(&series), once.clone());

        // Never drops below the floor, and never drops the last sample at or
        // before the window start.
        prop_assert!(once.len() >= max_len.min(raw_times.len()));
        if once.len() > max_len && once.len() > 1 {
            prop_assert!(once[1] as f64 >= oldest);
        }
    }

    #[test]
    fn appends_keep_timestamps_ordered(
        raw_times in prop::collection::vec(-1_000i64..1_000, 0..64),
    ) {
        let series = series_of(&raw_times);
        let stored = times(&series);
        prop_assert!(stored.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
