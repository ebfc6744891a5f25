use approx::assert_relative_eq;
use stream_chart::core::{
    SCALE_ANIMATION_THRESHOLD, ScaleController, ScaleSettings, ScaleState, ScaleUpdate,
    SeriesBounds,
};

fn bounds(min: f64, max: f64) -> SeriesBounds {
    SeriesBounds {
        min: Some(min),
        max: Some(max),
    }
}

fn controller(smoothing: f64) -> ScaleController {
    ScaleController::new(ScaleSettings {
        smoothing,
        ..ScaleSettings::default()
    })
    .expect("valid settings")
}

#[test]
fn range_converges_geometrically() {
    let mut controller = controller(0.25);
    let initial = controller.state();

    for step in 1..=20 {
        controller.update([bounds(0.0, 100.0)]);
        let expected_gap = (100.0 - initial.range) * 0.75_f64.powi(step);
        assert_relative_eq!(100.0 - controller.state().range, expected_gap, max_relative = 1e-9);
        assert_relative_eq!(controller.state().min, 0.0);
    }
}

#[test]
fn animation_stops_once_deltas_are_small() {
    let mut controller = controller(0.5);
    let mut previous = controller.state();

    for _ in 0..200 {
        controller.update([bounds(-2.0, 8.0)]);
        let state = controller.state();
        let range_delta = (10.0 - previous.range).abs();
        let min_delta = (-2.0 - previous.min).abs();
        assert_eq!(
            state.is_animating,
            range_delta > SCALE_ANIMATION_THRESHOLD || min_delta > SCALE_ANIMATION_THRESHOLD
        );
        previous = state;
    }
    assert!(!controller.state().is_animating);
}

#[test]
fn union_of_series_bounds_drives_target() {
    let mut controller = controller(1.0);
    let update = controller.update([
        bounds(-3.0, 4.0),
        SeriesBounds::default(),
        bounds(1.0, 9.0),
    ]);

    assert_eq!(
        update,
        ScaleUpdate::Smoothed(stream_chart::core::ValueRange { min: -3.0, max: 9.0 })
    );
    assert_relative_eq!(controller.state().min, -3.0);
    assert_relative_eq!(controller.state().range, 12.0);
}

#[test]
fn min_padding_moves_away_from_zero() {
    let mut controller = ScaleController::new(ScaleSettings {
        min_value_scale: 1.5,
        max_value_scale: 2.0,
        smoothing: 1.0,
        ..ScaleSettings::default()
    })
    .expect("valid settings");

    controller.update([bounds(-10.0, 10.0)]);
    let target = controller.target().expect("target");
    assert_relative_eq!(target.min, -15.0);
    assert_relative_eq!(target.max, 20.0);
}

#[test]
fn empty_series_set_leaves_state_untouched() {
    let mut controller = controller(0.125);
    assert_eq!(controller.update(std::iter::empty()), ScaleUpdate::NoData);
    assert_eq!(
        controller.update([SeriesBounds::default(), SeriesBounds::default()]),
        ScaleUpdate::NoData
    );

    let state = controller.state();
    assert_eq!(state, ScaleState::default());
    assert!(state.min.is_finite() && state.range.is_finite());
    assert_eq!(controller.target(), None);
}

#[test]
fn fixed_max_overrides_data() {
    let mut controller = ScaleController::new(ScaleSettings {
        fixed_max: Some(50.0),
        smoothing: 1.0,
        ..ScaleSettings::default()
    })
    .expect("valid settings");

    controller.update([bounds(0.0, 500.0)]);
    assert_relative_eq!(controller.state().range, 50.0);
}

#[test]
fn collapsed_fixed_bounds_are_degenerate() {
    let mut controller = ScaleController::new(ScaleSettings {
        fixed_max: Some(5.0),
        fixed_min: Some(5.0),
        smoothing: 1.0,
        ..ScaleSettings::default()
    })
    .expect("valid settings");

    controller.update(std::iter::empty());
    assert!(controller.state().is_degenerate());
}
