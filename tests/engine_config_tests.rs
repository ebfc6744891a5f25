use stream_chart::api::{ChartConfig, LabelOptions, ManualTickSource, StreamingChart};
use stream_chart::core::Interpolation;
use stream_chart::render::{Color, RecordingSurface};
use stream_chart::ChartError;

#[test]
fn partial_json_overlays_defaults() {
    let config = ChartConfig::from_json_str(
        r##"{
            "duration_ms": 60000,
            "interpolation": "step",
            "labels": { "precision": 0 },
            "grid": { "fill_color": "#102030", "vertical_sections": 5 }
        }"##,
    )
    .expect("config");

    let defaults = ChartConfig::default();
    assert_eq!(config.duration_ms, 60_000.0);
    assert_eq!(config.interpolation, Interpolation::Step);
    assert_eq!(config.labels.precision, 0);
    assert_eq!(config.labels.font_size, defaults.labels.font_size);
    assert_eq!(config.grid.vertical_sections, 5);
    assert_eq!(config.grid.fill_color, Color::from_hex("#102030").expect("hex"));
    assert_eq!(config.grid.stroke_color, defaults.grid.stroke_color);
    assert_eq!(config.grid.millis_per_line, 1_000.0);
    assert_eq!(config.scale_smoothing, defaults.scale_smoothing);
}

#[test]
fn empty_json_is_the_default_config() {
    assert_eq!(
        ChartConfig::from_json_str("{}").expect("config"),
        ChartConfig::default()
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ChartConfig::from_json_str(r#"{ "millisPerPixel": 20 }"#).expect_err("unknown");
    assert!(matches!(err, ChartError::InvalidConfig(_)));

    assert!(ChartConfig::from_json_str(r#"{ "grid": { "sharp_lines": true } }"#).is_err());
}

#[test]
fn legacy_names_are_accepted() {
    let config =
        ChartConfig::from_json_str(r#"{ "limit_fps": 30, "interpolation": "line" }"#).expect("config");
    assert_eq!(config.frame_rate, 30.0);
    assert_eq!(config.interpolation, Interpolation::Linear);
}

#[test]
fn invalid_values_fail_validation() {
    for input in [
        r#"{ "duration_ms": 0 }"#,
        r#"{ "frame_rate": -1 }"#,
        r#"{ "scale_smoothing": 0 }"#,
        r#"{ "scale_smoothing": 1.5 }"#,
        r#"{ "grid": { "line_width": -2 } }"#,
        r#"{ "grid": { "horizontal_sections": 0 } }"#,
        r#"{ "labels": { "font_size": 0 } }"#,
        r#"{ "labels": { "fill_color": "white" } }"#,
    ] {
        assert!(
            ChartConfig::from_json_str(input).is_err(),
            "accepted {input}"
        );
    }
}

#[test]
fn chart_rejects_invalid_config() {
    let config = ChartConfig::default().with_duration_ms(f64::NAN);
    let result = StreamingChart::<RecordingSurface, ManualTickSource>::new(
        config,
        ManualTickSource::new(),
    );
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));
}

#[test]
fn defaults_survive_a_json_round_trip() {
    let config = ChartConfig::default().with_labels(LabelOptions {
        show_intermediate_labels: true,
        ..LabelOptions::default()
    });
    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains("\"#000000ff\""));
    assert_eq!(ChartConfig::from_json_str(&json).expect("parse"), config);
}

#[test]
fn frame_time_follows_frame_rate() {
    assert_eq!(ChartConfig::default().frame_time_ms(), 0.0);
    assert_eq!(
        ChartConfig::default().with_frame_rate(50.0).frame_time_ms(),
        20.0
    );
}
