use proptest::prelude::*;
use stream_chart::core::pixel_snap;

#[test]
fn one_pixel_lines_land_on_pixel_centers() {
    assert_eq!(pixel_snap(0.0, 1.0), 0.5);
    assert_eq!(pixel_snap(199.999, 1.0), 199.5);
    assert_eq!(pixel_snap(200.0, 1.0), 200.5);
}

#[test]
fn two_pixel_lines_land_on_pixel_edges() {
    assert_eq!(pixel_snap(49.49, 2.0), 49.0);
    assert_eq!(pixel_snap(49.5, 2.0), 50.0);
    assert_eq!(pixel_snap(50.0, 2.0), 50.0);
}

#[test]
fn zero_width_rounds_like_even_widths() {
    assert_eq!(pixel_snap(12.3, 0.0), 12.0);
    assert_eq!(pixel_snap(12.7, 0.0), 13.0);
}

proptest! {
    #[test]
    fn even_width_matches_round(x in 0.0f64..1_000_000.0) {
        prop_assert_eq!(pixel_snap(x, 2.0), x.round());
    }

    #[test]
    fn odd_width_is_floor_plus_half(x in -1_000_000.0f64..1_000_000.0) {
        prop_assert_eq!(pixel_snap(x, 1.0), x.floor() + 0.5);
        prop_assert_eq!(pixel_snap(x, 3.0), x.floor() + 0.5);
    }

    #[test]
    fn snapping_commutes_with_whole_pixel_shifts(
        x in -10_000.0f64..10_000.0,
        shift in -500i32..500,
        width in prop::sample::select(vec![0.0f64, 1.0, 2.0, 3.0]),
    ) {
        let k = f64::from(shift);
        prop_assert_eq!(pixel_snap(x + k, width), pixel_snap(x, width) + k);
    }
}
