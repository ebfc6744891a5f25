use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::ValueRange;
use crate::render::TextHAlign;

use super::{GridOptions, LabelOptions};

/// Gap between a label and the chart edge it is anchored to.
const LABEL_EDGE_GAP: f64 = 2.0;

/// Label text positioned in layout units; `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPlacement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub align: TextHAlign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Leading,
    Trailing,
}

/// Formats a value label with a fixed number of decimals.
#[must_use]
pub fn format_value(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

fn anchor(side: Side, width: f64) -> (f64, TextHAlign) {
    match side {
        Side::Trailing => (width - LABEL_EDGE_GAP, TextHAlign::Right),
        Side::Leading => (0.0, TextHAlign::Left),
    }
}

/// Lays out the min/max labels and, when enabled, one label per horizontal
/// grid divider.
///
/// Min/max labels sit against the right edge, or the left edge when the chart
/// scrolls in reverse. Intermediate labels sit just above their divider, on
/// the same side unless `intermediate_label_same_axis` is off.
#[must_use]
pub fn layout_value_labels(
    target: ValueRange,
    labels: &LabelOptions,
    grid: &GridOptions,
    width: f64,
    height: f64,
    reverse: bool,
) -> SmallVec<[LabelPlacement; 4]> {
    let mut placements = SmallVec::new();
    if labels.disabled || !target.min.is_finite() || !target.max.is_finite() {
        return placements;
    }

    let main_side = if reverse { Side::Leading } else { Side::Trailing };
    let (x, align) = anchor(main_side, width);
    placements.push(LabelPlacement {
        text: format_value(target.max, labels.precision),
        x,
        y: labels.font_size,
        align,
    });
    placements.push(LabelPlacement {
        text: format_value(target.min, labels.precision),
        x,
        y: height - LABEL_EDGE_GAP,
        align,
    });

    if labels.show_intermediate_labels && grid.vertical_sections > 0 {
        let sections = f64::from(grid.vertical_sections);
        let value_step = target.span() / sections;
        let pixel_step = height / sections;
        let side = match (labels.intermediate_label_same_axis, main_side) {
            (true, side) => side,
            (false, Side::Trailing) => Side::Leading,
            (false, Side::Leading) => Side::Trailing,
        };
        let (x, align) = anchor(side, width);
        for v in 1..grid.vertical_sections {
            let v = f64::from(v);
            let divider_y = height - (v * pixel_step).round();
            placements.push(LabelPlacement {
                text: format_value(target.min + v * value_step, labels.precision),
                x,
                y: divider_y - grid.line_width,
                align,
            });
        }
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::{format_value, layout_value_labels};
    use crate::api::{GridOptions, LabelOptions};
    use crate::core::ValueRange;
    use crate::render::TextHAlign;

    #[test]
    fn precision_controls_decimals() {
        assert_eq!(format_value(10.0, 2), "10.00");
        assert_eq!(format_value(-0.125, 1), "-0.1");
        assert_eq!(format_value(3.0, 0), "3");
    }

    #[test]
    fn intermediate_labels_flip_side_when_requested() {
        let labels = LabelOptions {
            show_intermediate_labels: true,
            intermediate_label_same_axis: false,
            ..LabelOptions::default()
        };
        let grid = GridOptions {
            vertical_sections: 4,
            ..GridOptions::default()
        };
        let placements = layout_value_labels(
            ValueRange { min: 0.0, max: 8.0 },
            &labels,
            &grid,
            200.0,
            100.0,
            false,
        );

        assert_eq!(placements.len(), 5);
        assert_eq!(placements[0].align, TextHAlign::Right);
        assert_eq!(placements[2].text, "2.00");
        assert_eq!(placements[2].align, TextHAlign::Left);
        assert_eq!(placements[2].y, 73.0);
    }
}
