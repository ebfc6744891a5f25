use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::render::DrawingSurface;

/// How consecutive samples of a series are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// One cubic per segment with horizontal tangents at both samples.
    #[default]
    Bezier,
    /// Straight segments.
    #[serde(alias = "line")]
    Linear,
    /// Horizontal then vertical segments.
    Step,
}

/// Sample projected into pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One path-building operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    MoveTo(PixelPoint),
    LineTo(PixelPoint),
    BezierTo {
        control1: PixelPoint,
        control2: PixelPoint,
        end: PixelPoint,
    },
}

impl PathOp {
    pub fn apply<S: DrawingSurface + ?Sized>(self, surface: &mut S) {
        match self {
            Self::MoveTo(point) => surface.move_to(point.x, point.y),
            Self::LineTo(point) => surface.line_to(point.x, point.y),
            Self::BezierTo {
                control1,
                control2,
                end,
            } => surface.bezier_curve_to(
                control1.x, control1.y, control2.x, control2.y, end.x, end.y,
            ),
        }
    }
}

/// Operations joining `previous` to `current` for one interpolation mode.
#[must_use]
pub fn segment_ops(
    interpolation: Interpolation,
    previous: PixelPoint,
    current: PixelPoint,
) -> SmallVec<[PathOp; 2]> {
    let mut ops = SmallVec::new();
    match interpolation {
        Interpolation::Linear => ops.push(PathOp::LineTo(current)),
        Interpolation::Bezier => {
            let mid_x = ((previous.x + current.x) / 2.0).round();
            ops.push(PathOp::BezierTo {
                control1: PixelPoint::new(mid_x, previous.y),
                control2: PixelPoint::new(mid_x, current.y),
                end: current,
            });
        }
        Interpolation::Step => {
            ops.push(PathOp::LineTo(PixelPoint::new(current.x, previous.y)));
            ops.push(PathOp::LineTo(current));
        }
    }
    ops
}

/// Stroke path of one series for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPath {
    pub ops: Vec<PathOp>,
    pub first: PixelPoint,
    pub last: PixelPoint,
}

impl SeriesPath {
    /// Traces the path from `points`; `None` when fewer than two are given.
    #[must_use]
    pub fn trace(points: &[PixelPoint], interpolation: Interpolation) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let &last = rest.last()?;

        let mut ops = Vec::with_capacity(1 + rest.len() * 2);
        ops.push(PathOp::MoveTo(first));
        let mut previous = first;
        for &current in rest {
            ops.extend(segment_ops(interpolation, previous, current));
            previous = current;
        }

        Some(Self { ops, first, last })
    }

    /// Operations closing the traced path down to `fill_end_y` and back to
    /// the first x, ready to be filled.
    #[must_use]
    pub fn fill_closure(&self, fill_end_y: f64) -> [PathOp; 2] {
        [
            PathOp::LineTo(PixelPoint::new(self.last.x, fill_end_y)),
            PathOp::LineTo(PixelPoint::new(self.first.x, fill_end_y)),
        ]
    }

    pub fn apply<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        for op in &self.ops {
            op.apply(surface);
        }
    }
}
