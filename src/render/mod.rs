mod primitives;
mod recording_surface;

pub use primitives::{Color, FontSpec, TextHAlign};
pub use recording_surface::{RecordingSurface, SurfaceCommand};

use crate::core::Viewport;
use crate::error::ChartResult;

/// Contract implemented by any drawing backend.
///
/// The shape follows an immediate-mode 2D canvas: a current path is built
/// with `begin_path`/`move_to`/`line_to`/`bezier_curve_to`/`rect` and then
/// stroked, filled or used as a clip. `stroke` and `fill` do not consume the
/// current path, so a path may be stroked and then extended and filled.
///
/// Coordinates are in layout units; `scale` maps them onto device pixels.
pub trait DrawingSurface {
    /// Current size of the surface in layout units.
    fn layout_size(&self) -> Viewport;

    /// Device pixels per layout unit.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Changes the backing resolution in device pixels.
    ///
    /// Resets the transform, mirroring how canvas resolution changes behave.
    fn set_device_resolution(&mut self, width: u32, height: u32) -> ChartResult<()>;

    fn save(&mut self) -> ChartResult<()>;
    fn restore(&mut self) -> ChartResult<()>;
    fn translate(&mut self, dx: f64, dy: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn clip(&mut self);

    fn stroke(&mut self, line_width: f64, color: Color) -> ChartResult<()>;
    fn fill(&mut self, color: Color) -> ChartResult<()>;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> ChartResult<()>;
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color)
    -> ChartResult<()>;
    fn stroke_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
        color: Color,
    ) -> ChartResult<()>;

    /// Draws `text` with its baseline at `y`, aligned horizontally on `x`.
    fn fill_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontSpec,
        color: Color,
        align: TextHAlign,
    ) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::CairoSurface;
