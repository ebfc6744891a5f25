use std::fs::File;
use std::path::Path;

use cairo::{Context, Format, ImageSurface, Operator};
use pango::FontDescription;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, DrawingSurface, FontSpec, TextHAlign};

/// Offscreen cairo image surface with pango text.
///
/// The backing image is sized in device pixels; drawing happens in layout
/// units once the chart has applied the device pixel ratio with `scale`.
#[derive(Debug)]
pub struct CairoSurface {
    layout: Viewport,
    device_pixel_ratio: f64,
    surface: ImageSurface,
    context: Context,
}

impl CairoSurface {
    pub fn new(width: u32, height: u32) -> ChartResult<Self> {
        let (surface, context) = create_image(width, height)?;
        Ok(Self {
            layout: Viewport::new(width, height),
            device_pixel_ratio: 1.0,
            surface,
            context,
        })
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> ChartResult<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "device pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        self.device_pixel_ratio = ratio;
        Ok(self)
    }

    /// Changes the layout size; the chart resizes the backing image on its
    /// next frame.
    pub fn set_layout_size(&mut self, width: u32, height: u32) {
        self.layout = Viewport::new(width, height);
    }

    #[must_use]
    pub fn image(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> ChartResult<()> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|err| {
            ChartError::Backend(format!("failed to create {}: {err}", path.display()))
        })?;
        self.surface
            .write_to_png(&mut file)
            .map_err(|err| ChartError::Backend(format!("failed to write png: {err}")))
    }
}

fn create_image(width: u32, height: u32) -> ChartResult<(ImageSurface, Context)> {
    let invalid = ChartError::InvalidViewport { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    let (Ok(width), Ok(height)) = (i32::try_from(width), i32::try_from(height)) else {
        return Err(invalid);
    };
    let surface = ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
    let context = Context::new(&surface)
        .map_err(|err| map_backend_error("failed to create cairo context", err))?;
    Ok((surface, context))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}

impl CairoSurface {
    /// Runs `paint` on a fresh path and puts the caller's current path back.
    fn with_detached_path(
        &mut self,
        paint: impl FnOnce(&Context) -> Result<(), cairo::Error>,
    ) -> ChartResult<()> {
        let context = &self.context;
        let path = context
            .copy_path()
            .map_err(|err| map_backend_error("failed to copy path", err))?;
        context
            .save()
            .map_err(|err| map_backend_error("failed to save state", err))?;
        context.new_path();
        let painted = paint(context);
        context.new_path();
        context.append_path(&path);
        context
            .restore()
            .map_err(|err| map_backend_error("failed to restore state", err))?;
        painted.map_err(|err| map_backend_error("failed to paint", err))
    }
}

impl DrawingSurface for CairoSurface {
    fn layout_size(&self) -> Viewport {
        self.layout
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn set_device_resolution(&mut self, width: u32, height: u32) -> ChartResult<()> {
        let (surface, context) = create_image(width, height)?;
        self.surface = surface;
        self.context = context;
        Ok(())
    }

    fn save(&mut self) -> ChartResult<()> {
        self.context
            .save()
            .map_err(|err| map_backend_error("failed to save state", err))
    }

    fn restore(&mut self) -> ChartResult<()> {
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore state", err))
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.context.translate(dx, dy);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.context.scale(sx, sy);
    }

    fn begin_path(&mut self) {
        self.context.new_path();
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.context.curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.rectangle(x, y, width, height);
    }

    fn clip(&mut self) {
        self.context.clip_preserve();
    }

    fn stroke(&mut self, line_width: f64, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.context.set_line_width(line_width);
        apply_color(&self.context, color);
        self.context
            .stroke_preserve()
            .map_err(|err| map_backend_error("failed to stroke path", err))
    }

    fn fill(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        apply_color(&self.context, color);
        self.context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill path", err))
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> ChartResult<()> {
        self.with_detached_path(|context| {
            context.set_operator(Operator::Clear);
            context.rectangle(x, y, width, height);
            context.fill()
        })
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> ChartResult<()> {
        color.validate()?;
        self.with_detached_path(|context| {
            apply_color(context, color);
            context.rectangle(x, y, width, height);
            context.fill()
        })
    }

    fn stroke_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
        color: Color,
    ) -> ChartResult<()> {
        color.validate()?;
        self.with_detached_path(|context| {
            apply_color(context, color);
            context.set_line_width(line_width);
            context.rectangle(x, y, width, height);
            context.stroke()
        })
    }

    fn fill_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontSpec,
        color: Color,
        align: TextHAlign,
    ) -> ChartResult<()> {
        color.validate()?;
        self.with_detached_path(|context| {
            let layout = pangocairo::functions::create_layout(context);
            let mut description = FontDescription::new();
            description.set_family(&font.family);
            description.set_absolute_size(font.size_px * f64::from(pango::SCALE));
            layout.set_font_description(Some(&description));
            layout.set_text(text);

            let (text_width, _text_height) = layout.pixel_size();
            let left = match align {
                TextHAlign::Left => x,
                TextHAlign::Center => x - f64::from(text_width) / 2.0,
                TextHAlign::Right => x - f64::from(text_width),
            };
            let baseline = f64::from(layout.baseline()) / f64::from(pango::SCALE);

            apply_color(context, color);
            context.move_to(left, y - baseline);
            pangocairo::functions::show_layout(context, &layout);
            Ok(())
        })
    }
}
