use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, DrawingSurface, FontSpec, TextHAlign};

/// One recorded call on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceCommand {
    SetDeviceResolution { width: u32, height: u32 },
    Save,
    Restore,
    Translate { dx: f64, dy: f64 },
    Scale { sx: f64, sy: f64 },
    BeginPath,
    ClosePath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    BezierCurveTo {
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Clip,
    Stroke { line_width: f64, color: Color },
    Fill { color: Color },
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    FillRect { x: f64, y: f64, width: f64, height: f64, color: Color },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
        color: Color,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        align: TextHAlign,
    },
}

/// Headless surface that records every call.
///
/// Used by tests and tooling to assert the exact drawing sequence of a frame.
/// It still validates what it is given (finite coordinates, balanced
/// save/restore, valid colors) so invalid geometry surfaces as an error.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    layout: Viewport,
    device_pixel_ratio: f64,
    device_resolution: Option<(u32, u32)>,
    save_depth: usize,
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layout: Viewport::new(width, height),
            device_pixel_ratio: 1.0,
            device_resolution: None,
            save_depth: 0,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Simulates a layout change of the host element.
    pub fn set_layout_size(&mut self, width: u32, height: u32) {
        self.layout = Viewport::new(width, height);
    }

    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    #[must_use]
    pub fn device_resolution(&self) -> Option<(u32, u32)> {
        self.device_resolution
    }

    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.save_depth
    }

    fn push_checked(&mut self, values: &[f64], command: SurfaceCommand) -> ChartResult<()> {
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(format!(
                "non-finite coordinate in {command:?}"
            )));
        }
        self.commands.push(command);
        Ok(())
    }

    /// Path building calls are infallible on the trait; invalid geometry is
    /// still recorded so assertions can spot it.
    fn push(&mut self, command: SurfaceCommand) {
        self.commands.push(command);
    }
}

impl DrawingSurface for RecordingSurface {
    fn layout_size(&self) -> Viewport {
        self.layout
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn set_device_resolution(&mut self, width: u32, height: u32) -> ChartResult<()> {
        self.device_resolution = Some((width, height));
        self.push(SurfaceCommand::SetDeviceResolution { width, height });
        Ok(())
    }

    fn save(&mut self) -> ChartResult<()> {
        self.save_depth += 1;
        self.push(SurfaceCommand::Save);
        Ok(())
    }

    fn restore(&mut self) -> ChartResult<()> {
        if self.save_depth == 0 {
            return Err(ChartError::Backend(
                "restore called without matching save".to_owned(),
            ));
        }
        self.save_depth -= 1;
        self.push(SurfaceCommand::Restore);
        Ok(())
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.push(SurfaceCommand::Translate { dx, dy });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push(SurfaceCommand::Scale { sx, sy });
    }

    fn begin_path(&mut self) {
        self.push(SurfaceCommand::BeginPath);
    }

    fn close_path(&mut self) {
        self.push(SurfaceCommand::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(SurfaceCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(SurfaceCommand::LineTo { x, y });
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.push(SurfaceCommand::BezierCurveTo {
            cp1x,
            cp1y,
            cp2x,
            cp2y,
            x,
            y,
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(SurfaceCommand::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn clip(&mut self) {
        self.push(SurfaceCommand::Clip);
    }

    fn stroke(&mut self, line_width: f64, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.push_checked(&[line_width], SurfaceCommand::Stroke { line_width, color })
    }

    fn fill(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.push(SurfaceCommand::Fill { color });
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> ChartResult<()> {
        self.push_checked(
            &[x, y, width, height],
            SurfaceCommand::ClearRect {
                x,
                y,
                width,
                height,
            },
        )
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
        self.push_checked(
            &[x, y, width, height],
            SurfaceCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            },
        )
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
        self.push_checked(
            &[x, y, width, height, line_width],
            SurfaceCommand::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color,
            },
        )
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
        if text.is_empty() {
            return Err(ChartError::InvalidData(
                "text must not be empty".to_owned(),
            ));
        }
        color.validate()?;
        self.push_checked(
            &[x, y, font.size_px],
            SurfaceCommand::FillText {
                text: text.to_owned(),
                x,
                y,
                font_size_px: font.size_px,
                color,
                align,
            },
        )
    }
}
