use tracing::trace;

use crate::core::{CoordinateMapper, PixelPoint, SeriesPath, SeriesStyle, ValueRange, pixel_snap};
use crate::error::ChartResult;
use crate::render::DrawingSurface;

use super::label_layout::layout_value_labels;
use super::{ChartConfig, GridOptions, SeriesRegistry};

/// Counters collected while painting one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct PaintTally {
    pub series_drawn: usize,
    pub series_skipped: usize,
    pub points_pruned: usize,
    pub labels_drawn: usize,
}

/// Runs `paint` between `save` and `restore`; `restore` runs even when
/// `paint` fails.
fn with_saved_state<S, T, F>(surface: &mut S, paint: F) -> ChartResult<T>
where
    S: DrawingSurface + ?Sized,
    F: FnOnce(&mut S) -> ChartResult<T>,
{
    surface.save()?;
    let painted = paint(surface);
    let restored = surface.restore();
    let value = painted?;
    restored?;
    Ok(value)
}

/// Paints one frame clipped to the chart rectangle: background, grid, every
/// drawable series, then value labels.
///
/// Series are pruned before drawing. When `degenerate_scale` is set the
/// value-dependent layers (series and labels) are left out.
pub(super) fn paint_frame<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    config: &ChartConfig,
    registry: &SeriesRegistry,
    mapper: &CoordinateMapper,
    value_target: Option<ValueRange>,
    degenerate_scale: bool,
) -> ChartResult<PaintTally> {
    let geometry = mapper.geometry();
    let (width, height) = (geometry.width, geometry.height);

    with_saved_state(surface, |surface| {
        surface.begin_path();
        surface.rect(0.0, 0.0, width, height);
        surface.clip();

        paint_background(surface, &config.grid, width, height)?;
        paint_grid(surface, config, mapper)?;

        let mut tally = PaintTally {
            points_pruned: registry.prune(mapper.oldest_valid_time(), config.max_data_set_length),
            ..PaintTally::default()
        };
        if degenerate_scale {
            return Ok(tally);
        }

        paint_series(surface, config, registry, mapper, &mut tally)?;
        if let Some(target) = value_target {
            tally.labels_drawn = paint_labels(surface, config, target, width, height)?;
        }
        Ok(tally)
    })
}

fn paint_background<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    grid: &GridOptions,
    width: f64,
    height: f64,
) -> ChartResult<()> {
    with_saved_state(surface, |surface| {
        surface.clear_rect(0.0, 0.0, width, height)?;
        surface.fill_rect(0.0, 0.0, width, height, grid.fill_color)
    })
}

fn paint_grid<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    config: &ChartConfig,
    mapper: &CoordinateMapper,
) -> ChartResult<()> {
    let grid = &config.grid;
    let geometry = mapper.geometry();
    let line_width = grid.line_width;

    with_saved_state(surface, |surface| {
        let millis_per_line = grid.resolved_millis_per_line(config.duration_ms);
        if millis_per_line > 0.0 {
            let oldest = mapper.oldest_valid_time();
            // At most one divider per pixel column, plus the left edge.
            let max_dividers = geometry.width as usize + 1;
            let mut dividers = 0;
            surface.begin_path();
            let mut t = geometry.time - geometry.time % millis_per_line;
            while t >= oldest && dividers < max_dividers {
                let x = mapper.time_to_x(t, line_width);
                surface.move_to(x, 0.0);
                surface.line_to(x, geometry.height);
                dividers += 1;

                let next = t - millis_per_line;
                if next >= t {
                    // Step below the float resolution of `t`.
                    break;
                }
                t = next;
            }
            if dividers == max_dividers && t >= oldest {
                trace!(millis_per_line, dividers, "vertical dividers capped");
            }
            surface.stroke(line_width, grid.stroke_color)?;
        }

        let sections = f64::from(grid.vertical_sections);
        for v in 1..grid.vertical_sections {
            let y = pixel_snap(f64::from(v) * geometry.height / sections, line_width);
            surface.begin_path();
            surface.move_to(0.0, y);
            surface.line_to(geometry.width, y);
            surface.stroke(line_width, grid.stroke_color)?;
        }

        if grid.border {
            surface.stroke_rect(
                0.0,
                0.0,
                geometry.width,
                geometry.height,
                line_width,
                grid.stroke_color,
            )?;
        }
        Ok(())
    })
}

fn paint_series<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    config: &ChartConfig,
    registry: &SeriesRegistry,
    mapper: &CoordinateMapper,
    tally: &mut PaintTally,
) -> ChartResult<()> {
    registry.for_each_drawable(|id, series| {
        let data = series.data();
        let style = series.style();
        // No stroke means no half-pixel offset.
        let snap_width = if style.stroke.is_some() {
            style.line_width
        } else {
            0.0
        };

        let points: Vec<PixelPoint> = data
            .iter()
            .map(|point| {
                PixelPoint::new(
                    mapper.time_to_x(point.time as f64, snap_width),
                    mapper.value_to_y(point.value, snap_width),
                )
            })
            .collect();
        let interpolation = style.interpolation.unwrap_or(config.interpolation);
        let Some(path) = SeriesPath::trace(&points, interpolation) else {
            trace!(series = id.raw(), points = data.len(), "series skipped");
            tally.series_skipped += 1;
            return Ok(());
        };

        with_saved_state(surface, |surface| {
            paint_series_path(surface, &path, style, snap_width, mapper)
        })?;
        tally.series_drawn += 1;
        Ok(())
    })
}

fn paint_series_path<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    path: &SeriesPath,
    style: SeriesStyle,
    snap_width: f64,
    mapper: &CoordinateMapper,
) -> ChartResult<()> {
    surface.begin_path();
    path.apply(surface);

    if let Some(stroke) = style.stroke {
        surface.stroke(style.line_width, stroke)?;
    }

    if let Some(fill) = style.fill {
        let fill_end_y = if style.fill_to_bottom {
            mapper.geometry().height + snap_width + 1.0
        } else {
            mapper.value_to_y(0.0, 0.0)
        };
        for op in path.fill_closure(fill_end_y) {
            op.apply(surface);
        }
        surface.fill(fill)?;
    }
    Ok(())
}

fn paint_labels<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    config: &ChartConfig,
    target: ValueRange,
    width: f64,
    height: f64,
) -> ChartResult<usize> {
    let placements = layout_value_labels(
        target,
        &config.labels,
        &config.grid,
        width,
        height,
        config.reverse,
    );
    if placements.is_empty() {
        return Ok(0);
    }

    let font = config.labels.font();
    for label in &placements {
        surface.fill_text(
            &label.text,
            label.x,
            label.y,
            &font,
            config.labels.fill_color,
            label.align,
        )?;
    }
    Ok(placements.len())
}
