//! Overlay painting for selections, annotations and the crosshair.
//!
//! The chart primitives themselves are drawn by the host renderer; this module
//! only paints the interaction layers on top of them.

use crate::data_types::{Bounds, CellId, SelectionBounds};
use crate::theme::Rgba;
use crate::transform::{cell_rect, CellDimensions, Margins, PixelRect, PlotArea, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

/// 2-D drawing operations an overlay surface must provide.
pub trait Canvas {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba);
    fn stroke_rect(&mut self, rect: PixelRect, color: Rgba, width: f32);
    /// Strokes all segments as a single path.
    fn stroke_path(&mut self, segments: &[Segment], color: Rgba, width: f32);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect {
        rect: PixelRect,
        color: Rgba,
    },
    StrokeRect {
        rect: PixelRect,
        color: Rgba,
        width: f32,
    },
    StrokePath {
        segments: Vec<Segment>,
        color: Rgba,
        width: f32,
    },
}

/// Canvas that records commands instead of drawing them.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count()
    }

    /// Total number of stroked path segments.
    pub fn stroked_segments(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                DrawCommand::StrokePath { segments, .. } => segments.len(),
                _ => 0,
            })
            .sum()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgba, width: f32) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn stroke_path(&mut self, segments: &[Segment], color: Rgba, width: f32) {
        self.commands.push(DrawCommand::StrokePath {
            segments: segments.to_vec(),
            color,
            width,
        });
    }
}

/// Pixel rectangle spanned by an inclusive block of visible cells.
pub fn bounds_rect(bounds: Bounds, dims: CellDimensions, margins: &Margins) -> PixelRect {
    let top_left = cell_rect(CellId::new(bounds.min_row, bounds.min_col), dims, margins);
    PixelRect {
        x: top_left.x,
        y: top_left.y,
        width: bounds.col_count() as f64 * dims.width,
        height: bounds.row_count() as f64 * dims.height,
    }
}

/// Paints a grid zoom selection: translucent fill plus outline.
pub fn paint_cell_selection(
    canvas: &mut dyn Canvas,
    bounds: Bounds,
    dims: CellDimensions,
    margins: &Margins,
    fill: Rgba,
    stroke: Rgba,
    width: f32,
) {
    let rect = bounds_rect(bounds, dims, margins);
    canvas.fill_rect(rect, fill);
    canvas.stroke_rect(rect, stroke, width);
}

/// Paints a line-chart drag rectangle, clamped to the plotting area and
/// inset half a pixel for crisp 1px strokes.
pub fn paint_pixel_selection(
    canvas: &mut dyn Canvas,
    selection: SelectionBounds,
    area: &PlotArea,
    stroke: Rgba,
    width: f32,
) {
    let s = selection.normalized();
    let min_x = s.x_min.max(area.left);
    let max_x = s.x_max.min(area.right());
    let min_y = s.y_min.max(area.top);
    let max_y = s.y_max.min(area.bottom());
    let rect = PixelRect {
        x: min_x + 0.5,
        y: min_y + 0.5,
        width: (max_x - min_x - 1.0).max(0.0),
        height: (max_y - min_y - 1.0).max(0.0),
    };
    canvas.stroke_rect(rect, stroke, width);
}

/// Vertical crosshair through `x_px`, spanning the plotting area.
pub fn paint_crosshair(canvas: &mut dyn Canvas, x_px: f64, area: &PlotArea, color: Rgba) {
    let x = x_px + 0.5;
    canvas.stroke_path(
        &[Segment::new(
            Point::new(x, area.top),
            Point::new(x, area.bottom()),
        )],
        color,
        1.0,
    );
}
