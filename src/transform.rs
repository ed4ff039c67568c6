//! Coordinate projection between device pixels and data domains.
//!
//! All pixel values here are in logical (CSS-style) pixels relative to the
//! surface's top-left corner; device-pixel-ratio scaling is applied once by
//! [`crate::surface::SurfaceSync`] through the drawing transform.

use serde::{Deserialize, Serialize};

use crate::data_types::{CellId, Range};
use crate::scales::LinearScale;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Fixed insets between the surface edge and the plotting area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Displayed size of a surface. Zero until the host has measured it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Pixel size of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellDimensions {
    pub width: f64,
    pub height: f64,
}

/// Plotting area of a surface once margins are removed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    /// Inner area of `surface`; width and height are floored at one pixel so
    /// they can be used as divisors.
    pub fn new(surface: SurfaceSize, margins: &Margins) -> Self {
        Self {
            left: margins.left,
            top: margins.top,
            width: (surface.width - margins.horizontal()).max(1.0),
            height: (surface.height - margins.vertical()).max(1.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn rect(&self) -> PixelRect {
        PixelRect {
            x: self.left,
            y: self.top,
            width: self.width,
            height: self.height,
        }
    }

    /// Closed containment, so the last pixel column still maps to the x maximum.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.left, self.right()),
            p.y.clamp(self.top, self.bottom()),
        )
    }
}

/// Size of one cell of a `row_count × col_count` grid.
///
/// `None` while the surface is unmeasured, the grid is empty, or the margins
/// leave no room to draw.
pub fn cell_dimensions(
    surface: SurfaceSize,
    margins: &Margins,
    row_count: usize,
    col_count: usize,
) -> Option<CellDimensions> {
    if row_count == 0 || col_count == 0 || !surface.is_measured() {
        return None;
    }
    let grid_width = surface.width - margins.horizontal();
    let grid_height = surface.height - margins.vertical();
    if grid_width <= 0.0 || grid_height <= 0.0 {
        return None;
    }
    Some(CellDimensions {
        width: grid_width / col_count as f64,
        height: grid_height / row_count as f64,
    })
}

/// Visible cell under a pixel, or `None` over the margins or outside the grid.
pub fn pixel_to_cell(
    px: f64,
    py: f64,
    dims: CellDimensions,
    margins: &Margins,
    row_count: usize,
    col_count: usize,
) -> Option<CellId> {
    if row_count == 0 || col_count == 0 || !px.is_finite() || !py.is_finite() {
        return None;
    }
    let grid_width = dims.width * col_count as f64;
    let grid_height = dims.height * row_count as f64;
    let gx = px - margins.left;
    let gy = py - margins.top;
    if gx < 0.0 || gy < 0.0 || gx >= grid_width || gy >= grid_height {
        return None;
    }
    let col = ((gx / dims.width).floor() as usize).min(col_count - 1);
    let row = ((gy / dims.height).floor() as usize).min(row_count - 1);
    Some(CellId::new(row, col))
}

/// Pixel rectangle covered by a visible cell.
pub fn cell_rect(cell: CellId, dims: CellDimensions, margins: &Margins) -> PixelRect {
    PixelRect {
        x: margins.left + cell.col as f64 * dims.width,
        y: margins.top + cell.row as f64 * dims.height,
        width: dims.width,
        height: dims.height,
    }
}

fn x_scale(x_range: Range, inner_width: f64, left: f64) -> LinearScale {
    LinearScale::new(x_range, (left, left + inner_width))
}

pub fn domain_to_pixel_x(x: f64, x_range: Range, inner_width: f64, left: f64) -> f64 {
    x_scale(x_range, inner_width, left).map(x)
}

pub fn pixel_to_domain_x(px: f64, x_range: Range, inner_width: f64, left: f64) -> f64 {
    x_scale(x_range, inner_width, left).invert(px)
}

fn y_scale(y_range: Range, inner_height: f64, top: f64) -> LinearScale {
    LinearScale::new(y_range, (top + inner_height, top))
}

/// Y grows downward on screen: `y_range.max` maps to `top`.
pub fn domain_to_pixel_y(y: f64, y_range: Range, inner_height: f64, top: f64) -> f64 {
    y_scale(y_range, inner_height, top).map(y)
}

pub fn pixel_to_domain_y(py: f64, y_range: Range, inner_height: f64, top: f64) -> f64 {
    y_scale(y_range, inner_height, top).invert(py)
}

/// A pointer x collapsed onto one of the discrete x values of a line chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnappedX {
    pub value: f64,
    pub px: f64,
}

/// Snaps a pixel x to the nearest value of `sorted_xs`; ties go to the lower index.
pub fn nearest_discrete_x(
    px: f64,
    sorted_xs: &[f64],
    x_range: Range,
    inner_width: f64,
    left: f64,
) -> Option<SnappedX> {
    let (&first, rest) = sorted_xs.split_first()?;
    let target = pixel_to_domain_x(px, x_range, inner_width, left);

    let mut nearest = first;
    let mut best = (target - first).abs();
    for &v in rest {
        let d = (target - v).abs();
        if d < best {
            nearest = v;
            best = d;
        }
    }

    Some(SnappedX {
        value: nearest,
        px: domain_to_pixel_x(nearest, x_range, inner_width, left),
    })
}

/// Projection for one line chart frame: current ranges plus plotting area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotTransform {
    pub x_range: Range,
    pub y_range: Range,
    pub area: PlotArea,
}

impl PlotTransform {
    pub fn new(x_range: Range, y_range: Range, area: PlotArea) -> Self {
        Self {
            x_range,
            y_range,
            area,
        }
    }

    pub fn data_to_screen(&self, point: Point) -> Point {
        Point::new(self.x_data_to_screen(point.x), self.y_data_to_screen(point.y))
    }

    pub fn screen_to_data(&self, point: Point) -> Point {
        Point::new(
            pixel_to_domain_x(point.x, self.x_range, self.area.width, self.area.left),
            pixel_to_domain_y(point.y, self.y_range, self.area.height, self.area.top),
        )
    }

    pub fn x_data_to_screen(&self, x: f64) -> f64 {
        domain_to_pixel_x(x, self.x_range, self.area.width, self.area.left)
    }

    pub fn y_data_to_screen(&self, y: f64) -> f64 {
        domain_to_pixel_y(y, self.y_range, self.area.height, self.area.top)
    }

    pub fn snap_x(&self, px: f64, sorted_xs: &[f64]) -> Option<SnappedX> {
        nearest_discrete_x(px, sorted_xs, self.x_range, self.area.width, self.area.left)
    }
}
