use crate::data_types::{Bounds, Range, SelectionBounds};
use crate::data_window::{GridWindow, LineWindow};
use crate::transform::{PlotTransform, Point};

/// ViewController holds the zoom arithmetic, independent of any event or
/// rendering infrastructure to facilitate testing.
pub struct ViewController;

impl ViewController {
    /// Narrows one axis to a selection given as offsets from the start of `current`.
    ///
    /// The offsets are turned into absolute positions clamped to `extent`, and
    /// the result is intersected with `current`, so a zoom can only narrow.
    pub fn compose_zoom_axis(current: Range, extent: Range, sel_min: f64, sel_max: f64) -> Range {
        let abs_min = extent.clamp_value(current.min + sel_min);
        let abs_max = extent.clamp_value(current.min + sel_max);
        current.intersect(&Range::new(abs_min, abs_max))
    }

    /// Applies a grid selection (visible cell indices) to the window.
    ///
    /// Visible column `k` sits `k * stride` columns past the start of the
    /// column range. Returns the new `(row, col)` ranges, or `None` for an
    /// empty grid.
    pub fn zoom_grid(window: &mut GridWindow, selection: Bounds) -> Option<(Range, Range)> {
        let row_extent = window.row_extent()?;
        let col_extent = window.col_extent()?;
        let stride = window.stride() as f64;

        let rows = Self::compose_zoom_axis(
            window.row_range(),
            row_extent,
            selection.min_row as f64,
            selection.max_row as f64,
        );
        let cols = Self::compose_zoom_axis(
            window.col_range(),
            col_extent,
            selection.min_col as f64 * stride,
            selection.max_col as f64 * stride,
        );

        window.set_row_range(rows);
        window.set_col_range(cols);
        tracing::debug!(?rows, ?cols, "grid zoom committed");
        Some((window.row_range(), window.col_range()))
    }

    /// Converts a pixel selection to domain units, clamped to the plotting area.
    pub fn selection_to_domain(selection_px: SelectionBounds, transform: &PlotTransform) -> SelectionBounds {
        let s = selection_px.normalized();
        let area = transform.area;
        let top_left = transform.screen_to_data(area.clamp(Point::new(s.x_min, s.y_min)));
        let bottom_right = transform.screen_to_data(area.clamp(Point::new(s.x_max, s.y_max)));
        SelectionBounds {
            x_min: top_left.x,
            x_max: bottom_right.x,
            // Screen y grows downward, so the bottom edge is the domain minimum.
            y_min: bottom_right.y,
            y_max: top_left.y,
        }
        .normalized()
    }

    /// Zooms a line window into a pixel selection. Returns the new `(x, y)` ranges.
    pub fn zoom_line(
        window: &mut LineWindow,
        selection_px: SelectionBounds,
        transform: &PlotTransform,
    ) -> (Range, Range) {
        let domain = Self::selection_to_domain(selection_px, transform);
        let x = window
            .x_range()
            .intersect(&Range::new(domain.x_min, domain.x_max));
        let y = window
            .y_range()
            .intersect(&Range::new(domain.y_min, domain.y_max));
        window.set_x_range(x);
        window.set_y_range(y);
        tracing::debug!(?x, ?y, "line zoom committed");
        (x, y)
    }
}
