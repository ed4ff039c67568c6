//! Visible sub-range of a dataset and the filtered data derived from it.

use crate::data_types::{
    CellId, EngineConfig, GridDataset, GridRow, LineDataset, LineSeries, Range, ViewAnnotation,
    ViewRanges, ViewState,
};

/// Coerces an editable stride value to a usable interval (at least 1).
pub fn sanitize_stride(input: f64) -> u32 {
    if !input.is_finite() || input < 1.0 {
        1
    } else {
        input.floor().min(u32::MAX as f64) as u32
    }
}

/// Stride that shows roughly `target_columns` columns of `col_extent`.
pub fn default_stride(col_extent: Option<Range>, target_columns: usize) -> u32 {
    let span = col_extent.map(|r| r.span()).unwrap_or(0.0);
    let per = (span / target_columns.max(1) as f64).floor();
    sanitize_stride(per)
}

/// Row window covering the last `visible_rows` rows of `row_extent`.
pub fn default_row_range(row_extent: Option<Range>, visible_rows: usize) -> Range {
    match row_extent {
        Some(extent) => {
            let start = (extent.max - (visible_rows.max(1) - 1) as f64).max(extent.min);
            Range::new(start, extent.max)
        }
        None => Range::default(),
    }
}

fn index_range(range: Range, extent: Option<Range>) -> Range {
    let Some(extent) = extent else {
        return Range::default();
    };
    let narrowed = extent.intersect(&Range::new(range.min.round(), range.max.round()));
    Range::new(narrowed.min.round(), narrowed.max.round())
}

/// Row/column window and column stride over a [`GridDataset`].
///
/// Ranges hold whole indices and always lie inside the dataset extent.
#[derive(Clone, Debug, PartialEq)]
pub struct GridWindow {
    row_extent: Option<Range>,
    col_extent: Option<Range>,
    row_range: Range,
    col_range: Range,
    stride: u32,
    default_visible_rows: usize,
    target_visible_columns: usize,
}

impl GridWindow {
    pub fn new(row_count: usize, col_count: usize, config: &EngineConfig) -> Self {
        let mut window = Self {
            row_extent: Range::of_len(row_count),
            col_extent: Range::of_len(col_count),
            row_range: Range::default(),
            col_range: Range::default(),
            stride: 1,
            default_visible_rows: config.default_visible_rows,
            target_visible_columns: config.target_visible_columns,
        };
        window.reset();
        window
    }

    pub fn for_dataset(data: &GridDataset, config: &EngineConfig) -> Self {
        Self::new(data.row_count(), data.col_count(), config)
    }

    /// Restores the default window: every column, the last rows, the default stride.
    pub fn reset(&mut self) {
        self.col_range = self.col_extent.unwrap_or_default();
        self.row_range = default_row_range(self.row_extent, self.default_visible_rows);
        self.stride = self.default_stride();
    }

    pub fn default_stride(&self) -> u32 {
        default_stride(self.col_extent, self.target_visible_columns)
    }

    pub fn row_range(&self) -> Range {
        self.row_range
    }

    pub fn col_range(&self) -> Range {
        self.col_range
    }

    pub fn row_extent(&self) -> Option<Range> {
        self.row_extent
    }

    pub fn col_extent(&self) -> Option<Range> {
        self.col_extent
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn set_row_range(&mut self, range: Range) {
        self.row_range = index_range(range, self.row_extent);
    }

    pub fn set_col_range(&mut self, range: Range) {
        self.col_range = index_range(range, self.col_extent);
    }

    /// Sets the stride; zero is coerced to 1.
    pub fn set_stride(&mut self, stride: u32) {
        self.stride = stride.max(1);
    }

    fn max_stride(&self) -> u32 {
        self.col_extent.map(|r| r.span()).unwrap_or(0.0).max(1.0) as u32
    }

    /// Sets the stride from an editable field, clamped to the column span.
    pub fn set_stride_input(&mut self, input: f64) -> u32 {
        let stride = sanitize_stride(input).min(self.max_stride()).max(1);
        if !input.is_finite() || input < 1.0 {
            tracing::warn!(input, "invalid stride input, coerced to {}", stride);
        }
        self.stride = stride;
        stride
    }

    /// Dataset row indices inside the row range.
    pub fn kept_rows(&self) -> Vec<usize> {
        if self.row_extent.is_none() {
            return Vec::new();
        }
        let (lo, hi) = self.row_range.to_index_bounds();
        (lo..=hi).collect()
    }

    /// Dataset column indices inside the column range that fall on the stride.
    pub fn kept_columns(&self) -> Vec<usize> {
        if self.col_extent.is_none() {
            return Vec::new();
        }
        let (lo, hi) = self.col_range.to_index_bounds();
        (lo..=hi).step_by(self.stride as usize).collect()
    }

    /// `(rows, cols)` of the filtered grid.
    pub fn visible_shape(&self) -> (usize, usize) {
        (self.kept_rows().len(), self.kept_columns().len())
    }

    /// Whether dataset column `j` survives the range and stride filter.
    pub fn keeps_column(&self, j: usize) -> bool {
        let (lo, hi) = self.col_range.to_index_bounds();
        self.col_extent.is_some() && j >= lo && j <= hi && (j - lo) % self.stride as usize == 0
    }

    pub fn keeps_row(&self, i: usize) -> bool {
        let (lo, hi) = self.row_range.to_index_bounds();
        self.row_extent.is_some() && i >= lo && i <= hi
    }

    /// Rows and cells of `data` that the current window shows.
    pub fn filter(&self, data: &GridDataset) -> GridDataset {
        let rows = data
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| self.keeps_row(*i))
            .map(|(_, row)| GridRow {
                id: row.id.clone(),
                data: row
                    .data
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| self.keeps_column(*j))
                    .map(|(_, cell)| cell.clone())
                    .collect(),
            })
            .collect();
        GridDataset { rows }
    }

    /// Dataset cell shown at visible position `visible`.
    pub fn visible_to_absolute(&self, visible: CellId) -> Option<CellId> {
        let (rows, cols) = self.visible_shape();
        if visible.row >= rows || visible.col >= cols {
            return None;
        }
        let (row_lo, _) = self.row_range.to_index_bounds();
        let (col_lo, _) = self.col_range.to_index_bounds();
        Some(CellId::new(
            row_lo + visible.row,
            col_lo + visible.col * self.stride as usize,
        ))
    }

    /// Visible position of dataset cell `absolute`, if the window shows it.
    pub fn absolute_to_visible(&self, absolute: CellId) -> Option<CellId> {
        if !self.keeps_row(absolute.row) || !self.keeps_column(absolute.col) {
            return None;
        }
        let (row_lo, _) = self.row_range.to_index_bounds();
        let (col_lo, _) = self.col_range.to_index_bounds();
        Some(CellId::new(
            absolute.row - row_lo,
            (absolute.col - col_lo) / self.stride as usize,
        ))
    }

    /// Seeds ranges and stride from a stored view, sanitising whatever it holds.
    pub fn apply_view(&mut self, view: &ViewState) {
        let row_fallback = self.row_extent.unwrap_or_default();
        let col_fallback = self.col_extent.unwrap_or_default();
        self.set_row_range(Range::sanitized(
            view.range.row.min,
            view.range.row.max,
            row_fallback,
        ));
        self.set_col_range(Range::sanitized(
            view.range.col.min,
            view.range.col.max,
            col_fallback,
        ));
        self.set_stride(view.stride.min(self.max_stride()));
    }

    pub fn to_view_state(&self, annotation: Option<ViewAnnotation>) -> ViewState {
        ViewState::new(
            ViewRanges {
                row: self.row_range,
                col: self.col_range,
            },
            self.stride,
        )
        .with_annotation(annotation)
    }
}

/// X/Y window over a [`LineDataset`].
///
/// Only the x range filters points; the y range scales the display so that
/// zooming back out loses nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct LineWindow {
    x_extent: Option<Range>,
    y_extent: Option<Range>,
    x_range: Range,
    y_range: Range,
    default_y_range: Range,
    unique_sorted_x: Vec<f64>,
}

impl LineWindow {
    pub fn for_dataset(data: &LineDataset, config: &EngineConfig) -> Self {
        let extent = data.extent();
        let mut window = Self {
            x_extent: extent.map(|(x, _)| x),
            y_extent: extent.map(|(_, y)| y),
            x_range: Range::default(),
            y_range: Range::default(),
            default_y_range: config.line_default_y_range,
            unique_sorted_x: data.unique_sorted_x(),
        };
        window.reset();
        window
    }

    pub fn reset(&mut self) {
        self.x_range = self.x_extent.unwrap_or_else(|| Range::new(0.0, 100.0));
        self.y_range = self.default_y_range;
    }

    pub fn x_range(&self) -> Range {
        self.x_range
    }

    pub fn y_range(&self) -> Range {
        self.y_range
    }

    pub fn x_extent(&self) -> Option<Range> {
        self.x_extent
    }

    pub fn y_extent(&self) -> Option<Range> {
        self.y_extent
    }

    pub fn set_x_range(&mut self, range: Range) {
        self.x_range = Range::sanitized(range.min, range.max, self.x_range);
    }

    pub fn set_y_range(&mut self, range: Range) {
        self.y_range = Range::sanitized(range.min, range.max, self.y_range);
    }

    /// Every x value of the dataset, sorted and de-duplicated.
    pub fn unique_sorted_x(&self) -> &[f64] {
        &self.unique_sorted_x
    }

    /// Discrete x values inside the current x range, the snapping targets.
    pub fn visible_xs(&self) -> Vec<f64> {
        self.unique_sorted_x
            .iter()
            .copied()
            .filter(|x| self.x_range.contains(*x))
            .collect()
    }

    pub fn filter(&self, data: &LineDataset) -> LineDataset {
        LineDataset {
            lines: data
                .lines
                .iter()
                .map(|line| LineSeries {
                    id: line.id.clone(),
                    data: line
                        .data
                        .iter()
                        .copied()
                        .filter(|p| self.x_range.contains(p.x))
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn apply_view(&mut self, view: &ViewState) {
        self.set_x_range(view.range.col);
        self.set_y_range(view.range.row);
    }

    pub fn to_view_state(&self, annotation: Option<ViewAnnotation>) -> ViewState {
        ViewState::new(
            ViewRanges {
                row: self.y_range,
                col: self.x_range,
            },
            1,
        )
        .with_annotation(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_stride() {
        assert_eq!(sanitize_stride(0.0), 1);
        assert_eq!(sanitize_stride(f64::NAN), 1);
        assert_eq!(sanitize_stride(f64::NEG_INFINITY), 1);
        assert_eq!(sanitize_stride(4.7), 4);
    }

    #[test]
    fn test_default_stride() {
        assert_eq!(default_stride(Range::of_len(12), 10), 1);
        assert_eq!(default_stride(Range::of_len(101), 10), 10);
        assert_eq!(default_stride(None, 10), 1);
    }

    #[test]
    fn test_default_row_range_short_dataset() {
        assert_eq!(default_row_range(Range::of_len(4), 10), Range::new(0.0, 3.0));
    }
}
