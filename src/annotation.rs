//! Highlighted-cell annotations on the heatmap.
//!
//! Cells are kept in dataset coordinates so a zoom or stride change does not
//! move them. Painting maps them into the visible grid and traces only the
//! outer perimeter of each highlighted region.

use std::collections::HashSet;

use crate::data_types::{sorted_cells, CellId};
use crate::data_window::GridWindow;
use crate::frame::{FrameScheduler, FrameToken};
use crate::rendering::{Canvas, Segment};
use crate::theme::OverlayTheme;
use crate::transform::{cell_rect, CellDimensions, Margins, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Edges of `cells` that border a cell outside the set.
pub fn outline_edges(cells: &HashSet<CellId>) -> Vec<(CellId, Edge)> {
    let has = |row: Option<usize>, col: Option<usize>| match (row, col) {
        (Some(row), Some(col)) => cells.contains(&CellId::new(row, col)),
        _ => false,
    };

    let mut edges = Vec::new();
    for &cell in cells {
        let (r, c) = (cell.row, cell.col);
        if !has(r.checked_sub(1), Some(c)) {
            edges.push((cell, Edge::Top));
        }
        if !has(r.checked_add(1), Some(c)) {
            edges.push((cell, Edge::Bottom));
        }
        if !has(Some(r), c.checked_sub(1)) {
            edges.push((cell, Edge::Left));
        }
        if !has(Some(r), c.checked_add(1)) {
            edges.push((cell, Edge::Right));
        }
    }
    edges.sort();
    edges
}

/// Pixel segment of one cell edge, inset half a pixel.
pub fn edge_segment(cell: CellId, edge: Edge, dims: CellDimensions, margins: &Margins) -> Segment {
    let rect = cell_rect(cell, dims, margins);
    let (x0, y0) = (rect.x + 0.5, rect.y + 0.5);
    let (x1, y1) = (rect.right() - 0.5, rect.bottom() - 0.5);
    match edge {
        Edge::Top => Segment::new(Point::new(x0, y0), Point::new(x1, y0)),
        Edge::Bottom => Segment::new(Point::new(x0, y1), Point::new(x1, y1)),
        Edge::Left => Segment::new(Point::new(x0, y0), Point::new(x0, y1)),
        Edge::Right => Segment::new(Point::new(x1, y0), Point::new(x1, y1)),
    }
}

/// Set of highlighted cells plus the stroke currently being painted.
#[derive(Debug, Default)]
pub struct AnnotationPainter {
    committed: HashSet<CellId>,
    pending: HashSet<CellId>,
    frames: FrameScheduler,
}

impl AnnotationPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: impl IntoIterator<Item = CellId>) -> Self {
        Self {
            committed: cells.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Replaces the committed set, e.g. with the cells of a stored view.
    pub fn set_cells(&mut self, cells: impl IntoIterator<Item = CellId>) {
        self.committed = cells.into_iter().collect();
        self.pending.clear();
        self.frames.request();
    }

    pub fn contains(&self, cell: &CellId) -> bool {
        self.committed.contains(cell) || self.pending.contains(cell)
    }

    /// Committed and pending cells together, as painted.
    pub fn highlighted(&self) -> HashSet<CellId> {
        self.committed.union(&self.pending).copied().collect()
    }

    /// Committed cells in persistence order.
    pub fn committed_cells(&self) -> Vec<CellId> {
        sorted_cells(&self.committed)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.pending.is_empty()
    }

    /// Adds a cell to the pending stroke. Returns whether the set grew.
    pub fn add_pending(&mut self, cell: CellId) -> bool {
        if self.contains(&cell) {
            return false;
        }
        self.pending.insert(cell);
        self.frames.request();
        true
    }

    /// Merges the pending stroke into the committed set. Returns whether
    /// anything was merged.
    pub fn commit_pending(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let added = self.pending.len();
        self.committed.extend(self.pending.drain());
        tracing::debug!(added, total = self.committed.len(), "annotation stroke committed");
        true
    }

    pub fn discard_pending(&mut self) {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.frames.request();
        }
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.pending.clear();
        self.frames.request();
    }

    pub fn request_redraw(&mut self) -> FrameToken {
        self.frames.request()
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.frames.pending()
    }

    /// Highlighted cells that the window shows, in visible coordinates.
    pub fn visible_cells(&self, window: &GridWindow) -> HashSet<CellId> {
        self.committed
            .iter()
            .chain(self.pending.iter())
            .filter_map(|&cell| window.absolute_to_visible(cell))
            .collect()
    }

    /// Paints the fill and perimeter outline of every visible highlighted cell.
    pub fn paint(
        &self,
        canvas: &mut dyn Canvas,
        window: &GridWindow,
        dims: Option<CellDimensions>,
        margins: &Margins,
        theme: &OverlayTheme,
    ) {
        canvas.clear();
        let Some(dims) = dims else {
            return;
        };
        let visible = self.visible_cells(window);
        if visible.is_empty() {
            return;
        }

        let mut cells: Vec<CellId> = visible.iter().copied().collect();
        cells.sort();
        for cell in cells {
            canvas.fill_rect(cell_rect(cell, dims, margins), theme.annotation_fill);
        }

        let segments: Vec<Segment> = outline_edges(&visible)
            .into_iter()
            .map(|(cell, edge)| edge_segment(cell, edge, dims, margins))
            .collect();
        canvas.stroke_path(
            &segments,
            theme.annotation_stroke,
            theme.annotation_stroke_width,
        );
    }

    /// Runs a coalesced redraw. Returns `false` for a superseded token.
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        canvas: &mut dyn Canvas,
        window: &GridWindow,
        dims: Option<CellDimensions>,
        margins: &Margins,
        theme: &OverlayTheme,
    ) -> bool {
        if !self.frames.fire(token) {
            return false;
        }
        self.paint(canvas, window, dims, margins, theme);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell_has_four_edges() {
        let cells: HashSet<CellId> = [CellId::new(0, 0)].into_iter().collect();
        assert_eq!(outline_edges(&cells).len(), 4);
    }

    #[test]
    fn test_l_shape_outline() {
        // ##
        // #.
        let cells: HashSet<CellId> = [CellId::new(0, 0), CellId::new(0, 1), CellId::new(1, 0)]
            .into_iter()
            .collect();
        let edges = outline_edges(&cells);
        assert_eq!(edges.len(), 8);
        assert!(!edges.contains(&(CellId::new(0, 0), Edge::Right)));
        assert!(!edges.contains(&(CellId::new(0, 0), Edge::Bottom)));
    }

    #[test]
    fn test_pending_not_duplicated() {
        let mut painter = AnnotationPainter::from_cells([CellId::new(1, 1)]);
        assert!(!painter.add_pending(CellId::new(1, 1)));
        assert!(painter.add_pending(CellId::new(1, 2)));
        assert!(!painter.add_pending(CellId::new(1, 2)));
        assert_eq!(painter.pending_len(), 1);
        assert!(painter.commit_pending());
        assert_eq!(
            painter.committed_cells(),
            vec![CellId::new(1, 1), CellId::new(1, 2)]
        );
    }
}
