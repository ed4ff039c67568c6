use std::collections::HashSet;

use lens_view::annotation::{outline_edges, AnnotationPainter, Edge};
use lens_view::data_types::{cell_bounds, Bounds, CellId, EngineConfig, GridDataset, Range};
use lens_view::data_window::GridWindow;
use lens_view::rendering::{DrawCommand, RecordingCanvas};
use lens_view::theme::OverlayTheme;
use lens_view::transform::{cell_dimensions, Margins, SurfaceSize};

fn set(cells: &[(usize, usize)]) -> HashSet<CellId> {
    cells.iter().map(|&(r, c)| CellId::new(r, c)).collect()
}

fn window(rows: usize, cols: usize) -> GridWindow {
    let data = GridDataset::from_values(vec![vec![0.0; cols]; rows]).unwrap();
    let mut window = GridWindow::for_dataset(&data, &EngineConfig::default());
    window.set_row_range(Range::new(0.0, (rows - 1) as f64));
    window.set_stride(1);
    window
}

#[test]
fn test_solid_block_outlines_perimeter_only() {
    let edges = outline_edges(&set(&[(0, 0), (0, 1), (1, 0), (1, 1)]));
    assert_eq!(edges.len(), 8);
    // No internal edge between two highlighted cells.
    assert!(!edges.contains(&(CellId::new(0, 0), Edge::Right)));
    assert!(!edges.contains(&(CellId::new(0, 1), Edge::Left)));
    assert!(!edges.contains(&(CellId::new(0, 0), Edge::Bottom)));
    assert!(!edges.contains(&(CellId::new(1, 0), Edge::Top)));
}

#[test]
fn test_disjoint_cells_each_fully_outlined() {
    let edges = outline_edges(&set(&[(0, 0), (2, 2), (5, 1)]));
    assert_eq!(edges.len(), 12);
}

#[test]
fn test_paint_fills_and_strokes() {
    let w = window(10, 12);
    let margins = Margins::new(0.0, 80.0, 70.0, 70.0);
    let dims = cell_dimensions(SurfaceSize::new(270.0, 170.0), &margins, 10, 12);
    let painter = AnnotationPainter::from_cells([
        CellId::new(3, 3),
        CellId::new(3, 4),
        CellId::new(4, 3),
        CellId::new(4, 4),
    ]);

    let mut canvas = RecordingCanvas::new();
    painter.paint(&mut canvas, &w, dims, &margins, &OverlayTheme::default());
    assert_eq!(canvas.fill_count(), 4);
    assert_eq!(canvas.stroked_segments(), 8);
    let paths = canvas
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokePath { .. }))
        .count();
    assert_eq!(paths, 1, "outline is stroked as a single path");
}

#[test]
fn test_paint_without_dimensions_only_clears() {
    let w = window(10, 12);
    let painter = AnnotationPainter::from_cells([CellId::new(1, 1)]);
    let mut canvas = RecordingCanvas::new();
    painter.paint(&mut canvas, &w, None, &Margins::default(), &OverlayTheme::default());
    assert_eq!(canvas.commands, vec![DrawCommand::Clear]);
}

#[test]
fn test_cells_follow_the_window() {
    let mut w = window(10, 20);
    w.set_col_range(Range::new(0.0, 19.0));
    w.set_stride(2);
    // Columns 4 and 6 are adjacent once every other column is skipped;
    // column 5 is not shown at all.
    let painter =
        AnnotationPainter::from_cells([CellId::new(2, 4), CellId::new(2, 6), CellId::new(2, 5)]);
    let visible = painter.visible_cells(&w);
    assert_eq!(visible, set(&[(2, 2), (2, 3)]));
    assert_eq!(outline_edges(&visible).len(), 6);

    // Zoomed past the annotated rows: nothing to paint.
    w.set_row_range(Range::new(5.0, 9.0));
    assert!(painter.visible_cells(&w).is_empty());
}

#[test]
fn test_stroke_merges_on_commit() {
    let mut painter = AnnotationPainter::new();
    assert!(painter.add_pending(CellId::new(0, 0)));
    assert!(painter.add_pending(CellId::new(0, 1)));
    assert!(painter.committed_cells().is_empty());
    assert_eq!(painter.highlighted().len(), 2);
    assert!(painter.commit_pending());
    assert_eq!(painter.committed_cells().len(), 2);
    assert!(!painter.commit_pending());
}

#[test]
fn test_redraws_coalesce() {
    let w = window(10, 12);
    let margins = Margins::new(0.0, 80.0, 70.0, 70.0);
    let dims = cell_dimensions(SurfaceSize::new(270.0, 170.0), &margins, 10, 12);
    let theme = OverlayTheme::default();
    let mut painter = AnnotationPainter::new();

    painter.add_pending(CellId::new(0, 0));
    let stale = painter.pending_frame().unwrap();
    painter.add_pending(CellId::new(0, 1));
    let latest = painter.pending_frame().unwrap();
    assert_ne!(stale, latest);

    let mut canvas = RecordingCanvas::new();
    assert!(!painter.on_frame(stale, &mut canvas, &w, dims, &margins, &theme));
    assert!(canvas.commands.is_empty());
    assert!(painter.on_frame(latest, &mut canvas, &w, dims, &margins, &theme));
    assert_eq!(canvas.fill_count(), 2);
    assert!(painter.pending_frame().is_none());
}

#[test]
fn test_cell_bounds() {
    let cells = set(&[(4, 2), (1, 7), (3, 3)]);
    assert_eq!(
        cell_bounds(&cells),
        Some(Bounds {
            min_row: 1,
            max_row: 4,
            min_col: 2,
            max_col: 7
        })
    );
    assert_eq!(cell_bounds(&HashSet::new()), None);
}
