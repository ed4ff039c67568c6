use lens_view::data_types::{Bounds, CellId, Range};
use lens_view::selection::{
    GridHitTester, LineAnchor, LineHitTester, SelectionController, SelectionOutcome,
};
use lens_view::transform::{Margins, PlotArea, PlotTransform, Point, SurfaceSize};

/// 10 × 12 grid of 10px cells starting at (70, 0).
fn grid_hit() -> GridHitTester {
    GridHitTester::new(
        SurfaceSize::new(270.0, 170.0),
        Margins::new(0.0, 80.0, 70.0, 70.0),
        10,
        12,
    )
}

fn center(row: usize, col: usize) -> Point {
    Point::new(70.0 + col as f64 * 10.0 + 5.0, row as f64 * 10.0 + 5.0)
}

#[test]
fn test_drag_commits_normalised_bounds() {
    let hit = grid_hit();
    let mut sel = SelectionController::<CellId>::new(3.0);
    assert!(sel.pointer_down(center(5, 7), &hit));
    assert!(sel.is_capturing());
    sel.pointer_move(center(4, 5), &hit);
    let provisional = sel.pointer_move(center(2, 3), &hit).unwrap();
    assert_eq!(
        provisional,
        Bounds {
            min_row: 2,
            max_row: 5,
            min_col: 3,
            max_col: 7
        }
    );
    assert_eq!(sel.pointer_up(), SelectionOutcome::Committed(provisional));
    assert!(!sel.is_dragging());
}

#[test]
fn test_small_jitter_is_a_click() {
    let hit = grid_hit();
    let mut sel = SelectionController::<CellId>::new(3.0);
    let p = center(1, 1);
    sel.pointer_down(p, &hit);
    sel.pointer_move(Point::new(p.x + 2.0, p.y - 2.0), &hit);
    assert!(!sel.has_moved());
    assert_eq!(sel.pointer_up(), SelectionOutcome::Click(CellId::new(1, 1)));
}

#[test]
fn test_drag_back_to_start_is_still_a_drag() {
    let hit = grid_hit();
    let mut sel = SelectionController::<CellId>::new(3.0);
    let p = center(1, 1);
    sel.pointer_down(p, &hit);
    sel.pointer_move(Point::new(p.x + 20.0, p.y), &hit);
    sel.pointer_move(p, &hit);
    assert!(sel.has_moved());
    assert!(matches!(sel.pointer_up(), SelectionOutcome::Committed(_)));
}

#[test]
fn test_press_outside_grid_stays_idle() {
    let hit = grid_hit();
    let mut sel = SelectionController::<CellId>::new(3.0);
    assert!(!sel.pointer_down(Point::new(20.0, 20.0), &hit));
    assert!(!sel.is_dragging());
    assert!(sel.pointer_move(center(1, 1), &hit).is_none());
    assert_eq!(sel.pointer_up(), SelectionOutcome::Cancelled);
}

#[test]
fn test_move_over_margin_keeps_last_cell() {
    let hit = grid_hit();
    let mut sel = SelectionController::<CellId>::new(3.0);
    sel.pointer_down(center(0, 0), &hit);
    sel.pointer_move(center(3, 4), &hit);
    // The pointer leaves the surface; the window keeps routing events here.
    let bounds = sel.pointer_move(Point::new(900.0, 900.0), &hit).unwrap();
    assert_eq!(bounds.max_row, 3);
    assert_eq!(bounds.max_col, 4);
}

#[test]
fn test_second_press_while_dragging_is_ignored() {
    let hit = grid_hit();
    let mut sel = SelectionController::<CellId>::new(3.0);
    sel.pointer_down(center(0, 0), &hit);
    assert!(!sel.pointer_down(center(5, 5), &hit));
    assert_eq!(sel.anchor(), Some(CellId::new(0, 0)));
}

#[test]
fn test_unmeasured_surface_has_no_cells() {
    let hit = GridHitTester::new(SurfaceSize::default(), Margins::default(), 10, 12);
    let mut sel = SelectionController::<CellId>::new(3.0);
    assert!(!sel.pointer_down(Point::new(5.0, 5.0), &hit));
}

fn line_transform() -> PlotTransform {
    let area = PlotArea::new(
        SurfaceSize::new(305.0, 180.0),
        &Margins::new(10.0, 30.0, 70.0, 75.0),
    );
    PlotTransform::new(Range::new(0.0, 4.0), Range::new(0.0, 1.0), area)
}

#[test]
fn test_line_anchor_snaps_x_and_keeps_raw_y() {
    let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
    let hit = LineHitTester::new(line_transform(), &xs);
    let mut sel = SelectionController::<LineAnchor>::new(3.0);
    // x = 1.3 in domain snaps to 1.0 at pixel 125.
    assert!(sel.pointer_down(Point::new(75.0 + 65.0, 42.0), &hit));
    let anchor = sel.anchor().unwrap();
    assert_eq!(anchor.x_value, 1.0);
    assert_eq!(anchor.x_px, 125.0);
    assert_eq!(anchor.y_px, 42.0);
}

#[test]
fn test_line_drag_bounds_in_pixels() {
    let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
    let hit = LineHitTester::new(line_transform(), &xs);
    let mut sel = SelectionController::<LineAnchor>::new(3.0);
    sel.pointer_down(Point::new(230.0, 90.0), &hit);
    // Leaving the plot area still tracks, snapped to the last layer.
    sel.pointer_move(Point::new(400.0, 20.0), &hit);
    match sel.pointer_up() {
        SelectionOutcome::Committed(b) => {
            assert_eq!(b.x_min, 225.0);
            assert_eq!(b.x_max, 275.0);
            assert_eq!(b.y_min, 20.0);
            assert_eq!(b.y_max, 90.0);
        }
        other => panic!("expected a committed selection, got {:?}", other),
    }
}

#[test]
fn test_line_press_outside_plot_area() {
    let xs = [0.0, 1.0];
    let hit = LineHitTester::new(line_transform(), &xs);
    let mut sel = SelectionController::<LineAnchor>::new(3.0);
    assert!(!sel.pointer_down(Point::new(10.0, 50.0), &hit));
    assert!(!sel.pointer_down(Point::new(f64::NAN, 50.0), &hit));
}
