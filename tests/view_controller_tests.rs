use lens_view::data_types::{Bounds, EngineConfig, GridDataset, LineDataset, LineSeries, Range};
use lens_view::data_window::{GridWindow, LineWindow};
use lens_view::transform::{Margins, PlotArea, PlotTransform, SurfaceSize};
use lens_view::view_controller::ViewController;
use lens_view::SelectionBounds;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn grid_window(rows: usize, cols: usize) -> GridWindow {
    let data = GridDataset::from_values(vec![vec![0.0; cols]; rows]).unwrap();
    GridWindow::for_dataset(&data, &EngineConfig::default())
}

#[test]
fn test_compose_zoom_axis() {
    let current = Range::new(20.0, 29.0);
    let extent = Range::new(0.0, 29.0);
    let zoomed = ViewController::compose_zoom_axis(current, extent, 2.0, 5.0);
    assert_eq!(zoomed, Range::new(22.0, 25.0));
}

#[test]
fn test_compose_zoom_axis_cannot_escape() {
    // A stale selection reaching past the current window is cut back to it.
    let current = Range::new(20.0, 29.0);
    let extent = Range::new(0.0, 29.0);
    let zoomed = ViewController::compose_zoom_axis(current, extent, 5.0, 40.0);
    assert_eq!(zoomed, Range::new(25.0, 29.0));
}

#[test]
fn test_zoom_grid_nested() {
    let mut window = grid_window(30, 12);
    let (rows, cols) = ViewController::zoom_grid(
        &mut window,
        Bounds {
            min_row: 2,
            max_row: 5,
            min_col: 3,
            max_col: 7,
        },
    )
    .unwrap();
    assert_eq!(rows, Range::new(22.0, 25.0));
    assert_eq!(cols, Range::new(3.0, 7.0));

    // Second zoom is relative to the first.
    let (rows, cols) = ViewController::zoom_grid(
        &mut window,
        Bounds {
            min_row: 1,
            max_row: 2,
            min_col: 0,
            max_col: 1,
        },
    )
    .unwrap();
    assert_eq!(rows, Range::new(23.0, 24.0));
    assert_eq!(cols, Range::new(3.0, 4.0));
}

#[test]
fn test_zoom_grid_scales_column_offsets_by_stride() {
    let mut window = grid_window(30, 40);
    window.set_col_range(Range::new(0.0, 39.0));
    window.set_stride(4);
    // Visible columns 2..=3 are dataset columns 8 and 12.
    let (_, cols) = ViewController::zoom_grid(
        &mut window,
        Bounds {
            min_row: 0,
            max_row: 9,
            min_col: 2,
            max_col: 3,
        },
    )
    .unwrap();
    assert_eq!(cols, Range::new(8.0, 12.0));
}

#[test]
fn test_zoom_grid_empty_dataset() {
    let mut window = grid_window(0, 0);
    let selection = Bounds {
        min_row: 0,
        max_row: 0,
        min_col: 0,
        max_col: 0,
    };
    assert!(ViewController::zoom_grid(&mut window, selection).is_none());
}

#[test]
fn test_zoom_only_narrows() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let rows = rng.random_range(1..60);
        let cols = rng.random_range(1..60);
        let mut window = grid_window(rows, cols);
        window.set_stride(rng.random_range(1..5));

        for _ in 0..4 {
            let before = (window.row_range(), window.col_range());
            let selection = Bounds::from_corners(
                lens_view::CellId::new(rng.random_range(0..80), rng.random_range(0..80)),
                lens_view::CellId::new(rng.random_range(0..80), rng.random_range(0..80)),
            );
            let (r, c) = ViewController::zoom_grid(&mut window, selection).unwrap();
            assert!(before.0.contains_range(&r), "{:?} escaped {:?}", r, before.0);
            assert!(before.1.contains_range(&c), "{:?} escaped {:?}", c, before.1);
        }
    }
}

fn line_setup() -> (LineWindow, PlotTransform) {
    let data = LineDataset::new(vec![LineSeries::new(
        "a",
        &[(0.0, 0.0), (5.0, 0.5), (10.0, 1.0)],
    )]);
    let window = LineWindow::for_dataset(&data, &EngineConfig::default());
    let area = PlotArea::new(
        SurfaceSize::new(305.0, 180.0),
        &Margins::new(10.0, 30.0, 70.0, 75.0),
    );
    let transform = PlotTransform::new(window.x_range(), window.y_range(), area);
    (window, transform)
}

#[test]
fn test_selection_to_domain_inverts_y() {
    let (_, transform) = line_setup();
    // Drag from bottom-right to top-left of the middle of the plot.
    let selection = SelectionBounds {
        x_min: 175.0,
        y_min: 85.0,
        x_max: 125.0,
        y_max: 35.0,
    };
    let domain = ViewController::selection_to_domain(selection, &transform);
    assert!((domain.x_min - 2.5).abs() < 1e-9);
    assert!((domain.x_max - 5.0).abs() < 1e-9);
    assert!((domain.y_min - 0.25).abs() < 1e-9);
    assert!((domain.y_max - 0.75).abs() < 1e-9);
}

#[test]
fn test_zoom_line_clamps_to_plot_area() {
    let (mut window, transform) = line_setup();
    let selection = SelectionBounds {
        x_min: 0.0,
        y_min: 0.0,
        x_max: 175.0,
        y_max: 500.0,
    };
    let (x, y) = ViewController::zoom_line(&mut window, selection, &transform);
    assert_eq!(x.min, 0.0);
    assert!((x.max - 5.0).abs() < 1e-9);
    assert_eq!(y, Range::new(0.0, 1.0));
    assert_eq!(window.x_range(), x);
}
