//! Heatmap session: token position × layer grid with zoom and cell annotations.

use std::time::Instant;

use eyre::Result;

use super::ChartSession;
use crate::annotation::AnnotationPainter;
use crate::data_types::{
    Bounds, CellId, EngineConfig, GridCell, GridDataset, Range, ViewAnnotation, ViewState,
};
use crate::data_window::GridWindow;
use crate::frame::FrameToken;
use crate::persistence::{ViewPersistence, ViewStore};
use crate::rendering::{paint_cell_selection, Canvas};
use crate::selection::{GridHitTester, HitTest, SelectionController, SelectionOutcome};
use crate::surface::{Surface, SurfaceSync};
use crate::transform::{cell_dimensions, CellDimensions, Margins, Point, SurfaceSize};
use crate::view_controller::ViewController;

/// Cell under the pointer, for tooltips.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapHover {
    pub visible: CellId,
    pub absolute: CellId,
    pub cell: GridCell,
}

pub struct HeatmapView<S: ViewStore> {
    data: GridDataset,
    config: EngineConfig,
    window: GridWindow,
    surface: SurfaceSync,
    selection: SelectionController<CellId>,
    annotations: AnnotationPainter,
    zoom_mode: bool,
    zoom_selection: Option<Bounds>,
    persistence: ViewPersistence<S>,
}

impl<S: ViewStore> HeatmapView<S> {
    pub fn new(
        store: S,
        chart_id: impl Into<String>,
        data: GridDataset,
        config: EngineConfig,
    ) -> Self {
        let window = GridWindow::for_dataset(&data, &config);
        Self {
            persistence: ViewPersistence::new(store, chart_id, config.view_debounce()),
            selection: SelectionController::new(config.drag_threshold_px),
            surface: SurfaceSync::default(),
            annotations: AnnotationPainter::new(),
            zoom_mode: false,
            zoom_selection: None,
            window,
            data,
            config,
        }
    }

    pub fn data(&self) -> &GridDataset {
        &self.data
    }

    pub fn window(&self) -> &GridWindow {
        &self.window
    }

    pub fn annotations(&self) -> &AnnotationPainter {
        &self.annotations
    }

    pub fn persistence(&self) -> &ViewPersistence<S> {
        &self.persistence
    }

    pub fn margins(&self) -> Margins {
        self.config.heatmap_margins
    }

    /// Rows and cells to hand to the chart renderer.
    pub fn filtered(&self) -> GridDataset {
        self.window.filter(&self.data)
    }

    // --- surface ---

    pub fn set_surface_size(&mut self, size: SurfaceSize) -> Option<FrameToken> {
        let token = self.surface.observe_resize(size);
        if token.is_some() {
            self.annotations.request_redraw();
        }
        token
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) -> Option<FrameToken> {
        let token = self.surface.observe_pixel_ratio(ratio);
        if token.is_some() {
            self.annotations.request_redraw();
        }
        token
    }

    pub fn surface(&self) -> &SurfaceSync {
        &self.surface
    }

    /// Runs a chart-surface frame; `redraw` repaints the chart primitives.
    pub fn surface_frame<T, F>(&mut self, token: FrameToken, target: &mut T, redraw: F) -> bool
    where
        T: Surface + ?Sized,
        F: FnOnce(&mut T, SurfaceSize),
    {
        self.surface.on_frame(token, target, redraw)
    }

    pub fn cell_dimensions(&self) -> Option<CellDimensions> {
        let (rows, cols) = self.window.visible_shape();
        cell_dimensions(self.surface.displayed_size(), &self.config.heatmap_margins, rows, cols)
    }

    fn hit_tester(&self) -> GridHitTester {
        let (rows, cols) = self.window.visible_shape();
        GridHitTester::new(
            self.surface.displayed_size(),
            self.config.heatmap_margins,
            rows,
            cols,
        )
    }

    // --- interaction ---

    pub fn is_zoom_mode(&self) -> bool {
        self.zoom_mode
    }

    /// In zoom mode drags select a region to zoom into; otherwise they paint
    /// annotations. Switching abandons the gesture in progress.
    pub fn set_zoom_mode(&mut self, enabled: bool) {
        if self.zoom_mode == enabled {
            return;
        }
        self.selection.cancel();
        self.annotations.discard_pending();
        self.zoom_selection = None;
        self.zoom_mode = enabled;
        self.annotations.request_redraw();
        tracing::debug!(enabled, "heatmap zoom mode");
    }

    pub fn hover(&self, p: Point) -> Option<HeatmapHover> {
        let visible = self.hit_tester().anchor_at(p)?;
        let absolute = self.window.visible_to_absolute(visible)?;
        let cell = self.data.cell(absolute.row, absolute.col)?.clone();
        Some(HeatmapHover {
            visible,
            absolute,
            cell,
        })
    }

    pub fn is_capturing(&self) -> bool {
        self.selection.is_capturing()
    }

    /// Provisional zoom rectangle in visible cells.
    pub fn zoom_selection(&self) -> Option<Bounds> {
        self.zoom_selection
    }

    pub fn pointer_down(&mut self, p: Point) -> bool {
        let hit = self.hit_tester();
        if !self.selection.pointer_down(p, &hit) {
            return false;
        }
        if self.zoom_mode {
            self.zoom_selection = self.selection.provisional();
            self.annotations.request_redraw();
        } else if let Some(anchor) = self.selection.anchor() {
            self.paint_visible(anchor);
        }
        true
    }

    pub fn pointer_move(&mut self, p: Point) -> Option<Bounds> {
        let hit = self.hit_tester();
        let bounds = self.selection.pointer_move(p, &hit)?;
        if self.zoom_mode {
            if self.zoom_selection != Some(bounds) {
                self.zoom_selection = Some(bounds);
                self.annotations.request_redraw();
            }
        } else if let Some(end) = self.selection.end() {
            self.paint_visible(end);
        }
        Some(bounds)
    }

    pub fn pointer_up(&mut self, now: Instant) -> SelectionOutcome<CellId> {
        let outcome = self.selection.pointer_up();
        if self.zoom_mode {
            if let SelectionOutcome::Committed(bounds) = outcome {
                self.commit_zoom(bounds, now);
            }
            self.zoom_selection = None;
            self.annotations.request_redraw();
        } else if !matches!(outcome, SelectionOutcome::Cancelled) {
            self.commit_stroke(now);
        }
        outcome
    }

    pub fn cancel_gesture(&mut self) {
        self.selection.cancel();
        self.zoom_selection = None;
        self.annotations.discard_pending();
    }

    fn paint_visible(&mut self, visible: CellId) {
        if let Some(absolute) = self.window.visible_to_absolute(visible) {
            self.annotations.add_pending(absolute);
        }
    }

    fn commit_stroke(&mut self, now: Instant) -> bool {
        if !self.annotations.commit_pending() {
            return false;
        }
        let state = self.view_state();
        self.persistence
            .persist_after(state, now, self.config.annotation_debounce());
        self.annotations.request_redraw();
        true
    }

    /// Narrows the window to a selection given in visible cells and schedules
    /// the new range for persistence.
    pub fn commit_zoom(&mut self, selection: Bounds, now: Instant) -> Option<(Range, Range)> {
        self.annotations.discard_pending();
        let ranges = ViewController::zoom_grid(&mut self.window, selection)?;
        self.zoom_selection = None;
        let state = self.view_state();
        self.persistence.persist(state, now);
        self.annotations.request_redraw();
        Some(ranges)
    }

    /// Applies an edited stride value. Returns the stride actually used.
    pub fn set_stride_input(&mut self, input: f64, now: Instant) -> u32 {
        let previous = self.window.stride();
        let stride = self.window.set_stride_input(input);
        if stride != previous {
            tracing::debug!(stride, previous, "stride changed");
            let state = self.view_state();
            self.persistence.persist(state, now);
            self.annotations.request_redraw();
        }
        stride
    }

    /// Removes every annotation. Any write still pending for the old set is
    /// dropped before the cleared state is scheduled.
    pub fn clear_annotations(&mut self, now: Instant) {
        self.annotations.clear();
        self.persistence.cancel();
        let state = self.view_state();
        self.persistence.persist(state, now);
    }

    /// Restores the default window, drops annotations and deletes the stored view.
    pub fn reset(&mut self) -> Result<()> {
        self.cancel_gesture();
        self.window.reset();
        self.annotations.clear();
        self.persistence.delete()
    }

    /// Current window and annotations as a persistable record.
    pub fn view_state(&self) -> ViewState {
        let cells = self.annotations.committed_cells();
        let annotation = (!cells.is_empty()).then_some(ViewAnnotation::Cells { cells });
        self.window.to_view_state(annotation)
    }

    fn seed(&mut self, view: &ViewState) {
        self.window.apply_view(view);
        let rows = self.data.row_count();
        let cols = self.data.col_count();
        match &view.annotation {
            Some(ViewAnnotation::Cells { cells }) => {
                let kept: Vec<CellId> = cells
                    .iter()
                    .copied()
                    .filter(|c| c.row < rows && c.col < cols)
                    .collect();
                if kept.len() < cells.len() {
                    tracing::warn!(
                        dropped = cells.len() - kept.len(),
                        "stored annotation cells outside the dataset"
                    );
                }
                self.annotations.set_cells(kept);
            }
            Some(ViewAnnotation::Bounds { bounds }) => {
                if let Some(b) = bounds.clamped(rows, cols) {
                    self.annotations.set_cells(
                        (b.min_row..=b.max_row)
                            .flat_map(|r| (b.min_col..=b.max_col).map(move |c| CellId::new(r, c))),
                    );
                }
            }
            Some(ViewAnnotation::Selection { .. }) | None => {}
        }
    }

    // --- painting ---

    pub fn pending_overlay_frame(&self) -> Option<FrameToken> {
        self.annotations.pending_frame()
    }

    /// Paints annotations and the zoom rectangle.
    pub fn paint_overlays(&self, canvas: &mut dyn Canvas) {
        let dims = self.cell_dimensions();
        let margins = self.config.heatmap_margins;
        let theme = &self.config.overlay;
        self.annotations
            .paint(canvas, &self.window, dims, &margins, theme);
        self.paint_zoom_selection(canvas, dims);
    }

    /// Runs a coalesced overlay frame. Returns `false` for a superseded token.
    pub fn overlay_frame(&mut self, token: FrameToken, canvas: &mut dyn Canvas) -> bool {
        let dims = self.cell_dimensions();
        let margins = self.config.heatmap_margins;
        if !self.annotations.on_frame(
            token,
            canvas,
            &self.window,
            dims,
            &margins,
            &self.config.overlay,
        ) {
            return false;
        }
        self.paint_zoom_selection(canvas, dims);
        true
    }

    fn paint_zoom_selection(&self, canvas: &mut dyn Canvas, dims: Option<CellDimensions>) {
        let (Some(bounds), Some(dims)) = (self.zoom_selection, dims) else {
            return;
        };
        let theme = &self.config.overlay;
        paint_cell_selection(
            canvas,
            bounds,
            dims,
            &self.config.heatmap_margins,
            theme.zoom_fill,
            theme.zoom_stroke,
            theme.selection_stroke_width,
        );
    }

    fn finish_pending_stroke(&mut self) {
        self.selection.cancel();
        self.zoom_selection = None;
        if self.annotations.commit_pending() {
            let state = self.view_state();
            self.persistence.persist(state, Instant::now());
        }
    }
}

impl<S: ViewStore> ChartSession for HeatmapView<S> {
    fn chart_id(&self) -> &str {
        self.persistence.chart_id()
    }

    fn mount(&mut self) -> Result<()> {
        match self.persistence.load() {
            Ok(Some(view)) => {
                self.seed(&view);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                tracing::warn!(chart = %self.chart_id(), "using default view: {:#}", err);
                Err(err)
            }
        }
    }

    fn tick(&mut self, now: Instant) -> Result<bool> {
        self.persistence.tick(now)
    }

    fn unmount(&mut self) -> Result<bool> {
        self.finish_pending_stroke();
        self.persistence.flush()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.persistence.deadline()
    }
}

impl<S: ViewStore> Drop for HeatmapView<S> {
    fn drop(&mut self) {
        // The persistence layer flushes on its own drop, after this.
        self.finish_pending_stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryViewStore;

    fn view() -> HeatmapView<MemoryViewStore> {
        let data = GridDataset::from_values(vec![vec![0.5; 12]; 30]).unwrap();
        let mut v = HeatmapView::new(MemoryViewStore::new(), "h", data, EngineConfig::default());
        v.set_surface_size(SurfaceSize::new(70.0 + 120.0 + 80.0, 100.0 + 70.0));
        v
    }

    #[test]
    fn test_click_paints_one_cell() {
        let mut v = view();
        let now = Instant::now();
        // Visible grid is 10 rows × 12 cols of 10px cells.
        assert!(v.pointer_down(Point::new(75.0, 5.0)));
        assert!(matches!(v.pointer_up(now), SelectionOutcome::Click(_)));
        assert_eq!(v.annotations().committed_cells(), vec![CellId::new(20, 0)]);
        assert!(v.persistence().is_pending());
    }

    #[test]
    fn test_press_on_margin_is_ignored() {
        let mut v = view();
        assert!(!v.pointer_down(Point::new(10.0, 5.0)));
        assert!(!v.is_capturing());
    }

    #[test]
    fn test_hover_reports_dataset_cell() {
        let v = view();
        let hover = v.hover(Point::new(95.0, 15.0)).unwrap();
        assert_eq!(hover.visible, CellId::new(1, 2));
        assert_eq!(hover.absolute, CellId::new(21, 2));
        assert_eq!(hover.cell.y, 0.5);
    }

    #[test]
    fn test_pixel_ratio_change_repaints_overlay() {
        let mut v = view();
        v.annotations.add_pending(CellId::new(20, 0));
        let token = v.pending_overlay_frame().unwrap();
        let mut canvas = crate::rendering::RecordingCanvas::new();
        assert!(v.overlay_frame(token, &mut canvas));
        assert!(v.pending_overlay_frame().is_none());

        assert!(v.set_pixel_ratio(2.0).is_some());
        assert!(v.pending_overlay_frame().is_some());
        // Same ratio: nothing to resync or repaint.
        let token = v.pending_overlay_frame().unwrap();
        v.overlay_frame(token, &mut canvas);
        assert!(v.set_pixel_ratio(2.0).is_none());
        assert!(v.pending_overlay_frame().is_none());
    }
}
