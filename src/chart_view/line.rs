//! Line chart session: layer × metric curves with snapping, series
//! highlighting and rectangle zoom.

use std::collections::BTreeSet;
use std::time::Instant;

use eyre::Result;

use super::ChartSession;
use crate::data_types::{
    EngineConfig, LineDataset, Range, SelectionBounds, ViewAnnotation, ViewState,
};
use crate::data_window::LineWindow;
use crate::frame::{FrameScheduler, FrameToken};
use crate::persistence::{ViewPersistence, ViewStore};
use crate::rendering::{paint_crosshair, paint_pixel_selection, Canvas};
use crate::selection::{LineAnchor, LineHitTester, SelectionController, SelectionOutcome};
use crate::surface::{Surface, SurfaceSync};
use crate::transform::{Margins, PlotArea, PlotTransform, Point, SurfaceSize};
use crate::view_controller::ViewController;

/// Crosshair and tooltip data for the pointer position.
#[derive(Clone, Debug, PartialEq)]
pub struct LineHover {
    /// Discrete x the pointer snapped to.
    pub x_value: f64,
    pub x_px: f64,
    /// Y domain value under the pointer.
    pub y_value: f64,
    /// Series whose value at `x_value` is closest to `y_value`.
    pub series: Option<String>,
}

pub struct LineView<S: ViewStore> {
    data: LineDataset,
    config: EngineConfig,
    window: LineWindow,
    surface: SurfaceSync,
    selection: SelectionController<LineAnchor>,
    provisional: Option<SelectionBounds>,
    committed: Option<SelectionBounds>,
    highlighted: BTreeSet<String>,
    hover: Option<LineHover>,
    frames: FrameScheduler,
    persistence: ViewPersistence<S>,
}

impl<S: ViewStore> LineView<S> {
    pub fn new(
        store: S,
        chart_id: impl Into<String>,
        data: LineDataset,
        config: EngineConfig,
    ) -> Self {
        let window = LineWindow::for_dataset(&data, &config);
        Self {
            persistence: ViewPersistence::new(store, chart_id, config.view_debounce()),
            selection: SelectionController::new(config.drag_threshold_px),
            surface: SurfaceSync::default(),
            provisional: None,
            committed: None,
            highlighted: BTreeSet::new(),
            hover: None,
            frames: FrameScheduler::new(),
            window,
            data,
            config,
        }
    }

    pub fn data(&self) -> &LineDataset {
        &self.data
    }

    pub fn window(&self) -> &LineWindow {
        &self.window
    }

    pub fn persistence(&self) -> &ViewPersistence<S> {
        &self.persistence
    }

    pub fn margins(&self) -> Margins {
        self.config.line_margins
    }

    /// Series to hand to the chart renderer, trimmed to the x range.
    pub fn filtered(&self) -> LineDataset {
        self.window.filter(&self.data)
    }

    pub fn transform(&self) -> PlotTransform {
        let area = PlotArea::new(self.surface.displayed_size(), &self.config.line_margins);
        PlotTransform::new(self.window.x_range(), self.window.y_range(), area)
    }

    /// Snapping targets: the x values inside the current range, or every x
    /// when the range holds none.
    fn snap_targets(&self) -> Vec<f64> {
        let visible = self.window.visible_xs();
        if visible.is_empty() {
            self.window.unique_sorted_x().to_vec()
        } else {
            visible
        }
    }

    // --- surface ---

    pub fn set_surface_size(&mut self, size: SurfaceSize) -> Option<FrameToken> {
        let token = self.surface.observe_resize(size);
        if token.is_some() {
            self.frames.request();
        }
        token
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) -> Option<FrameToken> {
        let token = self.surface.observe_pixel_ratio(ratio);
        if token.is_some() {
            self.frames.request();
        }
        token
    }

    pub fn surface(&self) -> &SurfaceSync {
        &self.surface
    }

    pub fn surface_frame<T, F>(&mut self, token: FrameToken, target: &mut T, redraw: F) -> bool
    where
        T: Surface + ?Sized,
        F: FnOnce(&mut T, SurfaceSize),
    {
        self.surface.on_frame(token, target, redraw)
    }

    // --- hover and highlight ---

    /// Series whose value at `x` is nearest `y`; ties go to the earlier series.
    pub fn nearest_series(&self, x: f64, y: f64) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for line in &self.data.lines {
            let Some(v) = line.value_at(x) else {
                continue;
            };
            let d = (v - y).abs();
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((line.id.as_str(), d));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn hover(&mut self, p: Point) -> Option<&LineHover> {
        let transform = self.transform();
        let next = if p.is_finite() && transform.area.contains(p) {
            transform
                .snap_x(p.x, &self.snap_targets())
                .map(|snapped| {
                    let y_value = transform.screen_to_data(p).y;
                    LineHover {
                        x_value: snapped.value,
                        x_px: snapped.px,
                        y_value,
                        series: self
                            .nearest_series(snapped.value, y_value)
                            .map(str::to_string),
                    }
                })
        } else {
            None
        };
        if next != self.hover {
            self.hover = next;
            self.frames.request();
        }
        self.hover.as_ref()
    }

    pub fn clear_hover(&mut self) {
        if self.hover.take().is_some() {
            self.frames.request();
        }
    }

    pub fn highlighted_series(&self) -> &BTreeSet<String> {
        &self.highlighted
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted.contains(id)
    }

    /// Flips the highlight of one series. Returns whether it is now highlighted.
    pub fn toggle_highlight(&mut self, id: &str) -> bool {
        let on = if self.highlighted.remove(id) {
            false
        } else {
            self.highlighted.insert(id.to_string());
            true
        };
        tracing::debug!(series = id, on, "series highlight toggled");
        on
    }

    // --- selection and zoom ---

    pub fn is_capturing(&self) -> bool {
        self.selection.is_capturing()
    }

    /// Selection in domain units, as persisted.
    pub fn selection(&self) -> Option<SelectionBounds> {
        self.committed
    }

    /// Selection rectangle in pixels: the drag in progress, or the committed one.
    pub fn selection_px(&self) -> Option<SelectionBounds> {
        if self.provisional.is_some() {
            return self.provisional;
        }
        let domain = self.committed?;
        let transform = self.transform();
        let a = transform.data_to_screen(Point::new(domain.x_min, domain.y_min));
        let b = transform.data_to_screen(Point::new(domain.x_max, domain.y_max));
        Some(
            SelectionBounds {
                x_min: a.x,
                y_min: a.y,
                x_max: b.x,
                y_max: b.y,
            }
            .normalized(),
        )
    }

    pub fn pointer_down(&mut self, p: Point) -> bool {
        let xs = self.snap_targets();
        let hit = LineHitTester::new(self.transform(), &xs);
        if !self.selection.pointer_down(p, &hit) {
            return false;
        }
        self.provisional = self.selection.provisional();
        self.frames.request();
        true
    }

    pub fn pointer_move(&mut self, p: Point) -> Option<SelectionBounds> {
        let xs = self.snap_targets();
        let hit = LineHitTester::new(self.transform(), &xs);
        let bounds = self.selection.pointer_move(p, &hit)?;
        if self.selection.has_moved() {
            self.provisional = Some(bounds);
            self.frames.request();
        }
        Some(bounds)
    }

    /// Ends the gesture: a drag commits a selection, a click toggles the
    /// highlight of the series nearest the press.
    pub fn pointer_up(&mut self, now: Instant) -> SelectionOutcome<LineAnchor> {
        let outcome = self.selection.pointer_up();
        self.provisional = None;
        let transform = self.transform();
        match outcome {
            SelectionOutcome::Committed(px) => {
                let domain = ViewController::selection_to_domain(px, &transform);
                self.committed = Some(domain);
                let state = self.view_state();
                self.persistence.persist(state, now);
            }
            SelectionOutcome::Click(anchor) => {
                let y = transform
                    .screen_to_data(Point::new(anchor.x_px, anchor.y_px))
                    .y;
                if let Some(id) = self.nearest_series(anchor.x_value, y).map(str::to_string) {
                    self.toggle_highlight(&id);
                }
            }
            SelectionOutcome::Cancelled => {}
        }
        self.frames.request();
        outcome
    }

    /// Zooms into the committed selection and clears it.
    pub fn zoom_into_selection(&mut self, now: Instant) -> Option<(Range, Range)> {
        let selection = self.selection_px()?;
        let transform = self.transform();
        let ranges = ViewController::zoom_line(&mut self.window, selection, &transform);
        self.committed = None;
        let state = self.view_state();
        self.persistence.persist(state, now);
        self.frames.request();
        Some(ranges)
    }

    /// Drops the selection. A write still pending for it is cancelled before
    /// the cleared state is scheduled.
    pub fn clear_selection(&mut self, now: Instant) {
        self.selection.cancel();
        self.provisional = None;
        self.committed = None;
        self.persistence.cancel();
        let state = self.view_state();
        self.persistence.persist(state, now);
        self.frames.request();
    }

    /// Full x extent, default y range, no selection; deletes the stored view.
    pub fn reset(&mut self) -> Result<()> {
        self.selection.cancel();
        self.provisional = None;
        self.committed = None;
        self.window.reset();
        self.frames.request();
        self.persistence.delete()
    }

    pub fn view_state(&self) -> ViewState {
        let annotation = self
            .committed
            .map(|bounds| ViewAnnotation::Selection { bounds });
        self.window.to_view_state(annotation)
    }

    fn seed(&mut self, view: &ViewState) {
        self.window.apply_view(view);
        if let Some(ViewAnnotation::Selection { bounds }) = &view.annotation {
            self.committed = Some(bounds.normalized());
        }
        self.frames.request();
    }

    // --- painting ---

    pub fn pending_overlay_frame(&self) -> Option<FrameToken> {
        self.frames.pending()
    }

    /// Paints the crosshair and the selection rectangle.
    pub fn paint_overlays(&self, canvas: &mut dyn Canvas) {
        canvas.clear();
        let area = self.transform().area;
        let theme = &self.config.overlay;
        if let Some(hover) = &self.hover {
            paint_crosshair(canvas, hover.x_px, &area, theme.crosshair);
        }
        if let Some(selection) = self.selection_px() {
            paint_pixel_selection(
                canvas,
                selection,
                &area,
                theme.selection_stroke,
                theme.selection_stroke_width,
            );
        }
    }

    pub fn overlay_frame(&mut self, token: FrameToken, canvas: &mut dyn Canvas) -> bool {
        if !self.frames.fire(token) {
            return false;
        }
        self.paint_overlays(canvas);
        true
    }
}

impl<S: ViewStore> ChartSession for LineView<S> {
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
        self.selection.cancel();
        self.provisional = None;
        self.persistence.flush()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.persistence.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::LineSeries;
    use crate::persistence::MemoryViewStore;

    fn view() -> LineView<MemoryViewStore> {
        let data = LineDataset::new(vec![
            LineSeries::new("a", &[(0.0, 0.1), (1.0, 0.2), (2.0, 0.9)]),
            LineSeries::new("b", &[(0.0, 0.5), (1.0, 0.6), (2.0, 0.3)]),
        ]);
        let mut v = LineView::new(MemoryViewStore::new(), "l", data, EngineConfig::default());
        // Plot area: left 75, top 10, 200 × 100.
        v.set_surface_size(SurfaceSize::new(75.0 + 200.0 + 30.0, 10.0 + 100.0 + 70.0));
        v
    }

    #[test]
    fn test_nearest_series() {
        let v = view();
        assert_eq!(v.nearest_series(2.0, 0.8), Some("a"));
        assert_eq!(v.nearest_series(2.0, 0.35), Some("b"));
        assert_eq!(v.nearest_series(7.0, 0.5), None);
    }

    #[test]
    fn test_hover_snaps_to_layer() {
        let mut v = view();
        // x = 0.9 in domain, y = 0.2 → nearest layer 1, series a.
        let hover = v.hover(Point::new(75.0 + 90.0, 10.0 + 80.0)).cloned().unwrap();
        assert_eq!(hover.x_value, 1.0);
        assert_eq!(hover.x_px, 175.0);
        assert_eq!(hover.series.as_deref(), Some("a"));
        assert!(v.hover(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_click_toggles_highlight() {
        let mut v = view();
        let now = Instant::now();
        let p = Point::new(75.0 + 200.0, 10.0 + 10.0);
        assert!(v.pointer_down(p));
        assert!(matches!(v.pointer_up(now), SelectionOutcome::Click(_)));
        assert!(v.is_highlighted("a"));
        assert!(v.pointer_down(p));
        v.pointer_up(now);
        assert!(!v.is_highlighted("a"));
        assert!(!v.persistence().is_pending());
    }

    #[test]
    fn test_pixel_ratio_change_repaints_overlay() {
        let mut v = view();
        let token = v.pending_overlay_frame().unwrap();
        let mut canvas = crate::rendering::RecordingCanvas::new();
        assert!(v.overlay_frame(token, &mut canvas));
        assert!(v.pending_overlay_frame().is_none());

        assert!(v.set_pixel_ratio(1.5).is_some());
        assert!(v.pending_overlay_frame().is_some());
    }
}
