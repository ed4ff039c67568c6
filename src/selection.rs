//! Pointer press-drag-release state machine producing rectangular selections.
//!
//! The host forwards pointer events in arrival order. While
//! [`SelectionController::is_capturing`] is true it must route window-level
//! move/up events here, so a drag that leaves the surface still completes.

use std::fmt::Debug;

use crate::data_types::{Bounds, CellId, SelectionBounds};
use crate::transform::{
    cell_dimensions, pixel_to_cell, CellDimensions, Margins, PlotTransform, Point, SurfaceSize,
};

/// Endpoint type of a selection, and how two endpoints become normalised bounds.
pub trait SelectionAnchor: Copy + Debug + PartialEq {
    type Bounds: Copy + Debug + PartialEq;

    fn bounds(start: Self, end: Self) -> Self::Bounds;
}

impl SelectionAnchor for CellId {
    type Bounds = Bounds;

    fn bounds(start: Self, end: Self) -> Bounds {
        Bounds::from_corners(start, end)
    }
}

/// Line-chart endpoint: the snapped x (domain and pixel) and the raw y pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineAnchor {
    pub x_value: f64,
    pub x_px: f64,
    pub y_px: f64,
}

impl SelectionAnchor for LineAnchor {
    /// Pixel-space bounds.
    type Bounds = SelectionBounds;

    fn bounds(start: Self, end: Self) -> SelectionBounds {
        SelectionBounds {
            x_min: start.x_px,
            y_min: start.y_px,
            x_max: end.x_px,
            y_max: end.y_px,
        }
        .normalized()
    }
}

/// Maps pointer positions to selection anchors.
pub trait HitTest {
    type Anchor: SelectionAnchor;

    /// Anchor for a press. `None` means the press is outside the plotting area.
    fn anchor_at(&self, p: Point) -> Option<Self::Anchor>;

    /// Anchor for a move during a drag. `None` leaves the end side unchanged.
    fn track(&self, p: Point) -> Option<Self::Anchor> {
        self.anchor_at(p)
    }
}

/// Hit testing over the visible grid of a heatmap.
#[derive(Clone, Copy, Debug)]
pub struct GridHitTester {
    pub dims: Option<CellDimensions>,
    pub margins: Margins,
    pub rows: usize,
    pub cols: usize,
}

impl GridHitTester {
    pub fn new(surface: SurfaceSize, margins: Margins, rows: usize, cols: usize) -> Self {
        Self {
            dims: cell_dimensions(surface, &margins, rows, cols),
            margins,
            rows,
            cols,
        }
    }
}

impl HitTest for GridHitTester {
    type Anchor = CellId;

    fn anchor_at(&self, p: Point) -> Option<CellId> {
        let dims = self.dims?;
        pixel_to_cell(p.x, p.y, dims, &self.margins, self.rows, self.cols)
    }
}

/// Hit testing over a line chart, snapping x to the discrete layer values.
#[derive(Clone, Copy, Debug)]
pub struct LineHitTester<'a> {
    pub transform: PlotTransform,
    pub xs: &'a [f64],
}

impl<'a> LineHitTester<'a> {
    pub fn new(transform: PlotTransform, xs: &'a [f64]) -> Self {
        Self { transform, xs }
    }

    fn snap(&self, p: Point) -> Option<LineAnchor> {
        let snapped = self.transform.snap_x(p.x, self.xs)?;
        Some(LineAnchor {
            x_value: snapped.value,
            x_px: snapped.px,
            y_px: p.y,
        })
    }
}

impl HitTest for LineHitTester<'_> {
    type Anchor = LineAnchor;

    fn anchor_at(&self, p: Point) -> Option<LineAnchor> {
        if !p.is_finite() || !self.transform.area.contains(p) {
            return None;
        }
        self.snap(p)
    }

    fn track(&self, p: Point) -> Option<LineAnchor> {
        if !p.is_finite() {
            return None;
        }
        self.snap(p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState<A> {
    Idle,
    Dragging {
        start_pos: Point,
        anchor: A,
        end: A,
        moved: bool,
    },
}

/// Result of a pointer release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectionOutcome<A: SelectionAnchor> {
    /// The pointer moved past the threshold: a normalised selection.
    Committed(A::Bounds),
    /// No real movement: a plain click at the anchor.
    Click(A),
    /// Release without an active drag.
    Cancelled,
}

/// `Idle → Dragging → Idle` selection state machine, one drag at a time.
#[derive(Clone, Debug)]
pub struct SelectionController<A: SelectionAnchor> {
    state: DragState<A>,
    threshold_px: f64,
}

impl<A: SelectionAnchor> SelectionController<A> {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            state: DragState::Idle,
            threshold_px,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Whether window-level move/up events must be routed to this controller.
    pub fn is_capturing(&self) -> bool {
        self.is_dragging()
    }

    /// `true` once the current drag has moved past the click threshold.
    pub fn has_moved(&self) -> bool {
        matches!(self.state, DragState::Dragging { moved: true, .. })
    }

    pub fn anchor(&self) -> Option<A> {
        match self.state {
            DragState::Dragging { anchor, .. } => Some(anchor),
            DragState::Idle => None,
        }
    }

    pub fn end(&self) -> Option<A> {
        match self.state {
            DragState::Dragging { end, .. } => Some(end),
            DragState::Idle => None,
        }
    }

    /// Normalised bounds of the drag in progress.
    pub fn provisional(&self) -> Option<A::Bounds> {
        match self.state {
            DragState::Dragging { anchor, end, .. } => Some(A::bounds(anchor, end)),
            DragState::Idle => None,
        }
    }

    /// Starts a drag. Returns `false` when the press misses the plotting area
    /// or a drag is already active.
    pub fn pointer_down<H>(&mut self, p: Point, hit: &H) -> bool
    where
        H: HitTest<Anchor = A> + ?Sized,
    {
        if self.is_dragging() {
            tracing::debug!("pointer down ignored, drag already active");
            return false;
        }
        let Some(anchor) = hit.anchor_at(p) else {
            return false;
        };
        self.state = DragState::Dragging {
            start_pos: p,
            anchor,
            end: anchor,
            moved: false,
        };
        tracing::debug!(?anchor, "drag started");
        true
    }

    /// Moves the end side of the drag. Returns the updated provisional bounds.
    pub fn pointer_move<H>(&mut self, p: Point, hit: &H) -> Option<A::Bounds>
    where
        H: HitTest<Anchor = A> + ?Sized,
    {
        let threshold = self.threshold_px;
        let DragState::Dragging {
            start_pos,
            anchor,
            end,
            moved,
        } = &mut self.state
        else {
            return None;
        };
        if (p.x - start_pos.x).abs() > threshold || (p.y - start_pos.y).abs() > threshold {
            *moved = true;
        }
        if let Some(next) = hit.track(p) {
            *end = next;
        }
        Some(A::bounds(*anchor, *end))
    }

    /// Ends the drag.
    pub fn pointer_up(&mut self) -> SelectionOutcome<A> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        match state {
            DragState::Idle => SelectionOutcome::Cancelled,
            DragState::Dragging {
                anchor, moved: false, ..
            } => SelectionOutcome::Click(anchor),
            DragState::Dragging { anchor, end, .. } => {
                let bounds = A::bounds(anchor, end);
                tracing::debug!(?bounds, "selection committed");
                SelectionOutcome::Committed(bounds)
            }
        }
    }

    /// Abandons the drag without producing a selection.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
