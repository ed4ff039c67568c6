use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::annotations::{Bounds, CellId, SelectionBounds};
use super::axis::Range;

/// Visible window on both axes. For line charts `row` is the Y axis and `col` the X axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewRanges {
    pub row: Range,
    pub col: Range,
}

/// Selection or annotation carried by a persisted view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewAnnotation {
    Bounds { bounds: Bounds },
    Cells { cells: Vec<CellId> },
    Selection { bounds: SelectionBounds },
}

/// Persisted record of one chart's view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub range: ViewRanges,
    /// Column sampling interval, always at least 1.
    pub stride: u32,
    #[serde(default)]
    pub annotation: Option<ViewAnnotation>,
}

impl ViewState {
    pub fn new(range: ViewRanges, stride: u32) -> Self {
        Self {
            range,
            stride: stride.max(1),
            annotation: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Option<ViewAnnotation>) -> Self {
        self.annotation = annotation;
        self
    }
}

/// Store-assigned identifier of a persisted view.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub String);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A view as returned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub id: ViewId,
    pub chart_id: String,
    pub state: ViewState,
    pub updated_at: DateTime<Utc>,
}
