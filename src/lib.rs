//! lens_view: interactive view engine for interpretability charts

pub mod annotation;
pub mod cache;
pub mod chart_view;
pub mod data_types;
pub mod data_window;
pub mod debounce;
pub mod frame;
pub mod group_index;
pub mod persistence;
pub mod rendering;
pub mod scales;
pub mod selection;
pub mod surface;
pub mod theme;
pub mod transform;
pub mod view_controller;

pub use annotation::AnnotationPainter;
pub use chart_view::{ChartSession, HeatmapView, LineView};
pub use data_types::{
    Bounds, CellId, EngineConfig, GridDataset, LineDataset, Range, SelectionBounds, ViewState,
};
pub use data_window::{GridWindow, LineWindow};
pub use persistence::{MemoryViewStore, ViewPersistence, ViewStore};
pub use selection::{SelectionController, SelectionOutcome};
pub use view_controller::ViewController;
