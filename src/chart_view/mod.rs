//! Per-chart sessions that wire windowing, selection, zoom, annotation and
//! persistence together behind the host's event callbacks.

pub mod heatmap;
pub mod line;

use std::time::Instant;

use eyre::Result;

pub use heatmap::{HeatmapHover, HeatmapView};
pub use line::{LineHover, LineView};

/// Lifecycle shared by every chart session.
///
/// `mount` performs the single read of the stored view, `tick` runs due
/// debounced writes and `unmount` flushes whatever is still pending.
pub trait ChartSession {
    fn chart_id(&self) -> &str;

    /// Seeds the session from the store. On error the defaults stay in place
    /// and the error is returned for the host to surface.
    fn mount(&mut self) -> Result<()>;

    fn tick(&mut self, now: Instant) -> Result<bool>;

    fn unmount(&mut self) -> Result<bool>;

    /// Earliest instant at which `tick` has work to do.
    fn next_deadline(&self) -> Option<Instant>;
}
