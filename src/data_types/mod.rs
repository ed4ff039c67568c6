pub mod plot_configs;
pub mod annotations;
pub mod axis;
pub mod data;
pub mod state;

// Re-export everything for convenience
pub use plot_configs::*;
pub use annotations::*;
pub use axis::*;
pub use data::*;
pub use state::*;
