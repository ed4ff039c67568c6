use std::time::Duration;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use super::axis::Range;
use crate::theme::OverlayTheme;
use crate::transform::Margins;

/// Tunables shared by every chart view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub heatmap_margins: Margins,
    pub line_margins: Margins,
    /// Quiet period before a view write, in milliseconds.
    pub view_debounce_ms: u64,
    /// Quiet period before an annotation write, in milliseconds.
    pub annotation_debounce_ms: u64,
    /// Pointer displacement beyond which a press becomes a drag.
    pub drag_threshold_px: f64,
    /// Rows shown by default, counted from the last row.
    pub default_visible_rows: usize,
    /// Columns the default stride aims to show.
    pub target_visible_columns: usize,
    pub line_default_y_range: Range,
    pub overlay: OverlayTheme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heatmap_margins: Margins::new(0.0, 80.0, 70.0, 70.0),
            line_margins: Margins::new(10.0, 30.0, 70.0, 75.0),
            view_debounce_ms: 3000,
            annotation_debounce_ms: 5000,
            drag_threshold_px: 3.0,
            default_visible_rows: 10,
            target_visible_columns: 10,
            line_default_y_range: Range::new(0.0, 1.0),
            overlay: OverlayTheme::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self =
            serde_json::from_str(json).wrap_err("failed to parse engine config")?;
        config.sanitize();
        Ok(config)
    }

    pub fn view_debounce(&self) -> Duration {
        Duration::from_millis(self.view_debounce_ms)
    }

    pub fn annotation_debounce(&self) -> Duration {
        Duration::from_millis(self.annotation_debounce_ms)
    }

    fn sanitize(&mut self) {
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            tracing::warn!(
                value = self.drag_threshold_px,
                "invalid drag threshold, using default"
            );
            self.drag_threshold_px = Self::default().drag_threshold_px;
        }
        self.default_visible_rows = self.default_visible_rows.max(1);
        self.target_visible_columns = self.target_visible_columns.max(1);
        self.line_default_y_range = Range::sanitized(
            self.line_default_y_range.min,
            self.line_default_y_range.max,
            Self::default().line_default_y_range,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "view_debounce_ms": 4000 }"#).unwrap();
        assert_eq!(config.view_debounce(), Duration::from_millis(4000));
        assert_eq!(config.annotation_debounce_ms, 5000);
        assert_eq!(config.heatmap_margins.left, 70.0);
    }

    #[test]
    fn test_invalid_values_sanitized() {
        let config = EngineConfig::from_json(
            r#"{ "drag_threshold_px": -1.0, "default_visible_rows": 0 }"#,
        )
        .unwrap();
        assert_eq!(config.drag_threshold_px, 3.0);
        assert_eq!(config.default_visible_rows, 1);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }
}
