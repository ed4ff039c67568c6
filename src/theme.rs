use serde::{Deserialize, Serialize};

/// Straight-alpha colour, components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    pub fn alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Colours and stroke widths of the interaction overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayTheme {
    pub annotation_fill: Rgba,
    pub annotation_stroke: Rgba,
    pub annotation_stroke_width: f32,
    pub zoom_fill: Rgba,
    pub zoom_stroke: Rgba,
    pub selection_stroke: Rgba,
    pub selection_stroke_width: f32,
    pub crosshair: Rgba,
}

impl Default for OverlayTheme {
    fn default() -> Self {
        let red = Rgba::from_rgb8(0xef, 0x44, 0x44);
        let blue = Rgba::from_rgb8(0x3b, 0x82, 0xf6);
        Self {
            annotation_fill: red.alpha(0.12),
            annotation_stroke: red,
            annotation_stroke_width: 2.0,
            zoom_fill: blue.alpha(0.25),
            zoom_stroke: blue,
            selection_stroke: blue,
            selection_stroke_width: 1.0,
            crosshair: Rgba::from_rgb8(0x9c, 0xa3, 0xaf),
        }
    }
}
