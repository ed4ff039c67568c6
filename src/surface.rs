//! Keeps a drawing surface's backing buffer in step with its displayed size
//! and the device pixel ratio.

use crate::frame::{FrameScheduler, FrameToken};
use crate::transform::SurfaceSize;

/// Backing-store operations of a host drawing surface.
pub trait Surface {
    /// Resizes the pixel buffer, in device pixels.
    fn set_backing_size(&mut self, width: u32, height: u32);
    /// Resets the drawing transform to a uniform `scale`.
    fn set_transform(&mut self, scale: f64);
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

fn backing_extent(displayed: f64, ratio: f64) -> u32 {
    (displayed.max(0.0) * ratio).round().clamp(1.0, u32::MAX as f64) as u32
}

/// Batches resize and pixel-ratio notifications into one redraw per frame.
#[derive(Debug)]
pub struct SurfaceSync {
    displayed: SurfaceSize,
    pixel_ratio: f64,
    backing: (u32, u32),
    needs_resize: bool,
    frames: FrameScheduler,
}

impl SurfaceSync {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            displayed: SurfaceSize::default(),
            pixel_ratio: sanitize_ratio(pixel_ratio),
            backing: (0, 0),
            needs_resize: true,
            frames: FrameScheduler::new(),
        }
    }

    pub fn displayed_size(&self) -> SurfaceSize {
        self.displayed
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Backing buffer size last applied to the surface.
    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.frames.pending()
    }

    /// Records an observed container size. Returns the frame to wait for, if
    /// anything changed.
    pub fn observe_resize(&mut self, size: SurfaceSize) -> Option<FrameToken> {
        if size == self.displayed && !self.needs_resize {
            return None;
        }
        self.displayed = size;
        self.needs_resize = true;
        Some(self.frames.request())
    }

    /// Records a device-pixel-ratio change (e.g. the window moved to another monitor).
    pub fn observe_pixel_ratio(&mut self, ratio: f64) -> Option<FrameToken> {
        let ratio = sanitize_ratio(ratio);
        if (ratio - self.pixel_ratio).abs() < f64::EPSILON && !self.needs_resize {
            return None;
        }
        self.pixel_ratio = ratio;
        self.needs_resize = true;
        Some(self.frames.request())
    }

    /// Asks for a redraw without a geometry change.
    pub fn request_redraw(&mut self) -> FrameToken {
        self.frames.request()
    }

    pub fn cancel_redraw(&mut self) {
        self.frames.cancel();
    }

    /// Runs one animation frame. Stale tokens are ignored; otherwise the
    /// backing store is synced if needed and `redraw` runs exactly once.
    pub fn on_frame<S, F>(&mut self, token: FrameToken, surface: &mut S, redraw: F) -> bool
    where
        S: Surface + ?Sized,
        F: FnOnce(&mut S, SurfaceSize),
    {
        if !self.frames.fire(token) {
            return false;
        }
        if self.needs_resize {
            let width = backing_extent(self.displayed.width, self.pixel_ratio);
            let height = backing_extent(self.displayed.height, self.pixel_ratio);
            surface.set_backing_size(width, height);
            surface.set_transform(self.pixel_ratio);
            self.backing = (width, height);
            self.needs_resize = false;
            tracing::trace!(width, height, ratio = self.pixel_ratio, "surface resynced");
        }
        redraw(surface, self.displayed);
        true
    }
}

impl Default for SurfaceSync {
    fn default() -> Self {
        Self::new(1.0)
    }
}
