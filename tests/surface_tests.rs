use lens_view::frame::FrameScheduler;
use lens_view::surface::{Surface, SurfaceSync};
use lens_view::transform::SurfaceSize;

#[derive(Default)]
struct FakeSurface {
    backing: (u32, u32),
    scale: f64,
    resizes: usize,
    redraws: usize,
}

impl Surface for FakeSurface {
    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
        self.resizes += 1;
    }

    fn set_transform(&mut self, scale: f64) {
        self.scale = scale;
    }
}

fn redraw(surface: &mut FakeSurface, _size: SurfaceSize) {
    surface.redraws += 1;
}

#[test]
fn test_backing_size_follows_pixel_ratio() {
    let mut sync = SurfaceSync::new(2.0);
    let mut surface = FakeSurface::default();
    let token = sync.observe_resize(SurfaceSize::new(300.5, 150.0)).unwrap();
    assert!(sync.on_frame(token, &mut surface, redraw));
    assert_eq!(surface.backing, (601, 300));
    assert_eq!(surface.scale, 2.0);
    assert_eq!(sync.backing_size(), (601, 300));
    assert_eq!(surface.redraws, 1);
}

#[test]
fn test_resize_storm_draws_once() {
    let mut sync = SurfaceSync::new(1.0);
    let mut surface = FakeSurface::default();
    let mut tokens = Vec::new();
    for w in 100..110 {
        tokens.extend(sync.observe_resize(SurfaceSize::new(w as f64, 80.0)));
    }
    let drawn = tokens
        .iter()
        .filter(|t| sync.on_frame(**t, &mut surface, redraw))
        .count();
    assert_eq!(drawn, 1);
    assert_eq!(surface.redraws, 1);
    assert_eq!(surface.resizes, 1);
    assert_eq!(surface.backing, (109, 80));
}

#[test]
fn test_pixel_ratio_change_resyncs() {
    let mut sync = SurfaceSync::new(1.0);
    let mut surface = FakeSurface::default();
    let t = sync.observe_resize(SurfaceSize::new(100.0, 50.0)).unwrap();
    sync.on_frame(t, &mut surface, redraw);

    assert!(sync.observe_pixel_ratio(1.0).is_none());
    let t = sync.observe_pixel_ratio(1.5).unwrap();
    sync.on_frame(t, &mut surface, redraw);
    assert_eq!(surface.backing, (150, 75));
    assert_eq!(surface.scale, 1.5);

    // Invalid ratios fall back to 1.
    let t = sync.observe_pixel_ratio(f64::NAN).unwrap();
    sync.on_frame(t, &mut surface, redraw);
    assert_eq!(surface.backing, (100, 50));
}

#[test]
fn test_plain_redraw_keeps_backing() {
    let mut sync = SurfaceSync::new(1.0);
    let mut surface = FakeSurface::default();
    let t = sync.observe_resize(SurfaceSize::new(10.0, 10.0)).unwrap();
    sync.on_frame(t, &mut surface, redraw);
    assert!(sync.observe_resize(SurfaceSize::new(10.0, 10.0)).is_none());

    let t = sync.request_redraw();
    assert!(sync.on_frame(t, &mut surface, redraw));
    assert_eq!(surface.resizes, 1);
    assert_eq!(surface.redraws, 2);

    let t = sync.request_redraw();
    sync.cancel_redraw();
    assert!(!sync.on_frame(t, &mut surface, redraw));
}

#[test]
fn test_frame_scheduler_single_pending() {
    let mut frames = FrameScheduler::new();
    assert!(!frames.is_pending());
    let a = frames.request();
    let b = frames.request();
    assert_eq!(frames.pending(), Some(b));
    assert!(!frames.fire(a));
    assert!(frames.fire_pending());
    assert!(!frames.fire(b));
}
