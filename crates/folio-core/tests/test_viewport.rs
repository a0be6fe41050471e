mod common;

use approx::assert_relative_eq;
use common::{build_raw_tiff, gradient_rgb, small_huge_config, write_temp};
use folio_core::config::ViewerConfig;
use folio_core::geometry::Rect;
use folio_core::io::lazy::LazyImage;
use folio_core::io::source::SourceImage;
use folio_core::pyramid::{Pyramid, PyramidBuilder};
use folio_core::viewport::{level_for_scale, raw_level_for_scale, Viewport};

fn viewport_for(width: u32, height: u32, canvas: (u32, u32)) -> (Viewport, Pyramid) {
    let config = ViewerConfig::default();
    let pyramid = PyramidBuilder::new(config.clone())
        .build(gradient_rgb(width, height).into())
        .unwrap();
    let mut viewport = Viewport::new(&config, canvas.0, canvas.1);
    viewport.attach(&pyramid);
    (viewport, pyramid)
}

/// Image-space coordinate currently under canvas point `(x, y)`.
fn image_point(viewport: &Viewport, x: f64, y: f64) -> (f64, f64) {
    let b = viewport.image_bounds();
    let s = viewport.image_scale();
    ((x - b.x0) / s, (y - b.y0) / s)
}

#[test]
fn test_attach_resets_state() {
    let (mut viewport, pyramid) = viewport_for(400, 300, (800, 600));
    viewport.zoom_in_at(100.0, 100.0);
    viewport.pan_by(30.0, 10.0);
    viewport.add_marker(5.0, 5.0);

    viewport.attach(&pyramid);
    let state = viewport.state();
    assert_relative_eq!(state.image_scale, 1.0);
    assert_relative_eq!(state.scroll_x, 0.0);
    assert_eq!(viewport.image_bounds(), Rect::new(0.0, 0.0, 400.0, 300.0));
    assert!(viewport.markers().is_empty());
}

#[test]
fn test_zoom_in_out_round_trip() {
    let (mut viewport, _pyramid) = viewport_for(400, 300, (800, 600));
    let (px, py) = (123.0, 87.0);
    let before = image_point(&viewport, px, py);

    assert!(viewport.zoom_in_at(px, py));
    let zoomed = image_point(&viewport, px, py);
    assert_relative_eq!(zoomed.0, before.0, epsilon = 1e-9);
    assert_relative_eq!(zoomed.1, before.1, epsilon = 1e-9);

    assert!(viewport.zoom_out_at(px, py));
    assert_relative_eq!(viewport.image_scale(), 1.0, epsilon = 1e-12);
    let b = viewport.image_bounds();
    assert_relative_eq!(b.x0, 0.0, epsilon = 1e-9);
    assert_relative_eq!(b.y1, 300.0, epsilon = 1e-9);
    let after = image_point(&viewport, px, py);
    assert_relative_eq!(after.0, before.0, epsilon = 1e-9);
}

#[test]
fn test_zoom_out_floor() {
    let (mut viewport, _pyramid) = viewport_for(100, 160, (400, 400));
    let mut accepted = 0;
    while viewport.zoom_out_at(50.0, 50.0) {
        accepted += 1;
        assert!(accepted < 100);
    }
    let scale = viewport.image_scale();
    // Rejected because the short side has already shrunk below 30 pixels.
    assert!((100.0 * scale).round() < 30.0);
    assert!((100.0 * scale * 1.2).round() >= 30.0);
    assert_eq!(accepted, 7);
}

#[test]
fn test_zoom_in_limit() {
    let (mut viewport, _pyramid) = viewport_for(50, 50, (200, 120));
    while viewport.zoom_in_at(25.0, 25.0) {
        assert!(viewport.image_scale() < 1000.0);
    }
    // One image pixel may not exceed half the shorter canvas side.
    let scale = viewport.image_scale();
    assert!(scale > 60.0);
    assert!(scale / 1.2 <= 60.0);
}

#[test]
fn test_zoom_pivot_outside_image_rejected() {
    let (mut viewport, _pyramid) = viewport_for(100, 100, (400, 400));
    assert!(!viewport.zoom_in_at(150.0, 50.0));
    // Edges count as outside.
    assert!(!viewport.zoom_in_at(0.0, 50.0));
    assert!(!viewport.zoom_at(50.0, 50.0, 1.0));
    assert!(!viewport.zoom_at(50.0, 50.0, -2.0));
    assert_relative_eq!(viewport.image_scale(), 1.0);
}

#[test]
fn test_no_image_rejects_zoom() {
    let config = ViewerConfig::default();
    let mut viewport = Viewport::new(&config, 300, 200);
    assert!(!viewport.has_image());
    assert!(!viewport.zoom_in_at(10.0, 10.0));
    assert!(viewport.visible_image_rect().is_none());
    assert_eq!(viewport.scroll_region(), Rect::new(0.0, 0.0, 300.0, 200.0));
}

#[test]
fn test_pan_moves_content() {
    let (mut viewport, _pyramid) = viewport_for(1000, 800, (400, 300));
    viewport.pan_by(-100.0, -50.0);
    let state = viewport.state();
    assert_relative_eq!(state.scroll_x, 100.0);
    assert_relative_eq!(state.scroll_y, 50.0);
    assert_eq!(
        viewport.visible_image_rect(),
        Some(Rect::new(100.0, 50.0, 500.0, 350.0))
    );

    viewport.scroll_by(-100.0, 0.0);
    assert_relative_eq!(viewport.state().scroll_x, 0.0);

    viewport.pan_to(-5000.0, 0.0);
    assert!(viewport.visible_image_rect().is_none());
}

#[test]
fn test_canvas_point_includes_scroll() {
    let (mut viewport, _pyramid) = viewport_for(100, 100, (50, 50));
    viewport.pan_to(20.0, 30.0);
    assert_eq!(viewport.canvas_point(5.0, 5.0), (25.0, 35.0));
}

#[test]
fn test_scroll_region_collapses_when_image_fits() {
    let (mut viewport, _pyramid) = viewport_for(100, 100, (400, 300));
    assert_eq!(viewport.scroll_region(), Rect::new(0.0, 0.0, 100.0, 100.0));

    viewport.pan_by(50.0, 20.0);
    assert_eq!(viewport.scroll_region(), Rect::new(0.0, 0.0, 100.0, 100.0));

    // Horizontally the view now sticks out past the image.
    viewport.pan_to(80.0, 0.0);
    assert_eq!(viewport.scroll_region(), Rect::new(0.0, 0.0, 480.0, 100.0));
}

#[test]
fn test_scroll_region_spans_large_image() {
    let (viewport, _pyramid) = viewport_for(1000, 800, (400, 300));
    assert_eq!(viewport.scroll_region(), Rect::new(0.0, 0.0, 1000.0, 800.0));
}

#[test]
fn test_scroll_region_contains_visible_rect() {
    let (mut viewport, _pyramid) = viewport_for(640, 480, (300, 200));
    let steps: [(f64, f64, i32); 8] = [
        (100.0, 100.0, 3),
        (10.0, 190.0, -2),
        (250.0, 20.0, 5),
        (150.0, 100.0, -6),
        (33.3, 77.7, 4),
        (299.0, 1.0, 2),
        (120.0, 60.0, -9),
        (1.0, 1.0, 7),
    ];
    for (i, &(x, y, zooms)) in steps.iter().enumerate() {
        let (cx, cy) = viewport.canvas_point(x, y);
        for _ in 0..zooms.abs() {
            if zooms > 0 {
                viewport.zoom_in_at(cx, cy);
            } else {
                viewport.zoom_out_at(cx, cy);
            }
        }
        viewport.pan_by((i as f64 - 3.5) * 37.0, (3.0 - i as f64) * 21.0);

        if let Some(visible) = viewport.visible_image_rect() {
            let region = viewport.scroll_region();
            assert!(
                region.contains_rect(&visible),
                "step {i}: region {region:?} misses visible {visible:?}"
            );
        }
    }
}

#[test]
fn test_level_boundaries() {
    assert_eq!(level_for_scale(1.0, 5, 2.0), 0);
    assert_eq!(level_for_scale(0.5, 5, 2.0), 1);
    assert_eq!(level_for_scale(0.25, 5, 2.0), 2);
    assert_eq!(level_for_scale(2.0, 5, 2.0), 0);
    assert_eq!(level_for_scale(0.51, 5, 2.0), 0);
    assert_eq!(level_for_scale(0.49, 5, 2.0), 1);
    assert_eq!(level_for_scale(0.01, 3, 2.0), 2);

    assert_eq!(raw_level_for_scale(2.0, 2.0), -1);
    assert_eq!(raw_level_for_scale(1.0, 2.0), 0);
    assert_eq!(raw_level_for_scale(0.1, 3.0), 2);
}

#[test]
fn test_effective_scale_uses_base_scale() {
    let file = write_temp(&build_raw_tiff(&gradient_rgb(200, 100)), ".tif");
    let lazy = LazyImage::open(file.path()).unwrap();
    let config = ViewerConfig {
        min_visible_side: 5.0,
        ..small_huge_config(64, 16)
    };
    let pyramid = PyramidBuilder::new(config.clone())
        .build(SourceImage::Lazy(lazy))
        .unwrap();
    assert_eq!(pyramid.len(), 3);

    let mut viewport = Viewport::new(&config, 80, 60);
    viewport.attach(&pyramid);
    // At scale 1 the display needs more detail than the 64 px base holds.
    assert_relative_eq!(viewport.effective_scale(), 3.125, epsilon = 1e-9);
    assert!(viewport.raw_level_index() < 0);
    assert_eq!(viewport.current_level(), 0);

    while viewport.image_scale() > 0.09 && viewport.zoom_out_at(10.0, 10.0) {}
    assert!(viewport.image_scale() <= 0.09);
    assert_eq!(viewport.raw_level_index(), 2);
    assert_eq!(viewport.current_level(), 2);
}

#[test]
fn test_markers_follow_zoom() {
    let (mut viewport, _pyramid) = viewport_for(200, 200, (400, 400));
    let index = viewport.add_marker(150.0, 50.0);
    assert!(viewport.zoom_at(100.0, 100.0, 2.0));
    let m = viewport.markers()[index];
    assert_relative_eq!(m.x, 200.0);
    assert_relative_eq!(m.y, 0.0);
}
