#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn measured(width: f64, height: f64) -> Viewport {
    let mut vp = Viewport::default();
    vp.resize(width, height);
    vp.set_origin(ScreenRect::new(0.0, 0.0, width, height));
    vp
}

// =============================================================
// Layout
// =============================================================

#[test]
fn new_viewport_is_unmeasured() {
    let vp = Viewport::default();
    assert!(!vp.is_measured());
    assert!(vp.origin().is_none());
    assert_eq!(vp.dpr, 1.0);
}

#[test]
fn backing_size_scales_by_dpr() {
    let mut vp = measured(800.0, 600.0);
    vp.set_device_pixel_ratio(2.0);
    assert_eq!(vp.backing_size(), (1600, 1200));
}

#[test]
fn backing_size_rounds_fractional_dpr() {
    let mut vp = measured(101.0, 51.0);
    vp.set_device_pixel_ratio(1.5);
    assert_eq!(vp.backing_size(), (152, 77));
}

#[test]
fn resize_clamps_negative_sizes() {
    let mut vp = Viewport::default();
    vp.resize(-10.0, 20.0);
    assert_eq!(vp.width, 0.0);
    assert_eq!(vp.height, 20.0);
}

#[test]
fn set_dpr_reports_change() {
    let mut vp = Viewport::default();
    assert!(vp.set_device_pixel_ratio(2.0));
    assert!(!vp.set_device_pixel_ratio(2.0));
}

#[test]
fn set_dpr_ignores_invalid_values() {
    let mut vp = Viewport::default();
    assert!(!vp.set_device_pixel_ratio(0.0));
    assert!(!vp.set_device_pixel_ratio(f64::NAN));
    assert!(!vp.set_device_pixel_ratio(-1.0));
    assert_eq!(vp.dpr, 1.0);
}

#[test]
fn to_logical_before_measurement_is_none() {
    let vp = Viewport::default();
    assert!(vp.to_logical(Point::new(5.0, 5.0)).is_none());
}

// =============================================================
// Zoom
// =============================================================

#[test]
fn zoom_before_measurement_is_noop() {
    let mut vp = Viewport::default();
    assert!(!vp.zoom_at_point(Point::new(10.0, 10.0), ZoomDirection::In));
    assert!(!vp.zoom_at_center(ZoomDirection::In));
    assert_eq!(vp.camera.zoom, 1.0);
}

#[test]
fn zoom_in_adds_one_step() {
    let mut vp = measured(800.0, 600.0);
    assert!(vp.zoom_at_point(Point::new(0.0, 0.0), ZoomDirection::In));
    assert_eq!(vp.camera.zoom, 1.1);
}

#[test]
fn zoom_keeps_anchor_point_fixed() {
    let mut vp = measured(800.0, 600.0);
    vp.camera = Camera { pan_x: 37.0, pan_y: -12.5, zoom: 1.3 };
    let anchor = Point::new(321.0, 123.0);
    let before = vp.to_logical(anchor).unwrap();
    assert!(vp.zoom_at_point(anchor, ZoomDirection::In));
    let after = vp.to_logical(anchor).unwrap();
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
}

#[test]
fn zoom_anchor_holds_with_offset_origin() {
    let mut vp = Viewport::default();
    vp.resize(500.0, 400.0);
    vp.set_origin(ScreenRect::new(40.0, 60.0, 500.0, 400.0));
    let anchor = Point::new(140.0, 90.0);
    for _ in 0..15 {
        let before = vp.to_logical(anchor).unwrap();
        vp.zoom_at_point(anchor, ZoomDirection::Out);
        let after = vp.to_logical(anchor).unwrap();
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }
}

#[test]
fn zoom_at_center_keeps_center_fixed() {
    let mut vp = measured(800.0, 600.0);
    let center = Point::new(400.0, 300.0);
    let before = vp.to_logical(center).unwrap();
    vp.zoom_at_center(ZoomDirection::Out);
    let after = vp.to_logical(center).unwrap();
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
    assert_eq!(vp.camera.zoom, 0.9);
}

#[test]
fn zoom_in_is_clamped_at_max() {
    let mut vp = measured(800.0, 600.0);
    vp.camera.zoom = 3.95;
    for _ in 0..10 {
        vp.zoom_at_point(Point::new(100.0, 100.0), ZoomDirection::In);
        assert!(vp.camera.zoom <= 4.0);
    }
    assert_eq!(vp.camera.zoom, 4.0);
}

#[test]
fn zoom_out_is_clamped_at_min() {
    let mut vp = measured(800.0, 600.0);
    vp.camera.zoom = 0.05;
    for _ in 0..10 {
        vp.zoom_at_point(Point::new(100.0, 100.0), ZoomDirection::Out);
        assert!(vp.camera.zoom >= 0.01);
    }
    assert_eq!(vp.camera.zoom, 0.01);
}

#[test]
fn zoom_at_bound_reports_no_change() {
    let mut vp = measured(800.0, 600.0);
    vp.camera.zoom = 4.0;
    let pan = vp.pan_offset();
    assert!(!vp.zoom_at_point(Point::new(10.0, 10.0), ZoomDirection::In));
    assert_eq!(vp.pan_offset(), pan);
}

#[test]
fn zoom_steps_do_not_drift() {
    let mut vp = measured(800.0, 600.0);
    for _ in 0..25 {
        vp.zoom_at_center(ZoomDirection::In);
    }
    for _ in 0..25 {
        vp.zoom_at_center(ZoomDirection::Out);
    }
    assert_eq!(vp.camera.zoom, 1.0);
}

#[test]
fn zoom_respects_configured_limits() {
    let config = Config { max_zoom: 1.2, ..Config::default() };
    let mut vp = Viewport::new(&config);
    vp.set_origin(ScreenRect::new(0.0, 0.0, 100.0, 100.0));
    for _ in 0..5 {
        vp.zoom_at_center(ZoomDirection::In);
    }
    assert_eq!(vp.camera.zoom, 1.2);
}

#[test]
fn zoom_percent_rounds() {
    let mut vp = Viewport::default();
    vp.camera.zoom = 0.456;
    assert_eq!(vp.zoom_percent(), 46.0);
}

#[test]
fn wheel_direction_mapping() {
    assert_eq!(ZoomDirection::from_wheel(-3.0), Some(ZoomDirection::In));
    assert_eq!(ZoomDirection::from_wheel(3.0), Some(ZoomDirection::Out));
    assert_eq!(ZoomDirection::from_wheel(0.0), None);
}

#[test]
fn round_to_two_places() {
    assert_eq!(round_to(1.23456, 2), 1.23);
    assert_eq!(round_to(0.1 + 0.2, 2), 0.3);
}

// =============================================================
// Pan
// =============================================================

#[test]
fn pan_before_measurement_is_noop() {
    let mut vp = Viewport::default();
    assert!(!vp.pan(Point::new(10.0, 10.0)));
    assert_eq!(vp.pan_offset(), Point::new(0.0, 0.0));
}

#[test]
fn pan_divides_by_zoom_and_dpr() {
    let mut vp = measured(800.0, 600.0);
    vp.camera.zoom = 2.0;
    vp.set_device_pixel_ratio(2.0);
    assert!(vp.pan(Point::new(40.0, -8.0)));
    assert!(approx_eq(vp.camera.pan_x, 10.0));
    assert!(approx_eq(vp.camera.pan_y, -2.0));
}

#[test]
fn pan_accumulates() {
    let mut vp = measured(800.0, 600.0);
    vp.pan(Point::new(5.0, 0.0));
    vp.pan(Point::new(5.0, 3.0));
    assert_eq!(vp.pan_offset(), Point::new(10.0, 3.0));
}

#[test]
fn set_pan_offset_replaces() {
    let mut vp = Viewport::default();
    vp.set_pan_offset(Point::new(-4.0, 9.0));
    assert_eq!(vp.camera.pan_x, -4.0);
    assert_eq!(vp.camera.pan_y, 9.0);
}
