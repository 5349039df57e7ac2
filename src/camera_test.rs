#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn screen_world_roundtrip() {
    let camera = Camera { pan_x: 40.0, pan_y: -10.0, zoom: 2.0 };
    let screen = Point::new(100.0, 60.0);
    let world = camera.screen_to_world(screen);
    let back = camera.world_to_screen(world);
    assert_eq!(back, screen);
}

#[test]
fn default_camera_is_identity() {
    let camera = Camera::default();
    let pt = Point::new(12.5, -3.0);
    assert_eq!(camera.screen_to_world(pt), pt);
    assert_eq!(camera.world_to_screen(pt), pt);
}

#[test]
fn viewport_origin_tracks_pan_and_zoom() {
    let camera = Camera { pan_x: 100.0, pan_y: 50.0, zoom: 2.0 };
    let origin = camera.viewport_origin();
    assert_eq!(origin, Point::new(-50.0, -25.0));
}

#[test]
fn rect_center() {
    let rect = Rect::new(10.0, 20.0, 100.0, 40.0);
    assert_eq!(rect.center(), Point::new(60.0, 40.0));
}

#[test]
fn rect_contains_edges_inclusive() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(rect.contains(Point::new(0.0, 0.0)));
    assert!(rect.contains(Point::new(10.0, 10.0)));
    assert!(rect.contains(Point::new(5.0, 5.0)));
    assert!(!rect.contains(Point::new(10.1, 5.0)));
    assert!(!rect.contains(Point::new(-0.1, 5.0)));
}

#[test]
fn camera_serde_roundtrip() {
    let camera = Camera { pan_x: 1.5, pan_y: -2.5, zoom: 0.75 };
    let json = serde_json::to_string(&camera).unwrap();
    let back: Camera = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pan_x, camera.pan_x);
    assert_eq!(back.pan_y, camera.pan_y);
    assert_eq!(back.zoom, camera.zoom);
}
