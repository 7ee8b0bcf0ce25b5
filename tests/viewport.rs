//! Viewport and Display Settings Tests
//!
//! Resizing, projection aspect and pointer picking on the z = 0 plane.
//!
//! # Running tests
//! ```bash
//! cargo test --test viewport
//! ```

use bevy::math::{Vec2, Vec4};
use morphfield::render::{DisplaySettings, Viewport, FOV_Y_DEGREES, POINTER_MARKER_RADIUS};

fn project(viewport: &Viewport, x: f32, y: f32) -> Vec2 {
    let clip = viewport.view_projection() * Vec4::new(x, y, 0.0, 1.0);
    Vec2::new(clip.x / clip.w, clip.y / clip.w)
}

#[test]
fn test_resize_keeps_particle_count() {
    let mut display = DisplaySettings {
        side: 64,
        ..Default::default()
    };
    display.resize(800.0, 600.0);
    display.resize(400.0, 300.0);

    assert_eq!(display.particle_count(), 64 * 64);
    assert!((display.viewport.aspect() - 4.0 / 3.0).abs() < 1e-6);
    let params = display.display_params();
    assert_eq!(params.viewport, [400.0, 300.0]);
    assert_eq!(params.side, 64);
}

#[test]
fn test_degenerate_resize_is_ignored() {
    let mut viewport = Viewport::new(1024.0, 768.0);
    viewport.resize(0.0, 0.0);
    viewport.resize(-5.0, 100.0);
    viewport.resize(f32::NAN, 100.0);
    assert_eq!(viewport.size(), Vec2::new(1024.0, 768.0));
}

#[test]
fn test_origin_projects_to_screen_centre() {
    let viewport = Viewport::new(1280.0, 720.0);
    let centre = project(&viewport, 0.0, 0.0);
    assert!(centre.length() < 1e-6);
}

#[test]
fn test_projection_follows_aspect() {
    // A unit square stays square on screen: NDC x shrinks with a wider surface
    for (w, h) in [(1280.0, 720.0), (600.0, 800.0)] {
        let viewport = Viewport::new(w, h);
        let p = project(&viewport, 0.1, 0.1);
        let aspect = w / h;
        assert!((p.y / p.x - aspect).abs() < 1e-4, "{}x{}: {:?}", w, h, p);
    }
}

#[test]
fn test_plane_edge_matches_field_of_view() {
    let viewport = Viewport::new(1000.0, 1000.0);
    let half = (FOV_Y_DEGREES.to_radians() * 0.5).tan();
    let top = project(&viewport, 0.0, half);
    assert!((top.y - 1.0).abs() < 1e-4);
}

#[test]
fn test_centre_cursor_hits_origin() {
    let viewport = Viewport::new(800.0, 600.0);
    let hit = viewport.pointer_to_world(Vec2::new(400.0, 300.0)).unwrap();
    assert!(hit.length() < 1e-6);
}

#[test]
fn test_pointer_round_trips_through_projection() {
    let viewport = Viewport::new(800.0, 600.0);
    let cursor = Vec2::new(600.0, 150.0);
    let hit = viewport.pointer_to_world(cursor).unwrap();
    assert!(hit.x > 0.0 && hit.y > 0.0, "top right quadrant: {:?}", hit);

    let ndc = project(&viewport, hit.x, hit.y);
    let back = Vec2::new((ndc.x + 1.0) * 0.5 * 800.0, (1.0 - ndc.y) * 0.5 * 600.0);
    assert!((back - cursor).length() < 1e-2, "{:?}", back);
}

#[test]
fn test_pointer_far_outside_plane_is_dropped() {
    // A very wide surface reaches beyond the 10x10 plane at its edges
    let viewport = Viewport::new(20_000.0, 100.0);
    assert!(viewport.pointer_to_world(Vec2::new(0.0, 50.0)).is_none());
    assert!(viewport.pointer_to_world(Vec2::new(10_000.0, 50.0)).is_some());
}

#[test]
fn test_pointer_marker_is_one_extra_instance() {
    let display = DisplaySettings {
        side: 16,
        ..Default::default()
    };
    assert_eq!(display.particle_count(), 256);
    assert_eq!(display.instance_count(), 257);
}

#[test]
fn test_pointer_marker_follows_picked_point() {
    let mut display = DisplaySettings::default();
    display.resize(800.0, 600.0);
    let hit = display
        .viewport
        .pointer_to_world(Vec2::new(200.0, 450.0))
        .unwrap();
    display.pointer = hit;

    let params = display.display_params();
    assert_eq!(params.pointer, [hit.x, hit.y, 0.0, POINTER_MARKER_RADIUS]);

    // Marker centre lands back under the cursor
    let ndc = project(&display.viewport, hit.x, hit.y);
    let screen = Vec2::new((ndc.x + 1.0) * 400.0, (1.0 - ndc.y) * 300.0);
    assert!((screen - Vec2::new(200.0, 450.0)).length() < 1e-2);
}

#[test]
fn test_pointer_marker_starts_at_origin() {
    let params = DisplaySettings::default().display_params();
    assert_eq!(params.pointer, [0.0, 0.0, 0.0, POINTER_MARKER_RADIUS]);
}
