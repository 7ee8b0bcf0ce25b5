//! Perspective camera for the point display.

use bevy::math::{Mat4, Vec2, Vec3};

/// Vertical field of view, degrees
pub const FOV_Y_DEGREES: f32 = 70.0;
pub const NEAR: f32 = 0.01;
pub const FAR: f32 = 10.0;
/// Camera sits on +z looking at the origin
pub const EYE_DISTANCE: f32 = 1.0;
/// Half size of the invisible pointer plane at z = 0
pub const POINTER_PLANE_HALF_EXTENT: f32 = 5.0;

/// Surface size plus the fixed camera looking at the z = 0 plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let mut viewport = Self {
            width: 1.0,
            height: 1.0,
        };
        viewport.resize(width, height);
        viewport
    }

    /// Track a new surface size. Degenerate sizes (minimised windows) are
    /// ignored and the previous size kept.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            self.width = width;
            self.height = height;
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn view_projection(&self) -> Mat4 {
        let projection =
            Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect(), NEAR, FAR);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, EYE_DISTANCE), Vec3::ZERO, Vec3::Y);
        projection * view
    }

    /// Cast a ray from the camera through `cursor` (window pixels, origin top
    /// left) and intersect it with the pointer plane.
    pub fn pointer_to_world(&self, cursor: Vec2) -> Option<Vec3> {
        let ndc = Vec2::new(
            cursor.x / self.width * 2.0 - 1.0,
            1.0 - cursor.y / self.height * 2.0,
        );
        let half_height = (FOV_Y_DEGREES.to_radians() * 0.5).tan() * EYE_DISTANCE;
        let hit = Vec3::new(
            ndc.x * half_height * self.aspect(),
            ndc.y * half_height,
            0.0,
        );

        let inside = hit.x.abs() <= POINTER_PLANE_HALF_EXTENT
            && hit.y.abs() <= POINTER_PLANE_HALF_EXTENT;
        inside.then_some(hit)
    }
}
