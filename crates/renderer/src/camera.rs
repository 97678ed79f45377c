//! View camera for the decal pass.

use engine_core::{angle_vectors, Mat4, Vec3};

/// Camera with configurable FOV, clipping planes and viewport.
///
/// The world is Z-up and angles are `(pitch, yaw, roll)` degrees; view space
/// is right-handed looking down -Z, as the culling code expects.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub angles: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Viewport size in pixels.
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            angles: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 4.0,
            far: 8192.0,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl Camera {
    /// Create a new camera at the given position and view angles.
    pub fn new(position: Vec3, angles: Vec3) -> Self {
        Self {
            position,
            angles,
            ..Default::default()
        }
    }

    /// Update the viewport (call on window resize).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn aspect(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height.max(1) as f32
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let axes = angle_vectors(self.angles);
        Mat4::look_at_rh(self.position, self.position + axes.forward, axes.up)
    }

    /// Get the projection matrix (OpenGL depth range, finite far plane).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), self.aspect(), self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Pixel coordinates of a world point, `None` when behind the camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<(f32, f32)> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * self.viewport_width as f32;
        let y = (1.0 - ndc.y) * 0.5 * self.viewport_height as f32;
        Some((x, y))
    }
}
