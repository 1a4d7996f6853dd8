//! Perspective camera.

use super::Viewport;
use crate::math::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// A perspective projection camera bound to a viewport size in pixels.
///
/// Matrices are refreshed by every setter so the camera can be read through
/// a shared reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    fov: f32,
    /// Viewport width in pixels.
    width: f32,
    /// Viewport height in pixels.
    height: f32,
    /// Near clipping plane.
    near: f32,
    /// Far clipping plane.
    far: f32,
    /// Camera position.
    position: Vector3,
    /// Camera target (look-at point).
    target: Vector3,
    /// Up vector.
    up: Vector3,
    #[serde(skip)]
    view_matrix: Matrix4,
    #[serde(skip)]
    projection_matrix: Matrix4,
    #[serde(skip)]
    view_projection_matrix: Matrix4,
    #[serde(skip)]
    inverse_view_projection: Matrix4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 1280.0, 720.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera looking at the origin from +Z.
    pub fn new(fov: f32, width: f32, height: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            width,
            height,
            near,
            far,
            position: Vector3::new(0.0, 0.0, 5.0),
            target: Vector3::ZERO,
            up: Vector3::UNIT_Y,
            view_matrix: Matrix4::IDENTITY,
            projection_matrix: Matrix4::IDENTITY,
            view_projection_matrix: Matrix4::IDENTITY,
            inverse_view_projection: Matrix4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// Camera position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Camera target.
    #[inline]
    pub fn target(&self) -> Vector3 {
        self.target
    }

    /// Viewport size in pixels.
    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Set the camera position.
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.update_matrices();
    }

    /// Look at a target from the current position.
    pub fn look_at(&mut self, target: Vector3) {
        self.target = target;
        self.update_matrices();
    }

    /// Set the field of view.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.update_matrices();
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.update_matrices();
    }

    /// Set near and far planes.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.update_matrices();
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> &Matrix4 {
        &self.view_matrix
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> &Matrix4 {
        &self.view_projection_matrix
    }

    /// Recompute all matrices. Needed after deserializing.
    pub fn update_matrices(&mut self) {
        self.view_matrix = Matrix4::look_at(&self.position, &self.target, &self.up);
        self.projection_matrix = Matrix4::perspective(
            self.fov.to_radians(),
            self.width / self.height,
            self.near,
            self.far,
        );
        self.view_projection_matrix = self.projection_matrix.multiply(&self.view_matrix);
        self.inverse_view_projection = self.view_projection_matrix.inverse();
    }

    /// Get the forward direction.
    pub fn forward(&self) -> Vector3 {
        (self.target - self.position).normalized()
    }

    /// Orbit around the target.
    pub fn orbit(&mut self, delta_phi: f32, delta_theta: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();

        let mut theta = offset.z.atan2(offset.x);
        let mut phi = (offset.y / radius).acos();

        theta += delta_phi;
        phi = (phi + delta_theta).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vector3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            );
        self.update_matrices();
    }
}

impl Viewport for PerspectiveCamera {
    fn project(&self, world: &Vector3) -> Vector3 {
        let ndc = self.view_projection_matrix.transform_point(world);
        Vector3::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
            ndc.z,
        )
    }

    fn unproject(&self, x: f32, y: f32, depth: f32) -> Vector3 {
        let ndc = Vector3::new(
            x / self.width * 2.0 - 1.0,
            1.0 - y / self.height * 2.0,
            depth,
        );
        self.inverse_view_projection.transform_point(&ndc)
    }

    fn eye_position(&self) -> Vector3 {
        self.position
    }

    fn constant_screen_factor(&self) -> f32 {
        0.5 * self.height / (self.fov.to_radians() * 0.5).tan()
    }
}
