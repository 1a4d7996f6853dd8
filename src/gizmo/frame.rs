//! Widget placement: pivot, orientation and constant screen size.

use super::space::SpaceFrame;
use crate::camera::Viewport;
use crate::math::consts::EPSILON;
use crate::math::{Matrix4, Quaternion, Vector3};

/// The transform shared by every handle.
///
/// `matrix = translate(pivot) * scale(scale_factor) * space`.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetFrame {
    pivot: Vector3,
    space: SpaceFrame,
    distance_to_eye: f32,
    scale_factor: f32,
    view_rotation: Matrix4,
    matrix: Matrix4,
}

impl Default for WidgetFrame {
    fn default() -> Self {
        Self {
            pivot: Vector3::ZERO,
            space: SpaceFrame::WORLD,
            distance_to_eye: 0.0,
            scale_factor: 1.0,
            view_rotation: Matrix4::IDENTITY,
            matrix: Matrix4::IDENTITY,
        }
    }
}

impl WidgetFrame {
    /// Create a frame at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Full recompute while idle: new pivot, space, eye distance and view
    /// ring orientation.
    pub fn update(
        &mut self,
        pivot: Vector3,
        space: SpaceFrame,
        viewport: &dyn Viewport,
        screen_size: f32,
    ) {
        let eye = viewport.eye_position();
        self.pivot = pivot;
        self.space = space;
        self.distance_to_eye = eye.distance_to(&pivot);
        self.scale_factor =
            self.distance_to_eye * screen_size / viewport.constant_screen_factor().max(EPSILON);
        self.view_rotation = if space.is_world() {
            let to_eye = space.inverse.transform_direction(&(eye - pivot)).normalized();
            Matrix4::from_quaternion(&Quaternion::from_rotation_arc(&Vector3::UNIT_Y, &to_eye))
        } else {
            Matrix4::IDENTITY
        };
        self.compose();
    }

    /// Move the frame to a new pivot while editing. Scale, space and view
    /// ring stay as captured when the edit started.
    pub fn follow(&mut self, pivot: Vector3) {
        self.pivot = pivot;
        self.compose();
    }

    fn compose(&mut self) {
        self.matrix = Matrix4::from_translation(&self.pivot)
            * Matrix4::from_scale(&Vector3::splat(self.scale_factor))
            * self.space.matrix;
    }

    /// Pivot position.
    #[inline]
    pub fn pivot(&self) -> Vector3 {
        self.pivot
    }

    /// Active coordinate frame.
    #[inline]
    pub fn space(&self) -> &SpaceFrame {
        &self.space
    }

    /// Eye distance captured at the last idle update.
    #[inline]
    pub fn distance_to_eye(&self) -> f32 {
        self.distance_to_eye
    }

    /// World units per widget unit.
    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Orientation of the view-aligned rings.
    #[inline]
    pub fn view_rotation(&self) -> &Matrix4 {
        &self.view_rotation
    }

    /// Combined place, scale and orient matrix.
    #[inline]
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::gizmo::config::SpaceMode;

    #[test]
    fn test_apparent_size_is_distance_invariant() {
        let mut camera = PerspectiveCamera::new(60.0, 800.0, 600.0, 0.1, 500.0);
        let mut frame = WidgetFrame::new();
        let mut sizes = Vec::new();
        for z in [4.0, 12.0, 40.0] {
            camera.set_position(Vector3::new(0.0, 0.0, z));
            frame.update(Vector3::ZERO, SpaceFrame::WORLD, &camera, 80.0);
            let edge = frame.matrix().transform_point(&Vector3::UNIT_X);
            let a = camera.project(&Vector3::ZERO);
            let b = camera.project(&edge);
            sizes.push(b.x - a.x);
        }
        for size in sizes {
            assert!((size - 80.0).abs() < 0.5, "{size}");
        }
    }

    #[test]
    fn test_view_ring_faces_eye_in_world_space() {
        let mut camera = PerspectiveCamera::default();
        camera.set_position(Vector3::new(3.0, 4.0, 0.0));
        let mut frame = WidgetFrame::new();
        frame.update(Vector3::ZERO, SpaceFrame::WORLD, &camera, 80.0);
        let normal = frame.view_rotation().transform_direction(&Vector3::UNIT_Y);
        assert!(normal.approx_eq(&Vector3::new(0.6, 0.8, 0.0), 1e-5));
    }

    #[test]
    fn test_view_ring_identity_outside_world_space() {
        let camera = PerspectiveCamera::default();
        let mut frame = WidgetFrame::new();
        let local = SpaceFrame::resolve(SpaceMode::Local, Some(&Matrix4::from_rotation_z(0.3)), Vector3::ZERO);
        frame.update(Vector3::ZERO, local, &camera, 80.0);
        assert!(frame.view_rotation().is_identity());
    }

    #[test]
    fn test_follow_keeps_scale() {
        let camera = PerspectiveCamera::default();
        let mut frame = WidgetFrame::new();
        frame.update(Vector3::ZERO, SpaceFrame::WORLD, &camera, 80.0);
        let scale = frame.scale_factor();
        frame.follow(Vector3::new(0.0, 0.0, 4.0));
        assert_eq!(frame.scale_factor(), scale);
        assert!(frame.matrix().get_position().approx_eq(&Vector3::new(0.0, 0.0, 4.0), 1e-6));
    }
}
