//! Camera module: the viewport contract the manipulator consumes and a
//! perspective camera implementing it.

mod perspective;

pub use perspective::PerspectiveCamera;

use crate::math::{Ray, Vector3};

/// Screen/world conversions for one viewport.
///
/// Screen coordinates are pixels with the origin at the top-left corner and
/// y growing downwards. Depth runs from 0 (near plane) to 1 (far plane).
pub trait Viewport {
    /// Project a world point to `(pixel x, pixel y, depth)`.
    fn project(&self, world: &Vector3) -> Vector3;

    /// Unproject a screen position at the given depth into world space.
    fn unproject(&self, x: f32, y: f32, depth: f32) -> Vector3;

    /// World-space position of the eye.
    fn eye_position(&self) -> Vector3;

    /// Pixels covered by one world unit seen at unit distance.
    ///
    /// Dividing a desired pixel size by this factor and multiplying by the
    /// eye distance gives a world size with constant apparent size.
    fn constant_screen_factor(&self) -> f32;

    /// World ray through a screen position.
    fn pick_ray(&self, x: f32, y: f32) -> Option<Ray> {
        Ray::from_points(&self.unproject(x, y, 0.0), &self.unproject(x, y, 1.0))
    }
}
