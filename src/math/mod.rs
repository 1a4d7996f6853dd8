//! # Math Module
//!
//! Small 3D mathematics library used by the manipulator.
//! Provides vectors, affine matrices, quaternions, rays and planes.
//!
//! Types convert to and from `glam` so hosts on a glam stack can hand their
//! matrices straight in.

mod vector2;
mod vector3;
mod matrix4;
mod quaternion;
mod ray;
mod plane;

pub use vector2::Vector2;
pub use vector3::Vector3;
pub use matrix4::Matrix4;
pub use quaternion::Quaternion;
pub use ray::Ray;
pub use plane::Plane;

/// Common math constants.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Half of Pi.
    pub const HALF_PI: f32 = PI / 2.0;
    /// Small epsilon for floating point comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
