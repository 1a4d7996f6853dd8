//! Plane implementation.

use super::consts::EPSILON;
use super::Vector3;
use serde::{Deserialize, Serialize};

/// An infinite plane defined by a normal and constant (distance from origin).
/// The plane equation is: normal · point + constant = 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Plane {
    /// Normal vector of the plane (should be normalized).
    pub normal: Vector3,
    /// Negative distance from origin along the normal.
    pub constant: f32,
}

impl Plane {
    /// Create a new plane.
    #[inline]
    pub const fn new(normal: Vector3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Create a plane from normal and a point on the plane.
    #[inline]
    pub fn from_normal_and_point(normal: Vector3, point: &Vector3) -> Self {
        let n = normal.normalized();
        Self {
            normal: n,
            constant: -point.dot(&n),
        }
    }

    /// Signed distance from a point to the plane.
    #[inline]
    pub fn distance_to_point(&self, point: &Vector3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Where the infinite line through `near` and `far` crosses the plane.
    ///
    /// Returns `None` when both points sit at the same height above the plane.
    pub fn intersect_line(&self, near: &Vector3, far: &Vector3) -> Option<Vector3> {
        let d1 = self.distance_to_point(near);
        let d2 = self.distance_to_point(far);
        if (d2 - d1).abs() < EPSILON {
            return None;
        }
        Some(near.lerp(far, -d1 / (d2 - d1)))
    }
}
