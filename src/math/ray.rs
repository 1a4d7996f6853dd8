//! Ray implementation for picking and drag constraints.

use super::consts::EPSILON;
use super::{Plane, Vector3};
use serde::{Deserialize, Serialize};

/// A ray with an origin and direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Vector3,
    /// Direction of the ray (should be normalized).
    pub direction: Vector3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub const fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Ray starting at `near` and pointing through `far`.
    /// Returns `None` when the two points coincide.
    pub fn from_points(near: &Vector3, far: &Vector3) -> Option<Self> {
        (*far - *near)
            .try_normalized()
            .map(|direction| Self::new(*near, direction))
    }

    /// Get a point at distance t along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Apply a matrix to the ray, renormalizing the direction.
    pub fn transformed(&self, m: &super::Matrix4) -> Option<Self> {
        let near = m.transform_point(&self.origin);
        let far = m.transform_point(&self.at(1.0));
        Self::from_points(&near, &far)
    }

    /// Parameter `t` of the point `axis * t` on the line through the origin
    /// along unit `axis` that lies closest to this (infinite) ray line.
    ///
    /// Returns `None` when the ray runs parallel to the axis.
    pub fn closest_parameter_on_axis(&self, axis: &Vector3) -> Option<f32> {
        let a01 = -self.direction.dot(axis);
        let b0 = self.origin.dot(&self.direction);
        let b1 = -self.origin.dot(axis);
        let det = (1.0 - a01 * a01).abs();
        if det < EPSILON {
            return None;
        }
        Some((a01 * b0 - b1) / det)
    }

    /// Closest approach between the ray and the segment `p0..p1`.
    /// Returns `(distance along ray, gap between the two)`.
    pub fn distance_to_segment(&self, p0: &Vector3, p1: &Vector3) -> Option<(f32, f32)> {
        let u = self.direction;
        let v = *p1 - *p0;
        let w = self.origin - *p0;

        let a = u.dot(&u);
        let b = u.dot(&v);
        let c = v.dot(&v);
        let d = u.dot(&w);
        let e = v.dot(&w);

        let denom = a * c - b * b;
        if denom.abs() < 1e-8 {
            return None;
        }

        let s = ((b * e - c * d) / denom).max(0.0);
        let t = ((a * e - b * d) / denom).clamp(0.0, 1.0);

        let closest_ray = self.at(s);
        let closest_segment = *p0 + v * t;
        Some((s, closest_ray.distance_to(&closest_segment)))
    }

    /// Get distance from ray origin to a plane.
    /// Returns None if the ray is parallel to the plane or points away from it.
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(&self.direction);
        if denom.abs() < 1e-8 {
            return None;
        }
        let t = -(self.origin.dot(&plane.normal) + plane.constant) / denom;
        if t >= 0.0 { Some(t) } else { None }
    }

    /// Intersect with a plane.
    /// Returns the intersection point, or None if no intersection.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vector3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }

    /// Intersect with an axis-aligned box given by its corners.
    /// Returns the entry distance along the ray.
    pub fn intersect_box(&self, min: &Vector3, max: &Vector3) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / self.direction.x,
            1.0 / self.direction.y,
            1.0 / self.direction.z,
        );

        let t1 = (min.x - self.origin.x) * inv_dir.x;
        let t2 = (max.x - self.origin.x) * inv_dir.x;
        let t3 = (min.y - self.origin.y) * inv_dir.y;
        let t4 = (max.y - self.origin.y) * inv_dir.y;
        let t5 = (min.z - self.origin.z) * inv_dir.z;
        let t6 = (max.z - self.origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if tmax < 0.0 || tmin > tmax {
            None
        } else {
            Some(tmin.max(0.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_parameter_on_axis() {
        // Ray looking down -Z through x = 2, y = 1.
        let ray = Ray::new(Vector3::new(2.0, 1.0, 10.0), -Vector3::UNIT_Z);
        let t = ray.closest_parameter_on_axis(&Vector3::UNIT_X).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_parallel_axis_has_no_parameter() {
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::UNIT_X);
        assert!(ray.closest_parameter_on_axis(&Vector3::UNIT_X).is_none());
    }

    #[test]
    fn test_distance_to_segment() {
        let ray = Ray::new(Vector3::new(0.5, 0.1, 5.0), -Vector3::UNIT_Z);
        let (s, gap) = ray
            .distance_to_segment(&Vector3::ZERO, &Vector3::UNIT_X)
            .unwrap();
        assert!((s - 5.0).abs() < 1e-5);
        assert!((gap - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_plane_and_box() {
        let ray = Ray::new(Vector3::new(0.0, 5.0, 0.0), -Vector3::UNIT_Y);
        let hit = ray.intersect_plane(&Plane::new(Vector3::UNIT_Y, 0.0)).unwrap();
        assert!(hit.approx_eq(&Vector3::ZERO, 1e-6));

        let t = ray
            .intersect_box(&Vector3::splat(-1.0), &Vector3::splat(1.0))
            .unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray.intersect_box(&Vector3::splat(2.0), &Vector3::splat(3.0)).is_none());
    }

    #[test]
    fn test_from_points_degenerate() {
        assert!(Ray::from_points(&Vector3::ONE, &Vector3::ONE).is_none());
    }
}
