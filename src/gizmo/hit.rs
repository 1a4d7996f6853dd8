//! Handle hit testing and the picking contract.

use super::handle::{HandleGeometry, HandleKind};
use crate::camera::Viewport;
use crate::math::consts::PI;
use crate::math::{Matrix4, Plane, Ray, Vector3};

/// Segments used to approximate a full ring when picking.
const RING_SEGMENTS: usize = 64;

/// Pick geometry of one handle placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleShape {
    /// Handle the shape belongs to.
    pub kind: HandleKind,
    /// Local-to-world matrix of the geometry.
    pub matrix: Matrix4,
    /// Geometry in its local frame.
    pub geometry: HandleGeometry,
}

/// A ray hit on a handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleHit {
    /// Handle that was hit.
    pub kind: HandleKind,
    /// World-space hit point.
    pub point: Vector3,
    /// Distance from the ray origin along the ray.
    pub distance: f32,
}

impl HandleShape {
    /// Test a world ray against this shape.
    pub fn intersect(&self, ray: &Ray) -> Option<HandleHit> {
        let inverse = self.matrix.try_inverse()?;
        let local = ray.transformed(&inverse)?;
        let t = intersect_geometry(&local, &self.geometry)?;
        let point = self.matrix.transform_point(&local.at(t));
        Some(HandleHit {
            kind: self.kind,
            point,
            distance: (point - ray.origin).dot(&ray.direction),
        })
    }
}

/// Nearest hit of a world ray among `shapes`.
pub fn pick_handles(ray: &Ray, shapes: &[HandleShape]) -> Option<HandleHit> {
    shapes
        .iter()
        .filter_map(|shape| shape.intersect(ray))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

fn intersect_geometry(ray: &Ray, geometry: &HandleGeometry) -> Option<f32> {
    match *geometry {
        HandleGeometry::Arrow {
            length,
            thickness,
            cone_radius,
            cone_length,
        } => {
            let half = length * 0.5;
            let tip = Vector3::new(0.0, half, 0.0);
            let shaft = hit_capsule(ray, &Vector3::new(0.0, -half, 0.0), &tip, thickness);
            let cone = hit_capsule(
                ray,
                &Vector3::new(0.0, half - cone_length, 0.0),
                &tip,
                cone_radius,
            );
            nearest(shaft, cone)
        }
        HandleGeometry::Plane { width, height } => {
            let normal = width.cross(&height).try_normalized()?;
            let t = ray.distance_to_plane(&Plane::new(normal, 0.0))?;
            let p = ray.at(t);
            // Edges are perpendicular, so each coordinate is a plain projection.
            let u = p.dot(&width) / width.length_squared();
            let v = p.dot(&height) / height.length_squared();
            ((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)).then_some(t)
        }
        HandleGeometry::Ring {
            radius,
            thickness,
            arc,
        } => {
            let steps = ((RING_SEGMENTS as f32 * arc / (2.0 * PI)).ceil() as usize).max(1);
            let point = |i: usize| {
                let (s, c) = (arc * i as f32 / steps as f32).sin_cos();
                Vector3::new(radius * c, 0.0, radius * s)
            };
            (0..steps)
                .filter_map(|i| hit_capsule(ray, &point(i), &point(i + 1), thickness))
                .min_by(f32::total_cmp)
        }
        HandleGeometry::Cube { side } => {
            let h = side * 0.5;
            ray.intersect_box(&Vector3::splat(-h), &Vector3::splat(h))
        }
    }
}

fn hit_capsule(ray: &Ray, p0: &Vector3, p1: &Vector3, radius: f32) -> Option<f32> {
    let (s, gap) = ray.distance_to_segment(p0, p1)?;
    (gap <= radius).then_some(s)
}

fn nearest(a: Option<f32>, b: Option<f32>) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Picking services the manipulator consumes.
pub trait Picking {
    /// Hit test the cursor against handle shapes, remembering the hit point.
    fn intersect_handles(
        &mut self,
        viewport: &dyn Viewport,
        shapes: &[HandleShape],
        x: f32,
        y: f32,
    ) -> Option<HandleKind>;

    /// World point of the last successful intersection.
    fn intersection_point(&self) -> Vector3;

    /// Local-space surface normal at the last mesh hit, zero when there is none.
    fn surface_normal(&self) -> Vector3;
}

/// Picking against handles through a viewport, with the mesh surface hit
/// supplied by the host's own mesh picker.
#[derive(Debug, Clone, Default)]
pub struct ViewportPicker {
    last_point: Vector3,
    surface_normal: Vector3,
}

impl ViewportPicker {
    /// Create a picker with no hit recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a surface hit: world point and local-space normal.
    pub fn set_surface_hit(&mut self, point: Vector3, normal: Vector3) {
        self.last_point = point;
        self.surface_normal = normal;
    }

    /// Forget the surface normal.
    pub fn clear_surface_hit(&mut self) {
        self.surface_normal = Vector3::ZERO;
    }
}

impl Picking for ViewportPicker {
    fn intersect_handles(
        &mut self,
        viewport: &dyn Viewport,
        shapes: &[HandleShape],
        x: f32,
        y: f32,
    ) -> Option<HandleKind> {
        let ray = viewport.pick_ray(x, y)?;
        let hit = pick_handles(&ray, shapes)?;
        self.last_point = hit.point;
        Some(hit.kind)
    }

    fn intersection_point(&self) -> Vector3 {
        self.last_point
    }

    fn surface_normal(&self) -> Vector3 {
        self.surface_normal
    }
}
