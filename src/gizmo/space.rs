//! Coordinate frame resolution (world, object-local, surface normal).

use super::config::SpaceMode;
use super::handle::Axis;
use crate::math::{Matrix4, Vector3};

/// An orthonormal frame embedded in a 4x4 matrix, with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceFrame {
    /// Requested space mode.
    pub mode: SpaceMode,
    /// Frame axes as columns, no translation.
    pub matrix: Matrix4,
    /// Inverse (transpose) of `matrix`.
    pub inverse: Matrix4,
}

impl Default for SpaceFrame {
    fn default() -> Self {
        Self::WORLD
    }
}

impl SpaceFrame {
    /// World axes.
    pub const WORLD: Self = Self {
        mode: SpaceMode::World,
        matrix: Matrix4::IDENTITY,
        inverse: Matrix4::IDENTITY,
    };

    /// Resolve the frame for `mode`.
    ///
    /// `object` is the local matrix of the first selected object and
    /// `normal` the object-space surface normal (only read in normal mode,
    /// zero when there is no hit). Degenerate inputs fall back
    /// NORMAL → LOCAL → WORLD.
    pub fn resolve(mode: SpaceMode, object: Option<&Matrix4>, normal: Vector3) -> Self {
        let Some(m) = object else {
            return Self::WORLD.with_mode(mode);
        };
        let frame = match mode {
            SpaceMode::World => None,
            SpaceMode::Local => Self::orthonormal_from_matrix(m),
            SpaceMode::Normal => Self::from_surface_normal(m, &normal)
                .or_else(|| Self::orthonormal_from_matrix(m)),
        };
        frame.unwrap_or(Self::WORLD).with_mode(mode)
    }

    /// Frame from three orthonormal axes.
    pub fn from_axes(x: &Vector3, y: &Vector3, z: &Vector3) -> Self {
        let matrix = Matrix4::from_basis(x, y, z);
        Self {
            mode: SpaceMode::World,
            matrix,
            inverse: matrix.transposed(),
        }
    }

    /// Gram-Schmidt the X and Y columns of `m` into a right-handed frame.
    pub fn orthonormal_from_matrix(m: &Matrix4) -> Option<Self> {
        let raw_y = m.axis(1);
        let x = m.axis(0).try_normalized()?;
        let y = raw_y
            .reject_from(&x)
            .try_normalized()
            .or_else(|| raw_y.try_normalized())?;
        let z = x
            .cross(&y)
            .try_normalized()
            .or_else(|| m.axis(2).reject_from(&x).try_normalized())?;
        let y = z.cross(&x).try_normalized()?;
        Some(Self::from_axes(&x, &y, &z))
    }

    /// Frame whose Z axis is the object's surface normal in world space.
    ///
    /// X is built from whichever object axis is more nearly perpendicular
    /// to the normal.
    pub fn from_surface_normal(m: &Matrix4, normal: &Vector3) -> Option<Self> {
        let n = m.without_translation().transform_direction(normal).try_normalized()?;
        let mesh_x = m.axis(0).normalized();
        let mesh_y = m.axis(1).normalized();

        let (first, second) = if mesh_x.dot(&n).abs() < mesh_y.dot(&n).abs() {
            (mesh_x, mesh_y)
        } else {
            (mesh_y, mesh_x)
        };
        let x = first
            .cross(&n)
            .try_normalized()
            .or_else(|| second.cross(&n).try_normalized())?;
        let y = n.cross(&x).try_normalized()?;
        Some(Self::from_axes(&x, &y, &n))
    }

    fn with_mode(mut self, mode: SpaceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Unit direction of one frame axis in world space.
    #[inline]
    pub fn axis(&self, axis: Axis) -> Vector3 {
        self.matrix.axis(axis.index()).normalized()
    }

    /// True for the world space mode.
    #[inline]
    pub fn is_world(&self) -> bool {
        self.mode == SpaceMode::World
    }

    /// Columns have unit length and are mutually orthogonal.
    pub fn is_orthonormal(&self, epsilon: f32) -> bool {
        let c = [self.matrix.axis(0), self.matrix.axis(1), self.matrix.axis(2)];
        c.iter().all(|v| (v.length() - 1.0).abs() < epsilon)
            && c[0].dot(&c[1]).abs() < epsilon
            && c[1].dot(&c[2]).abs() < epsilon
            && c[0].dot(&c[2]).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheared() -> Matrix4 {
        let mut m = Matrix4::from_translation(&Vector3::new(3.0, -1.0, 2.0))
            * Matrix4::from_axis_angle(&Vector3::new(1.0, 1.0, 0.0).normalized(), 0.8)
            * Matrix4::from_scale(&Vector3::new(2.0, 0.5, 3.0));
        // Lean Y towards X.
        m.elements[4] += 0.7;
        m
    }

    #[test]
    fn test_world_is_identity() {
        let frame = SpaceFrame::resolve(SpaceMode::World, Some(&sheared()), Vector3::UNIT_Z);
        assert!(frame.matrix.is_identity());
        assert!(frame.is_world());
    }

    #[test]
    fn test_local_is_orthonormal_for_sheared_matrix() {
        let m = sheared();
        let frame = SpaceFrame::resolve(SpaceMode::Local, Some(&m), Vector3::ZERO);
        assert!(frame.is_orthonormal(1e-5));
        assert!(frame.axis(Axis::X).approx_eq(&m.axis(0).normalized(), 1e-5));
        assert!((frame.matrix * frame.inverse).approx_eq(&Matrix4::IDENTITY, 1e-5));
        // Right-handed.
        let z = frame.axis(Axis::X).cross(&frame.axis(Axis::Y));
        assert!(z.approx_eq(&frame.axis(Axis::Z), 1e-5));
    }

    #[test]
    fn test_normal_frame_z_follows_normal() {
        let m = Matrix4::from_rotation_z(0.5);
        let frame = SpaceFrame::resolve(SpaceMode::Normal, Some(&m), Vector3::UNIT_X);
        assert!(frame.is_orthonormal(1e-5));
        let expected = m.transform_direction(&Vector3::UNIT_X);
        assert!(frame.axis(Axis::Z).approx_eq(&expected, 1e-5));
        assert_eq!(frame.mode, SpaceMode::Normal);
    }

    #[test]
    fn test_zero_normal_falls_back_to_local() {
        let m = sheared();
        let normal = SpaceFrame::resolve(SpaceMode::Normal, Some(&m), Vector3::ZERO);
        let local = SpaceFrame::resolve(SpaceMode::Local, Some(&m), Vector3::ZERO);
        assert!(normal.matrix.approx_eq(&local.matrix, 1e-6));
    }

    #[test]
    fn test_no_selection_falls_back_to_world() {
        let frame = SpaceFrame::resolve(SpaceMode::Local, None, Vector3::ZERO);
        assert!(frame.matrix.is_identity());
        assert_eq!(frame.mode, SpaceMode::Local);
    }

    #[test]
    fn test_collapsed_matrix_falls_back_to_world() {
        let m = Matrix4::from_scale(&Vector3::ZERO);
        let frame = SpaceFrame::resolve(SpaceMode::Local, Some(&m), Vector3::ZERO);
        assert!(frame.matrix.is_identity());
    }

    #[test]
    fn test_parallel_columns_use_z_orthogonalized() {
        let m = Matrix4::from_cols_array([
            1.0, 0.0, 0.0, 0.0,
            2.0, 0.0, 0.0, 0.0,
            1.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        let frame = SpaceFrame::resolve(SpaceMode::Local, Some(&m), Vector3::ZERO);
        assert!(frame.is_orthonormal(1e-5));
        assert!(frame.axis(Axis::X).approx_eq(&Vector3::UNIT_X, 1e-6));
        assert!(frame.axis(Axis::Z).approx_eq(&Vector3::UNIT_Y, 1e-6));
    }

    #[test]
    fn test_all_columns_parallel_falls_back_to_world() {
        let m = Matrix4::from_cols_array([
            1.0, 0.0, 0.0, 0.0,
            2.0, 0.0, 0.0, 0.0,
            -3.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        let frame = SpaceFrame::resolve(SpaceMode::Local, Some(&m), Vector3::ZERO);
        assert!(frame.matrix.is_identity());
        assert_eq!(frame.mode, SpaceMode::Local);
    }

    #[test]
    fn test_many_random_frames_are_orthonormal() {
        let mut seed = 0x2545_f491_u32;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed as f32 / u32::MAX as f32) * 2.0 - 1.0
        };
        for _ in 0..64 {
            let m = Matrix4::from_cols_array([
                next(), next(), next(), 0.0,
                next(), next(), next(), 0.0,
                next(), next(), next(), 0.0,
                next(), next(), next(), 1.0,
            ]);
            let n = Vector3::new(next(), next(), next());
            for mode in [SpaceMode::Local, SpaceMode::Normal] {
                let frame = SpaceFrame::resolve(mode, Some(&m), n);
                assert!(frame.is_orthonormal(1e-3), "{mode:?} {m:?}");
            }
        }
    }
}
