//! 4x4 Matrix implementation.

use super::{Quaternion, Vector3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A 4x4 matrix stored in column-major order.
/// Used for object, edit, widget and camera transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    /// Matrix elements in column-major order.
    /// [m00, m10, m20, m30, m01, m11, m21, m31, m02, m12, m22, m32, m03, m13, m23, m33]
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Create from column-major array.
    #[inline]
    pub const fn from_cols_array(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Create a matrix whose upper 3x3 columns are the given axes.
    pub fn from_basis(x_axis: &Vector3, y_axis: &Vector3, z_axis: &Vector3) -> Self {
        Self {
            elements: [
                x_axis.x, x_axis.y, x_axis.z, 0.0,
                y_axis.x, y_axis.y, y_axis.z, 0.0,
                z_axis.x, z_axis.y, z_axis.z, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Create a translation matrix.
    pub fn from_translation(v: &Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.set_position(v);
        m
    }

    /// Create a scale matrix.
    pub fn from_scale(v: &Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[0] = v.x;
        m.elements[5] = v.y;
        m.elements[10] = v.z;
        m
    }

    /// Create a rotation matrix around the X axis.
    pub fn from_rotation_x(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_basis(
            &Vector3::UNIT_X,
            &Vector3::new(0.0, c, s),
            &Vector3::new(0.0, -s, c),
        )
    }

    /// Create a rotation matrix around the Z axis.
    pub fn from_rotation_z(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_basis(
            &Vector3::new(c, s, 0.0),
            &Vector3::new(-s, c, 0.0),
            &Vector3::UNIT_Z,
        )
    }

    /// Create a rotation matrix around an arbitrary unit axis.
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        Self::from_quaternion(&Quaternion::from_axis_angle(axis, angle))
    }

    /// Create a rotation matrix from a quaternion.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        Self::from_basis(
            &q.rotate_vector(&Vector3::UNIT_X),
            &q.rotate_vector(&Vector3::UNIT_Y),
            &q.rotate_vector(&Vector3::UNIT_Z),
        )
    }

    /// Create a view matrix (look-at).
    /// Returns the inverse of the camera transform.
    pub fn look_at(eye: &Vector3, target: &Vector3, up: &Vector3) -> Self {
        let f = (*target - *eye).normalized();
        let r = f.cross(up).normalized();
        let u = r.cross(&f);

        Self {
            elements: [
                r.x, u.x, -f.x, 0.0,
                r.y, u.y, -f.y, 0.0,
                r.z, u.z, -f.z, 0.0,
                -r.dot(eye), -u.dot(eye), f.dot(eye), 1.0,
            ],
        }
    }

    /// Create a perspective projection matrix with a 0..1 depth range.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();

        Self {
            elements: [
                f / aspect, 0.0, 0.0, 0.0,
                0.0, f, 0.0, 0.0,
                0.0, 0.0, far / (near - far), -1.0,
                0.0, 0.0, (near * far) / (near - far), 0.0,
            ],
        }
    }

    /// Column `index` of the upper 3x3 block (0 = X axis, 1 = Y, 2 = Z).
    #[inline]
    pub fn axis(&self, index: usize) -> Vector3 {
        let e = &self.elements;
        let c = index.min(2) * 4;
        Vector3::new(e[c], e[c + 1], e[c + 2])
    }

    /// Extract the position (translation) component.
    #[inline]
    pub fn get_position(&self) -> Vector3 {
        Vector3::new(self.elements[12], self.elements[13], self.elements[14])
    }

    /// Set the position (translation) component.
    #[inline]
    pub fn set_position(&mut self, v: &Vector3) -> &mut Self {
        self.elements[12] = v.x;
        self.elements[13] = v.y;
        self.elements[14] = v.z;
        self
    }

    /// Copy of this matrix with the translation zeroed (rotation and scale only).
    #[inline]
    pub fn without_translation(&self) -> Self {
        let mut m = *self;
        m.set_position(&Vector3::ZERO);
        m
    }

    /// Multiply this matrix by another (`self * other`).
    pub fn multiply(&self, other: &Matrix4) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Self { elements: out }
    }

    /// Conjugate `inner` by this matrix: `self * inner * self⁻¹`.
    pub fn conjugate(&self, inner: &Matrix4, inverse: &Matrix4) -> Self {
        self.multiply(inner).multiply(inverse)
    }

    /// Return the inverse, or `None` when the matrix is singular.
    pub fn try_inverse(&self) -> Option<Self> {
        let e = &self.elements;
        let (a00, a10, a20, a30) = (e[0], e[1], e[2], e[3]);
        let (a01, a11, a21, a31) = (e[4], e[5], e[6], e[7]);
        let (a02, a12, a22, a32) = (e[8], e[9], e[10], e[11]);
        let (a03, a13, a23, a33) = (e[12], e[13], e[14], e[15]);

        let s0 = a00 * a11 - a10 * a01;
        let s1 = a00 * a12 - a10 * a02;
        let s2 = a00 * a13 - a10 * a03;
        let s3 = a01 * a12 - a11 * a02;
        let s4 = a01 * a13 - a11 * a03;
        let s5 = a02 * a13 - a12 * a03;

        let c5 = a22 * a33 - a32 * a23;
        let c4 = a21 * a33 - a31 * a23;
        let c3 = a21 * a32 - a31 * a22;
        let c2 = a20 * a33 - a30 * a23;
        let c1 = a20 * a32 - a30 * a22;
        let c0 = a20 * a31 - a30 * a21;

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < f32::MIN_POSITIVE || !det.is_finite() {
            return None;
        }
        let id = 1.0 / det;

        // Rows of the inverse, written back column-major.
        let b00 = (a11 * c5 - a12 * c4 + a13 * c3) * id;
        let b01 = (-a01 * c5 + a02 * c4 - a03 * c3) * id;
        let b02 = (a31 * s5 - a32 * s4 + a33 * s3) * id;
        let b03 = (-a21 * s5 + a22 * s4 - a23 * s3) * id;
        let b10 = (-a10 * c5 + a12 * c2 - a13 * c1) * id;
        let b11 = (a00 * c5 - a02 * c2 + a03 * c1) * id;
        let b12 = (-a30 * s5 + a32 * s2 - a33 * s1) * id;
        let b13 = (a20 * s5 - a22 * s2 + a23 * s1) * id;
        let b20 = (a10 * c4 - a11 * c2 + a13 * c0) * id;
        let b21 = (-a00 * c4 + a01 * c2 - a03 * c0) * id;
        let b22 = (a30 * s4 - a31 * s2 + a33 * s0) * id;
        let b23 = (-a20 * s4 + a21 * s2 - a23 * s0) * id;
        let b30 = (-a10 * c3 + a11 * c1 - a12 * c0) * id;
        let b31 = (a00 * c3 - a01 * c1 + a02 * c0) * id;
        let b32 = (-a30 * s3 + a31 * s1 - a32 * s0) * id;
        let b33 = (a20 * s3 - a21 * s1 + a22 * s0) * id;

        Some(Self {
            elements: [
                b00, b10, b20, b30,
                b01, b11, b21, b31,
                b02, b12, b22, b32,
                b03, b13, b23, b33,
            ],
        })
    }

    /// Return the inverse of this matrix, or the identity when it is singular.
    pub fn inverse(&self) -> Self {
        self.try_inverse().unwrap_or(Self::IDENTITY)
    }

    /// Return the transpose of this matrix.
    pub fn transposed(&self) -> Self {
        let mut m = *self;
        m.elements.swap(1, 4);
        m.elements.swap(2, 8);
        m.elements.swap(3, 12);
        m.elements.swap(6, 9);
        m.elements.swap(7, 13);
        m.elements.swap(11, 14);
        m
    }

    /// Transform a Vector3 as a point (with translation and perspective divide).
    pub fn transform_point(&self, v: &Vector3) -> Vector3 {
        let e = &self.elements;
        let w = 1.0 / (e[3] * v.x + e[7] * v.y + e[11] * v.z + e[15]);
        Vector3 {
            x: (e[0] * v.x + e[4] * v.y + e[8] * v.z + e[12]) * w,
            y: (e[1] * v.x + e[5] * v.y + e[9] * v.z + e[13]) * w,
            z: (e[2] * v.x + e[6] * v.y + e[10] * v.z + e[14]) * w,
        }
    }

    /// Transform a Vector3 as a direction (without translation).
    pub fn transform_direction(&self, v: &Vector3) -> Vector3 {
        let e = &self.elements;
        Vector3 {
            x: e[0] * v.x + e[4] * v.y + e[8] * v.z,
            y: e[1] * v.x + e[5] * v.y + e[9] * v.z,
            z: e[2] * v.x + e[6] * v.y + e[10] * v.z,
        }
    }

    /// Exact identity test.
    pub fn is_identity(&self) -> bool {
        self.elements == Self::IDENTITY.elements
    }

    /// True when the bottom row is (0, 0, 0, 1).
    pub fn is_affine(&self) -> bool {
        let e = &self.elements;
        e[3] == 0.0 && e[7] == 0.0 && e[11] == 0.0 && e[15] == 1.0
    }

    /// Check if approximately equal to another matrix.
    pub fn approx_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }

    /// Convert to column-major 2D array (for GPU uniform buffers).
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let e = &self.elements;
        [
            [e[0], e[1], e[2], e[3]],
            [e[4], e[5], e[6], e[7]],
            [e[8], e[9], e[10], e[11]],
            [e[12], e[13], e[14], e[15]],
        ]
    }
}

impl std::ops::Mul for Matrix4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl std::ops::Mul<Vector3> for Matrix4 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.transform_point(&rhs)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self {
            elements: m.to_cols_array(),
        }
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation() {
        let m = Matrix4::from_translation(&Vector3::new(10.0, 20.0, 30.0));
        let result = m.transform_point(&Vector3::ZERO);
        assert!(result.approx_eq(&Vector3::new(10.0, 20.0, 30.0), 1e-6));
        assert!(m.transform_direction(&Vector3::UNIT_X).approx_eq(&Vector3::UNIT_X, 1e-6));
    }

    #[test]
    fn test_inverse_of_affine() {
        let m = Matrix4::from_translation(&Vector3::new(1.0, 2.0, 3.0))
            * Matrix4::from_rotation_z(0.7)
            * Matrix4::from_scale(&Vector3::new(2.0, 0.5, 3.0));
        let inv = m.try_inverse().unwrap();
        assert!((m * inv).approx_eq(&Matrix4::IDENTITY, 1e-5));
        assert!((inv * m).approx_eq(&Matrix4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_inverse_of_projection() {
        let m = Matrix4::perspective(1.0, 1.5, 0.1, 100.0)
            * Matrix4::look_at(&Vector3::new(0.0, 2.0, 8.0), &Vector3::ZERO, &Vector3::UNIT_Y);
        let inv = m.try_inverse().unwrap();
        let p = Vector3::new(0.3, -0.2, 1.0);
        let back = inv.transform_point(&m.transform_point(&p));
        assert!(back.approx_eq(&p, 1e-3));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = Matrix4::from_scale(&Vector3::new(1.0, 0.0, 1.0));
        assert!(m.try_inverse().is_none());
        assert!(m.inverse().is_identity());
    }

    #[test]
    fn test_rotation_z_maps_y_to_x() {
        let m = Matrix4::from_rotation_z(-std::f32::consts::FRAC_PI_2);
        assert!(m.transform_direction(&Vector3::UNIT_Y).approx_eq(&Vector3::UNIT_X, 1e-6));
        let m = Matrix4::from_rotation_x(std::f32::consts::FRAC_PI_2);
        assert!(m.transform_direction(&Vector3::UNIT_Y).approx_eq(&Vector3::UNIT_Z, 1e-6));
    }

    #[test]
    fn test_axis_angle_matches_quaternion() {
        let axis = Vector3::new(1.0, 2.0, -1.0).normalized();
        let m = Matrix4::from_axis_angle(&axis, 0.4);
        assert!(m.transform_direction(&axis).approx_eq(&axis, 1e-6));
        assert!(m.is_affine());
    }

    #[test]
    fn test_glam_interop() {
        let g = glam::Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let m: Matrix4 = g.into();
        assert!(m.get_position().approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
    }
}
