//! Vertex-array mesh with a per-vertex mask.

use super::{EditableMesh, GeometryUpdate};
use crate::core::MeshId;
use crate::math::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// A mesh holding plain vertex positions and mask weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMesh {
    /// Unique identifier.
    id: MeshId,
    /// Object name.
    name: String,
    /// Local vertex positions.
    positions: Vec<Vector3>,
    /// Edit weight per vertex.
    mask: Vec<f32>,
    /// Local-to-world matrix.
    matrix: Matrix4,
    /// Pending edit matrix.
    #[serde(skip)]
    edit_matrix: Matrix4,
    /// Local-space center.
    center: Vector3,
    /// Local bounding box (min, max).
    bounds: (Vector3, Vector3),
}

impl EditMesh {
    /// Create a mesh from local positions. Every vertex starts fully editable
    /// and the center is the middle of the bounding box.
    pub fn new(positions: Vec<Vector3>) -> Self {
        let bounds = compute_bounds(&positions);
        let mask = vec![1.0; positions.len()];
        Self {
            id: MeshId::new(),
            name: String::new(),
            positions,
            mask,
            matrix: Matrix4::IDENTITY,
            edit_matrix: Matrix4::IDENTITY,
            center: (bounds.0 + bounds.1) * 0.5,
            bounds,
        }
    }

    /// Axis-aligned unit cube centered on the origin.
    pub fn cube() -> Self {
        let positions = (0..8)
            .map(|i| {
                Vector3::new(
                    if i & 1 == 0 { -0.5 } else { 0.5 },
                    if i & 2 == 0 { -0.5 } else { 0.5 },
                    if i & 4 == 0 { -0.5 } else { 0.5 },
                )
            })
            .collect();
        Self::new(positions).with_name("cube")
    }

    /// Set the object name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the local-to-world matrix.
    pub fn with_matrix(mut self, matrix: Matrix4) -> Self {
        self.matrix = matrix;
        self
    }

    /// Get the object name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the local-to-world matrix.
    pub fn set_matrix(&mut self, matrix: Matrix4) {
        self.matrix = matrix;
    }

    /// Set the edit weight of one vertex, clamped to `[0, 1]`.
    pub fn set_mask(&mut self, index: usize, weight: f32) {
        if let Some(w) = self.mask.get_mut(index) {
            *w = weight.clamp(0.0, 1.0);
        }
    }

    /// Local vertex positions.
    #[inline]
    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Local bounding box as `(min, max)`.
    #[inline]
    pub fn bounds(&self) -> (Vector3, Vector3) {
        self.bounds
    }
}

impl EditableMesh for EditMesh {
    fn id(&self) -> MeshId {
        self.id
    }

    fn matrix(&self) -> Matrix4 {
        self.matrix
    }

    fn edit_matrix(&self) -> Matrix4 {
        self.edit_matrix
    }

    fn set_edit_matrix(&mut self, matrix: Matrix4) {
        self.edit_matrix = matrix;
    }

    fn center(&self) -> Vector3 {
        self.center
    }

    fn set_center(&mut self, center: Vector3) {
        self.center = center;
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn vertex(&self, index: usize) -> Option<Vector3> {
        self.positions.get(index).copied()
    }

    fn set_vertex(&mut self, index: usize, position: Vector3) {
        if let Some(p) = self.positions.get_mut(index) {
            *p = position;
        }
    }

    fn mask_weight(&self, index: usize) -> f32 {
        self.mask.get(index).copied().unwrap_or(0.0)
    }

    fn geometry_changed(&mut self, vertices: &[usize]) -> GeometryUpdate {
        self.bounds = compute_bounds(&self.positions);
        let update = GeometryUpdate::classify(vertices, self.positions.len());
        log::trace!(
            "{} geometry changed ({} of {} vertices)",
            self.id,
            vertices.len(),
            self.positions.len()
        );
        update
    }
}

fn compute_bounds(positions: &[Vector3]) -> (Vector3, Vector3) {
    let mut iter = positions.iter();
    let Some(first) = iter.next() else {
        return (Vector3::ZERO, Vector3::ZERO);
    };
    iter.fold((*first, *first), |(min, max), p| {
        (
            Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )
    })
}
