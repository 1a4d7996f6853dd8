//! # Mesh Module
//!
//! The contract the manipulator needs from editable mesh storage, plus a
//! simple vertex-array mesh implementing it.

mod edit_mesh;

pub use edit_mesh::EditMesh;

use crate::core::MeshId;
use crate::math::{Matrix4, Vector3};

/// How much of a mesh changed after an edit was baked into its vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryUpdate {
    /// Every vertex moved; normals and bounds need a full recompute.
    Full,
    /// Only the listed vertices moved.
    Partial(Vec<usize>),
}

impl GeometryUpdate {
    /// Classify a changed subset against the mesh's vertex count.
    pub fn classify(vertices: &[usize], vertex_count: usize) -> Self {
        if vertices.len() == vertex_count {
            Self::Full
        } else {
            Self::Partial(vertices.to_vec())
        }
    }

    /// True for [`GeometryUpdate::Full`].
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Mesh storage as seen by the manipulator.
///
/// The mesh owns two matrices. `matrix` places the mesh in the world and
/// `edit_matrix` holds the pending, not yet baked edit, applied before
/// `matrix` when the mesh is drawn (`world = matrix * edit_matrix * v`).
pub trait EditableMesh {
    /// Stable identifier used by snapshots.
    fn id(&self) -> MeshId;

    /// Local-to-world matrix.
    fn matrix(&self) -> Matrix4;

    /// Pending edit matrix, identity while no edit is in progress.
    fn edit_matrix(&self) -> Matrix4;

    /// Replace the pending edit matrix.
    fn set_edit_matrix(&mut self, matrix: Matrix4);

    /// Center of the mesh in local space.
    fn center(&self) -> Vector3;

    /// Move the local-space center.
    fn set_center(&mut self, center: Vector3);

    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Local-space position of a vertex.
    fn vertex(&self, index: usize) -> Option<Vector3>;

    /// Overwrite the local-space position of a vertex.
    fn set_vertex(&mut self, index: usize, position: Vector3);

    /// Per-vertex edit weight in `[0, 1]`. 0 leaves the vertex untouched.
    fn mask_weight(&self, index: usize) -> f32;

    /// Vertices an edit can move (weight above zero).
    fn unmasked_vertices(&self) -> Vec<usize> {
        (0..self.vertex_count())
            .filter(|&i| self.mask_weight(i) > 0.0)
            .collect()
    }

    /// Called after vertices were rewritten so derived data can be rebuilt.
    fn geometry_changed(&mut self, vertices: &[usize]) -> GeometryUpdate {
        GeometryUpdate::classify(vertices, self.vertex_count())
    }

    /// Matrix the mesh is currently drawn with, pending edit included.
    fn world_matrix(&self) -> Matrix4 {
        self.matrix() * self.edit_matrix()
    }
}
