//! Error types for committing edits.

use super::MeshId;
use thiserror::Error;

/// Errors that can occur while baking an edit into mesh data.
///
/// Geometric degeneracies during a drag are not errors: those frames are
/// skipped and the widget stays where it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GizmoError {
    /// A vertex subset references a vertex the mesh does not have.
    #[error("vertex {index} is out of range for {mesh} ({count} vertices)")]
    VertexOutOfRange {
        /// Mesh being edited.
        mesh: MeshId,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// The edit matrix has a projective bottom row.
    #[error("edit matrix for {mesh} is not affine")]
    NonAffineEdit {
        /// Mesh being edited.
        mesh: MeshId,
    },
}
