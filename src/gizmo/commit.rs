//! Baking pending edits into vertex data.

use super::config::SpaceMode;
use crate::core::{GizmoError, MeshId};
use crate::history::History;
use crate::math::Matrix4;
use crate::mesh::{EditableMesh, GeometryUpdate};

/// Outcome of one baked edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    /// Mesh that changed.
    pub mesh: MeshId,
    /// Number of vertices rewritten.
    pub vertices: usize,
    /// Full or partial geometry update.
    pub update: GeometryUpdate,
}

/// Applies edit matrices to meshes, snapshotting them first.
///
/// One committer spans one edit: the first snapshot it pushes opens an undo
/// step and the following ones are grouped into it.
pub struct TransformCommitter<'h> {
    history: &'h mut dyn History,
    committed: usize,
}

impl<'h> TransformCommitter<'h> {
    /// Create a committer writing snapshots into `history`.
    pub fn new(history: &'h mut dyn History) -> Self {
        Self {
            history,
            committed: 0,
        }
    }

    /// Number of meshes committed so far.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Bake `edit` into `mesh`.
    ///
    /// The edit was authored in `space`; outside world space it is
    /// conjugated back with `frame * edit * frame_inverse` first. Each
    /// unmasked vertex is blended by its mask weight. The mesh's pending edit
    /// matrix is reset to identity whatever the outcome. Returns `None` when
    /// the edit is the identity and nothing was touched.
    pub fn commit(
        &mut self,
        mesh: &mut dyn EditableMesh,
        edit: &Matrix4,
        space: SpaceMode,
        frame: &Matrix4,
        frame_inverse: &Matrix4,
    ) -> Result<Option<CommitReport>, GizmoError> {
        mesh.set_edit_matrix(Matrix4::IDENTITY);
        if edit.is_identity() {
            return Ok(None);
        }

        let effective = if space == SpaceMode::World {
            *edit
        } else {
            frame.conjugate(edit, frame_inverse)
        };
        if !effective.is_affine() {
            return Err(GizmoError::NonAffineEdit { mesh: mesh.id() });
        }

        let vertices = mesh.unmasked_vertices();
        let count = mesh.vertex_count();
        let positions = vertices
            .iter()
            .map(|&index| {
                mesh.vertex(index).ok_or(GizmoError::VertexOutOfRange {
                    mesh: mesh.id(),
                    index,
                    count,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.history
            .push_snapshot(&*mesh, &vertices, self.committed > 0);

        for (&index, original) in vertices.iter().zip(positions) {
            let weight = mesh.mask_weight(index).clamp(0.0, 1.0);
            let moved = effective.transform_point(&original);
            mesh.set_vertex(index, original * (1.0 - weight) + moved * weight);
        }
        let center = effective.transform_point(&mesh.center());
        mesh.set_center(center);

        let update = mesh.geometry_changed(&vertices);
        self.committed += 1;
        log::debug!("baked edit into {} ({} vertices)", mesh.id(), vertices.len());

        Ok(Some(CommitReport {
            mesh: mesh.id(),
            vertices: vertices.len(),
            update,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::UndoStack;
    use crate::math::Vector3;
    use crate::mesh::EditMesh;

    #[test]
    fn test_translation_with_mask_interpolation() {
        let mut mesh = EditMesh::cube();
        mesh.set_mask(0, 0.0);
        mesh.set_mask(1, 0.5);
        let before: Vec<Vector3> = mesh.positions().to_vec();

        let mut history = UndoStack::new();
        let mut committer = TransformCommitter::new(&mut history);
        let edit = Matrix4::from_translation(&Vector3::new(2.0, 0.0, 0.0));
        let report = committer
            .commit(&mut mesh, &edit, SpaceMode::World, &Matrix4::IDENTITY, &Matrix4::IDENTITY)
            .unwrap()
            .unwrap();

        assert_eq!(report.vertices, 7);
        assert!(!report.update.is_full());
        let after = mesh.positions();
        assert!(after[0].approx_eq(&before[0], 1e-6));
        assert!(after[1].approx_eq(&(before[1] + Vector3::new(1.0, 0.0, 0.0)), 1e-6));
        for i in 2..8 {
            assert!(after[i].approx_eq(&(before[i] + Vector3::new(2.0, 0.0, 0.0)), 1e-6));
        }
        assert!(mesh.center().approx_eq(&Vector3::new(2.0, 0.0, 0.0), 1e-6));
        assert!(mesh.edit_matrix().is_identity());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_space_conjugation() {
        let mut mesh = EditMesh::cube();
        let frame = Matrix4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let frame_inverse = frame.inverse();
        // Scale along the frame's X, which is world Y.
        let edit = Matrix4::from_scale(&Vector3::new(2.0, 1.0, 1.0));
        let mut history = UndoStack::new();
        TransformCommitter::new(&mut history)
            .commit(&mut mesh, &edit, SpaceMode::Local, &frame, &frame_inverse)
            .unwrap();
        let (min, max) = mesh.bounds();
        assert!(min.approx_eq(&Vector3::new(-0.5, -1.0, -0.5), 1e-5));
        assert!(max.approx_eq(&Vector3::new(0.5, 1.0, 0.5), 1e-5));
    }

    #[test]
    fn test_identity_edit_is_skipped() {
        let mut mesh = EditMesh::cube();
        let mut history = UndoStack::new();
        let report = TransformCommitter::new(&mut history)
            .commit(&mut mesh, &Matrix4::IDENTITY, SpaceMode::Normal, &Matrix4::from_rotation_x(1.0), &Matrix4::IDENTITY)
            .unwrap();
        assert!(report.is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_projective_edit_is_rejected_and_reset() {
        let mut mesh = EditMesh::cube();
        mesh.set_edit_matrix(Matrix4::from_translation(&Vector3::UNIT_X));
        let mut edit = Matrix4::IDENTITY;
        edit.elements[3] = 0.5;
        let mut history = UndoStack::new();
        let err = TransformCommitter::new(&mut history)
            .commit(&mut mesh, &edit, SpaceMode::World, &Matrix4::IDENTITY, &Matrix4::IDENTITY)
            .unwrap_err();
        assert_eq!(err, GizmoError::NonAffineEdit { mesh: mesh.id() });
        assert!(mesh.edit_matrix().is_identity());
        assert!(history.is_empty());
    }

    #[test]
    fn test_later_commits_are_grouped() {
        let mut a = EditMesh::cube();
        let mut b = EditMesh::cube();
        let edit = Matrix4::from_translation(&Vector3::UNIT_Y);
        let mut history = UndoStack::new();
        let mut committer = TransformCommitter::new(&mut history);
        for mesh in [&mut a, &mut b] {
            committer
                .commit(mesh, &edit, SpaceMode::World, &Matrix4::IDENTITY, &Matrix4::IDENTITY)
                .unwrap();
        }
        assert_eq!(committer.committed(), 2);
        let grouped: Vec<bool> = history.snapshots().iter().map(|s| s.grouped).collect();
        assert_eq!(grouped, vec![false, true]);
    }
}
