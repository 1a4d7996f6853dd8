//! # History Module
//!
//! Undo snapshots taken before an edit is baked into vertex data.

use crate::core::MeshId;
use crate::math::Vector3;
use crate::mesh::EditableMesh;

/// Receiver of pre-commit snapshots.
pub trait History {
    /// Record the current positions of `vertices` (and the mesh center)
    /// before they are overwritten. `grouped` joins the snapshot to the
    /// previous one so a multi-object edit undoes as one step.
    fn push_snapshot(&mut self, mesh: &dyn EditableMesh, vertices: &[usize], grouped: bool);
}

/// Saved vertex state of one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSnapshot {
    /// Mesh the snapshot belongs to.
    pub mesh: MeshId,
    /// Saved vertex indices.
    pub indices: Vec<usize>,
    /// Positions of `indices`, in the same order.
    pub positions: Vec<Vector3>,
    /// Mesh center at snapshot time.
    pub center: Vector3,
    /// Undone together with the previous snapshot.
    pub grouped: bool,
}

impl VertexSnapshot {
    /// Capture the given vertices of a mesh.
    pub fn capture(mesh: &dyn EditableMesh, vertices: &[usize], grouped: bool) -> Self {
        let (indices, positions) = vertices
            .iter()
            .filter_map(|&i| mesh.vertex(i).map(|p| (i, p)))
            .unzip();
        Self {
            mesh: mesh.id(),
            indices,
            positions,
            center: mesh.center(),
            grouped,
        }
    }

    /// Write the saved state back into `mesh`.
    pub fn restore(&self, mesh: &mut dyn EditableMesh) {
        for (&index, &position) in self.indices.iter().zip(&self.positions) {
            mesh.set_vertex(index, position);
        }
        mesh.set_center(self.center);
        mesh.geometry_changed(&self.indices);
    }
}

/// Linear undo stack of vertex snapshots.
#[derive(Debug, Default)]
pub struct UndoStack {
    snapshots: Vec<VertexSnapshot>,
}

impl UndoStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing can be undone.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Stored snapshots, oldest first.
    pub fn snapshots(&self) -> &[VertexSnapshot] {
        &self.snapshots
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Undo the most recent group of snapshots.
    /// Returns how many snapshots were restored.
    pub fn undo<M: EditableMesh>(&mut self, meshes: &mut [M]) -> usize {
        let mut restored = 0;
        while let Some(snapshot) = self.snapshots.pop() {
            match meshes.iter_mut().find(|m| m.id() == snapshot.mesh) {
                Some(mesh) => snapshot.restore(mesh),
                None => log::warn!("undo skipped: {} is no longer available", snapshot.mesh),
            }
            restored += 1;
            if !snapshot.grouped {
                break;
            }
        }
        restored
    }
}

impl History for UndoStack {
    fn push_snapshot(&mut self, mesh: &dyn EditableMesh, vertices: &[usize], grouped: bool) {
        self.snapshots
            .push(VertexSnapshot::capture(mesh, vertices, grouped));
    }
}
