//! Pivot point resolution.

use super::config::PivotPolicy;
use crate::math::Vector3;
use crate::mesh::EditableMesh;

/// World-space center of a mesh, pending edit included.
pub fn object_center<M: EditableMesh + ?Sized>(mesh: &M) -> Vector3 {
    mesh.world_matrix().transform_point(&mesh.center())
}

/// World-space origin of a mesh, pending edit included.
pub fn object_origin<M: EditableMesh + ?Sized>(mesh: &M) -> Vector3 {
    mesh.world_matrix().transform_point(&Vector3::ZERO)
}

/// The point rotations and scales are centered on.
///
/// An empty selection resolves to the origin unless a custom point is set.
pub fn resolve<M: EditableMesh>(policy: PivotPolicy, selection: &[M], custom: Vector3) -> Vector3 {
    match policy {
        PivotPolicy::SelectionCentroid => average(selection.iter().map(object_center)),
        PivotPolicy::ObjectOrigin => average(selection.iter().map(object_origin)),
        PivotPolicy::Custom => custom,
    }
}

fn average(points: impl Iterator<Item = Vector3>) -> Vector3 {
    let (sum, count) = points.fold((Vector3::ZERO, 0usize), |(sum, n), p| (sum + p, n + 1));
    if count == 0 {
        Vector3::ZERO
    } else {
        sum / count as f32
    }
}
