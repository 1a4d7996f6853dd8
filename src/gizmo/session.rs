//! Edit session: the hover / edit state machine and the per-move edit math.
//!
//! Every move rebuilds each object's pending edit matrix from the snapshot
//! taken when the edit started, so nothing accumulates between frames.

use super::commit::{CommitReport, TransformCommitter};
use super::handle::{Axis, HandleKind};
use super::space::SpaceFrame;
use crate::camera::Viewport;
use crate::core::GizmoError;
use crate::history::History;
use crate::math::consts::EPSILON;
use crate::math::{Matrix4, Plane, Ray, Vector2, Vector3};
use crate::mesh::EditableMesh;

/// Depth of the near point when unprojecting the cursor.
const NEAR_DEPTH: f32 = 0.0;
/// Depth of the far point when unprojecting the cursor.
const FAR_DEPTH: f32 = 0.5;
/// Smallest scale multiplier offset, keeps scale matrices invertible.
const MIN_SCALE_MULT: f32 = -0.99;
/// Shortest surface normal worth freezing.
const MIN_NORMAL_LENGTH: f32 = 1e-4;
/// Pointer distance from the press point, in pixels, treated as no movement.
const PRESS_TOLERANCE: f32 = 0.5;

/// Where the state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing under the pointer.
    #[default]
    Idle,
    /// Pointer over a handle.
    Hovered(HandleKind),
    /// Pointer held on a handle.
    Editing(HandleKind),
}

/// What an edit starts from.
#[derive(Debug, Clone, Copy)]
pub struct EditStart {
    /// Handle being dragged.
    pub kind: HandleKind,
    /// Widget pivot.
    pub pivot: Vector3,
    /// Widget space frame.
    pub space: SpaceFrame,
    /// Pointer position in pixels.
    pub pointer: Vector2,
    /// Rotate and scale each object around its own origin.
    pub individual_origins: bool,
}

/// Per-object matrices captured at edit start.
#[derive(Debug, Clone)]
struct ObjectSnapshot {
    local: Matrix4,
    local_inverse: Matrix4,
    scale_rot_inverse: Matrix4,
    origin: Vector3,
    /// Pending edit expressed in the session's space frame.
    authored: Matrix4,
}

impl ObjectSnapshot {
    fn capture<M: EditableMesh>(mesh: &M) -> Self {
        let local = mesh.matrix();
        Self {
            local,
            local_inverse: local.inverse(),
            scale_rot_inverse: local.without_translation().inverse(),
            origin: local.get_position(),
            authored: Matrix4::IDENTITY,
        }
    }

    fn store<M: EditableMesh>(&mut self, mesh: &mut M, edit: Matrix4, space: &SpaceFrame) {
        // F⁻¹·I·F is not exactly I in f32; keep identity exact so it commits nothing.
        self.authored = if space.is_world() || edit.is_identity() {
            edit
        } else {
            space.inverse.conjugate(&edit, &space.matrix)
        };
        mesh.set_edit_matrix(edit);
    }
}

/// A world-space change produced by one pointer move.
enum Delta {
    /// Shared translation.
    Translate(Vector3),
    /// Rotation or scale centered on the pivot.
    AroundPivot(Matrix4),
}

/// The interaction state machine.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: SessionState,
    objects: Vec<ObjectSnapshot>,
    pivot: Vector3,
    pivot_translate: Matrix4,
    pivot_translate_inverse: Matrix4,
    space: SpaceFrame,
    individual_origins: bool,
    screen_origin: Vector2,
    screen_direction: Vector2,
    screen_offset: Vector2,
    press: Vector2,
    reference_distance: f32,
    view_axis: Vector3,
    frozen_normal: Option<Vector3>,
    guide: Option<(Vector2, Vector2)>,
    rotate_sensitivity: f32,
}

impl EditSession {
    /// Create an idle session.
    pub fn new(rotate_sensitivity: f32) -> Self {
        Self {
            state: SessionState::Idle,
            objects: Vec::new(),
            pivot: Vector3::ZERO,
            pivot_translate: Matrix4::IDENTITY,
            pivot_translate_inverse: Matrix4::IDENTITY,
            space: SpaceFrame::WORLD,
            individual_origins: false,
            screen_origin: Vector2::ZERO,
            screen_direction: Vector2::ZERO,
            screen_offset: Vector2::ZERO,
            press: Vector2::ZERO,
            reference_distance: 0.0,
            view_axis: Vector3::UNIT_Z,
            frozen_normal: None,
            guide: None,
            rotate_sensitivity,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True between press and release on a handle.
    #[inline]
    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing(_))
    }

    /// Handle being dragged.
    pub fn active_handle(&self) -> Option<HandleKind> {
        match self.state {
            SessionState::Editing(kind) => Some(kind),
            _ => None,
        }
    }

    /// Pivot captured at edit start.
    #[inline]
    pub fn pivot(&self) -> Vector3 {
        self.pivot
    }

    /// Space frame captured at edit start.
    #[inline]
    pub fn space(&self) -> &SpaceFrame {
        &self.space
    }

    /// Surface normal frozen for this edit.
    #[inline]
    pub fn frozen_normal(&self) -> Option<Vector3> {
        self.frozen_normal
    }

    /// 2D guide segment of the running edit, in pixels.
    #[inline]
    pub fn guide_line(&self) -> Option<(Vector2, Vector2)> {
        self.guide
    }

    /// Change the rotation speed.
    pub fn set_rotate_sensitivity(&mut self, radians_per_pixel: f32) {
        self.rotate_sensitivity = radians_per_pixel;
    }

    /// Record the handle under the pointer. Ignored while editing.
    pub fn hover(&mut self, kind: Option<HandleKind>) {
        if self.is_editing() {
            return;
        }
        let next = kind.map_or(SessionState::Idle, SessionState::Hovered);
        if next != self.state {
            match next {
                SessionState::Hovered(kind) => log::debug!("hovering {kind:?}"),
                _ => log::debug!("hover lost"),
            }
            self.state = next;
        }
    }

    /// Keep `normal` for the coming edit when it is long enough to mean a hit.
    pub fn freeze_normal(&mut self, normal: Vector3) {
        self.frozen_normal = (normal.length() > MIN_NORMAL_LENGTH).then_some(normal);
    }

    /// Start dragging `start.kind`.
    pub fn begin<M: EditableMesh>(&mut self, start: EditStart, selection: &[M], viewport: &dyn Viewport) {
        let project = |p: &Vector3| {
            let s = viewport.project(p);
            Vector2::new(s.x, s.y)
        };

        self.state = SessionState::Editing(start.kind);
        self.objects = selection.iter().map(ObjectSnapshot::capture).collect();
        self.pivot = start.pivot;
        self.pivot_translate = Matrix4::from_translation(&start.pivot);
        self.pivot_translate_inverse = Matrix4::from_translation(&-start.pivot);
        self.space = start.space;
        self.individual_origins = start.individual_origins;
        self.press = start.pointer;
        self.screen_origin = project(&start.pivot);
        self.screen_offset = start.pointer - self.screen_origin;
        self.screen_direction = Vector2::ZERO;
        self.reference_distance = 0.0;
        self.guide = None;

        match start.kind {
            HandleKind::TranslateAxis(axis) | HandleKind::ScaleAxis(axis) => {
                let tip = start.pivot + self.space.matrix.transform_direction(&axis.unit());
                self.screen_direction = (project(&tip) - self.screen_origin)
                    .try_normalized()
                    .unwrap_or(Vector2::ZERO);
                self.reference_distance = self.screen_offset.dot(&self.screen_direction).abs();
            }
            HandleKind::ScaleUniform => {
                self.reference_distance = self.screen_offset.length();
            }
            HandleKind::RotateView => {
                self.view_axis = (viewport.eye_position() - start.pivot)
                    .try_normalized()
                    .unwrap_or(Vector3::UNIT_Z);
            }
            HandleKind::TranslatePlane(_) | HandleKind::RotateAxis(_) => {}
        }

        log::debug!(
            "edit started on {:?} with {} object(s) in {:?} space",
            start.kind,
            self.objects.len(),
            self.space.mode
        );
    }

    /// Turn the pointer position into pending edit matrices.
    /// Returns false when nothing changed (idle, or a degenerate frame).
    pub fn update<M: EditableMesh>(
        &mut self,
        selection: &mut [M],
        viewport: &dyn Viewport,
        pointer: Vector2,
    ) -> bool {
        let Some(kind) = self.active_handle() else {
            return false;
        };

        // Back on the press point (sub-pixel touch jitter included): exact identity.
        if pointer.distance_to(&self.press) <= PRESS_TOLERANCE {
            self.guide = None;
            self.write(selection, |_, _| Matrix4::IDENTITY);
            return true;
        }

        let delta = match kind {
            HandleKind::TranslateAxis(axis) => self.translate_axis(axis, viewport, pointer),
            HandleKind::TranslatePlane(axis) => self.translate_plane(axis, viewport, pointer),
            HandleKind::RotateAxis(axis) => Some(self.rotate_axis(axis, pointer)),
            HandleKind::RotateView => self.rotate_view(pointer),
            HandleKind::ScaleAxis(axis) => self.scale(Some(axis), pointer),
            HandleKind::ScaleUniform => self.scale(None, pointer),
        };
        let Some(delta) = delta else {
            log::trace!("skipped degenerate {kind:?} update at {pointer:?}");
            return false;
        };

        match delta {
            Delta::Translate(offset) => self.write(selection, |object, _| {
                Matrix4::from_translation(&object.scale_rot_inverse.transform_direction(&offset))
            }),
            Delta::AroundPivot(change) => self.write(selection, |object, pivot| {
                let around = Matrix4::from_translation(&pivot)
                    * change
                    * Matrix4::from_translation(&-pivot);
                object.local_inverse * around * object.local
            }),
        }
        true
    }

    fn write<M, F>(&mut self, selection: &mut [M], edit_for: F)
    where
        M: EditableMesh,
        F: Fn(&ObjectSnapshot, Vector3) -> Matrix4,
    {
        let space = self.space;
        for (mesh, object) in selection.iter_mut().zip(self.objects.iter_mut()) {
            let pivot = if self.individual_origins { object.origin } else { self.pivot };
            let edit = edit_for(object, pivot);
            object.store(mesh, edit, &space);
        }
    }

    /// Cursor unprojected at two depths, in pivot-and-space-local coordinates.
    fn local_points(&self, viewport: &dyn Viewport, at: Vector2) -> (Vector3, Vector3) {
        let to_local = self.space.inverse * self.pivot_translate_inverse;
        let near = viewport.unproject(at.x, at.y, NEAR_DEPTH);
        let far = viewport.unproject(at.x, at.y, FAR_DEPTH);
        (to_local.transform_point(&near), to_local.transform_point(&far))
    }

    fn translate_axis(&mut self, axis: Axis, viewport: &dyn Viewport, pointer: Vector2) -> Option<Delta> {
        let along = (pointer - self.screen_origin - self.screen_offset).dot(&self.screen_direction);
        let target = self.screen_origin + self.screen_direction * along;
        self.guide = Some((self.screen_origin, target));

        let (near, far) = self.local_points(viewport, target);
        let ray = Ray::from_points(&near, &far)?;
        let t = ray.closest_parameter_on_axis(&axis.unit())?;
        let offset = self.space.matrix.transform_direction(&(axis.unit() * t));
        Some(Delta::Translate(offset))
    }

    fn translate_plane(&mut self, axis: Axis, viewport: &dyn Viewport, pointer: Vector2) -> Option<Delta> {
        self.guide = Some((self.press, pointer));

        let (near, far) = self.local_points(viewport, pointer - self.screen_offset);
        let hit = Plane::new(axis.unit(), 0.0).intersect_line(&near, &far)?;
        Some(Delta::Translate(self.space.matrix.transform_direction(&hit)))
    }

    fn rotate_axis(&self, axis: Axis, pointer: Vector2) -> Delta {
        let moved = pointer - self.press;
        let angle = (moved.x + moved.y) * self.rotate_sensitivity;
        Delta::AroundPivot(Matrix4::from_axis_angle(&self.space.axis(axis), angle))
    }

    fn rotate_view(&self, pointer: Vector2) -> Option<Delta> {
        let from = (self.press - self.screen_origin).try_normalized()?;
        let to = (pointer - self.screen_origin).try_normalized()?;
        // Screen y points down, so a clockwise sweep on screen is negative.
        let angle = -from.perp_dot(&to).atan2(from.dot(&to));
        Some(Delta::AroundPivot(Matrix4::from_axis_angle(&self.view_axis, angle)))
    }

    fn scale(&mut self, axis: Option<Axis>, pointer: Vector2) -> Option<Delta> {
        let target = match axis {
            Some(_) => {
                let along = (pointer - self.screen_origin).dot(&self.screen_direction);
                self.screen_origin + self.screen_direction * along
            }
            None => pointer,
        };
        self.guide = Some((self.screen_origin, target));

        if self.reference_distance < EPSILON {
            return None;
        }
        let distance = target.distance_to(&self.screen_origin);
        let mult = ((distance - self.reference_distance) / self.reference_distance).max(MIN_SCALE_MULT);
        let factors = match axis {
            Some(axis) => Vector3::ONE.with_component(axis.index(), 1.0 + mult),
            None => Vector3::splat(1.0 + mult),
        };

        let scale = Matrix4::from_scale(&factors);
        Some(Delta::AroundPivot(if self.space.is_world() {
            scale
        } else {
            self.space.matrix.conjugate(&scale, &self.space.inverse)
        }))
    }

    /// Release: bake every pending edit and return to idle.
    ///
    /// Pending edit matrices are back to identity afterwards, on success,
    /// on failure, and when no edit was running.
    pub fn end<M: EditableMesh>(
        &mut self,
        selection: &mut [M],
        history: &mut dyn History,
    ) -> Result<Vec<CommitReport>, GizmoError> {
        let kind = self.active_handle();
        let objects = std::mem::take(&mut self.objects);
        self.state = SessionState::Idle;
        self.guide = None;
        self.frozen_normal = None;

        let Some(kind) = kind else {
            for mesh in selection.iter_mut() {
                if !mesh.edit_matrix().is_identity() {
                    mesh.set_edit_matrix(Matrix4::IDENTITY);
                }
            }
            return Ok(Vec::new());
        };

        let mut committer = TransformCommitter::new(history);
        let mut reports = Vec::new();
        let mut failure = None;
        for (i, mesh) in selection.iter_mut().enumerate() {
            let edit = match (&failure, objects.get(i)) {
                (None, Some(object)) => object.authored,
                _ => {
                    mesh.set_edit_matrix(Matrix4::IDENTITY);
                    continue;
                }
            };
            match committer.commit(mesh, &edit, self.space.mode, &self.space.matrix, &self.space.inverse) {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => {}
                Err(err) => failure = Some(err),
            }
        }

        if let Some(err) = failure {
            log::warn!("edit on {kind:?} failed to commit: {err}");
            return Err(err);
        }
        log::debug!("edit on {kind:?} ended, {} object(s) committed", reports.len());
        Ok(reports)
    }
}
