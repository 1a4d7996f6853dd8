//! Host facade: selector setters, pointer events and per-frame rendering.

use super::commit::CommitReport;
use super::config::{AxisSelection, GizmoConfig, PivotPolicy, SpaceMode, ToolSettings, TransformMode};
use super::frame::WidgetFrame;
use super::handle::{HandleKind, HandleMask, HandleSet};
use super::hit::Picking;
use super::pivot;
use super::render::HandleRenderer;
use super::session::{EditSession, EditStart, SessionState};
use super::space::SpaceFrame;
use crate::camera::Viewport;
use crate::core::GizmoError;
use crate::history::History;
use crate::math::{Vector2, Vector3};
use crate::mesh::EditableMesh;

/// Interactive transform manipulator.
///
/// The host forwards pointer events and calls [`render`](Self::render) once
/// per frame, always with the same selection slice it edits.
#[derive(Debug, Clone)]
pub struct TransformTool {
    config: GizmoConfig,
    settings: ToolSettings,
    handles: HandleSet,
    frame: WidgetFrame,
    session: EditSession,
}

impl Default for TransformTool {
    fn default() -> Self {
        Self::new(GizmoConfig::default())
    }
}

impl TransformTool {
    /// Create a tool in translate mode with every axis offered.
    pub fn new(config: GizmoConfig) -> Self {
        let settings = ToolSettings::default();
        Self {
            handles: HandleSet::new(HandleMask::for_tool(settings.mode, settings.axis)),
            session: EditSession::new(config.rotate_sensitivity),
            frame: WidgetFrame::new(),
            config,
            settings,
        }
    }

    /// Restore persisted selector state.
    pub fn with_settings(mut self, settings: ToolSettings) -> Self {
        self.handles
            .set_enabled(HandleMask::for_tool(settings.mode, settings.axis));
        self.settings = settings;
        self
    }

    /// Widget configuration.
    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    /// Replace the widget configuration.
    pub fn set_config(&mut self, config: GizmoConfig) {
        self.session.set_rotate_sensitivity(config.rotate_sensitivity);
        self.config = config;
    }

    /// Selector state.
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// The handle collection.
    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    /// Widget frame as of the last refresh.
    pub fn frame(&self) -> &WidgetFrame {
        &self.frame
    }

    /// The interaction state machine.
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Interaction state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// True while a handle is being dragged.
    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    /// Switch between translate, rotate and scale. Ignored while editing.
    pub fn set_mode(&mut self, mode: TransformMode) {
        if self.refuse_while_editing("mode") {
            return;
        }
        self.settings.mode = mode;
        self.apply_mask();
    }

    /// Restrict the offered axes. Ignored while editing.
    pub fn set_axis(&mut self, axis: AxisSelection) {
        if self.refuse_while_editing("axis") {
            return;
        }
        self.settings.axis = axis;
        self.apply_mask();
    }

    fn refuse_while_editing(&self, what: &str) -> bool {
        if self.is_editing() {
            log::debug!("{what} change ignored during an edit");
        }
        self.is_editing()
    }

    fn apply_mask(&mut self) {
        self.handles
            .set_enabled(HandleMask::for_tool(self.settings.mode, self.settings.axis));
    }

    /// Select the coordinate frame used by the next edit.
    pub fn set_space(&mut self, space: SpaceMode) {
        self.settings.space = space;
    }

    /// Select where the next edit is centered.
    pub fn set_pivot_policy(&mut self, policy: PivotPolicy) {
        self.settings.pivot = policy;
    }

    /// Center edits on `point`.
    pub fn set_custom_pivot(&mut self, point: Vector3) {
        self.settings.custom_pivot = point;
        self.settings.pivot = PivotPolicy::Custom;
    }

    /// Center edits on the last picked point.
    pub fn set_pivot_from_picking(&mut self, picking: &dyn Picking) {
        self.set_custom_pivot(picking.intersection_point());
    }

    /// Go back to the selection centroid.
    pub fn reset_pivot(&mut self) {
        self.settings.pivot = PivotPolicy::SelectionCentroid;
    }

    /// Pointer moved to `(x, y)` pixels: updates the running edit, or hover
    /// picks when idle. Returns true when a redraw is needed.
    pub fn on_pointer_move<M: EditableMesh>(
        &mut self,
        selection: &mut [M],
        viewport: &dyn Viewport,
        picking: &mut dyn Picking,
        x: f32,
        y: f32,
    ) -> bool {
        if self.is_editing() {
            return self.session.update(selection, viewport, Vector2::new(x, y));
        }
        let before = self.handles.highlighted();
        self.hover(selection, viewport, picking, x, y);
        before != self.handles.highlighted()
    }

    fn hover<M: EditableMesh>(
        &mut self,
        selection: &[M],
        viewport: &dyn Viewport,
        picking: &mut dyn Picking,
        x: f32,
        y: f32,
    ) {
        let hit = if selection.is_empty() {
            None
        } else {
            self.refresh_frame(selection, viewport, &*picking);
            picking.intersect_handles(viewport, &self.handles.pick_shapes(), x, y)
        };
        self.handles.highlight(hit, picking.intersection_point());
        self.session.hover(hit);
    }

    /// Pointer pressed at `(x, y)` pixels. Starts an edit on the handle
    /// under the pointer; returns true when one started.
    pub fn on_pointer_down<M: EditableMesh>(
        &mut self,
        selection: &[M],
        viewport: &dyn Viewport,
        picking: &mut dyn Picking,
        x: f32,
        y: f32,
    ) -> bool {
        if self.is_editing() || selection.is_empty() {
            return false;
        }
        // Touch input has no hover before the press.
        if self.handles.highlighted().is_none() {
            self.hover(selection, viewport, picking, x, y);
        }
        let Some(kind) = self.handles.highlighted() else {
            return false;
        };

        if self.settings.space == SpaceMode::Normal {
            self.session.freeze_normal(picking.surface_normal());
        }
        let space = self.resolve_space(selection, &*picking);
        let pivot = pivot::resolve(self.settings.pivot, selection, self.settings.custom_pivot);
        self.frame.update(pivot, space, viewport, self.config.screen_size);
        self.handles.update_matrices(&self.frame);

        self.session.begin(
            EditStart {
                kind,
                pivot,
                space,
                pointer: Vector2::new(x, y),
                individual_origins: self.settings.pivot == PivotPolicy::ObjectOrigin,
            },
            selection,
            viewport,
        );
        true
    }

    /// Pointer released: bake the running edit into the selection.
    ///
    /// A release with no edit running resets any stray pending edit and
    /// returns an empty report list.
    pub fn on_pointer_up<M: EditableMesh>(
        &mut self,
        selection: &mut [M],
        history: &mut dyn History,
    ) -> Result<Vec<CommitReport>, GizmoError> {
        let result = self.session.end(selection, history);
        self.handles.highlight(None, Vector3::ZERO);
        result
    }

    /// Emit this frame's handles (and the guide line while dragging).
    /// Nothing is drawn for an empty selection.
    pub fn render<M: EditableMesh>(
        &mut self,
        selection: &[M],
        viewport: &dyn Viewport,
        picking: &dyn Picking,
        renderer: &mut dyn HandleRenderer,
    ) {
        if selection.is_empty() {
            return;
        }
        self.refresh_frame(selection, viewport, picking);

        for draw in self.handles.draw_list(self.session.active_handle()) {
            renderer.draw_handle(&draw);
        }
        if self.config.show_guide_line {
            if let Some((from, to)) = self.session.guide_line() {
                renderer.draw_guide_line(from, to);
            }
        }
    }

    fn refresh_frame<M: EditableMesh>(&mut self, selection: &[M], viewport: &dyn Viewport, picking: &dyn Picking) {
        let pivot = pivot::resolve(self.settings.pivot, selection, self.settings.custom_pivot);
        if self.is_editing() {
            self.frame.follow(pivot);
        } else {
            let space = self.resolve_space(selection, picking);
            self.frame.update(pivot, space, viewport, self.config.screen_size);
        }
        self.handles.update_matrices(&self.frame);
    }

    fn resolve_space<M: EditableMesh>(&self, selection: &[M], picking: &dyn Picking) -> SpaceFrame {
        let normal = match self.settings.space {
            SpaceMode::Normal => self
                .session
                .frozen_normal()
                .unwrap_or_else(|| picking.surface_normal()),
            _ => Vector3::ZERO,
        };
        let object = selection.first().map(|mesh| mesh.matrix());
        SpaceFrame::resolve(self.settings.space, object.as_ref(), normal)
    }

    /// Handle the pointer would grab right now.
    pub fn highlighted(&self) -> Option<HandleKind> {
        self.handles.highlighted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::gizmo::handle::{Axis, COLOR_SELECTED};
    use crate::gizmo::hit::{HandleShape, ViewportPicker};
    use crate::gizmo::render::HandleDraw;
    use crate::history::UndoStack;
    use crate::math::Matrix4;
    use crate::mesh::EditMesh;

    /// Picking that always reports the same handle, when it is enabled.
    struct StubPicking {
        handle: Option<HandleKind>,
        point: Vector3,
        normal: Vector3,
    }

    impl StubPicking {
        fn on(handle: HandleKind) -> Self {
            Self {
                handle: Some(handle),
                point: Vector3::ZERO,
                normal: Vector3::ZERO,
            }
        }
    }

    impl Picking for StubPicking {
        fn intersect_handles(
            &mut self,
            _viewport: &dyn Viewport,
            shapes: &[HandleShape],
            _x: f32,
            _y: f32,
        ) -> Option<HandleKind> {
            self.handle.filter(|kind| shapes.iter().any(|s| s.kind == *kind))
        }

        fn intersection_point(&self) -> Vector3 {
            self.point
        }

        fn surface_normal(&self) -> Vector3 {
            self.normal
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        draws: Vec<HandleDraw>,
        guides: Vec<(Vector2, Vector2)>,
    }

    impl HandleRenderer for RecordingRenderer {
        fn draw_handle(&mut self, draw: &HandleDraw) {
            self.draws.push(*draw);
        }

        fn draw_guide_line(&mut self, from: Vector2, to: Vector2) {
            self.guides.push((from, to));
        }
    }

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(60.0, 800.0, 600.0, 0.1, 100.0);
        camera.set_position(Vector3::new(0.0, 0.0, 10.0));
        camera
    }

    fn screen(camera: &PerspectiveCamera, p: Vector3) -> (f32, f32) {
        let s = camera.project(&p);
        (s.x, s.y)
    }

    #[test]
    fn test_translate_x_by_two() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube()];
        meshes[0].set_mask(0, 0.0);
        let before = meshes[0].positions().to_vec();
        let mut tool = TransformTool::default();
        let mut picker = ViewportPicker::new();
        let mut history = UndoStack::new();

        let (x0, y0) = screen(&camera, Vector3::new(1.0, 0.0, 0.0));
        assert!(tool.on_pointer_move(&mut meshes, &camera, &mut picker, x0, y0));
        assert_eq!(tool.highlighted(), Some(HandleKind::TranslateAxis(Axis::X)));
        assert!(tool.on_pointer_down(&meshes, &camera, &mut picker, x0, y0));

        let (x1, y1) = screen(&camera, Vector3::new(3.0, 0.0, 0.0));
        assert!(tool.on_pointer_move(&mut meshes, &camera, &mut picker, x1, y1));
        let reports = tool.on_pointer_up(&mut meshes, &mut history).unwrap();

        assert_eq!(reports.len(), 1);
        let after = meshes[0].positions();
        assert!(after[0].approx_eq(&before[0], 1e-6));
        for i in 1..8 {
            assert!(after[i].approx_eq(&(before[i] + Vector3::new(2.0, 0.0, 0.0)), 1e-3), "{i}: {:?}", after[i]);
        }
        assert!((meshes[0].center().x - 2.0).abs() < 1e-3);
        assert!(meshes[0].edit_matrix().is_identity());
        assert_eq!(history.len(), 1);
        assert_eq!(tool.state(), SessionState::Idle);
    }

    #[test]
    fn test_uniform_scale_about_individual_origins() {
        let camera = camera();
        let mut meshes = vec![
            EditMesh::cube().with_matrix(Matrix4::from_translation(&Vector3::new(-2.0, 0.0, 0.0))),
            EditMesh::cube().with_matrix(Matrix4::from_translation(&Vector3::new(2.0, 0.0, 0.0))),
        ];
        let mut tool = TransformTool::default();
        tool.set_mode(TransformMode::Scale);
        tool.set_pivot_policy(PivotPolicy::ObjectOrigin);
        let mut picking = StubPicking::on(HandleKind::ScaleUniform);
        let mut history = UndoStack::new();

        let (ox, oy) = screen(&camera, Vector3::ZERO);
        assert!(tool.on_pointer_down(&meshes, &camera, &mut picking, ox + 60.0, oy));
        tool.on_pointer_move(&mut meshes, &camera, &mut picking, ox + 90.0, oy);
        tool.on_pointer_up(&mut meshes, &mut history).unwrap();

        for mesh in &meshes {
            for p in mesh.positions() {
                for c in p.to_array() {
                    assert!((c.abs() - 0.75).abs() < 1e-4, "{p:?}");
                }
            }
            assert!(mesh.center().approx_eq(&Vector3::ZERO, 1e-5));
        }
        let grouped: Vec<bool> = history.snapshots().iter().map(|s| s.grouped).collect();
        assert_eq!(grouped, vec![false, true]);

        assert_eq!(history.undo(&mut meshes), 2);
        assert!(meshes[1].positions()[0].approx_eq(&EditMesh::cube().positions()[0], 1e-6));
    }

    #[test]
    fn test_normal_space_without_hit_falls_back_to_local() {
        let camera = camera();
        let rotation = Matrix4::from_rotation_z(0.4);
        let mut meshes = vec![EditMesh::cube().with_matrix(rotation)];
        let mut tool = TransformTool::default();
        tool.set_space(SpaceMode::Normal);
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::X));

        tool.on_pointer_move(&mut meshes, &camera, &mut picking, 10.0, 10.0);
        let space = tool.frame().space();
        assert_eq!(space.mode, SpaceMode::Normal);
        assert!(space.matrix.approx_eq(&rotation, 1e-5));

        assert!(tool.on_pointer_down(&meshes, &camera, &mut picking, 10.0, 10.0));
        assert!(tool.session().frozen_normal().is_none());
        assert!(tool.session().space().matrix.approx_eq(&rotation, 1e-5));
    }

    #[test]
    fn test_normal_is_frozen_for_the_edit() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::default();
        tool.set_space(SpaceMode::Normal);
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::Z));
        picking.normal = Vector3::UNIT_X;

        assert!(tool.on_pointer_down(&meshes, &camera, &mut picking, 10.0, 10.0));
        picking.normal = Vector3::UNIT_Y;
        tool.render(&meshes, &camera, &picking, &mut RecordingRenderer::default());

        assert_eq!(tool.session().frozen_normal(), Some(Vector3::UNIT_X));
        let z = tool.session().space().axis(Axis::Z);
        assert!(z.approx_eq(&Vector3::UNIT_X, 1e-5));
        tool.on_pointer_up(&mut meshes, &mut UndoStack::new()).unwrap();
        assert!(tool.session().frozen_normal().is_none());
    }

    #[test]
    fn test_release_without_movement_is_a_no_op() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube()];
        let before = meshes[0].positions().to_vec();
        let mut tool = TransformTool::default();
        tool.set_mode(TransformMode::Rotate);
        let mut picking = StubPicking::on(HandleKind::RotateAxis(Axis::Y));
        let mut history = UndoStack::new();

        assert!(tool.on_pointer_down(&meshes, &camera, &mut picking, 300.0, 200.0));
        assert!(meshes[0].edit_matrix().is_identity());
        tool.on_pointer_move(&mut meshes, &camera, &mut picking, 300.0, 200.0);
        assert!(meshes[0].edit_matrix().is_identity());
        let reports = tool.on_pointer_up(&mut meshes, &mut history).unwrap();

        assert!(reports.is_empty());
        assert!(history.is_empty());
        assert_eq!(meshes[0].positions(), before.as_slice());
    }

    #[test]
    fn test_local_drag_back_to_press_commits_nothing() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube().with_matrix(Matrix4::from_rotation_z(0.4))];
        let before = meshes[0].positions().to_vec();
        let mut tool = TransformTool::default();
        tool.set_space(SpaceMode::Local);
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::X));
        let mut history = UndoStack::new();

        assert!(tool.on_pointer_down(&meshes, &camera, &mut picking, 400.0, 300.0));
        tool.on_pointer_move(&mut meshes, &camera, &mut picking, 450.0, 310.0);
        tool.on_pointer_move(&mut meshes, &camera, &mut picking, 400.0, 300.0);
        assert!(meshes[0].edit_matrix().is_identity());
        let reports = tool.on_pointer_up(&mut meshes, &mut history).unwrap();

        assert!(reports.is_empty());
        assert!(history.is_empty());
        assert_eq!(meshes[0].positions(), before.as_slice());
    }

    #[test]
    fn test_touch_press_starts_edit_without_hover() {
        let camera = camera();
        let meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::default();
        let mut picking = StubPicking::on(HandleKind::TranslatePlane(Axis::Y));
        assert_eq!(tool.highlighted(), None);
        assert!(tool.on_pointer_down(&meshes, &camera, &mut picking, 50.0, 50.0));
        assert_eq!(tool.state(), SessionState::Editing(HandleKind::TranslatePlane(Axis::Y)));
    }

    #[test]
    fn test_disabled_handle_cannot_start_edit() {
        let camera = camera();
        let meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::default();
        let mut picking = StubPicking::on(HandleKind::RotateView);
        assert!(!tool.on_pointer_down(&meshes, &camera, &mut picking, 50.0, 50.0));
        assert_eq!(tool.state(), SessionState::Idle);
    }

    #[test]
    fn test_mode_change_waits_for_edit_end() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::default();
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::Y));

        tool.on_pointer_down(&meshes, &camera, &mut picking, 50.0, 50.0);
        tool.set_mode(TransformMode::Scale);
        tool.set_axis(AxisSelection::Z);
        assert_eq!(tool.settings().mode, TransformMode::Translate);
        assert_eq!(tool.handles().enabled(), HandleMask::TRANS_XYZ | HandleMask::PLANE_XYZ);

        tool.on_pointer_up(&mut meshes, &mut UndoStack::new()).unwrap();
        tool.set_mode(TransformMode::Scale);
        tool.set_axis(AxisSelection::Z);
        assert_eq!(tool.handles().enabled(), HandleMask::SCALE_Z);
    }

    #[test]
    fn test_render_lists_enabled_then_active_handle() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::default();
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::X));

        let mut idle = RecordingRenderer::default();
        tool.render(&meshes, &camera, &picking, &mut idle);
        assert_eq!(idle.draws.len(), 6);
        assert!(idle.guides.is_empty());

        let (x, y) = screen(&camera, Vector3::new(1.0, 0.0, 0.0));
        tool.on_pointer_down(&meshes, &camera, &mut picking, x, y);
        tool.on_pointer_move(&mut meshes, &camera, &mut picking, x + 40.0, y);
        let mut editing = RecordingRenderer::default();
        tool.render(&meshes, &camera, &picking, &mut editing);

        assert_eq!(editing.draws.len(), 1);
        assert_eq!(editing.draws[0].kind, HandleKind::TranslateAxis(Axis::X));
        assert_eq!(editing.draws[0].color, COLOR_SELECTED);
        assert_eq!(editing.guides.len(), 1);
        // The widget follows the object it moves.
        let moved = meshes[0].edit_matrix().get_position();
        assert!(tool.frame().pivot().approx_eq(&moved, 1e-5));
    }

    #[test]
    fn test_guide_line_can_be_disabled() {
        let camera = camera();
        let mut meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::new(GizmoConfig {
            show_guide_line: false,
            ..GizmoConfig::default()
        });
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::X));
        tool.on_pointer_down(&meshes, &camera, &mut picking, 400.0, 300.0);
        tool.on_pointer_move(&mut meshes, &camera, &mut picking, 450.0, 300.0);
        let mut renderer = RecordingRenderer::default();
        tool.render(&meshes, &camera, &picking, &mut renderer);
        assert!(renderer.guides.is_empty());
    }

    #[test]
    fn test_empty_selection_draws_nothing() {
        let camera = camera();
        let none: Vec<EditMesh> = Vec::new();
        let mut tool = TransformTool::default();
        let mut picking = StubPicking::on(HandleKind::TranslateAxis(Axis::X));
        let mut renderer = RecordingRenderer::default();
        tool.render(&none, &camera, &picking, &mut renderer);
        assert!(renderer.draws.is_empty());
        assert!(!tool.on_pointer_down(&none, &camera, &mut picking, 1.0, 1.0));
    }

    #[test]
    fn test_pivot_helpers() {
        let mut tool = TransformTool::default();
        let mut picking = StubPicking::on(HandleKind::RotateView);
        picking.point = Vector3::new(1.0, 2.0, 3.0);
        tool.set_pivot_from_picking(&picking);
        assert_eq!(tool.settings().pivot, PivotPolicy::Custom);
        assert_eq!(tool.settings().custom_pivot, Vector3::new(1.0, 2.0, 3.0));
        tool.reset_pivot();
        assert_eq!(tool.settings().pivot, PivotPolicy::SelectionCentroid);
    }

    #[test]
    fn test_custom_pivot_places_widget() {
        let camera = camera();
        let meshes = vec![EditMesh::cube()];
        let mut tool = TransformTool::default();
        tool.set_custom_pivot(Vector3::new(0.0, 1.0, 0.0));
        let picking = StubPicking::on(HandleKind::TranslateAxis(Axis::X));
        tool.render(&meshes, &camera, &picking, &mut RecordingRenderer::default());
        assert!(tool.frame().pivot().approx_eq(&Vector3::new(0.0, 1.0, 0.0), 1e-6));
    }
}
