//! The fourteen manipulable handles and their fixed geometry.

use super::config::{AxisSelection, TransformMode};
use super::frame::WidgetFrame;
use super::hit::HandleShape;
use super::render::HandleDraw;
use crate::math::consts::{HALF_PI, PI};
use crate::math::{Matrix4, Vector3};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Length of a translate arrow.
pub const ARROW_LENGTH: f32 = 2.5;
/// Arrow cone radius as a multiple of the shaft thickness.
pub const ARROW_CONE_THICKNESS: f32 = 6.0;
/// Length of the arrow cone.
pub const ARROW_CONE_LENGTH: f32 = 0.25;
/// Drawn shaft and ring thickness.
pub const THICKNESS: f32 = 0.02;
/// Shaft and ring thickness used for picking.
pub const THICKNESS_PICK: f32 = THICKNESS * 5.0;
/// Radius of the rotate rings.
pub const ROT_RADIUS: f32 = 1.5;
/// Radius of the uniform scale ring.
pub const SCALE_RADIUS: f32 = ROT_RADIUS * 1.3;
/// Side of a drawn scale cube.
pub const CUBE_SIDE: f32 = 0.35;
/// Side of a scale cube used for picking.
pub const CUBE_SIDE_PICK: f32 = CUBE_SIDE * 1.2;
/// Side of a translate-plane quad.
pub const PLANE_SIDE: f32 = ARROW_LENGTH * 0.2;

/// X handle color.
pub const COLOR_X: [f32; 3] = [0.7, 0.2, 0.2];
/// Y handle color.
pub const COLOR_Y: [f32; 3] = [0.2, 0.7, 0.2];
/// Z handle color.
pub const COLOR_Z: [f32; 3] = [0.2, 0.2, 0.7];
/// View ring color.
pub const COLOR_GREY: [f32; 3] = [0.4, 0.4, 0.4];
/// Uniform scale ring color.
pub const COLOR_SCALE_UNIFORM: [f32; 3] = [0.8, 0.4, 0.2];
/// Color of the highlighted or active handle.
pub const COLOR_SELECTED: [f32; 3] = [1.0, 1.0, 0.0];

/// One of the three principal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All three axes in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0, 1, 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis.
    #[inline]
    pub fn unit(self) -> Vector3 {
        Vector3::unit(self.index())
    }

    /// Handle color for the axis.
    pub fn color(self) -> [f32; 3] {
        match self {
            Axis::X => COLOR_X,
            Axis::Y => COLOR_Y,
            Axis::Z => COLOR_Z,
        }
    }

    /// Single axis named by a selector, `None` for [`AxisSelection::All`].
    pub fn from_selection(selection: AxisSelection) -> Option<Axis> {
        match selection {
            AxisSelection::All => None,
            AxisSelection::X => Some(Axis::X),
            AxisSelection::Y => Some(Axis::Y),
            AxisSelection::Z => Some(Axis::Z),
        }
    }

    /// Rotation taking the +Y-aligned primitives onto this axis.
    fn orientation(self) -> Matrix4 {
        match self {
            Axis::X => Matrix4::from_rotation_z(-HALF_PI),
            Axis::Y => Matrix4::IDENTITY,
            Axis::Z => Matrix4::from_rotation_x(HALF_PI),
        }
    }
}

bitflags! {
    /// Set of handles, one bit per [`HandleKind`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleMask: u32 {
        /// Translate along X.
        const TRANS_X = 1 << 0;
        /// Translate along Y.
        const TRANS_Y = 1 << 1;
        /// Translate along Z.
        const TRANS_Z = 1 << 2;
        /// Rotate around X.
        const ROT_X = 1 << 3;
        /// Rotate around Y.
        const ROT_Y = 1 << 4;
        /// Rotate around Z.
        const ROT_Z = 1 << 5;
        /// Rotate around the view direction.
        const ROT_W = 1 << 6;
        /// Translate in the plane normal to X.
        const PLANE_X = 1 << 7;
        /// Translate in the plane normal to Y.
        const PLANE_Y = 1 << 8;
        /// Translate in the plane normal to Z.
        const PLANE_Z = 1 << 9;
        /// Scale along X.
        const SCALE_X = 1 << 10;
        /// Scale along Y.
        const SCALE_Y = 1 << 11;
        /// Scale along Z.
        const SCALE_Z = 1 << 12;
        /// Uniform scale.
        const SCALE_W = 1 << 13;

        /// Three translate arrows.
        const TRANS_XYZ = Self::TRANS_X.bits() | Self::TRANS_Y.bits() | Self::TRANS_Z.bits();
        /// Three rotate rings.
        const ROT_XYZ = Self::ROT_X.bits() | Self::ROT_Y.bits() | Self::ROT_Z.bits();
        /// Three translate planes.
        const PLANE_XYZ = Self::PLANE_X.bits() | Self::PLANE_Y.bits() | Self::PLANE_Z.bits();
        /// Three scale cubes.
        const SCALE_XYZ = Self::SCALE_X.bits() | Self::SCALE_Y.bits() | Self::SCALE_Z.bits();
        /// Three scale cubes and the uniform ring.
        const SCALE_XYZW = Self::SCALE_XYZ.bits() | Self::SCALE_W.bits();
    }
}

impl HandleMask {
    /// Handles offered for a mode and axis selection.
    pub fn for_tool(mode: TransformMode, axis: AxisSelection) -> Self {
        match (mode, Axis::from_selection(axis)) {
            (TransformMode::Translate, None) => Self::TRANS_XYZ | Self::PLANE_XYZ,
            (TransformMode::Translate, Some(a)) => HandleKind::TranslateAxis(a).mask(),
            (TransformMode::Rotate, None) => Self::ROT_XYZ | Self::ROT_W,
            (TransformMode::Rotate, Some(a)) => HandleKind::RotateAxis(a).mask(),
            (TransformMode::Scale, None) => Self::SCALE_XYZW,
            (TransformMode::Scale, Some(a)) => HandleKind::ScaleAxis(a).mask(),
        }
    }
}

/// Type tag of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Arrow constraining motion to one axis.
    TranslateAxis(Axis),
    /// Quad constraining motion to the plane normal to the axis.
    TranslatePlane(Axis),
    /// Half ring rotating around one axis.
    RotateAxis(Axis),
    /// Full ring rotating around the view direction.
    RotateView,
    /// Cube scaling along one axis.
    ScaleAxis(Axis),
    /// Full ring scaling uniformly.
    ScaleUniform,
}

impl HandleKind {
    /// Every handle, in draw order.
    pub const ALL: [HandleKind; 14] = [
        HandleKind::RotateView,
        HandleKind::TranslateAxis(Axis::X),
        HandleKind::TranslateAxis(Axis::Y),
        HandleKind::TranslateAxis(Axis::Z),
        HandleKind::TranslatePlane(Axis::X),
        HandleKind::TranslatePlane(Axis::Y),
        HandleKind::TranslatePlane(Axis::Z),
        HandleKind::RotateAxis(Axis::X),
        HandleKind::RotateAxis(Axis::Y),
        HandleKind::RotateAxis(Axis::Z),
        HandleKind::ScaleAxis(Axis::X),
        HandleKind::ScaleAxis(Axis::Y),
        HandleKind::ScaleAxis(Axis::Z),
        HandleKind::ScaleUniform,
    ];

    /// Bit of this handle.
    pub fn mask(self) -> HandleMask {
        use Axis::*;
        match self {
            HandleKind::TranslateAxis(X) => HandleMask::TRANS_X,
            HandleKind::TranslateAxis(Y) => HandleMask::TRANS_Y,
            HandleKind::TranslateAxis(Z) => HandleMask::TRANS_Z,
            HandleKind::TranslatePlane(X) => HandleMask::PLANE_X,
            HandleKind::TranslatePlane(Y) => HandleMask::PLANE_Y,
            HandleKind::TranslatePlane(Z) => HandleMask::PLANE_Z,
            HandleKind::RotateAxis(X) => HandleMask::ROT_X,
            HandleKind::RotateAxis(Y) => HandleMask::ROT_Y,
            HandleKind::RotateAxis(Z) => HandleMask::ROT_Z,
            HandleKind::RotateView => HandleMask::ROT_W,
            HandleKind::ScaleAxis(X) => HandleMask::SCALE_X,
            HandleKind::ScaleAxis(Y) => HandleMask::SCALE_Y,
            HandleKind::ScaleAxis(Z) => HandleMask::SCALE_Z,
            HandleKind::ScaleUniform => HandleMask::SCALE_W,
        }
    }

    /// Constrained axis, `None` for the view ring and uniform scale.
    pub fn axis(self) -> Option<Axis> {
        match self {
            HandleKind::TranslateAxis(a)
            | HandleKind::TranslatePlane(a)
            | HandleKind::RotateAxis(a)
            | HandleKind::ScaleAxis(a) => Some(a),
            HandleKind::RotateView | HandleKind::ScaleUniform => None,
        }
    }

    /// Rings that turn to face the eye in world space.
    pub fn is_view_aligned(self) -> bool {
        matches!(self, HandleKind::RotateView | HandleKind::ScaleUniform)
    }

    /// Resting color.
    pub fn color(self) -> [f32; 3] {
        match self {
            HandleKind::RotateView => COLOR_GREY,
            HandleKind::ScaleUniform => COLOR_SCALE_UNIFORM,
            other => other.axis().map(Axis::color).unwrap_or(COLOR_GREY),
        }
    }

    /// Placement of the handle geometry inside the widget frame.
    /// View-aligned rings get their orientation from the frame instead.
    pub fn base_matrix(self) -> Matrix4 {
        let lift = |y: f32| Matrix4::from_translation(&Vector3::new(0.0, y, 0.0));
        match self {
            HandleKind::TranslateAxis(a) => a.orientation() * lift(ARROW_LENGTH * 0.5),
            HandleKind::RotateAxis(a) => a.orientation(),
            HandleKind::ScaleAxis(a) => a.orientation() * lift(ROT_RADIUS),
            HandleKind::TranslatePlane(_) | HandleKind::RotateView | HandleKind::ScaleUniform => {
                Matrix4::IDENTITY
            }
        }
    }

    /// Geometry the renderer draws.
    pub fn draw_geometry(self) -> HandleGeometry {
        self.geometry(THICKNESS, THICKNESS * ARROW_CONE_THICKNESS, CUBE_SIDE)
    }

    /// Enlarged geometry used for hit testing.
    pub fn pick_geometry(self) -> HandleGeometry {
        self.geometry(
            THICKNESS_PICK,
            THICKNESS_PICK * ARROW_CONE_THICKNESS * 0.4,
            CUBE_SIDE_PICK,
        )
    }

    fn geometry(self, thickness: f32, cone_radius: f32, cube_side: f32) -> HandleGeometry {
        let s = PLANE_SIDE;
        match self {
            HandleKind::TranslateAxis(_) => HandleGeometry::Arrow {
                length: ARROW_LENGTH,
                thickness,
                cone_radius,
                cone_length: ARROW_CONE_LENGTH,
            },
            HandleKind::ScaleAxis(_) => HandleGeometry::Cube { side: cube_side },
            HandleKind::TranslatePlane(Axis::X) => HandleGeometry::Plane {
                width: Vector3::new(0.0, s, 0.0),
                height: Vector3::new(0.0, 0.0, s),
            },
            HandleKind::TranslatePlane(Axis::Y) => HandleGeometry::Plane {
                width: Vector3::new(s, 0.0, 0.0),
                height: Vector3::new(0.0, 0.0, s),
            },
            HandleKind::TranslatePlane(Axis::Z) => HandleGeometry::Plane {
                width: Vector3::new(s, 0.0, 0.0),
                height: Vector3::new(0.0, s, 0.0),
            },
            HandleKind::RotateAxis(_) => HandleGeometry::Ring {
                radius: ROT_RADIUS,
                thickness,
                arc: PI,
            },
            HandleKind::RotateView => HandleGeometry::Ring {
                radius: ROT_RADIUS,
                thickness,
                arc: 2.0 * PI,
            },
            HandleKind::ScaleUniform => HandleGeometry::Ring {
                radius: SCALE_RADIUS,
                thickness: thickness * 2.0,
                arc: 2.0 * PI,
            },
        }
    }
}

/// Handle primitive in its own local frame.
///
/// Arrows and rings are built around +Y: an arrow runs along Y centered on
/// the origin, a ring lies in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HandleGeometry {
    /// Shaft with a cone at the +Y end.
    Arrow {
        /// Total length.
        length: f32,
        /// Shaft radius.
        thickness: f32,
        /// Cone base radius.
        cone_radius: f32,
        /// Cone length.
        cone_length: f32,
    },
    /// Quad with one corner at the origin spanning `width` and `height`.
    Plane {
        /// First edge.
        width: Vector3,
        /// Second edge.
        height: Vector3,
    },
    /// Torus in the XZ plane, swept from angle 0 through `arc`.
    Ring {
        /// Ring radius.
        radius: f32,
        /// Tube radius.
        thickness: f32,
        /// Swept angle in radians.
        arc: f32,
    },
    /// Cube centered on the origin.
    Cube {
        /// Edge length.
        side: f32,
    },
}

/// One handle of the widget.
#[derive(Debug, Clone)]
pub struct Handle {
    kind: HandleKind,
    base_matrix: Matrix4,
    matrix: Matrix4,
    highlighted: bool,
    last_intersection: Vector3,
}

impl Handle {
    fn new(kind: HandleKind) -> Self {
        Self {
            kind,
            base_matrix: kind.base_matrix(),
            matrix: Matrix4::IDENTITY,
            highlighted: false,
            last_intersection: Vector3::ZERO,
        }
    }

    /// Type tag.
    #[inline]
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Placement inside the widget frame.
    #[inline]
    pub fn base_matrix(&self) -> &Matrix4 {
        &self.base_matrix
    }

    /// Final world matrix (`frame * base`).
    #[inline]
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// Whether the pointer is over this handle.
    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// World point where the handle was last hit.
    #[inline]
    pub fn last_intersection(&self) -> Vector3 {
        self.last_intersection
    }

    /// Draw color, yellow while highlighted.
    pub fn color(&self) -> [f32; 3] {
        if self.highlighted {
            COLOR_SELECTED
        } else {
            self.kind.color()
        }
    }
}

/// The fixed collection of handles and the subset currently enabled.
#[derive(Debug, Clone)]
pub struct HandleSet {
    handles: Vec<Handle>,
    enabled: HandleMask,
}

impl Default for HandleSet {
    fn default() -> Self {
        Self::new(HandleMask::all())
    }
}

impl HandleSet {
    /// Create every handle with the given subset enabled.
    pub fn new(enabled: HandleMask) -> Self {
        Self {
            handles: HandleKind::ALL.iter().map(|&k| Handle::new(k)).collect(),
            enabled,
        }
    }

    /// Enabled subset.
    #[inline]
    pub fn enabled(&self) -> HandleMask {
        self.enabled
    }

    /// Change the enabled subset. Disabled handles lose their highlight.
    pub fn set_enabled(&mut self, mask: HandleMask) {
        self.enabled = mask;
        for handle in &mut self.handles {
            if !mask.contains(handle.kind.mask()) {
                handle.highlighted = false;
            }
        }
    }

    /// Look up a handle.
    pub fn get(&self, kind: HandleKind) -> Option<&Handle> {
        self.handles.iter().find(|h| h.kind == kind)
    }

    /// All handles in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.handles.iter()
    }

    /// Currently highlighted handle.
    pub fn highlighted(&self) -> Option<HandleKind> {
        self.handles.iter().find(|h| h.highlighted).map(|h| h.kind)
    }

    /// Highlight `kind` (clearing every other highlight) and remember where it was hit.
    pub fn highlight(&mut self, kind: Option<HandleKind>, intersection: Vector3) {
        for handle in &mut self.handles {
            handle.highlighted = Some(handle.kind) == kind;
            if handle.highlighted {
                handle.last_intersection = intersection;
            }
        }
    }

    /// Recompute every handle's final matrix from the widget frame.
    pub fn update_matrices(&mut self, frame: &WidgetFrame) {
        for handle in &mut self.handles {
            if handle.kind.is_view_aligned() {
                handle.base_matrix = *frame.view_rotation();
            }
            handle.matrix = frame.matrix().multiply(&handle.base_matrix);
        }
    }

    /// Pick geometry of the enabled handles.
    pub fn pick_shapes(&self) -> Vec<HandleShape> {
        self.handles
            .iter()
            .filter(|h| self.enabled.contains(h.kind.mask()))
            .map(|h| HandleShape {
                kind: h.kind,
                matrix: h.matrix,
                geometry: h.kind.pick_geometry(),
            })
            .collect()
    }

    /// Draw records: every enabled handle, or only `active` while editing.
    pub fn draw_list(&self, active: Option<HandleKind>) -> Vec<HandleDraw> {
        let visible = active.map(HandleKind::mask).unwrap_or(self.enabled);
        self.handles
            .iter()
            .filter(|h| visible.contains(h.kind.mask()))
            .map(|h| HandleDraw {
                kind: h.kind,
                matrix: h.matrix,
                geometry: h.kind.draw_geometry(),
                color: if active == Some(h.kind) { COLOR_SELECTED } else { h.color() },
            })
            .collect()
    }
}
