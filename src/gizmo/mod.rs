//! # Gizmo Module
//!
//! The transform manipulator: handles, picking, space and pivot resolution,
//! the edit session and the committer that bakes edits into vertices.

mod commit;
mod config;
mod frame;
mod handle;
mod hit;
pub mod pivot;
mod render;
mod session;
mod space;
mod tool;

pub use commit::{CommitReport, TransformCommitter};
pub use config::{AxisSelection, GizmoConfig, PivotPolicy, SpaceMode, ToolSettings, TransformMode};
pub use frame::WidgetFrame;
pub use handle::{
    Axis, Handle, HandleGeometry, HandleKind, HandleMask, HandleSet, ARROW_CONE_LENGTH,
    ARROW_CONE_THICKNESS, ARROW_LENGTH, COLOR_GREY, COLOR_SCALE_UNIFORM, COLOR_SELECTED, COLOR_X,
    COLOR_Y, COLOR_Z, CUBE_SIDE, CUBE_SIDE_PICK, PLANE_SIDE, ROT_RADIUS, SCALE_RADIUS, THICKNESS,
    THICKNESS_PICK,
};
pub use hit::{pick_handles, HandleHit, HandleShape, Picking, ViewportPicker};
pub use render::{HandleDraw, HandleRenderer, HandleUniform};
pub use session::{EditSession, EditStart, SessionState};
pub use space::SpaceFrame;
pub use tool::TransformTool;
