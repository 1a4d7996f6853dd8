//! Manipulator settings.

use crate::math::Vector3;
use serde::{Deserialize, Serialize};

/// Gizmo operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransformMode {
    /// Move objects along axes and planes.
    #[default]
    Translate,
    /// Rotate objects around axes.
    Rotate,
    /// Scale objects along axes.
    Scale,
}

/// Which axes of the current mode are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisSelection {
    /// Every handle of the mode.
    #[default]
    All,
    /// X axis only.
    X,
    /// Y axis only.
    Y,
    /// Z axis only.
    Z,
}

/// Coordinate frame the handles are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpaceMode {
    /// World axes.
    #[default]
    World,
    /// Axes of the first selected object.
    Local,
    /// Frame aligned with the picked surface normal.
    Normal,
}

/// Where rotations and scales are centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PivotPolicy {
    /// Average of the selected objects' centers.
    #[default]
    SelectionCentroid,
    /// Each object's own origin.
    ObjectOrigin,
    /// An explicitly stored point.
    Custom,
}

/// Widget appearance and feel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    /// Desired on-screen widget size in pixels.
    pub screen_size: f32,
    /// Rotation in radians per pixel of pointer travel.
    pub rotate_sensitivity: f32,
    /// Draw the 2D guide line while dragging.
    pub show_guide_line: bool,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            screen_size: 80.0,
            rotate_sensitivity: 0.01,
            show_guide_line: true,
        }
    }
}

/// Selector state owned by the host UI.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Active operation.
    pub mode: TransformMode,
    /// Offered axes.
    pub axis: AxisSelection,
    /// Active coordinate frame.
    pub space: SpaceMode,
    /// Pivot policy.
    pub pivot: PivotPolicy,
    /// Point used by [`PivotPolicy::Custom`].
    pub custom_pivot: Vector3,
}
