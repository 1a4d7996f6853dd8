//! Draw records handed to the host renderer.

use super::handle::{HandleGeometry, HandleKind};
use crate::math::{Matrix4, Vector2};
use bytemuck::{Pod, Zeroable};

/// One visible handle for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleDraw {
    /// Handle being drawn.
    pub kind: HandleKind,
    /// World matrix of the geometry.
    pub matrix: Matrix4,
    /// Geometry in its local frame.
    pub geometry: HandleGeometry,
    /// Flat color.
    pub color: [f32; 3],
}

impl HandleDraw {
    /// Uniform block for a flat-color shader.
    pub fn uniform(&self) -> HandleUniform {
        HandleUniform {
            model: self.matrix.to_cols_array_2d(),
            color: [self.color[0], self.color[1], self.color[2], 1.0],
        }
    }
}

/// GPU layout of a handle draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HandleUniform {
    /// Model matrix, column-major.
    pub model: [[f32; 4]; 4],
    /// RGBA color.
    pub color: [f32; 4],
}

/// Receives what the manipulator wants on screen.
pub trait HandleRenderer {
    /// Draw one handle.
    fn draw_handle(&mut self, draw: &HandleDraw);

    /// Draw the 2D guide segment (pixel coordinates) shown while dragging.
    fn draw_guide_line(&mut self, _from: Vector2, _to: Vector2) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::handle::COLOR_SELECTED;
    use crate::math::Vector3;

    #[test]
    fn test_uniform_layout() {
        let draw = HandleDraw {
            kind: HandleKind::ScaleUniform,
            matrix: Matrix4::from_translation(&Vector3::new(1.0, 2.0, 3.0)),
            geometry: HandleKind::ScaleUniform.draw_geometry(),
            color: COLOR_SELECTED,
        };
        let uniform = draw.uniform();
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.color, [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 80);
    }
}
