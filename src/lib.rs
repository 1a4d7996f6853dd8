//! # Ren Gizmo - Interactive Transform Manipulator
//!
//! A translate / rotate / scale widget for editable meshes, in the style of
//! 3D sculpting and modelling tools.
//!
//! ## Features
//!
//! - **Math**: Column-major vectors, quaternions and matrices with glam interop
//! - **Camera**: `Viewport` contract and a perspective camera implementing it
//! - **Mesh**: `EditableMesh` contract with per-vertex mask weights
//! - **History**: Grouped vertex snapshots with undo
//! - **Gizmo**: Handles, analytic picking, world/local/normal spaces, pivot
//!   policies, the edit session and the vertex committer
//!
//! ## Example
//!
//! ```ignore
//! use ren_gizmo::prelude::*;
//!
//! let camera = PerspectiveCamera::default();
//! let mut meshes = vec![EditMesh::cube()];
//! let mut picker = ViewportPicker::new();
//! let mut history = UndoStack::new();
//! let mut tool = TransformTool::default();
//!
//! tool.on_pointer_move(&mut meshes, &camera, &mut picker, x, y);
//! tool.on_pointer_down(&meshes, &camera, &mut picker, x, y);
//! tool.on_pointer_move(&mut meshes, &camera, &mut picker, x + 40.0, y);
//! tool.on_pointer_up(&mut meshes, &mut history)?;
//! tool.render(&meshes, &camera, &picker, &mut renderer);
//! ```

#![warn(missing_docs)]

pub mod math;
pub mod core;
pub mod camera;
pub mod mesh;
pub mod history;
pub mod gizmo;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::math::*;
    pub use crate::core::*;
    pub use crate::camera::*;
    pub use crate::mesh::*;
    pub use crate::history::*;
    pub use crate::gizmo::*;
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Ren Gizmo";
