//! # Core Module
//!
//! Identifiers and error types shared by every part of the manipulator.

mod error;
mod id;

pub use error::GizmoError;
pub use id::MeshId;
