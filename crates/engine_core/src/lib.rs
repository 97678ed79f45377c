//! Core engine types and utilities shared by the simulation and renderer.
//!
//! This crate provides the foundational pieces used across all systems:
//! - Culling geometry (planes, frustums, boxes, perspective inversion)
//! - Euler-angle helpers for view directions
//! - The fixed-step level clock
//! - Entity identifiers and teams

pub mod components;
pub mod geometry;
pub mod time;
pub mod transform;

pub use components::*;
pub use geometry::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Vec3, Vec4};
