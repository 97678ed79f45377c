//! Collision queries using Rapier3D.
//!
//! The game positions entity boxes and world brushes here; weapons and
//! projectiles query them with filtered line traces, optionally rewound in
//! time for lag compensation.

pub mod collision;
pub mod lag;
pub mod physics_world;
pub mod raycast;

pub use collision::*;
pub use lag::*;
pub use physics_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::ColliderHandle;
