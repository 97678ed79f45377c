//! Decal rendering support: the per-frame decal store, spray lifecycle and
//! the screen-space tile culling that feeds the decal shader.

pub mod camera;
pub mod decals;
pub mod gpu;
pub mod materials;
pub mod pipeline;
pub mod sprays;
pub mod tiles;

pub use camera::*;
pub use decals::*;
pub use gpu::*;
pub use materials::*;
pub use pipeline::*;
pub use sprays::*;
pub use tiles::*;
