//! Server-side weapon simulation.
//!
//! Hit-scan and projectile weapons, lag-compensated traces, damage and splash,
//! and the events clients turn into feedback and decals.

pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod fire;
pub mod game;
pub mod laser;
pub mod level;
pub mod movement;
pub mod projectile;
pub mod weapons;

pub use combat::{DamageFlags, MeansOfDeath};
pub use config::GameConfig;
pub use entity::{Entity, EntityTable, MoveType, ProjectileKind, SvFlags, ThinkKind};
pub use error::GameError;
pub use events::{EventKind, GameEvent, ImpactMark};
pub use fire::sunflower_offsets;
pub use game::Game;
pub use level::{build_arena, Arena};
pub use weapons::{weapon_def, WeaponDef, WeaponState, WeaponType};
