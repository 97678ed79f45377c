//! Content and surface flags used to filter traces.

use bitflags::bitflags;
use rapier3d::prelude::*;

bitflags! {
    /// What a collider is made of. Stored as the collider's membership group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Contents: u32 {
        /// Regular world geometry.
        const SOLID = 1 << 0;
        /// Thin geometry that penetrating shots pass through.
        const WALLBANGABLE = 1 << 1;
        const LAVA = 1 << 3;
        const SLIME = 1 << 4;
        const WATER = 1 << 5;
        /// Clips players but not shots.
        const PLAYERCLIP = 1 << 16;
        /// Living bounding boxes (players).
        const BODY = 1 << 25;
        const CORPSE = 1 << 26;
    }
}

bitflags! {
    /// Surface properties reported by a trace hit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SurfaceFlags: u32 {
        /// Projectiles vanish without an explosion (sky, void).
        const NOIMPACT = 1 << 0;
        /// No decals are placed on this surface.
        const NODECALS = 1 << 1;
    }
}

/// Everything a moving player collides with.
pub const MASK_PLAYERSOLID: Contents = Contents::SOLID
    .union(Contents::WALLBANGABLE)
    .union(Contents::PLAYERCLIP)
    .union(Contents::BODY);
/// World geometry only.
pub const MASK_SOLID: Contents = Contents::SOLID.union(Contents::WALLBANGABLE);
/// Shots: world plus bodies.
pub const MASK_SHOT: Contents = Contents::SOLID
    .union(Contents::WALLBANGABLE)
    .union(Contents::BODY)
    .union(Contents::CORPSE);
/// Penetrating shots: like [`MASK_SHOT`] but thin walls are ignored.
pub const MASK_WALLBANG: Contents = Contents::SOLID
    .union(Contents::BODY)
    .union(Contents::CORPSE);
pub const MASK_WATER: Contents = Contents::WATER.union(Contents::LAVA).union(Contents::SLIME);

impl Contents {
    /// Collider groups for something made of these contents. Colliders accept every query.
    pub fn collider_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::from_bits_retain(self.bits()), Group::ALL)
    }

    /// Query groups that only see colliders whose contents intersect this mask.
    pub fn query_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_retain(self.bits()))
    }

    pub fn from_groups(groups: InteractionGroups) -> Self {
        Contents::from_bits_truncate(groups.memberships.bits())
    }
}

/// Pack the owning entity and surface flags into collider user data.
pub(crate) fn pack_user_data(entity: u32, surface: SurfaceFlags) -> u128 {
    (entity as u128) | ((surface.bits() as u128) << 32)
}

pub(crate) fn unpack_entity(user_data: u128) -> u32 {
    (user_data & 0xffff_ffff) as u32
}

pub(crate) fn unpack_surface(user_data: u128) -> SurfaceFlags {
    SurfaceFlags::from_bits_truncate(((user_data >> 32) & 0xffff_ffff) as u32)
}
