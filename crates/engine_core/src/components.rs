//! Identifiers shared between the simulation, collision and rendering crates.

use std::fmt;

/// Index into the entity arena. Slot 0 is always the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const WORLD: EntityId = EntityId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_world(self) -> bool {
        self == Self::WORLD
    }
}

impl From<usize> for EntityId {
    fn from(index: usize) -> Self {
        EntityId(index as u32)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team membership for friendly-fire checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Team {
    #[default]
    None,
    Spectator,
    /// Everyone on their own side (free-for-all).
    Players,
    Alpha,
    Beta,
}

impl Team {
    /// True when both sides belong to the same playing team.
    pub fn is_teammate_of(self, other: Team) -> bool {
        matches!(self, Team::Alpha | Team::Beta) && self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_is_slot_zero() {
        assert!(EntityId::WORLD.is_world());
        assert_eq!(EntityId::from(5usize).index(), 5);
    }

    #[test]
    fn free_for_all_players_are_not_teammates() {
        assert!(!Team::Players.is_teammate_of(Team::Players));
        assert!(Team::Alpha.is_teammate_of(Team::Alpha));
        assert!(!Team::Alpha.is_teammate_of(Team::Beta));
    }
}
