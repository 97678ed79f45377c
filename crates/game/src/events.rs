//! Events the simulation emits for clients: damage feedback and impacts.

use engine_core::{EntityId, Team, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `param` = damage << 1 | headshot.
    Damage,
    BulletImpact,
    /// Bullet punched through a wallbangable surface.
    Wallbang,
    BladeImpact,
    GrenadeBounce,
    /// `param` = splash radius / 8, capped at 127.
    GrenadeExplosion,
    /// `param` = splash radius / 8, capped at 255.
    RocketExplosion,
    PlasmaExplosion,
    BubbleExplosion,
    /// Railgun hit on a damaged entity.
    BoltExplosion,
    RifleBulletImpact,
    Obituary,
}

/// Decal left by an impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactMark {
    pub material: &'static str,
    pub radius: f32,
}

impl EventKind {
    pub fn impact_mark(self) -> Option<ImpactMark> {
        let (material, radius) = match self {
            EventKind::BulletImpact | EventKind::Wallbang => ("weapons/bullet_impact", 4.0),
            EventKind::RifleBulletImpact => ("weapons/bullet_impact", 6.0),
            EventKind::BladeImpact => ("weapons/blade_impact", 6.0),
            EventKind::GrenadeExplosion | EventKind::RocketExplosion => ("weapons/explosion_scorch", 32.0),
            EventKind::PlasmaExplosion => ("weapons/plasma_impact", 12.0),
            EventKind::BubbleExplosion => ("weapons/bubble_impact", 12.0),
            EventKind::BoltExplosion => ("weapons/rail_impact", 8.0),
            EventKind::Damage | EventKind::GrenadeBounce | EventKind::Obituary => return None,
        };
        Some(ImpactMark { material, radius })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub kind: EventKind,
    pub time: i64,
    pub origin: Vec3,
    /// Surface normal; zero when the event did not happen on a surface.
    pub normal: Vec3,
    pub param: i32,
    pub team: Team,
    /// Entity that caused the event.
    pub owner: Option<EntityId>,
    /// Entity the event is about (damage target, obituary victim).
    pub target: Option<EntityId>,
    /// Only the owner receives it.
    pub only_owner: bool,
}

impl GameEvent {
    pub fn new(kind: EventKind, time: i64, origin: Vec3, normal: Vec3) -> Self {
        Self {
            kind,
            time,
            origin,
            normal,
            param: 0,
            team: Team::None,
            owner: None,
            target: None,
            only_owner: false,
        }
    }

    pub fn with_param(mut self, param: i32) -> Self {
        self.param = param;
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn only_owner(mut self) -> Self {
        self.only_owner = true;
        self
    }
}

/// Explosion size byte: splash radius / 8, capped.
pub fn explosion_param(radius: f32, cap: i32) -> i32 {
    ((radius / 8.0) as i32).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explosion_param_is_capped() {
        assert_eq!(explosion_param(150.0, 127), 18);
        assert_eq!(explosion_param(4000.0, 127), 127);
        assert_eq!(explosion_param(4000.0, 255), 255);
    }

    #[test]
    fn damage_events_leave_no_mark() {
        assert!(EventKind::Damage.impact_mark().is_none());
        assert_eq!(
            EventKind::RocketExplosion.impact_mark().unwrap().material,
            "weapons/explosion_scorch"
        );
    }
}
