//! Continuous laser beam: one persistent entity per owner.

use crate::combat::{DamageFlags, MeansOfDeath};
use crate::entity::{MoveType, ProjectileKind, SvFlags, ThinkKind};
use crate::game::Game;
use crate::weapons::{weapon_def, WeaponState, WeaponType};
use engine_core::{angles_forward, EntityId, Vec3};
use physics::MASK_SHOT;

/// A beam nobody refreshes hides after this long, and a hidden beam is freed
/// after the same delay.
pub const LASER_HOLD_MS: i64 = 100;

impl Game {
    /// The owner's beam entity, if it has one.
    pub fn find_laser(&self, owner: EntityId) -> Option<EntityId> {
        self.entities
            .spawned()
            .find(|e| e.kind == Some(ProjectileKind::LaserBeam) && e.owner == Some(owner))
            .map(|e| e.id)
    }

    fn find_or_spawn_laser(&mut self, owner: EntityId) -> Option<EntityId> {
        if let Some(id) = self.find_laser(owner) {
            return Some(id);
        }
        let id = match self.entities.spawn(self.now()) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("{} could not fire laser: {}", owner, e);
                return None;
            }
        };
        let team = self.entities[owner].team;
        let e = &mut self.entities[id];
        e.classname = "laser";
        e.kind = Some(ProjectileKind::LaserBeam);
        e.move_type = MoveType::None;
        e.owner = Some(owner);
        e.team = team;
        log::debug!("laser {} spawned for {}", id, owner);
        Some(id)
    }

    /// Trace the beam from `start` and damage whatever it touches.
    pub(crate) fn fire_lasergun(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        let def = weapon_def(WeaponType::Laser);
        let Some(laser) = self.find_or_spawn_laser(shooter) else {
            return;
        };

        let dir = angles_forward(angles);
        let end = start + dir * def.range;
        let trace = self.collision.trace(start, end, &[shooter], MASK_SHOT, time_delta);
        if let Some(hit) = trace.ent.filter(|id| !id.is_world()) {
            if self.entities.get(hit).is_some_and(|e| e.take_damage) {
                self.damage(
                    hit,
                    laser,
                    shooter,
                    dir,
                    trace.endpos,
                    def.damage,
                    def.knockback,
                    DamageFlags::KNOCKBACK_SOFT,
                    MeansOfDeath::Laser,
                );
            }
        }

        let now = self.now();
        let e = &mut self.entities[laser];
        e.sv_flags.remove(SvFlags::NOCLIENT);
        e.sv_flags.insert(SvFlags::FORCEOWNER);
        e.origin = start;
        e.origin2 = trace.endpos;
        e.schedule(ThinkKind::Laser, now + LASER_HOLD_MS);
    }

    /// Keep the beam alive while its owner holds the trigger, otherwise hide it.
    pub(crate) fn laser_think(&mut self, id: EntityId) {
        let owner_firing = self
            .entities
            .get(id)
            .and_then(|e| e.owner)
            .and_then(|owner| self.entities.get(owner))
            .and_then(|owner| owner.client.as_ref().map(|c| (owner.weapon, c)))
            .is_some_and(|(weapon, client)| {
                client.spawned
                    && !client.ghosting
                    && weapon == Some(WeaponType::Laser)
                    && client.weapon_state == WeaponState::Firing
            });

        let now = self.now();
        if owner_firing {
            self.entities[id].next_think = now + 1;
        } else {
            self.hide_laser(id, now);
        }
    }

    fn hide_laser(&mut self, id: EntityId, now: i64) {
        let e = &mut self.entities[id];
        e.sv_flags = SvFlags::NOCLIENT;
        e.schedule(ThinkKind::Free, now + LASER_HOLD_MS);
        log::trace!("laser {} hidden", id);
    }
}
