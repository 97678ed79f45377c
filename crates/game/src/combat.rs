//! Damage application, splash damage and headshot detection.

use crate::entity::MoveType;
use crate::events::{EventKind, GameEvent};
use crate::game::Game;
use crate::weapons::WeaponType;
use bitflags::bitflags;
use engine_core::{lerp, Aabb, EntityId, Vec3};
use physics::MASK_SOLID;

/// Hits this close to the top of a client's box count as headshots.
const HEADSHOT_HEIGHT: f32 = 12.0;
const KNOCKBACK_SCALE: f32 = 500.0;
const MIN_KNOCKBACK_MASS: f32 = 50.0;

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DamageFlags: u32 {
        /// Knockback only pushes horizontally.
        const KNOCKBACK_SOFT = 1 << 0;
        const HEADSHOT = 1 << 1;
        /// Splash damage; spares the attacker's health.
        const RADIUS = 1 << 2;
        /// Caller reports the damage itself.
        const NO_EVENT = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeansOfDeath {
    Knife,
    Pistol,
    MachineGun,
    Deagle,
    Shotgun,
    AssaultRifle,
    Grenade,
    Rocket,
    Plasma,
    BubbleGun,
    Laser,
    Sniper,
    Railgun,
    Rifle,
}

impl MeansOfDeath {
    pub fn weapon(self) -> WeaponType {
        match self {
            MeansOfDeath::Knife => WeaponType::Knife,
            MeansOfDeath::Pistol => WeaponType::Pistol,
            MeansOfDeath::MachineGun => WeaponType::MachineGun,
            MeansOfDeath::Deagle => WeaponType::Deagle,
            MeansOfDeath::Shotgun => WeaponType::Shotgun,
            MeansOfDeath::AssaultRifle => WeaponType::AssaultRifle,
            MeansOfDeath::Grenade => WeaponType::GrenadeLauncher,
            MeansOfDeath::Rocket => WeaponType::RocketLauncher,
            MeansOfDeath::Plasma => WeaponType::Plasma,
            MeansOfDeath::BubbleGun => WeaponType::BubbleGun,
            MeansOfDeath::Laser => WeaponType::Laser,
            MeansOfDeath::Sniper => WeaponType::Sniper,
            MeansOfDeath::Railgun => WeaponType::Railgun,
            MeansOfDeath::Rifle => WeaponType::Rifle,
        }
    }
}

/// Splash falloff from `origin` to the nearest point of `bounds`.
///
/// Returns `(fraction, push_dir)`, where fraction is 1 at the blast center
/// and 0 at `radius`, or `None` when the box is out of reach.
pub fn splash_frac(bounds: &Aabb, origin: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    if radius <= 0.0 {
        return None;
    }
    let distance = bounds.closest_point(origin).distance(origin);
    if distance >= radius {
        return None;
    }
    let push_dir = (bounds.center() - origin).try_normalize().unwrap_or(Vec3::Z);
    Some((1.0 - distance / radius, push_dir))
}

impl Game {
    /// World-space box of an entity, rewound `time_delta` ms when lag compensated.
    pub(crate) fn entity_box(&self, id: EntityId, time_delta: i64) -> Option<Aabb> {
        self.collision.entity_bounds(id, time_delta).or_else(|| {
            let e = self.entities.get(id)?;
            Some(Aabb::new(e.origin + e.mins, e.origin + e.maxs))
        })
    }

    /// Both sides are on the same playing team.
    pub fn is_team_damage(&self, a: EntityId, b: EntityId) -> bool {
        match (self.entities.get(a), self.entities.get(b)) {
            (Some(a), Some(b)) => a.team.is_teammate_of(b.team),
            _ => false,
        }
    }

    /// A hit at `point` lands in the top of a client's box.
    pub fn is_headshot(&self, target: EntityId, point: Vec3, time_delta: i64) -> bool {
        if !self.entities.is_client(target) {
            return false;
        }
        self.entity_box(target, time_delta)
            .is_some_and(|bounds| point.z >= bounds.max.z - HEADSHOT_HEIGHT)
    }

    /// Apply damage and knockback to `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn damage(
        &mut self,
        target: EntityId,
        inflictor: EntityId,
        attacker: EntityId,
        push_dir: Vec3,
        point: Vec3,
        damage: f32,
        knockback: f32,
        flags: DamageFlags,
        means: MeansOfDeath,
    ) {
        let friendly_fire = self.config.friendly_fire;
        let now = self.now();
        let target_is_client = self.entities.is_client(target);
        let attacker_is_client = self.entities.is_client(attacker);
        let self_damage = target == attacker;
        let team_damage = !self_damage && self.is_team_damage(target, attacker);

        let Some(t) = self.entities.get_mut(target) else {
            return;
        };
        if !t.take_damage {
            return;
        }

        let mut damage = damage.max(0.0);
        if team_damage && !friendly_fire {
            damage = 0.0;
        }
        if self_damage && flags.contains(DamageFlags::RADIUS) {
            damage = 0.0;
        }

        let pushable = !t.brush_model && !matches!(t.move_type, MoveType::None | MoveType::Push);
        if knockback > 0.0 && pushable {
            let mass = t.mass.max(MIN_KNOCKBACK_MASS);
            let mut push = push_dir.normalize_or_zero() * (KNOCKBACK_SCALE * knockback / mass);
            if flags.contains(DamageFlags::KNOCKBACK_SOFT) {
                push.z = 0.0;
            }
            t.velocity += push;
            t.ground = None;
        }

        if damage <= 0.0 {
            return;
        }
        t.health -= damage;
        let health = t.health;
        let origin = t.origin;
        let team = t.team;
        if let Some(client) = t.client.as_mut() {
            client.stats.damage_taken += damage;
        }

        if attacker_is_client && !self_damage && !team_damage {
            if let Some(client) = self.entities[attacker].client.as_mut() {
                client.stats.damage_given += damage;
                client.stats.accuracy_hits[means.weapon().index()] += 1;
            }
        }

        if target_is_client && !flags.contains(DamageFlags::NO_EVENT) {
            let headshot = i32::from(flags.contains(DamageFlags::HEADSHOT));
            self.spawn_event(
                GameEvent::new(EventKind::Damage, now, origin, Vec3::ZERO)
                    .with_param((damage as i32) << 1 | headshot)
                    .with_owner(attacker)
                    .with_target(target)
                    .with_team(team),
            );
        }

        if health <= 0.0 {
            self.kill(target, inflictor, attacker, means);
        }
    }

    fn kill(&mut self, target: EntityId, inflictor: EntityId, attacker: EntityId, means: MeansOfDeath) {
        let now = self.now();
        log::info!("{} killed {} with {:?} (inflictor {})", attacker, target, means, inflictor);

        if attacker != target {
            if let Some(client) = self.entities.get_mut(attacker).and_then(|e| e.client.as_mut()) {
                client.stats.frags += 1;
            }
        }

        let Some(t) = self.entities.get_mut(target) else {
            return;
        };
        let origin = t.origin;
        self.spawn_event(
            GameEvent::new(EventKind::Obituary, now, origin, Vec3::ZERO)
                .with_owner(attacker)
                .with_target(target),
        );

        if self.entities.is_client(target) {
            let t = &mut self.entities[target];
            t.take_damage = false;
            t.contents = physics::Contents::CORPSE;
            if let Some(client) = t.client.as_mut() {
                client.ghosting = true;
            }
            self.link_entity(target);
        } else {
            self.free_entity(target);
        }
    }

    /// Splash damage around `inflictor` using its projectile parameters.
    ///
    /// Entities behind world geometry are spared. `ignore` is the entity
    /// already hit directly.
    pub fn radius_damage(
        &mut self,
        inflictor: EntityId,
        attacker: EntityId,
        normal: Option<Vec3>,
        ignore: Option<EntityId>,
        means: MeansOfDeath,
    ) {
        let Some(e) = self.entities.get(inflictor) else {
            return;
        };
        let info = e.projectile;
        let origin = e.origin;
        let time_delta = e.time_delta;
        if info.radius <= 0.0 {
            return;
        }
        // Look from just off the surface the blast hit.
        let eye = origin + normal.unwrap_or(Vec3::ZERO);

        for id in self.entities.ids_in_use() {
            if Some(id) == ignore || id == inflictor {
                continue;
            }
            if !self.entities.get(id).is_some_and(|e| e.take_damage) {
                continue;
            }
            let Some(bounds) = self.entity_box(id, time_delta) else {
                continue;
            };
            let Some((frac, push_dir)) = splash_frac(&bounds, origin, info.radius) else {
                continue;
            };
            if !self
                .collision
                .line_of_sight(eye, bounds.center(), &[inflictor], MASK_SOLID)
            {
                continue;
            }

            let damage = lerp(info.min_damage, frac, info.max_damage);
            let knockback = lerp(info.min_knockback, frac, info.max_knockback);
            self.damage(
                id,
                inflictor,
                attacker,
                push_dir,
                origin,
                damage,
                knockback,
                DamageFlags::RADIUS,
                means,
            );
        }
    }
}
