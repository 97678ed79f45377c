//! Projectile spawning and impact handling.
//!
//! Projectiles are zero-size arena entities. Touches are dispatched on
//! [`ProjectileKind`]; plasma and bubbles additionally run a backtrace that
//! catches bodies the projectile passed through during its last step.

use crate::combat::{splash_frac, DamageFlags, MeansOfDeath};
use crate::entity::{LinearMovement, MoveType, ProjectileInfo, ProjectileKind, SvFlags, ThinkKind};
use crate::events::{explosion_param, EventKind, GameEvent};
use crate::game::Game;
use crate::weapons::{weapon_def, WeaponType};
use engine_core::{angles_forward, EntityId, Vec3};
use physics::{Contents, SurfaceFlags, Trace, MASK_SOLID, MASK_WATER};

impl Game {
    /// A projectile never hits its owner; the world is always fair game.
    fn can_hit(&self, projectile: EntityId, target: EntityId) -> bool {
        target.is_world() || self.entities.get(projectile).and_then(|e| e.owner) != Some(target)
    }

    /// Spawn a projectile flying along `angles` and prestep it.
    ///
    /// Returns `None` if the arena is full or the projectile was consumed by
    /// its prestep.
    #[allow(clippy::too_many_arguments)]
    pub fn fire_projectile(
        &mut self,
        owner: EntityId,
        start: Vec3,
        angles: Vec3,
        time_delta: i64,
        weapon: WeaponType,
        kind: ProjectileKind,
        clip_mask: Contents,
    ) -> Option<EntityId> {
        let def = weapon_def(weapon);
        let now = self.now();
        let race = self.config.race_gametype;
        let team = self.entities.get(owner).map(|e| e.team).unwrap_or_default();

        let id = match self.entities.spawn(now) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("{} could not fire {}: {}", owner, def.name, e);
                return None;
            }
        };

        let range_ms = def.range as i64;
        let e = &mut self.entities[id];
        e.classname = def.name;
        e.origin = start;
        e.old_origin = start;
        e.angles = angles;
        e.velocity = angles_forward(angles) * def.speed;
        e.move_type = MoveType::LinearProjectile;
        e.clip_mask = if race { MASK_SOLID } else { clip_mask };
        e.sv_flags = SvFlags::PROJECTILE;
        e.owner = Some(owner);
        e.schedule(ThinkKind::Free, now + range_ms);
        e.timeout = now + range_ms;
        e.time_stamp = now;
        e.time_delta = time_delta;
        e.team = team;
        e.kind = Some(kind);
        e.projectile = ProjectileInfo {
            min_damage: def.min_damage.min(def.damage),
            max_damage: def.damage,
            min_knockback: def.min_knockback.min(def.knockback),
            max_knockback: def.knockback,
            radius: def.splash_radius,
        };

        self.projectile_prestep(id, self.config.projectile_prestep);
        self.entities.in_use(id).then_some(id)
    }

    /// [`Game::fire_projectile`] plus the straight-line extrapolation data clients use.
    #[allow(clippy::too_many_arguments)]
    pub fn fire_linear_projectile(
        &mut self,
        owner: EntityId,
        start: Vec3,
        angles: Vec3,
        time_delta: i64,
        weapon: WeaponType,
        kind: ProjectileKind,
        clip_mask: Contents,
    ) -> Option<EntityId> {
        let id = self.fire_projectile(owner, start, angles, time_delta, weapon, kind, clip_mask)?;
        let now = self.now();
        let e = &mut self.entities[id];
        e.move_type = MoveType::LinearProjectile;
        e.linear = Some(LinearMovement {
            begin: e.origin,
            velocity: e.velocity,
            time_stamp: now,
            time_delta: time_delta.unsigned_abs().min(255) as u8,
        });
        Some(id)
    }

    /// Push a fresh projectile `distance` units along its velocity, hitting
    /// whatever is in the way.
    pub fn projectile_prestep(&mut self, id: EntityId, distance: f32) {
        if distance == 0.0 {
            return;
        }
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let speed = e.velocity.length();
        if speed == 0.0 {
            return;
        }
        let dir = e.velocity / speed;
        let start = e.origin;
        let owner = e.owner.unwrap_or(id);
        let (mask, time_delta, kind) = (e.clip_mask, e.time_delta, e.kind);

        let dest = start + dir * distance;
        let trace = self.collision.trace(start, dest, &[id, owner], mask, time_delta);

        let e = &mut self.entities[id];
        e.origin = trace.endpos;
        e.old_origin = trace.endpos;
        self.impact(id, &trace);

        if !self.entities.in_use(id) {
            return;
        }
        let in_water = self.collision.point_contents(trace.endpos).intersects(MASK_WATER);
        self.entities[id].water_level = in_water;

        if matches!(kind, Some(ProjectileKind::Plasma | ProjectileKind::Bubble)) {
            self.plasma_backtrace(id, start);
        }
    }

    /// Report a trace hit to the moving entity.
    pub(crate) fn impact(&mut self, id: EntityId, trace: &Trace) {
        if let Some(other) = trace.ent {
            self.touch(id, other, trace.plane(), trace.surface);
        }
    }

    pub(crate) fn touch(&mut self, id: EntityId, other: EntityId, plane: Option<Vec3>, surface: SurfaceFlags) {
        let Some(kind) = self.entities.get(id).and_then(|e| e.kind) else {
            return;
        };
        match kind {
            ProjectileKind::Grenade => self.touch_grenade(id, other, plane, surface),
            ProjectileKind::Rocket => self.touch_rocket(id, other, plane, surface),
            ProjectileKind::Plasma | ProjectileKind::Bubble => self.autotouch_plasma(id, other, plane, surface),
            ProjectileKind::RifleBullet => self.touch_rifle_bullet(id, other, plane, surface),
            ProjectileKind::LaserBeam => {}
        }
    }

    /// Full direct-hit damage to `other`, pushed away from the projectile.
    fn direct_hit(&mut self, id: EntityId, other: EntityId, flags: DamageFlags, means: MeansOfDeath) {
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let (origin, velocity, info, time_delta) = (e.origin, e.velocity, e.projectile, e.time_delta);
        let attacker = e.owner.unwrap_or(id);
        let push_dir = self
            .entity_box(other, time_delta)
            .and_then(|bounds| splash_frac(&bounds, origin, info.radius))
            .map(|(_, dir)| dir)
            .unwrap_or_else(|| velocity.normalize_or_zero());
        self.damage(
            other,
            id,
            attacker,
            push_dir,
            origin,
            info.max_damage,
            info.max_knockback,
            flags,
            means,
        );
    }

    fn takes_damage(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|e| e.take_damage)
    }

    fn projectile_event(&self, id: EntityId, kind: EventKind, normal: Option<Vec3>) -> GameEvent {
        let e = &self.entities[id];
        let mut event = GameEvent::new(kind, self.now(), e.origin, normal.unwrap_or(Vec3::ZERO)).with_team(e.team);
        if let Some(owner) = e.owner {
            event = event.with_owner(owner);
        }
        event
    }

    fn explode_plasma(&mut self, id: EntityId, other: Option<EntityId>, plane: Option<Vec3>) {
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let bubble = e.kind == Some(ProjectileKind::Bubble);
        let attacker = e.owner.unwrap_or(id);
        let radius = e.projectile.radius;
        let means = if bubble {
            MeansOfDeath::BubbleGun
        } else {
            MeansOfDeath::Plasma
        };

        if let Some(other) = other.filter(|&o| self.takes_damage(o)) {
            self.direct_hit(id, other, DamageFlags::KNOCKBACK_SOFT, means);
        }
        self.radius_damage(id, attacker, plane, other, means);

        let kind = if bubble {
            EventKind::BubbleExplosion
        } else {
            EventKind::PlasmaExplosion
        };
        let event = self
            .projectile_event(id, kind, plane)
            .with_param(explosion_param(radius, 127));
        self.spawn_event(event);
        self.free_entity(id);
    }

    fn touch_plasma(&mut self, id: EntityId, other: EntityId, plane: Option<Vec3>, surface: SurfaceFlags) {
        if surface.contains(SurfaceFlags::NOIMPACT) {
            self.free_entity(id);
            return;
        }
        if !self.can_hit(id, other) {
            return;
        }
        self.explode_plasma(id, Some(other), plane);
    }

    fn autotouch_plasma(&mut self, id: EntityId, other: EntityId, plane: Option<Vec3>, surface: SurfaceFlags) {
        self.think_plasma(id);
        if self.entities.in_use(id) {
            self.touch_plasma(id, other, plane, surface);
        }
    }

    /// Per-frame plasma/bubble think: expire, then backtrace the last step.
    pub(crate) fn think_plasma(&mut self, id: EntityId) {
        let now = self.now();
        let frame_seconds = self.time.frame_time_seconds();
        let Some(e) = self.entities.get_mut(id) else {
            return;
        };
        if e.timeout < now {
            if e.kind == Some(ProjectileKind::Bubble) {
                self.explode_plasma(id, None, None);
            } else {
                self.free_entity(id);
            }
            return;
        }

        e.next_think = now + 1;
        let start = e.origin - e.velocity * frame_seconds;
        self.plasma_backtrace(id, start);
    }

    /// Re-trace from `start` to the current origin against bodies only, so
    /// a fast plasma ball cannot skip over a player between frames.
    ///
    /// Each body touched is ignored by the next trace, so the walk always
    /// ends. Skipped in race mode.
    pub fn plasma_backtrace(&mut self, id: EntityId, start: Vec3) {
        if self.config.race_gametype {
            return;
        }
        let Some(e) = self.entities.get_mut(id) else {
            return;
        };
        let end = e.origin;
        let time_delta = e.time_delta;
        let mut ignore = vec![id];
        ignore.extend(e.owner);
        e.origin = start;

        let mut from = start;
        loop {
            let tr = self.collision.trace(from, end, &ignore, Contents::BODY, time_delta);
            from = tr.endpos;
            self.entities[id].origin = tr.endpos;

            let Some(hit) = tr.ent else {
                break;
            };
            if tr.start_solid {
                self.touch_plasma(id, hit, None, SurfaceFlags::empty());
            } else if tr.fraction < 1.0 {
                self.touch_plasma(id, hit, tr.plane(), tr.surface);
            } else {
                break;
            }

            if !self.entities.in_use(id) {
                return;
            }
            ignore.push(hit);
            if from == end {
                break;
            }
        }

        if let Some(e) = self.entities.get_mut(id) {
            e.origin = end;
        }
    }

    fn touch_grenade(&mut self, id: EntityId, other: EntityId, plane: Option<Vec3>, surface: SurfaceFlags) {
        if surface.contains(SurfaceFlags::NOIMPACT) {
            self.free_entity(id);
            return;
        }
        if !self.can_hit(id, other) {
            return;
        }

        // Doors and platforms that take damage only bounce grenades.
        let brush = self.entities.get(other).map_or(true, |o| o.brush_model);
        if !self.takes_damage(other) || brush {
            let event = self.projectile_event(id, EventKind::GrenadeBounce, plane);
            self.spawn_event(event);
            return;
        }

        self.direct_hit(id, other, DamageFlags::empty(), MeansOfDeath::Grenade);
        if let Some(e) = self.entities.get_mut(id) {
            e.enemy = Some(other);
        }
        self.grenade_explode(id, plane.unwrap_or(Vec3::ZERO));
    }

    /// Splash, explosion event, free. A zero `normal` means "explode upward".
    pub(crate) fn grenade_explode(&mut self, id: EntityId, normal: Vec3) {
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let dir = if normal != Vec3::ZERO { normal } else { Vec3::Z };
        let attacker = e.owner.unwrap_or(id);
        let (enemy, radius) = (e.enemy, e.projectile.radius);

        self.radius_damage(id, attacker, None, enemy, MeansOfDeath::Grenade);
        let event = self
            .projectile_event(id, EventKind::GrenadeExplosion, Some(dir))
            .with_param(explosion_param(radius, 127));
        self.spawn_event(event);
        self.free_entity(id);
    }

    fn touch_rocket(&mut self, id: EntityId, other: EntityId, plane: Option<Vec3>, surface: SurfaceFlags) {
        if surface.contains(SurfaceFlags::NOIMPACT) {
            self.free_entity(id);
            return;
        }
        if !self.can_hit(id, other) {
            return;
        }

        if self.takes_damage(other) {
            self.direct_hit(id, other, DamageFlags::empty(), MeansOfDeath::Rocket);
        }
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let attacker = e.owner.unwrap_or(id);
        let radius = e.projectile.radius;
        self.radius_damage(id, attacker, plane, Some(other), MeansOfDeath::Rocket);

        let event = self
            .projectile_event(id, EventKind::RocketExplosion, plane)
            .with_param(explosion_param(radius, 255));
        self.spawn_event(event);
        self.free_entity(id);
    }

    fn touch_rifle_bullet(&mut self, id: EntityId, other: EntityId, plane: Option<Vec3>, surface: SurfaceFlags) {
        if surface.contains(SurfaceFlags::NOIMPACT) {
            self.free_entity(id);
            return;
        }
        if !self.can_hit(id, other) {
            return;
        }

        if self.takes_damage(other) {
            let e = &self.entities[id];
            let (origin, velocity, info) = (e.origin, e.velocity, e.projectile);
            let attacker = e.owner.unwrap_or(id);
            self.damage(
                other,
                id,
                attacker,
                velocity,
                origin,
                info.max_damage,
                info.max_knockback,
                DamageFlags::empty(),
                MeansOfDeath::Rifle,
            );
        }

        if self.entities.in_use(id) {
            let event = self.projectile_event(id, EventKind::RifleBulletImpact, plane);
            self.spawn_event(event);
            self.free_entity(id);
        }
    }
}
