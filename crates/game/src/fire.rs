//! Weapon firing: hit-scan traces and projectile launches.

use crate::combat::{DamageFlags, MeansOfDeath};
use crate::entity::{MoveType, ProjectileKind, ThinkKind};
use crate::events::{EventKind, GameEvent};
use crate::game::Game;
use crate::weapons::{weapon_def, WeaponType, ZOOM_TIME};
use engine_core::{angle_vectors, angles_forward, lerp, vec_to_angles, AngleVectors, EntityId, Vec3};
use physics::{Contents, Trace, MASK_SHOT, MASK_SOLID, MASK_WALLBANG};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Distance between the center bubble and the ring around it.
const BUBBLE_SPACING: f32 = 25.0;
/// Grenades leave the barrel this many degrees above the view direction.
const GRENADE_AIM_UP_DEGREES: f32 = 5.0;

/// Maximum bullet offset at `range` for a client zoomed in for `zoom_time` ms.
///
/// The cone half-width is `atan` of the weapon's spread angle in radians and
/// shrinks linearly to zero at a full zoom.
pub fn hip_spread(range: f32, zoom_spread_degrees: f32, zoom_time: i64) -> f32 {
    if zoom_time >= ZOOM_TIME {
        return 0.0;
    }
    let frac = 1.0 - zoom_time.max(0) as f32 / ZOOM_TIME as f32;
    frac * range * zoom_spread_degrees.to_radians().atan()
}

/// Deterministic shotgun pellet offsets `(right, up)` in a sunflower pattern.
///
/// Pellet `i` sits at angle `2.4 i` radians and radius `spread * sqrt(2.4 i)`.
pub fn sunflower_offsets(count: u32, spread: f32) -> Vec<(f32, f32)> {
    (0..count)
        .map(|i| {
            let fi = i as f32 * 2.4;
            let r = spread * fi.sqrt();
            (fi.cos() * r, fi.sin() * r)
        })
        .collect()
}

/// Hit-scan result: the trace that deals damage and, if the bullet went
/// through a wallbangable surface first, where it went through.
struct BulletTrace {
    trace: Trace,
    wallbang: Option<Trace>,
}

impl Game {
    /// Fire `weapon` from `entity`'s eye along its view.
    pub fn fire_weapon(&mut self, entity: EntityId, weapon: WeaponType) {
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        e.weapon = Some(weapon);
        let (origin, angles, time_delta) = match &e.client {
            Some(client) => (
                e.origin + Vec3::Z * client.view_height,
                client.view_angles,
                client.time_delta,
            ),
            None => (e.origin, e.angles, 0),
        };

        match weapon {
            WeaponType::Knife => self.fire_blade(entity, origin, angles, time_delta),
            WeaponType::Pistol => self.fire_bullet(entity, origin, angles, time_delta, weapon, MeansOfDeath::Pistol),
            WeaponType::MachineGun => {
                self.fire_bullet(entity, origin, angles, time_delta, weapon, MeansOfDeath::MachineGun)
            }
            WeaponType::Deagle => self.fire_bullet(entity, origin, angles, time_delta, weapon, MeansOfDeath::Deagle),
            WeaponType::Shotgun => self.fire_shotgun(entity, origin, angles, time_delta),
            WeaponType::AssaultRifle => {
                self.fire_bullet(entity, origin, angles, time_delta, weapon, MeansOfDeath::AssaultRifle)
            }
            WeaponType::GrenadeLauncher => self.fire_grenade(entity, origin, angles, time_delta, true),
            WeaponType::RocketLauncher => self.fire_rocket(entity, origin, angles, time_delta),
            WeaponType::Plasma => self.fire_plasma(entity, origin, angles, time_delta),
            WeaponType::BubbleGun => self.fire_bubble_gun(entity, origin, angles, time_delta),
            WeaponType::Laser => self.fire_lasergun(entity, origin, angles, time_delta),
            WeaponType::Sniper => self.fire_bullet(entity, origin, angles, time_delta, weapon, MeansOfDeath::Sniper),
            WeaponType::Railgun => self.fire_railgun(entity, origin, angles, time_delta),
            WeaponType::Rifle => self.fire_rifle_bullet(entity, origin, angles, time_delta),
        }

        let shots = weapon_def(weapon).projectile_count;
        if let Some(client) = self.entities.get_mut(entity).and_then(|e| e.client.as_mut()) {
            client.stats.accuracy_shots[weapon.index()] += shots;
        }
    }

    fn damageable_hit(&self, trace: &Trace) -> Option<EntityId> {
        trace
            .ent
            .filter(|&id| self.entities.get(id).is_some_and(|e| e.take_damage))
    }

    fn impact_event(&mut self, kind: EventKind, trace: &Trace, owner: EntityId) {
        let now = self.now();
        let team = self.entities[owner].team;
        self.spawn_event(
            GameEvent::new(kind, now, trace.endpos, trace.normal)
                .with_team(team)
                .with_owner(owner),
        );
    }

    /// Slash with a fan of short traces; the first one that finds something
    /// damageable deals the damage.
    fn fire_blade(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        let def = weapon_def(WeaponType::Knife);
        let traces = def.projectile_count;
        let slash = def.spread;
        let mask = if self.config.race_gametype {
            MASK_SOLID
        } else {
            MASK_SHOT
        };

        let mut wall_hit = None;
        for i in 0..traces {
            let t = if traces > 1 {
                i as f32 / (traces - 1) as f32
            } else {
                0.5
            };
            let mut new_angles = angles;
            new_angles.y += lerp(-slash, t, slash);

            let dir = angles_forward(new_angles);
            let end = start + dir * def.range;
            let trace = self.collision.trace(start, end, &[shooter], mask, time_delta);
            if let Some(hit) = self.damageable_hit(&trace) {
                self.damage(
                    hit,
                    shooter,
                    shooter,
                    dir,
                    trace.endpos,
                    def.damage,
                    def.knockback,
                    DamageFlags::empty(),
                    MeansOfDeath::Knife,
                );
                return;
            }
            if trace.hit() && wall_hit.is_none() {
                wall_hit = Some(trace);
            }
        }

        if let Some(trace) = wall_hit {
            self.impact_event(EventKind::BladeImpact, &trace, shooter);
        }
    }

    /// Trace a bullet offset `(x, y)` units from the crosshair at full range.
    #[allow(clippy::too_many_arguments)]
    fn trace_bullet(
        &mut self,
        shooter: EntityId,
        start: Vec3,
        axes: &AngleVectors,
        x_spread: f32,
        y_spread: f32,
        range: f32,
        time_delta: i64,
    ) -> BulletTrace {
        let end = start + axes.forward * range + axes.right * x_spread + axes.up * y_spread;
        let first = self.collision.trace(start, end, &[shooter], MASK_SHOT, time_delta);
        if !first.contents.contains(Contents::WALLBANGABLE) {
            return BulletTrace {
                trace: first,
                wallbang: None,
            };
        }
        let trace = self.collision.trace(start, end, &[shooter], MASK_WALLBANG, time_delta);
        BulletTrace {
            trace,
            wallbang: Some(first),
        }
    }

    fn bullet_impacts(&mut self, shooter: EntityId, bullet: &BulletTrace) {
        if let Some(wallbang) = &bullet.wallbang {
            self.impact_event(EventKind::Wallbang, wallbang, shooter);
        }
        if bullet.trace.hit() && self.damageable_hit(&bullet.trace).is_none() {
            self.impact_event(EventKind::BulletImpact, &bullet.trace, shooter);
        }
    }

    fn fire_bullet(
        &mut self,
        shooter: EntityId,
        start: Vec3,
        angles: Vec3,
        time_delta: i64,
        weapon: WeaponType,
        means: MeansOfDeath,
    ) {
        let def = weapon_def(weapon);
        let axes = angle_vectors(angles);

        // Hip fire spreads; a full zoom is perfectly accurate.
        let zoom_time = self
            .entities
            .get(shooter)
            .and_then(|e| e.client.as_ref())
            .map(|c| c.zoom_time);
        let (mut x_spread, mut y_spread) = (0.0, 0.0);
        if let Some(zoom_time) = zoom_time.filter(|&z| z < ZOOM_TIME) {
            let spread = hip_spread(def.range, def.zoom_spread, zoom_time);
            x_spread = self.rng.gen_range(-1.0f32..=1.0) * spread;
            y_spread = self.rng.gen_range(-1.0f32..=1.0) * spread;
        }

        let bullet = self.trace_bullet(shooter, start, &axes, x_spread, y_spread, def.range, time_delta);
        self.bullet_impacts(shooter, &bullet);

        let trace = bullet.trace;
        if let Some(hit) = self.damageable_hit(&trace) {
            let mut flags = DamageFlags::KNOCKBACK_SOFT;
            if self.is_headshot(hit, trace.endpos, time_delta) {
                flags |= DamageFlags::HEADSHOT;
            }
            self.damage(
                hit,
                shooter,
                shooter,
                axes.forward,
                trace.endpos,
                def.damage,
                def.knockback,
                flags,
                means,
            );
        }
    }

    /// Sunflower pellet pattern. Damage to each client is reported as one
    /// event per blast, sent only to the shooter.
    fn fire_shotgun(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        let def = weapon_def(WeaponType::Shotgun);
        let axes = angle_vectors(angles);
        let mut dealt = vec![0.0f32; self.entities.max_clients() + 1];

        for (r, u) in sunflower_offsets(def.projectile_count, def.spread) {
            let bullet = self.trace_bullet(shooter, start, &axes, r, u, def.range, time_delta);
            self.bullet_impacts(shooter, &bullet);

            let trace = bullet.trace;
            let Some(hit) = self.damageable_hit(&trace) else {
                continue;
            };
            self.damage(
                hit,
                shooter,
                shooter,
                axes.forward,
                trace.endpos,
                def.damage,
                def.knockback,
                DamageFlags::NO_EVENT,
                MeansOfDeath::Shotgun,
            );
            if !self.is_team_damage(hit, shooter) && self.entities.is_client(hit) {
                dealt[hit.index()] += def.damage;
            }
        }

        let now = self.now();
        for (i, &damage) in dealt.iter().enumerate().skip(1) {
            if damage == 0.0 {
                continue;
            }
            let target = EntityId::from(i);
            let origin = self.entities[target].origin;
            self.spawn_event(
                GameEvent::new(EventKind::Damage, now, origin, Vec3::ZERO)
                    .with_param((damage as i32) << 1)
                    .with_owner(shooter)
                    .with_target(target)
                    .only_owner(),
            );
        }
    }

    fn fire_grenade(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64, aim_up: bool) {
        let mut new_angles = angles;
        if aim_up {
            new_angles.x -= GRENADE_AIM_UP_DEGREES * new_angles.x.to_radians().cos();
        }

        let Some(id) = self.fire_projectile(
            shooter,
            start,
            new_angles,
            time_delta,
            WeaponType::GrenadeLauncher,
            ProjectileKind::Grenade,
            MASK_SHOT,
        ) else {
            return;
        };
        let e = &mut self.entities[id];
        e.classname = "grenade";
        e.move_type = MoveType::BounceGrenade;
        e.think = Some(ThinkKind::GrenadeExplode);
        e.angles = Vec3::ZERO;
        e.avelocity = Vec3::splat(300.0);
    }

    fn fire_rocket(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        if let Some(id) = self.fire_linear_projectile(
            shooter,
            start,
            angles,
            time_delta,
            WeaponType::RocketLauncher,
            ProjectileKind::Rocket,
            MASK_SHOT,
        ) {
            self.entities[id].classname = "rocket";
        }
    }

    fn fire_plasma(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        if let Some(id) = self.fire_linear_projectile(
            shooter,
            start,
            angles,
            time_delta,
            WeaponType::Plasma,
            ProjectileKind::Plasma,
            MASK_SHOT,
        ) {
            self.entities[id].classname = "plasma";
        }
    }

    fn fire_bubble(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        let now = self.now();
        if let Some(id) = self.fire_linear_projectile(
            shooter,
            start,
            angles,
            time_delta,
            WeaponType::BubbleGun,
            ProjectileKind::Bubble,
            MASK_SHOT,
        ) {
            let e = &mut self.entities[id];
            e.classname = "bubble";
            e.schedule(ThinkKind::Plasma, now + 1);
        }
    }

    /// One bubble straight ahead, the rest on a ring around it drifting outward.
    fn fire_bubble_gun(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        let def = weapon_def(WeaponType::BubbleGun);
        let axes = angle_vectors(angles);

        self.fire_bubble(shooter, start, angles, time_delta);

        let n = def.projectile_count.saturating_sub(1);
        let base_angle = self.rng.gen::<f32>() * TAU;
        for i in 0..n {
            let angle = base_angle + TAU * i as f32 / n as f32;
            let pos = start
                + axes.right * angle.cos() * BUBBLE_SPACING
                + axes.up * angle.sin() * BUBBLE_SPACING;
            let tilt = angle + FRAC_PI_2;
            let dir = (axes.forward + axes.right * tilt.cos() * def.spread + axes.up * tilt.sin() * def.spread)
                .normalize();
            self.fire_bubble(shooter, pos, vec_to_angles(dir), time_delta);
        }
    }

    /// Penetrating trace: passes through bodies, damaging each once, until
    /// it hits the world, a teammate or something immovable.
    fn fire_railgun(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        let def = weapon_def(WeaponType::Railgun);
        let dir = angles_forward(angles);
        let end = start + dir * def.range;
        let mut from = start;
        let mut ignore = vec![shooter];

        loop {
            let tr = self.collision.trace(from, end, &ignore, MASK_WALLBANG, time_delta);
            from = tr.endpos;
            let Some(hit) = tr.ent else {
                break;
            };
            if hit.is_world() {
                break;
            }
            let Some(target) = self.entities.get(hit) else {
                break;
            };
            // The target may die below; keep what it was.
            let move_type = target.move_type;
            let brush = target.brush_model;
            let takes_damage = target.take_damage;

            if hit != shooter && takes_damage {
                let mut flags = DamageFlags::empty();
                if self.is_headshot(hit, tr.endpos, time_delta) {
                    flags |= DamageFlags::HEADSHOT;
                }
                self.damage(
                    hit,
                    shooter,
                    shooter,
                    dir,
                    tr.endpos,
                    def.damage,
                    def.knockback,
                    flags,
                    MeansOfDeath::Railgun,
                );
                self.impact_event(EventKind::BoltExplosion, &tr, shooter);

                if self.is_team_damage(hit, shooter) {
                    break;
                }
            }

            if brush || matches!(move_type, MoveType::None | MoveType::Push) {
                break;
            }
            ignore.push(hit);
        }
    }

    fn fire_rifle_bullet(&mut self, shooter: EntityId, start: Vec3, angles: Vec3, time_delta: i64) {
        if let Some(id) = self.fire_linear_projectile(
            shooter,
            start,
            angles,
            time_delta,
            WeaponType::Rifle,
            ProjectileKind::RifleBullet,
            MASK_WALLBANG,
        ) {
            self.entities[id].classname = "riflebullet";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use engine_core::Team;
    use physics::SurfaceFlags;

    fn game(friendly_fire: bool) -> Game {
        Game::new(GameConfig {
            max_clients: 8,
            friendly_fire,
            ..Default::default()
        })
    }

    /// Client at `origin` whose eye is level with other clients' chests.
    fn shooter(g: &mut Game, origin: Vec3, team: Team) -> EntityId {
        let id = g.spawn_client(origin, team).unwrap();
        g.entities[id].client.as_mut().unwrap().view_height = 0.0;
        g.entities[id].client.as_mut().unwrap().zoom_time = ZOOM_TIME;
        id
    }

    #[test]
    fn hip_spread_narrows_with_zoom() {
        let full = hip_spread(8192.0, 2.0, 0);
        assert!((full - 8192.0 * 2.0f32.to_radians().atan()).abs() < 1e-3);
        assert!(full < 8192.0 * 2.0f32.to_radians().tan());
        assert!((hip_spread(8192.0, 2.0, ZOOM_TIME / 2) - full * 0.5).abs() < 1e-2);
        assert_eq!(hip_spread(8192.0, 2.0, ZOOM_TIME), 0.0);
        assert_eq!(hip_spread(8192.0, 0.0, 0), 0.0);
    }

    #[test]
    fn sunflower_is_deterministic() {
        let a = sunflower_offsets(25, 20.0);
        let b = sunflower_offsets(25, 20.0);
        assert_eq!(a, b);
        assert_eq!(a[0], (0.0, 0.0));
        let (r, u) = a[1];
        assert!(((r * r + u * u).sqrt() - 20.0 * 2.4f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn railgun_stops_at_teammate() {
        for (ff, teammate_health) in [(false, 100.0), (true, 40.0)] {
            let mut g = game(ff);
            let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
            let b = g.spawn_client(Vec3::new(100.0, 0.0, 0.0), Team::Alpha).unwrap();
            let c = g.spawn_client(Vec3::new(200.0, 0.0, 0.0), Team::Beta).unwrap();
            g.fire_weapon(a, WeaponType::Railgun);

            assert_eq!(g.entities[b].health, teammate_health);
            assert_eq!(g.entities[c].health, 100.0);
            let bolts = g.events().iter().filter(|e| e.kind == EventKind::BoltExplosion).count();
            assert_eq!(bolts, 1);
        }
    }

    #[test]
    fn railgun_penetrates_enemies() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        let b = g.spawn_client(Vec3::new(100.0, 0.0, 0.0), Team::Beta).unwrap();
        let c = g.spawn_client(Vec3::new(200.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Railgun);
        assert_eq!(g.entities[b].health, 40.0);
        assert_eq!(g.entities[c].health, 40.0);
    }

    #[test]
    fn railgun_stops_at_world() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        g.add_brush(
            Vec3::new(150.0, 0.0, 0.0),
            Vec3::new(4.0, 500.0, 500.0),
            Contents::SOLID,
            SurfaceFlags::empty(),
        );
        let c = g.spawn_client(Vec3::new(200.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Railgun);
        assert_eq!(g.entities[c].health, 100.0);
    }

    #[test]
    fn shotgun_aggregates_one_event_per_target() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        let b = g.spawn_client(Vec3::new(150.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Shotgun);

        let damage_events: Vec<_> = g.events().iter().filter(|e| e.kind == EventKind::Damage).collect();
        assert_eq!(damage_events.len(), 1);
        let ev = damage_events[0];
        assert!(ev.only_owner);
        assert_eq!(ev.owner, Some(a));
        assert_eq!(ev.target, Some(b));
        let taken = 100.0 - g.entities[b].health;
        assert!(taken > 0.0);
        assert_eq!(ev.param, (taken as i32) << 1);
        let stats = g.entities[a].client.as_ref().unwrap().stats;
        assert_eq!(stats.accuracy_shots[WeaponType::Shotgun.index()], 25);
    }

    #[test]
    fn shotgun_pattern_hits_same_way_every_time() {
        let health_after_blast = || {
            let mut g = game(false);
            let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
            let b = g.spawn_client(Vec3::new(300.0, 0.0, 0.0), Team::Beta).unwrap();
            g.fire_weapon(a, WeaponType::Shotgun);
            g.entities[b].health
        };
        assert_eq!(health_after_blast(), health_after_blast());
    }

    #[test]
    fn zoomed_bullet_is_exact_and_headshots() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::new(0.0, 0.0, 36.0), Team::Alpha);
        let b = g.spawn_client(Vec3::new(300.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Sniper);
        assert_eq!(g.entities[b].health, 25.0);
        let ev = g.events().iter().find(|e| e.kind == EventKind::Damage).unwrap();
        assert_eq!(ev.param & 1, 1);
    }

    #[test]
    fn bullet_into_wall_leaves_impact() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        g.add_brush(
            Vec3::new(300.0, 0.0, 0.0),
            Vec3::new(4.0, 500.0, 500.0),
            Contents::SOLID,
            SurfaceFlags::empty(),
        );
        g.fire_weapon(a, WeaponType::Pistol);
        let ev = g.events().iter().find(|e| e.kind == EventKind::BulletImpact).unwrap();
        assert!((ev.origin.x - 296.0).abs() < 0.1);
        assert!((ev.normal - Vec3::NEG_X).length() < 1e-3);
    }

    #[test]
    fn bullets_go_through_wallbangable_walls() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        g.add_brush(
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(2.0, 500.0, 500.0),
            Contents::WALLBANGABLE,
            SurfaceFlags::empty(),
        );
        let b = g.spawn_client(Vec3::new(200.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Deagle);
        assert_eq!(g.entities[b].health, 60.0);
        assert!(g.events().iter().any(|e| e.kind == EventKind::Wallbang));
    }

    #[test]
    fn blade_reaches_only_close_targets() {
        let mut g = game(false);
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        let far = g.spawn_client(Vec3::new(200.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Knife);
        assert_eq!(g.entities[far].health, 100.0);

        let near = g.spawn_client(Vec3::new(50.0, 30.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Knife);
        assert_eq!(g.entities[near].health, 75.0);
    }

    #[test]
    fn bubble_gun_fires_a_ring() {
        let mut g = Game::new(GameConfig {
            projectile_prestep: 0.0,
            ..Default::default()
        });
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        g.fire_weapon(a, WeaponType::BubbleGun);
        let bubbles: Vec<_> = g
            .entities
            .spawned()
            .filter(|e| e.kind == Some(ProjectileKind::Bubble))
            .collect();
        assert_eq!(bubbles.len(), 5);
        let ring = bubbles.iter().filter(|b| (b.origin.length() - BUBBLE_SPACING).abs() < 1e-3).count();
        assert_eq!(ring, 4);
        for b in &bubbles {
            assert_eq!(b.think, Some(ThinkKind::Plasma));
            assert!(b.velocity.x > 0.0);
        }
    }

    #[test]
    fn grenade_fires_slightly_upward() {
        let mut g = Game::new(GameConfig {
            projectile_prestep: 0.0,
            ..Default::default()
        });
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        g.fire_weapon(a, WeaponType::GrenadeLauncher);
        let grenade = g.entities.spawned().find(|e| e.kind == Some(ProjectileKind::Grenade)).unwrap();
        assert_eq!(grenade.move_type, MoveType::BounceGrenade);
        assert_eq!(grenade.think, Some(ThinkKind::GrenadeExplode));
        assert!(grenade.velocity.z > 0.0);
    }

    #[test]
    fn rifle_bullet_hits_after_travel() {
        let mut g = Game::new(GameConfig {
            max_clients: 4,
            projectile_prestep: 0.0,
            ..Default::default()
        });
        let a = shooter(&mut g, Vec3::ZERO, Team::Alpha);
        let b = g.spawn_client(Vec3::new(500.0, 0.0, 0.0), Team::Beta).unwrap();
        g.fire_weapon(a, WeaponType::Rifle);
        assert_eq!(g.entities[b].health, 100.0);
        for _ in 0..10 {
            g.run_frame();
        }
        assert_eq!(g.entities[b].health, 55.0);
        assert!(g.events().iter().any(|e| e.kind == EventKind::RifleBulletImpact));
    }
}
