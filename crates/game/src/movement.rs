//! Per-frame entity movement by [`MoveType`].

use crate::entity::MoveType;
use crate::game::Game;
use engine_core::{EntityId, Vec3};
use physics::MASK_WATER;

const STOP_EPSILON: f32 = 0.1;
/// Floors are surfaces steeper than this.
const FLOOR_NORMAL_Z: f32 = 0.7;
/// Bouncing objects come to rest on a floor below this vertical speed.
const REST_SPEED: f32 = 60.0;

/// Slide `velocity` along a plane, scaled by `overbounce`.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal) * overbounce;
    let out = velocity - normal * backoff;
    Vec3::select(out.abs().cmplt(Vec3::splat(STOP_EPSILON)), Vec3::ZERO, out)
}

impl Game {
    pub(crate) fn run_movement(&mut self, id: EntityId) {
        let Some(e) = self.entities.get(id) else {
            return;
        };
        match e.move_type {
            MoveType::LinearProjectile => self.move_linear(id),
            MoveType::Toss | MoveType::Bounce | MoveType::BounceGrenade => self.move_toss(id),
            MoveType::None | MoveType::Push | MoveType::Player => {}
        }
    }

    fn move_linear(&mut self, id: EntityId) {
        let now = self.now();
        let dt = self.time.frame_time_seconds();
        let e = &self.entities[id];
        let start = e.origin;
        // Follow the same line clients extrapolate.
        let end = match e.linear {
            Some(linear) => linear.begin + linear.velocity * ((now - linear.time_stamp) as f32 * 0.001),
            None => start + e.velocity * dt,
        };
        let ignore = [id, e.owner.unwrap_or(id)];
        let (mask, time_delta) = (e.clip_mask, e.time_delta);

        let trace = self.collision.trace(start, end, &ignore, mask, time_delta);
        let e = &mut self.entities[id];
        e.old_origin = start;
        e.origin = trace.endpos;
        self.impact(id, &trace);

        if self.entities.in_use(id) {
            let in_water = self.collision.point_contents(trace.endpos).intersects(MASK_WATER);
            self.entities[id].water_level = in_water;
        }
    }

    fn move_toss(&mut self, id: EntityId) {
        let dt = self.time.frame_time_seconds();
        let gravity = self.config.gravity;
        let e = &mut self.entities[id];
        if e.ground.is_some() && e.velocity == Vec3::ZERO {
            return;
        }

        e.velocity.z -= gravity * dt;
        e.angles += e.avelocity * dt;
        let start = e.origin;
        let end = start + e.velocity * dt;
        let ignore = [id, e.owner.unwrap_or(id)];
        let (mask, time_delta, move_type) = (e.clip_mask, e.time_delta, e.move_type);

        let trace = self.collision.trace(start, end, &ignore, mask, time_delta);
        let e = &mut self.entities[id];
        e.old_origin = start;
        e.origin = trace.endpos;
        if !trace.hit() {
            return;
        }

        self.impact(id, &trace);
        let Some(e) = self.entities.get_mut(id) else {
            return;
        };
        let Some(normal) = trace.plane() else {
            return;
        };
        let overbounce = if move_type == MoveType::Toss { 1.0 } else { 1.5 };
        e.velocity = clip_velocity(e.velocity, normal, overbounce);

        if normal.z > FLOOR_NORMAL_Z && e.velocity.z.abs() < REST_SPEED {
            e.ground = trace.ent;
            e.velocity = Vec3::ZERO;
            e.avelocity = Vec3::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::entity::{ProjectileKind, ThinkKind};
    use crate::events::EventKind;
    use crate::weapons::WeaponType;
    use engine_core::Team;
    use physics::{Contents, SurfaceFlags, MASK_SHOT};

    #[test]
    fn clip_velocity_reflects_and_slides() {
        let v = clip_velocity(Vec3::new(100.0, 0.0, -100.0), Vec3::Z, 1.0);
        assert_eq!(v, Vec3::new(100.0, 0.0, 0.0));
        let v = clip_velocity(Vec3::new(0.0, 0.0, -100.0), Vec3::Z, 1.5);
        assert_eq!(v, Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn linear_projectile_flies_straight() {
        let mut g = Game::new(GameConfig {
            projectile_prestep: 0.0,
            ..Default::default()
        });
        let a = g.spawn_client(Vec3::ZERO, Team::Players).unwrap();
        let id = g
            .fire_linear_projectile(a, Vec3::ZERO, Vec3::ZERO, 0, WeaponType::RocketLauncher, ProjectileKind::Rocket, MASK_SHOT)
            .unwrap();
        for _ in 0..10 {
            g.run_frame();
        }
        let e = &g.entities[id];
        let expected = 1150.0 * 0.16;
        assert!((e.origin.x - expected).abs() < 0.5, "{}", e.origin.x);
        assert_eq!(e.origin.z, 0.0);
    }

    #[test]
    fn grenade_bounces_then_settles_and_explodes_on_timeout() {
        let mut g = Game::new(GameConfig {
            projectile_prestep: 0.0,
            ..Default::default()
        });
        let a = g.spawn_client(Vec3::new(0.0, 0.0, 100.0), Team::Players).unwrap();
        // Floor top at z = 0.
        g.add_brush(
            Vec3::new(0.0, 0.0, -8.0),
            Vec3::new(4000.0, 4000.0, 8.0),
            Contents::SOLID,
            SurfaceFlags::empty(),
        );
        let id = g
            .fire_projectile(a, Vec3::new(0.0, 0.0, 50.0), Vec3::new(45.0, 0.0, 0.0), 0, WeaponType::GrenadeLauncher, ProjectileKind::Grenade, MASK_SHOT)
            .unwrap();
        g.entities[id].move_type = MoveType::BounceGrenade;
        let timeout = g.entities[id].timeout;
        g.entities[id].schedule(ThinkKind::GrenadeExplode, timeout);

        while g.entities.in_use(id) && g.now() < timeout + 100 {
            g.run_frame();
            if let Some(e) = g.entities.get(id) {
                assert!(e.origin.z >= 0.0);
            }
        }

        assert!(!g.entities.in_use(id));
        let events = g.take_events();
        assert!(events.iter().any(|e| e.kind == EventKind::GrenadeBounce));
        let explosion = events.iter().find(|e| e.kind == EventKind::GrenadeExplosion).unwrap();
        assert_eq!(explosion.normal, Vec3::Z);
        assert!(explosion.time >= timeout);
    }
}
