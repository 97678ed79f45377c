//! A small test arena: floor, walls, water and three players.

use crate::entity::MoveType;
use crate::error::GameError;
use crate::game::Game;
use engine_core::{EntityId, Team, Vec3};
use physics::{Contents, SurfaceFlags};

/// Player origins sit this high above the floor so their boxes rest on it.
const STANDING_HEIGHT: f32 = 24.0;

/// Who is where in the arena.
#[derive(Debug, Clone, Copy)]
pub struct Arena {
    pub shooter: EntityId,
    pub teammate: EntityId,
    pub enemy: EntityId,
    pub dummy: EntityId,
    /// Point just off a solid wall face the shooter can spray on, with the
    /// face's outward normal.
    pub spray_wall: (Vec3, Vec3),
}

/// Reset `game` and build the arena in it.
pub fn build_arena(game: &mut Game) -> Result<Arena, GameError> {
    game.reset_level();

    let solid = Contents::SOLID;
    let none = SurfaceFlags::empty();
    // Floor with its top at z = 0.
    game.add_brush(Vec3::new(0.0, 0.0, -8.0), Vec3::new(2048.0, 2048.0, 8.0), solid, none);
    // Sky: projectiles vanish, nothing leaves marks.
    game.add_brush(
        Vec3::new(0.0, 0.0, 1040.0),
        Vec3::new(2048.0, 2048.0, 16.0),
        solid,
        SurfaceFlags::NOIMPACT | SurfaceFlags::NODECALS,
    );
    // Back wall behind the enemy.
    game.add_brush(Vec3::new(1024.0, 0.0, 256.0), Vec3::new(16.0, 1024.0, 256.0), solid, none);
    // Thin wooden panel that bullets go through.
    game.add_brush(
        Vec3::new(400.0, 400.0, 64.0),
        Vec3::new(4.0, 200.0, 64.0),
        Contents::WALLBANGABLE,
        none,
    );
    game.add_brush(
        Vec3::new(-400.0, 0.0, 32.0),
        Vec3::new(200.0, 200.0, 32.0),
        Contents::WATER,
        none,
    );

    let ground = |x: f32, y: f32| Vec3::new(x, y, STANDING_HEIGHT);
    let shooter = game.spawn_client(ground(0.0, 0.0), Team::Alpha)?;
    let teammate = game.spawn_client(ground(200.0, -300.0), Team::Alpha)?;
    let enemy = game.spawn_client(ground(600.0, 0.0), Team::Beta)?;
    let dummy = game.spawn_target(
        ground(700.0, 400.0),
        Vec3::splat(-16.0),
        Vec3::splat(16.0),
        500.0,
        MoveType::None,
    )?;

    log::info!("arena built: {} entities in use", game.entities.count_in_use());
    Ok(Arena {
        shooter,
        teammate,
        enemy,
        dummy,
        spray_wall: (Vec3::new(1006.0, -200.0, 96.0), Vec3::NEG_X),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use physics::{MASK_SHOT, MASK_WATER};

    #[test]
    fn arena_has_players_and_geometry() {
        let mut g = Game::new(GameConfig::default());
        let arena = build_arena(&mut g).unwrap();
        assert!(g.entities.is_client(arena.shooter));
        assert!(!g.entities.is_client(arena.dummy));
        assert!(g.is_team_damage(arena.shooter, arena.teammate));
        assert!(!g.is_team_damage(arena.shooter, arena.enemy));

        let eye = g.entities[arena.shooter].origin;
        let enemy = g.entities[arena.enemy].origin;
        let trace = g.collision.trace(eye, enemy, &[arena.shooter], MASK_SHOT, 0);
        assert_eq!(trace.ent, Some(arena.enemy));

        assert!(g.collision.point_contents(Vec3::new(-400.0, 0.0, 16.0)).intersects(MASK_WATER));
    }

    #[test]
    fn spray_wall_is_solid() {
        let mut g = Game::new(GameConfig::default());
        let arena = build_arena(&mut g).unwrap();
        let (point, normal) = arena.spray_wall;
        let trace = g.collision.trace(point, point - normal * 32.0, &[], MASK_SHOT, 0);
        assert!(trace.ent.is_some_and(|e| e.is_world()));
        assert!((trace.normal - normal).length() < 1e-3);
    }

    #[test]
    fn rebuilding_starts_from_scratch() {
        let mut g = Game::new(GameConfig::default());
        build_arena(&mut g).unwrap();
        let first = g.entities.count_in_use();
        build_arena(&mut g).unwrap();
        assert_eq!(g.entities.count_in_use(), first);
    }
}
