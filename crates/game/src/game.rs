//! The simulation root: entity arena, collision world, clock and event queue.

use crate::config::GameConfig;
use crate::entity::{Client, EntityTable, MoveType, ThinkKind};
use crate::error::GameError;
use crate::events::GameEvent;
use engine_core::{EntityId, LevelTime, Team, Vec3};
use physics::{CollisionWorld, Contents, SurfaceFlags, MASK_PLAYERSOLID};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const PLAYER_MINS: Vec3 = Vec3::new(-16.0, -16.0, -24.0);
pub const PLAYER_MAXS: Vec3 = Vec3::new(16.0, 16.0, 40.0);
pub const PLAYER_VIEW_HEIGHT: f32 = 30.0;
pub const PLAYER_HEALTH: f32 = 100.0;

pub struct Game {
    pub config: GameConfig,
    pub time: LevelTime,
    pub entities: EntityTable,
    pub collision: CollisionWorld,
    events: Vec<GameEvent>,
    pub(crate) rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        log::info!(
            "new level: {} clients, {} entities, {} ms frames",
            config.max_clients,
            config.max_entities,
            config.frame_time_ms
        );
        Self {
            time: LevelTime::new(config.frame_time_ms),
            entities: EntityTable::new(config.max_clients, config.max_entities),
            collision: CollisionWorld::new(),
            events: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Drop every entity, brush and pending event.
    pub fn reset_level(&mut self) {
        log::info!("level reset at {} ms", self.time.now());
        self.time = LevelTime::new(self.config.frame_time_ms);
        self.entities = EntityTable::new(self.config.max_clients, self.config.max_entities);
        self.collision.clear();
        self.events.clear();
        self.rng = StdRng::seed_from_u64(self.config.seed);
    }

    pub fn now(&self) -> i64 {
        self.time.now()
    }

    /// Add a box of world geometry.
    pub fn add_brush(&mut self, center: Vec3, half_extents: Vec3, contents: Contents, surface: SurfaceFlags) {
        self.collision
            .add_brush(EntityId::WORLD, center, half_extents, contents, surface);
    }

    /// Put a player in the first free client slot.
    pub fn spawn_client(&mut self, origin: Vec3, team: Team) -> Result<EntityId, GameError> {
        let slot = (1..=self.entities.max_clients())
            .map(EntityId::from)
            .find(|&id| !self.entities.in_use(id))
            .ok_or(GameError::EntityTableFull {
                max: self.entities.max_clients(),
            })?;

        let e = &mut self.entities[slot];
        e.in_use = true;
        e.classname = "player";
        e.origin = origin;
        e.old_origin = origin;
        e.mins = PLAYER_MINS;
        e.maxs = PLAYER_MAXS;
        e.contents = Contents::BODY;
        e.clip_mask = MASK_PLAYERSOLID;
        e.move_type = MoveType::Player;
        e.take_damage = true;
        e.health = PLAYER_HEALTH;
        e.team = team;
        e.client = Some(Client {
            view_height: PLAYER_VIEW_HEIGHT,
            spawned: true,
            ..Default::default()
        });
        self.link_entity(slot);
        log::info!("client {} joined team {:?}", slot, team);
        Ok(slot)
    }

    /// Spawn a damageable non-client box (practice dummy, crate, door).
    pub fn spawn_target(
        &mut self,
        origin: Vec3,
        mins: Vec3,
        maxs: Vec3,
        health: f32,
        move_type: MoveType,
    ) -> Result<EntityId, GameError> {
        let id = self.entities.spawn(self.now())?;
        let e = &mut self.entities[id];
        e.classname = "target";
        e.origin = origin;
        e.old_origin = origin;
        e.mins = mins;
        e.maxs = maxs;
        e.contents = Contents::BODY;
        e.move_type = move_type;
        e.brush_model = matches!(move_type, MoveType::Push);
        e.take_damage = true;
        e.health = health;
        self.link_entity(id);
        Ok(id)
    }

    /// Move a client and aim its view.
    pub fn place_client(&mut self, id: EntityId, origin: Vec3, view_angles: Vec3) {
        let Some(e) = self.entities.get_mut(id) else {
            return;
        };
        e.old_origin = e.origin;
        e.origin = origin;
        if let Some(client) = e.client.as_mut() {
            client.view_angles = view_angles;
        }
        self.link_entity(id);
    }

    /// Sync an entity's box into the collision world.
    pub fn link_entity(&mut self, id: EntityId) {
        let Some(e) = self.entities.get(id) else {
            self.collision.unlink_entity(id);
            return;
        };
        let antilag = self.entities.is_client(id);
        self.collision
            .link_entity(id, e.origin, e.mins, e.maxs, e.contents, antilag);
    }

    pub fn free_entity(&mut self, id: EntityId) {
        self.collision.unlink_entity(id);
        self.entities.free(id, self.now());
    }

    pub fn spawn_event(&mut self, event: GameEvent) {
        log::trace!("event {:?} at {:?}", event.kind, event.origin);
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand queued events to the caller.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance one server frame: clock, lag history, movement, thinks.
    pub fn run_frame(&mut self) {
        self.time.advance();
        let now = self.now();
        self.collision.record_snapshot(now);

        for id in self.entities.ids_in_use() {
            if !self.entities.in_use(id) {
                continue;
            }
            self.run_movement(id);

            let Some(e) = self.entities.get_mut(id) else {
                continue;
            };
            if e.next_think > 0 && e.next_think <= now {
                e.next_think = 0;
                if let Some(think) = e.think {
                    self.run_think(id, think);
                }
            }
        }
    }

    fn run_think(&mut self, id: EntityId, think: ThinkKind) {
        match think {
            ThinkKind::Free => self.free_entity(id),
            ThinkKind::GrenadeExplode => self.grenade_explode(id, Vec3::ZERO),
            ThinkKind::Plasma => self.think_plasma(id),
            ThinkKind::Laser => self.laser_think(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_fill_reserved_slots() {
        let mut game = Game::new(GameConfig {
            max_clients: 2,
            ..Default::default()
        });
        assert_eq!(game.spawn_client(Vec3::ZERO, Team::Alpha).unwrap(), EntityId(1));
        assert_eq!(game.spawn_client(Vec3::X * 100.0, Team::Beta).unwrap(), EntityId(2));
        assert!(game.spawn_client(Vec3::ZERO, Team::Beta).is_err());
        assert!(game.collision.is_linked(EntityId(2)));
    }

    #[test]
    fn free_think_runs_on_time() {
        let mut game = Game::new(GameConfig::default());
        let id = game.entities.spawn(0).unwrap();
        game.entities[id].schedule(ThinkKind::Free, 32);
        game.run_frame();
        assert!(game.entities.in_use(id));
        game.run_frame();
        assert!(!game.entities.in_use(id));
    }

    #[test]
    fn reset_clears_everything() {
        let mut game = Game::new(GameConfig::default());
        game.spawn_client(Vec3::ZERO, Team::Players).unwrap();
        game.run_frame();
        game.reset_level();
        assert_eq!(game.now(), 0);
        assert_eq!(game.entities.count_in_use(), 1);
        assert!(!game.collision.is_linked(EntityId(1)));
    }
}
