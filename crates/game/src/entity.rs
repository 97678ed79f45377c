//! Entity arena.
//!
//! Slot 0 is the world and slots `1..=max_clients` belong to clients; every
//! other slot is handed out by [`EntityTable::spawn`]. Entities refer to each
//! other by [`EntityId`], never by reference.

use crate::error::GameError;
use crate::weapons::{WeaponState, WeaponType, WEAPON_COUNT};
use bitflags::bitflags;
use engine_core::{EntityId, Team, Vec3};
use physics::Contents;
use std::ops::{Index, IndexMut};

/// Freed slots are not handed out again for this long...
const FREE_SLOT_DELAY_MS: i64 = 500;
/// ...unless the level is younger than this.
const LEVEL_START_GRACE_MS: i64 = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MoveType {
    #[default]
    None,
    /// Pushers (doors, platforms).
    Push,
    Player,
    Toss,
    LinearProjectile,
    Bounce,
    BounceGrenade,
}

bitflags! {
    /// Network visibility flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SvFlags: u32 {
        /// Not sent to any client.
        const NOCLIENT = 1 << 0;
        const PROJECTILE = 1 << 1;
        /// Always sent to the owner.
        const FORCEOWNER = 1 << 2;
        /// Only sent to the owner.
        const ONLYOWNER = 1 << 3;
    }
}

/// Closed set of projectile-like entities; drives touch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Grenade,
    Rocket,
    Plasma,
    Bubble,
    RifleBullet,
    LaserBeam,
}

/// Deferred action polled by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkKind {
    Free,
    GrenadeExplode,
    /// Plasma and bubble backtrace, re-armed every frame.
    Plasma,
    Laser,
}

/// Damage parameters a projectile carries from its weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectileInfo {
    pub min_damage: f32,
    pub max_damage: f32,
    pub min_knockback: f32,
    pub max_knockback: f32,
    pub radius: f32,
}

/// Client-side extrapolation data for linear projectiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMovement {
    pub begin: Vec3,
    pub velocity: Vec3,
    pub time_stamp: i64,
    /// Clamped to `0..=255`.
    pub time_delta: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientStats {
    pub accuracy_shots: [u32; WEAPON_COUNT],
    pub accuracy_hits: [u32; WEAPON_COUNT],
    pub damage_given: f32,
    pub damage_taken: f32,
    pub frags: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Client {
    pub view_height: f32,
    pub view_angles: Vec3,
    /// Latency to compensate, in milliseconds.
    pub time_delta: i64,
    /// How long the client has been zoomed in.
    pub zoom_time: i64,
    pub weapon_state: WeaponState,
    pub spawned: bool,
    /// Spectating or dead.
    pub ghosting: bool,
    pub stats: ClientStats,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub in_use: bool,
    /// Level time the slot was last freed.
    pub free_time: i64,
    pub classname: &'static str,

    pub origin: Vec3,
    pub old_origin: Vec3,
    /// Beam end point for lasers.
    pub origin2: Vec3,
    pub angles: Vec3,
    pub velocity: Vec3,
    pub avelocity: Vec3,
    pub mins: Vec3,
    pub maxs: Vec3,
    pub mass: f32,
    /// What the entity is made of when linked; empty for non-solid.
    pub contents: Contents,
    /// What the entity collides with while moving.
    pub clip_mask: Contents,
    /// Brush model (door, platform) rather than a bounding box.
    pub brush_model: bool,
    pub move_type: MoveType,
    pub sv_flags: SvFlags,
    pub water_level: bool,
    pub ground: Option<EntityId>,

    pub owner: Option<EntityId>,
    pub team: Team,
    pub weapon: Option<WeaponType>,
    pub take_damage: bool,
    pub health: f32,
    /// Last entity a grenade touched; spared by its splash.
    pub enemy: Option<EntityId>,

    pub kind: Option<ProjectileKind>,
    pub projectile: ProjectileInfo,
    pub linear: Option<LinearMovement>,
    pub think: Option<ThinkKind>,
    pub next_think: i64,
    pub timeout: i64,
    pub time_stamp: i64,
    pub time_delta: i64,

    pub client: Option<Client>,
}

impl Entity {
    fn new(id: EntityId) -> Self {
        Self {
            id,
            in_use: false,
            free_time: 0,
            classname: "noclass",
            origin: Vec3::ZERO,
            old_origin: Vec3::ZERO,
            origin2: Vec3::ZERO,
            angles: Vec3::ZERO,
            velocity: Vec3::ZERO,
            avelocity: Vec3::ZERO,
            mins: Vec3::ZERO,
            maxs: Vec3::ZERO,
            mass: 200.0,
            contents: Contents::empty(),
            clip_mask: Contents::empty(),
            brush_model: false,
            move_type: MoveType::None,
            sv_flags: SvFlags::empty(),
            water_level: false,
            ground: None,
            owner: None,
            team: Team::None,
            weapon: None,
            take_damage: false,
            health: 0.0,
            enemy: None,
            kind: None,
            projectile: ProjectileInfo::default(),
            linear: None,
            think: None,
            next_think: 0,
            timeout: 0,
            time_stamp: 0,
            time_delta: 0,
            client: None,
        }
    }

    /// Set the think callback to run at `time`.
    pub fn schedule(&mut self, think: ThinkKind, time: i64) {
        self.think = Some(think);
        self.next_think = time;
    }
}

/// Fixed-capacity entity arena.
#[derive(Debug)]
pub struct EntityTable {
    entities: Vec<Entity>,
    max_clients: usize,
    max_entities: usize,
    /// Slots touched so far; scanning for free slots stops here.
    num_entities: usize,
}

impl EntityTable {
    pub fn new(max_clients: usize, max_entities: usize) -> Self {
        let max_entities = max_entities.max(max_clients + 2);
        let reserved = max_clients + 1;
        let mut entities: Vec<Entity> = (0..reserved).map(|i| Entity::new(EntityId::from(i))).collect();
        entities[0].in_use = true;
        entities[0].classname = "worldspawn";
        entities[0].move_type = MoveType::Push;
        entities[0].brush_model = true;
        Self {
            entities,
            max_clients,
            max_entities,
            num_entities: reserved,
        }
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    pub fn capacity(&self) -> usize {
        self.max_entities
    }

    pub fn is_client(&self, id: EntityId) -> bool {
        (1..=self.max_clients).contains(&id.index())
    }

    /// Hand out a free slot, skipping slots freed in the last 500 ms once the
    /// level has been running for two seconds.
    pub fn spawn(&mut self, now: i64) -> Result<EntityId, GameError> {
        let first = self.max_clients + 1;
        for i in first..self.num_entities {
            let e = &self.entities[i];
            if !e.in_use && (e.free_time < LEVEL_START_GRACE_MS || now - e.free_time > FREE_SLOT_DELAY_MS) {
                return Ok(self.init_slot(i));
            }
        }

        if self.num_entities >= self.max_entities {
            return Err(GameError::EntityTableFull {
                max: self.max_entities,
            });
        }
        let i = self.num_entities;
        self.num_entities += 1;
        self.entities.push(Entity::new(EntityId::from(i)));
        Ok(self.init_slot(i))
    }

    fn init_slot(&mut self, i: usize) -> EntityId {
        let id = EntityId::from(i);
        self.entities[i] = Entity::new(id);
        self.entities[i].in_use = true;
        id
    }

    /// Release a slot. The world and client slots are never freed.
    pub fn free(&mut self, id: EntityId, now: i64) {
        let i = id.index();
        if i <= self.max_clients || i >= self.entities.len() {
            return;
        }
        let mut freed = Entity::new(id);
        freed.classname = "freed";
        freed.free_time = now;
        self.entities[i] = freed;
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index()).filter(|e| e.in_use)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index()).filter(|e| e.in_use)
    }

    pub fn in_use(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of every entity in use, world included.
    pub fn ids_in_use(&self) -> Vec<EntityId> {
        self.entities.iter().filter(|e| e.in_use).map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.in_use)
    }

    /// Entities in use outside the world and client slots.
    pub fn spawned(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().skip(self.max_clients + 1).filter(|e| e.in_use)
    }

    pub fn count_in_use(&self) -> usize {
        self.iter().count()
    }
}

impl Index<EntityId> for EntityTable {
    type Output = Entity;

    fn index(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }
}

impl IndexMut<EntityId> for EntityTable {
    fn index_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_slots() {
        let table = EntityTable::new(4, 32);
        assert!(table.in_use(EntityId::WORLD));
        assert!(!table.in_use(EntityId(1)));
        assert!(table.is_client(EntityId(4)));
        assert!(!table.is_client(EntityId(5)));
        assert!(!table.is_client(EntityId::WORLD));
    }

    #[test]
    fn spawn_starts_after_clients() {
        let mut table = EntityTable::new(4, 32);
        assert_eq!(table.spawn(0).unwrap(), EntityId(5));
        assert_eq!(table.spawn(0).unwrap(), EntityId(6));
    }

    #[test]
    fn freed_slot_reuse_is_delayed_after_level_start() {
        let mut table = EntityTable::new(1, 32);
        let a = table.spawn(5000).unwrap();
        table.free(a, 5000);
        // Too fresh: a new slot is used.
        assert_ne!(table.spawn(5100).unwrap(), a);
        // Old enough.
        assert_eq!(table.spawn(5600).unwrap(), a);
    }

    #[test]
    fn freed_slot_reused_immediately_at_level_start() {
        let mut table = EntityTable::new(1, 32);
        let a = table.spawn(0).unwrap();
        table.free(a, 100);
        assert_eq!(table.spawn(150).unwrap(), a);
    }

    #[test]
    fn full_table_is_an_error() {
        let mut table = EntityTable::new(1, 4);
        table.spawn(0).unwrap();
        table.spawn(0).unwrap();
        assert!(matches!(table.spawn(0), Err(GameError::EntityTableFull { max: 4 })));
    }

    #[test]
    fn world_and_clients_are_never_freed() {
        let mut table = EntityTable::new(2, 8);
        table.free(EntityId::WORLD, 0);
        assert!(table.in_use(EntityId::WORLD));
    }
}
