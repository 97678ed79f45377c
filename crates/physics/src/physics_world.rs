//! Collision world over Rapier3D colliders.
//!
//! Nothing is simulated here: colliders are positioned by the game each frame
//! and only scene queries run against them. Each collider carries its owning
//! entity and surface flags in `user_data`, and its contents as the collider's
//! membership group.

use crate::collision::{pack_user_data, Contents, SurfaceFlags};
use crate::lag::LagHistory;
use engine_core::{Aabb, EntityId, Vec3};
use rapier3d::prelude::*;
use std::collections::HashMap;

/// Bounding box of a linked entity.
#[derive(Debug, Clone, Copy)]
struct LinkedEntity {
    collider: ColliderHandle,
    half_extents: Vec3,
    /// Position is recorded for lag compensation.
    antilag: bool,
}

/// Scene-query world holding world brushes and linked entity boxes.
pub struct CollisionWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
    links: HashMap<EntityId, LinkedEntity>,
    pub(crate) history: LagHistory,
    pipeline_dirty: bool,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            links: HashMap::new(),
            history: LagHistory::default(),
            pipeline_dirty: true,
        }
    }

    /// Add a static box of world geometry owned by `owner` (usually the world entity).
    pub fn add_brush(
        &mut self,
        owner: EntityId,
        center: Vec3,
        half_extents: Vec3,
        contents: Contents,
        surface: SurfaceFlags,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(contents.collider_groups())
            .user_data(pack_user_data(owner.0, surface))
            .build();
        self.pipeline_dirty = true;
        self.collider_set.insert(collider)
    }

    /// Place (or move) an entity's bounding box. Degenerate boxes are unlinked.
    pub fn link_entity(
        &mut self,
        entity: EntityId,
        origin: Vec3,
        mins: Vec3,
        maxs: Vec3,
        contents: Contents,
        antilag: bool,
    ) {
        let half_extents = (maxs - mins) * 0.5;
        if half_extents.min_element() <= 0.0 || contents.is_empty() {
            self.unlink_entity(entity);
            return;
        }
        let center = origin + (mins + maxs) * 0.5;

        if let Some(link) = self.links.get_mut(&entity) {
            if link.half_extents == half_extents {
                if let Some(collider) = self.collider_set.get_mut(link.collider) {
                    collider.set_translation(vector![center.x, center.y, center.z]);
                    collider.set_collision_groups(contents.collider_groups());
                    link.antilag = antilag;
                    self.pipeline_dirty = true;
                    return;
                }
            }
        }

        self.unlink_entity(entity);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(contents.collider_groups())
            .user_data(pack_user_data(entity.0, SurfaceFlags::empty()))
            .build();
        let handle = self.collider_set.insert(collider);
        self.links.insert(
            entity,
            LinkedEntity {
                collider: handle,
                half_extents,
                antilag,
            },
        );
        self.pipeline_dirty = true;
    }

    /// Remove an entity's box from the world.
    pub fn unlink_entity(&mut self, entity: EntityId) {
        if let Some(link) = self.links.remove(&entity) {
            self.collider_set.remove(
                link.collider,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            );
            self.pipeline_dirty = true;
        }
    }

    pub fn is_linked(&self, entity: EntityId) -> bool {
        self.links.contains_key(&entity)
    }

    /// Current box center of a linked entity.
    pub fn linked_center(&self, entity: EntityId) -> Option<Vec3> {
        let link = self.links.get(&entity)?;
        let t = self.collider_set.get(link.collider)?.translation();
        Some(Vec3::new(t.x, t.y, t.z))
    }

    /// World-space box of a linked entity, as it was `time_delta` ms ago for
    /// lag-compensated entities.
    pub fn entity_bounds(&self, entity: EntityId, time_delta: i64) -> Option<Aabb> {
        let link = self.links.get(&entity)?;
        let rewound = (link.antilag && time_delta > 0)
            .then(|| self.history.positions_before(time_delta))
            .flatten()
            .and_then(|past| past.iter().find(|(e, _)| *e == entity).map(|&(_, c)| c));
        let center = match rewound {
            Some(center) => center,
            None => self.linked_center(entity)?,
        };
        Some(Aabb::new(center - link.half_extents, center + link.half_extents))
    }

    /// Record the positions of lag-compensated entities for `time`.
    pub fn record_snapshot(&mut self, time: i64) {
        let positions = self
            .links
            .iter()
            .filter(|(_, link)| link.antilag)
            .filter_map(|(&entity, link)| {
                let t = self.collider_set.get(link.collider)?.translation();
                Some((entity, Vec3::new(t.x, t.y, t.z)))
            })
            .collect();
        self.history.push(time, positions);
    }

    /// Move lag-compensated boxes back by `time_delta` ms. Returns what to restore.
    pub(crate) fn rewind(&mut self, time_delta: i64) -> Option<Vec<(EntityId, Vec3)>> {
        if time_delta <= 0 {
            return None;
        }
        let past = self.history.positions_before(time_delta)?.to_vec();

        let mut restore = Vec::with_capacity(past.len());
        for (entity, center) in past {
            let Some(link) = self.links.get(&entity) else {
                continue;
            };
            if let Some(collider) = self.collider_set.get_mut(link.collider) {
                let now = collider.translation();
                restore.push((entity, Vec3::new(now.x, now.y, now.z)));
                collider.set_translation(vector![center.x, center.y, center.z]);
            }
        }
        self.pipeline_dirty = true;
        Some(restore)
    }

    pub(crate) fn restore(&mut self, positions: Vec<(EntityId, Vec3)>) {
        for (entity, center) in positions {
            let Some(link) = self.links.get(&entity) else {
                continue;
            };
            if let Some(collider) = self.collider_set.get_mut(link.collider) {
                collider.set_translation(vector![center.x, center.y, center.z]);
            }
        }
        self.pipeline_dirty = true;
    }

    /// Update query pipeline for raycasting if colliders moved.
    pub fn update_query_pipeline(&mut self) {
        if self.pipeline_dirty {
            self.query_pipeline.update(&self.collider_set);
            self.pipeline_dirty = false;
        }
    }

    /// Forget all geometry and history (level change).
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_and_unlink() {
        let mut world = CollisionWorld::new();
        let id = EntityId(3);
        world.link_entity(
            id,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-16.0, -16.0, -24.0),
            Vec3::new(16.0, 16.0, 40.0),
            Contents::BODY,
            true,
        );
        assert!(world.is_linked(id));
        let center = world.linked_center(id).unwrap();
        assert!((center - Vec3::new(10.0, 0.0, 8.0)).length() < 1e-4);

        world.unlink_entity(id);
        assert!(!world.is_linked(id));
    }

    #[test]
    fn zero_size_boxes_are_not_linked() {
        let mut world = CollisionWorld::new();
        world.link_entity(EntityId(9), Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Contents::BODY, false);
        assert!(!world.is_linked(EntityId(9)));
    }

    #[test]
    fn relink_moves_existing_collider() {
        let mut world = CollisionWorld::new();
        let id = EntityId(1);
        let (mins, maxs) = (Vec3::splat(-8.0), Vec3::splat(8.0));
        world.link_entity(id, Vec3::ZERO, mins, maxs, Contents::BODY, false);
        world.link_entity(id, Vec3::new(0.0, 50.0, 0.0), mins, maxs, Contents::BODY, false);
        let center = world.linked_center(id).unwrap();
        assert!((center.y - 50.0).abs() < 1e-4);
        assert_eq!(world.collider_set.len(), 1);
    }

    #[test]
    fn bounds_follow_lag_history() {
        let mut world = CollisionWorld::new();
        let id = EntityId(1);
        let (mins, maxs) = (Vec3::new(-16.0, -16.0, -24.0), Vec3::new(16.0, 16.0, 40.0));
        world.link_entity(id, Vec3::ZERO, mins, maxs, Contents::BODY, true);
        world.record_snapshot(0);
        world.link_entity(id, Vec3::new(0.0, 100.0, 0.0), mins, maxs, Contents::BODY, true);
        world.record_snapshot(50);

        let now = world.entity_bounds(id, 0).unwrap();
        assert!((now.max - Vec3::new(16.0, 116.0, 40.0)).length() < 1e-4);
        let past = world.entity_bounds(id, 50).unwrap();
        assert!((past.min - Vec3::new(-16.0, -16.0, -24.0)).length() < 1e-4);
    }
}
