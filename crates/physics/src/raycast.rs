//! Line traces and point-contents queries for weapon hit detection.

use crate::collision::{unpack_entity, unpack_surface, Contents, SurfaceFlags};
use crate::CollisionWorld;
use engine_core::{EntityId, Vec3};
use rapier3d::prelude::*;

/// Trace end points are pulled back this far from the surface they hit so a
/// follow-up trace does not start inside the collider.
pub const DIST_EPSILON: f32 = 0.03125;

/// Result of a trace query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trace {
    /// Fraction of the segment travelled before the hit (1.0 = clear).
    pub fraction: f32,
    /// Where the trace stopped.
    pub endpos: Vec3,
    /// Surface normal at the hit point, zero when nothing was hit.
    pub normal: Vec3,
    /// Entity owning the hit collider.
    pub ent: Option<EntityId>,
    pub surface: SurfaceFlags,
    pub contents: Contents,
    /// The start point was already inside the hit collider.
    pub start_solid: bool,
}

impl Trace {
    fn clear(end: Vec3) -> Self {
        Self {
            fraction: 1.0,
            endpos: end,
            normal: Vec3::ZERO,
            ent: None,
            surface: SurfaceFlags::empty(),
            contents: Contents::empty(),
            start_solid: false,
        }
    }

    pub fn hit(&self) -> bool {
        self.ent.is_some()
    }

    /// Hit plane normal, if the trace hit a surface it did not start inside.
    pub fn plane(&self) -> Option<Vec3> {
        (self.hit() && !self.start_solid && self.normal != Vec3::ZERO).then_some(self.normal)
    }
}

impl CollisionWorld {
    /// Trace a line from `start` to `end` against colliders matching `mask`.
    ///
    /// Colliders owned by any entity in `ignore` are skipped. A positive
    /// `time_delta` rewinds lag-compensated boxes that many milliseconds first.
    pub fn trace(
        &mut self,
        start: Vec3,
        end: Vec3,
        ignore: &[EntityId],
        mask: Contents,
        time_delta: i64,
    ) -> Trace {
        let rewound = self.rewind(time_delta);
        self.update_query_pipeline();
        let trace = self.cast(start, end, ignore, mask);
        if let Some(saved) = rewound {
            self.restore(saved);
        }
        trace
    }

    fn cast(&self, start: Vec3, end: Vec3, ignore: &[EntityId], mask: Contents) -> Trace {
        let delta = end - start;
        let length = delta.length();
        if length <= f32::EPSILON {
            return Trace::clear(end);
        }

        let ray = Ray::new(
            point![start.x, start.y, start.z],
            vector![delta.x, delta.y, delta.z],
        );
        let predicate = |_: ColliderHandle, collider: &Collider| {
            !ignore.contains(&EntityId(unpack_entity(collider.user_data)))
        };
        let filter = QueryFilter::default()
            .groups(mask.query_groups())
            .predicate(&predicate);

        let Some((handle, hit)) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            1.0,
            true,
            filter,
        ) else {
            return Trace::clear(end);
        };
        let Some(collider) = self.collider_set.get(handle) else {
            return Trace::clear(end);
        };

        let fraction = hit.time_of_impact.clamp(0.0, 1.0);
        let pullback = (DIST_EPSILON / length).min(fraction);
        let normal = Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z);

        Trace {
            fraction,
            endpos: start + delta * (fraction - pullback),
            normal: normal.normalize_or_zero(),
            ent: Some(EntityId(unpack_entity(collider.user_data))),
            surface: unpack_surface(collider.user_data),
            contents: Contents::from_groups(collider.collision_groups()),
            start_solid: fraction <= 0.0,
        }
    }

    /// Union of the contents of every collider containing `point`.
    pub fn point_contents(&mut self, point: Vec3) -> Contents {
        self.update_query_pipeline();
        let mut contents = Contents::empty();
        self.query_pipeline.intersections_with_point(
            &self.rigid_body_set,
            &self.collider_set,
            &point![point.x, point.y, point.z],
            QueryFilter::default(),
            |handle| {
                if let Some(collider) = self.collider_set.get(handle) {
                    contents |= Contents::from_groups(collider.collision_groups());
                }
                true // Continue searching
            },
        );
        contents
    }

    /// Check if there's a clear line between two points through world geometry.
    pub fn line_of_sight(&mut self, from: Vec3, to: Vec3, ignore: &[EntityId], mask: Contents) -> bool {
        self.trace(from, to, ignore, mask, 0).fraction >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MASK_SHOT, MASK_SOLID, MASK_WATER, MASK_WALLBANG};

    fn arena() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        // Wall at x = 100..110.
        world.add_brush(
            EntityId::WORLD,
            Vec3::new(105.0, 0.0, 0.0),
            Vec3::new(5.0, 200.0, 200.0),
            Contents::SOLID,
            SurfaceFlags::empty(),
        );
        world
    }

    #[test]
    fn trace_hits_wall() {
        let mut world = arena();
        let tr = world.trace(Vec3::ZERO, Vec3::new(200.0, 0.0, 0.0), &[], MASK_SHOT, 0);
        assert_eq!(tr.ent, Some(EntityId::WORLD));
        assert!((tr.fraction - 0.5).abs() < 1e-3);
        assert!(tr.endpos.x < 100.0 && tr.endpos.x > 99.9);
        assert!((tr.normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-3);
        assert!(!tr.start_solid);
    }

    #[test]
    fn trace_misses_when_clear() {
        let mut world = arena();
        let tr = world.trace(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0), &[], MASK_SHOT, 0);
        assert!(!tr.hit());
        assert_eq!(tr.fraction, 1.0);
        assert_eq!(tr.endpos, Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn ignored_entity_is_skipped() {
        let mut world = arena();
        let target = EntityId(2);
        world.link_entity(
            target,
            Vec3::new(50.0, 0.0, 0.0),
            Vec3::splat(-16.0),
            Vec3::splat(16.0),
            Contents::BODY,
            false,
        );
        let end = Vec3::new(200.0, 0.0, 0.0);
        assert_eq!(world.trace(Vec3::ZERO, end, &[], MASK_SHOT, 0).ent, Some(target));
        assert_eq!(world.trace(Vec3::ZERO, end, &[target], MASK_SHOT, 0).ent, Some(EntityId::WORLD));
        // World-only mask never sees bodies.
        assert_eq!(world.trace(Vec3::ZERO, end, &[], MASK_SOLID, 0).ent, Some(EntityId::WORLD));
    }

    #[test]
    fn wallbang_passes_thin_walls() {
        let mut world = CollisionWorld::new();
        world.add_brush(
            EntityId::WORLD,
            Vec3::new(50.0, 0.0, 0.0),
            Vec3::new(1.0, 100.0, 100.0),
            Contents::WALLBANGABLE,
            SurfaceFlags::empty(),
        );
        let end = Vec3::new(100.0, 0.0, 0.0);
        assert!(world.trace(Vec3::ZERO, end, &[], MASK_SHOT, 0).hit());
        assert!(!world.trace(Vec3::ZERO, end, &[], MASK_WALLBANG, 0).hit());
    }

    #[test]
    fn point_contents_reports_water() {
        let mut world = arena();
        world.add_brush(
            EntityId::WORLD,
            Vec3::new(0.0, 0.0, -50.0),
            Vec3::new(40.0, 40.0, 20.0),
            Contents::WATER,
            SurfaceFlags::empty(),
        );
        assert!(world.point_contents(Vec3::new(0.0, 0.0, -50.0)).intersects(MASK_WATER));
        assert!(world.point_contents(Vec3::ZERO).is_empty());
    }

    #[test]
    fn lag_compensation_rewinds_boxes() {
        let mut world = CollisionWorld::new();
        let target = EntityId(1);
        let (mins, maxs) = (Vec3::splat(-16.0), Vec3::splat(16.0));

        world.link_entity(target, Vec3::new(100.0, 0.0, 0.0), mins, maxs, Contents::BODY, true);
        world.record_snapshot(0);
        world.link_entity(target, Vec3::new(100.0, 200.0, 0.0), mins, maxs, Contents::BODY, true);
        world.record_snapshot(100);

        let (start, end) = (Vec3::ZERO, Vec3::new(300.0, 0.0, 0.0));
        assert!(!world.trace(start, end, &[], MASK_SHOT, 0).hit());
        assert_eq!(world.trace(start, end, &[], MASK_SHOT, 100).ent, Some(target));
        // Restored afterwards.
        assert!(!world.trace(start, end, &[], MASK_SHOT, 0).hit());
    }
}
