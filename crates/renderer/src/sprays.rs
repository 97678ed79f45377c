//! Player sprays: long-lived decals that are re-submitted every frame.

use crate::decals::DecalStore;
use crate::materials::MaterialLookup;
use glam::{Vec3, Vec4};
use rand::Rng;

pub const MAX_SPRAYS: usize = 1024;
/// Lifetime of a spray in milliseconds.
pub const SPRAY_DURATION_MS: i64 = 60_000;

const SPRAY_MIN_RADIUS: f32 = 32.0;
const SPRAY_MAX_RADIUS: f32 = 48.0;
const SPRAY_ANGLE_JITTER_DEGREES: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct Spray {
    pub origin: Vec3,
    pub normal: Vec3,
    pub radius: f32,
    /// Radians around `normal`.
    pub angle: f32,
    pub material: String,
    pub spawn_time: i64,
}

impl Spray {
    pub fn expired(&self, now: i64) -> bool {
        self.spawn_time + SPRAY_DURATION_MS <= now
    }
}

/// Tangent and bitangent completing `n` to an orthonormal basis.
///
/// Branchless construction from Duff et al., "Building an Orthonormal Basis,
/// Revisited" (JCGT 2017). `n` must be unit length.
pub fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let sign = 1.0f32.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;
    let tangent = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
    let bitangent = Vec3::new(b, sign + n.y * n.y * a, -n.y);
    (tangent, bitangent)
}

#[derive(Debug)]
pub struct SprayStore {
    sprays: Vec<Spray>,
}

impl Default for SprayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SprayStore {
    pub fn new() -> Self {
        Self {
            sprays: Vec::with_capacity(MAX_SPRAYS),
        }
    }

    /// Place a spray on a surface. `up_hint` orients the image (usually the
    /// sprayer's view up vector). No-op when the store is full.
    pub fn add_spray(
        &mut self,
        origin: Vec3,
        normal: Vec3,
        up_hint: Vec3,
        material: &str,
        now: i64,
        rng: &mut impl Rng,
    ) {
        if self.sprays.len() >= MAX_SPRAYS {
            return;
        }

        let (tangent, bitangent) = orthonormal_basis(normal);
        let jitter = rng
            .gen_range(-SPRAY_ANGLE_JITTER_DEGREES..=SPRAY_ANGLE_JITTER_DEGREES)
            .to_radians();
        let angle = up_hint.dot(bitangent).atan2(up_hint.dot(tangent)) + jitter;

        self.sprays.push(Spray {
            origin,
            normal,
            radius: rng.gen_range(SPRAY_MIN_RADIUS..=SPRAY_MAX_RADIUS),
            angle,
            material: material.to_owned(),
            spawn_time: now,
        });
    }

    /// Expire old sprays and queue a decal for each survivor.
    pub fn draw_sprays(&mut self, now: i64, decals: &mut DecalStore, materials: &impl MaterialLookup) {
        let mut i = 0;
        while i < self.sprays.len() {
            if self.sprays[i].expired(now) {
                self.sprays.swap_remove(i);
                continue;
            }
            let spray = &self.sprays[i];
            decals.add_decal(
                spray.origin,
                spray.normal,
                spray.radius,
                spray.angle,
                &spray.material,
                Vec4::ONE,
                materials,
            );
            i += 1;
        }
    }

    pub fn clear(&mut self) {
        self.sprays.clear();
    }

    pub fn len(&self) -> usize {
        self.sprays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spray> {
        self.sprays.iter()
    }
}
