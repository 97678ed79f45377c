//! Per-frame decal store.
//!
//! Decals are rebuilt every rendered frame by whoever wants one drawn
//! (sprays, impact marks). The store is a flat, GPU-ready array that the
//! tile culler indexes into.

use crate::gpu::{BufferSlot, GpuUpload, RenderError};
use crate::materials::MaterialLookup;
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Hard cap on decals per frame.
pub const MAX_DECALS: usize = 100_000;

/// Packed decal as read by the shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DecalRaw {
    /// xyz = origin, w = radius.
    pub origin_radius: [f32; 4],
    /// xyz = surface normal, w = rotation around it in radians.
    pub normal_angle: [f32; 4],
    pub color: [f32; 4],
    /// Atlas rect: min uv, max uv.
    pub uvwh: [f32; 4],
}

impl DecalRaw {
    pub fn origin(&self) -> Vec3 {
        Vec3::from_slice(&self.origin_radius[..3])
    }

    pub fn radius(&self) -> f32 {
        self.origin_radius[3]
    }
}

/// Uniform holding the live decal count, padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DecalCount {
    pub count: u32,
    pub _pad: [u32; 3],
}

#[derive(Debug)]
pub struct DecalStore {
    decals: Vec<DecalRaw>,
}

impl Default for DecalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DecalStore {
    pub fn new() -> Self {
        Self {
            decals: Vec::with_capacity(MAX_DECALS),
        }
    }

    /// Queue a decal for this frame.
    ///
    /// Silently dropped when the store is full; skipped with a debug log when
    /// the material has no decal image.
    #[allow(clippy::too_many_arguments)]
    pub fn add_decal(
        &mut self,
        origin: Vec3,
        normal: Vec3,
        radius: f32,
        angle: f32,
        material: &str,
        color: Vec4,
        materials: &impl MaterialLookup,
    ) {
        if self.decals.len() >= MAX_DECALS {
            return;
        }
        let Some(rect) = materials.decal_rect(material) else {
            log::debug!("material '{material}' has no decal image");
            return;
        };

        self.decals.push(DecalRaw {
            origin_radius: origin.extend(radius).to_array(),
            normal_angle: normal.extend(angle).to_array(),
            color: color.to_array(),
            uvwh: rect.to_array(),
        });
    }

    /// Drop all decals (frame start, level load).
    pub fn clear(&mut self) {
        self.decals.clear();
    }

    pub fn len(&self) -> usize {
        self.decals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decals.is_empty()
    }

    pub fn as_slice(&self) -> &[DecalRaw] {
        &self.decals
    }

    /// Allocate the count uniform and a full-capacity decal buffer.
    pub fn allocate(gpu: &mut impl GpuUpload) {
        gpu.allocate(BufferSlot::DecalCount, std::mem::size_of::<DecalCount>());
        gpu.allocate(BufferSlot::Decals, MAX_DECALS * std::mem::size_of::<DecalRaw>());
    }

    /// Upload the live count and the live decals.
    pub fn upload(&self, gpu: &mut impl GpuUpload) -> Result<(), RenderError> {
        let count = DecalCount {
            count: self.decals.len() as u32,
            _pad: [0; 3],
        };
        gpu.upload(
            BufferSlot::DecalCount,
            bytemuck::bytes_of(&count),
            std::mem::size_of::<DecalCount>() as u32,
        )?;
        gpu.upload(
            BufferSlot::Decals,
            bytemuck::cast_slice(&self.decals),
            std::mem::size_of::<DecalRaw>() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::CpuUpload;
    use crate::materials::MaterialTable;

    fn materials() -> MaterialTable {
        let mut table = MaterialTable::new();
        table.insert("hole", Vec4::new(0.0, 0.0, 0.5, 0.5));
        table
    }

    #[test]
    fn record_is_64_bytes() {
        assert_eq!(std::mem::size_of::<DecalRaw>(), 64);
        assert_eq!(std::mem::size_of::<DecalCount>(), 16);
    }

    #[test]
    fn add_decal_packs_fields() {
        let mut store = DecalStore::new();
        store.add_decal(Vec3::new(1.0, 2.0, 3.0), Vec3::Z, 8.0, 0.5, "hole", Vec4::ONE, &materials());
        let d = store.as_slice()[0];
        assert_eq!(d.origin(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(d.radius(), 8.0);
        assert_eq!(d.normal_angle, [0.0, 0.0, 1.0, 0.5]);
        assert_eq!(d.uvwh, [0.0, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn unknown_material_is_skipped() {
        let mut store = DecalStore::new();
        store.add_decal(Vec3::ZERO, Vec3::Z, 8.0, 0.0, "nope", Vec4::ONE, &materials());
        assert!(store.is_empty());
    }

    #[test]
    fn store_caps_at_capacity() {
        let mut store = DecalStore::new();
        let table = materials();
        for _ in 0..MAX_DECALS + 10 {
            store.add_decal(Vec3::ZERO, Vec3::Z, 8.0, 0.0, "hole", Vec4::ONE, &table);
        }
        assert_eq!(store.len(), MAX_DECALS);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn upload_size_matches_live_count() {
        let table = materials();
        let mut gpu = CpuUpload::new();
        DecalStore::allocate(&mut gpu);

        let mut store = DecalStore::new();
        for target in [0, 1, 17, 1000, MAX_DECALS] {
            while store.len() < target {
                store.add_decal(Vec3::ZERO, Vec3::Z, 8.0, 0.0, "hole", Vec4::ONE, &table);
            }
            store.upload(&mut gpu).unwrap();
            let decals = gpu.buffer(BufferSlot::Decals).unwrap();
            assert_eq!(decals.bytes.len(), target * 64);
            assert_eq!(decals.stride, 64);
            let count: Vec<DecalCount> = gpu.read(BufferSlot::DecalCount);
            assert_eq!(count[0].count as usize, target);
        }
    }
}
