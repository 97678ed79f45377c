//! Decal pass entry point: upload this frame's decals and their tile lists.

use crate::camera::Camera;
use crate::decals::DecalStore;
use crate::gpu::{GpuUpload, RenderError};
use crate::tiles::TileCuller;

/// What one frame pushed to the GPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecalFrameStats {
    pub decals: usize,
    pub tiles: usize,
    /// Tiles with at least one decal.
    pub occupied_tiles: usize,
    pub indices: usize,
}

#[derive(Debug, Default)]
pub struct DecalPipeline {
    tiles: TileCuller,
    allocated: bool,
}

impl DecalPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the decal buffer, then cull it into screen tiles and upload the
    /// tile table and index list.
    pub fn add_decals_to_pipeline(
        &mut self,
        camera: &Camera,
        decals: &DecalStore,
        gpu: &mut impl GpuUpload,
    ) -> Result<DecalFrameStats, RenderError> {
        if !self.allocated {
            DecalStore::allocate(gpu);
            self.allocated = true;
        }
        decals.upload(gpu)?;

        let culled = self.tiles.cull_and_upload(camera, decals.as_slice(), gpu)?;
        Ok(DecalFrameStats {
            decals: decals.len(),
            tiles: culled.ranges.len(),
            occupied_tiles: culled.ranges.iter().filter(|r| r.count > 0).count(),
            indices: culled.indices.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{BufferSlot, CpuUpload};
    use crate::materials::MaterialTable;
    use glam::{Vec3, Vec4};

    #[test]
    fn frame_uploads_decals_and_tiles() {
        let materials = MaterialTable::with_builtin();
        let mut store = DecalStore::new();
        store.add_decal(
            Vec3::new(400.0, 0.0, 0.0),
            Vec3::NEG_X,
            12.0,
            0.0,
            "weapons/bullet_impact",
            Vec4::ONE,
            &materials,
        );

        let camera = Camera::default();
        let mut gpu = CpuUpload::new();
        let mut pipeline = DecalPipeline::new();
        let stats = pipeline.add_decals_to_pipeline(&camera, &store, &mut gpu).unwrap();

        assert_eq!(stats.decals, 1);
        assert_eq!(stats.tiles, 45 * 80);
        assert!(stats.occupied_tiles > 0);
        assert_eq!(stats.indices, stats.occupied_tiles);
        assert_eq!(gpu.buffer(BufferSlot::Decals).unwrap().bytes.len(), 64);

        // Empty frame still uploads cleanly.
        store.clear();
        let stats = pipeline.add_decals_to_pipeline(&camera, &store, &mut gpu).unwrap();
        assert_eq!(stats.indices, 0);
        assert_eq!(gpu.allocations, 5);
    }
}
