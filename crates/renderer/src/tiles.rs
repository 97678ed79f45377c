//! Screen-space tile culling for decals.
//!
//! The viewport is cut into 16x16 pixel tiles. Each tile's view volume is an
//! open pyramid (four side planes) plus a loose view-space AABB; every decal
//! sphere touching both is listed for that tile, up to a fixed cap. The lists
//! are flattened into a `(first, count)` table and one index buffer so the
//! fragment shader only walks the decals that can touch its pixel.

use crate::camera::Camera;
use crate::decals::DecalRaw;
use crate::gpu::{BufferSlot, GpuUpload, RenderError};
use bytemuck::{Pod, Zeroable};
use engine_core::geometry::{
    invert_perspective, pyramid_from_points, sphere_overlaps_aabb, sphere_overlaps_pyramid, unproject, Aabb,
    Pyramid,
};
use glam::{Mat4, Vec3};

/// Tile edge in pixels.
pub const TILE_SIZE: u32 = 16;

/// Decals listed per tile; extras are dropped.
pub const MAX_DECALS_PER_TILE: usize = 100;

/// Slice of the index buffer belonging to one tile.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TileRange {
    pub first: u32,
    pub count: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TileUniforms {
    pub rows: u32,
    pub cols: u32,
    pub tile_size: u32,
    pub num_decals: u32,
}

/// Per-tile scratch list.
#[derive(Clone, Copy)]
struct TileList {
    count: usize,
    indices: [u32; MAX_DECALS_PER_TILE],
}

impl TileList {
    const EMPTY: Self = Self {
        count: 0,
        indices: [0; MAX_DECALS_PER_TILE],
    };

    /// Returns false once the tile is full.
    fn push(&mut self, index: u32) -> bool {
        if self.count >= MAX_DECALS_PER_TILE {
            return false;
        }
        self.indices[self.count] = index;
        self.count += 1;
        true
    }

    fn as_slice(&self) -> &[u32] {
        &self.indices[..self.count]
    }
}

/// Grid dimensions for a viewport. Partial tiles at the right and bottom
/// edges are not covered.
pub fn tile_grid(width: u32, height: u32) -> (u32, u32) {
    (height / TILE_SIZE, width / TILE_SIZE)
}

/// View-space culling volume of one tile.
///
/// Row 0 is the top of the screen, matching the top-left origin of wgpu's
/// `@builtin(position)`. A shader reading a bottom-left origin such as GL's
/// `gl_FragCoord` must flip the row (`rows - 1 - row`) before the lookup.
pub fn tile_volume(inverse_projection: Mat4, width: u32, height: u32, row: u32, col: u32) -> (Pyramid, Aabb) {
    let (w, h) = (width as f32, height as f32);
    let x0 = (col * TILE_SIZE) as f32;
    let x1 = x0 + TILE_SIZE as f32;
    let y0 = (row * TILE_SIZE) as f32;
    let y1 = y0 + TILE_SIZE as f32;

    let ndc_x = |x: f32| 2.0 * x / w - 1.0;
    let ndc_y = |y: f32| 1.0 - 2.0 * y / h;

    // Bottom-left, bottom-right, top-right, top-left in screen space.
    let quad = [
        (ndc_x(x0), ndc_y(y1)),
        (ndc_x(x1), ndc_y(y1)),
        (ndc_x(x1), ndc_y(y0)),
        (ndc_x(x0), ndc_y(y0)),
    ];

    let mut corners = [Vec3::ZERO; 8];
    for (i, &(x, y)) in quad.iter().enumerate() {
        corners[i] = unproject(inverse_projection, Vec3::new(x, y, -1.0));
        corners[i + 4] = unproject(inverse_projection, Vec3::new(x, y, 1.0));
    }

    let pyramid = pyramid_from_points(&corners);
    let mut aabb = Aabb::from_points(&corners);
    aabb.min.z = f32::NEG_INFINITY;
    aabb.max.z = 0.0;
    (pyramid, aabb)
}

/// Flattened per-tile decal lists for one frame.
#[derive(Debug, Clone, Default)]
pub struct CulledTiles {
    pub rows: u32,
    pub cols: u32,
    /// Row-major, `rows * cols` entries.
    pub ranges: Vec<TileRange>,
    pub indices: Vec<u32>,
}

impl CulledTiles {
    /// Decal indices listed for a tile.
    pub fn tile(&self, row: u32, col: u32) -> &[u32] {
        if row >= self.rows || col >= self.cols {
            return &[];
        }
        let range = self.ranges[(row * self.cols + col) as usize];
        &self.indices[range.first as usize..(range.first + range.count) as usize]
    }
}

/// Assign decals to the tiles of `camera`'s viewport.
pub fn cull_decals(camera: &Camera, decals: &[DecalRaw]) -> CulledTiles {
    let (width, height) = (camera.viewport_width, camera.viewport_height);
    let (rows, cols) = tile_grid(width, height);
    let inverse_projection = invert_perspective(camera.projection_matrix());
    let view = camera.view_matrix();

    let spheres: Vec<(Vec3, f32)> = decals
        .iter()
        .map(|d| (view.transform_point3(d.origin()), d.radius()))
        .collect();

    let mut tiles = vec![TileList::EMPTY; (rows * cols) as usize];
    for row in 0..rows {
        for col in 0..cols {
            let (pyramid, aabb) = tile_volume(inverse_projection, width, height, row, col);
            let tile = &mut tiles[(row * cols + col) as usize];
            for (i, &(center, radius)) in spheres.iter().enumerate() {
                if sphere_overlaps_aabb(center, radius, &aabb)
                    && sphere_overlaps_pyramid(center, radius, &pyramid)
                    && !tile.push(i as u32)
                {
                    break;
                }
            }
        }
    }

    let mut culled = CulledTiles {
        rows,
        cols,
        ranges: Vec::with_capacity(tiles.len()),
        indices: Vec::new(),
    };
    for tile in &tiles {
        culled.ranges.push(TileRange {
            first: culled.indices.len() as u32,
            count: tile.count as u32,
        });
        culled.indices.extend_from_slice(tile.as_slice());
    }
    culled
}

/// Owns the GPU-side tile buffers across frames.
#[derive(Debug, Default)]
pub struct TileCuller {
    dims: Option<(u32, u32)>,
}

impl TileCuller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid dimensions the GPU buffers are currently sized for.
    pub fn dims(&self) -> Option<(u32, u32)> {
        self.dims
    }

    /// Cull `decals` for `camera` and upload the tile table, index list and
    /// grid uniforms. Tile buffers are reallocated only when the grid changes.
    pub fn cull_and_upload(
        &mut self,
        camera: &Camera,
        decals: &[DecalRaw],
        gpu: &mut impl GpuUpload,
    ) -> Result<CulledTiles, RenderError> {
        let culled = cull_decals(camera, decals);
        let dims = (culled.rows, culled.cols);

        if self.dims != Some(dims) {
            if self.dims.is_none() {
                gpu.allocate(BufferSlot::TileUniforms, std::mem::size_of::<TileUniforms>());
            }
            let tiles = (dims.0 * dims.1) as usize;
            log::debug!("decal tile grid {}x{} ({} tiles)", dims.0, dims.1, tiles);
            gpu.allocate(BufferSlot::DecalTiles, tiles * std::mem::size_of::<TileRange>());
            gpu.allocate(
                BufferSlot::DecalIndices,
                tiles * MAX_DECALS_PER_TILE * std::mem::size_of::<u32>(),
            );
            self.dims = Some(dims);
        }

        let uniforms = TileUniforms {
            rows: culled.rows,
            cols: culled.cols,
            tile_size: TILE_SIZE,
            num_decals: decals.len() as u32,
        };
        gpu.upload(
            BufferSlot::TileUniforms,
            bytemuck::bytes_of(&uniforms),
            std::mem::size_of::<TileUniforms>() as u32,
        )?;
        gpu.upload(
            BufferSlot::DecalTiles,
            bytemuck::cast_slice(&culled.ranges),
            std::mem::size_of::<TileRange>() as u32,
        )?;
        gpu.upload(
            BufferSlot::DecalIndices,
            bytemuck::cast_slice(&culled.indices),
            std::mem::size_of::<u32>() as u32,
        )?;
        Ok(culled)
    }
}
