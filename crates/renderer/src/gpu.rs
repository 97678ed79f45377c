//! GPU buffer upload seam.
//!
//! The decal pass only ever hands opaque byte blobs plus an element stride to
//! a [`GpuUpload`]. [`WgpuUpload`] writes them into wgpu storage/uniform
//! buffers; [`CpuUpload`] keeps them in memory for headless runs and tests.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Buffers consumed by the decal shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    /// Uniform: live decal count.
    DecalCount,
    /// Storage: packed decal records.
    Decals,
    /// Uniform: tile grid dimensions.
    TileUniforms,
    /// Storage: per-tile `(first, count)` ranges.
    DecalTiles,
    /// Storage: flattened per-tile decal indices.
    DecalIndices,
}

impl BufferSlot {
    pub fn label(self) -> &'static str {
        match self {
            BufferSlot::DecalCount => "Decal Count Buffer",
            BufferSlot::Decals => "Decal Buffer",
            BufferSlot::TileUniforms => "Decal Tile Uniform Buffer",
            BufferSlot::DecalTiles => "Decal Tile Buffer",
            BufferSlot::DecalIndices => "Decal Index Buffer",
        }
    }

    pub fn is_uniform(self) -> bool {
        matches!(self, BufferSlot::DecalCount | BufferSlot::TileUniforms)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0:?} was uploaded before it was allocated")]
    Unallocated(BufferSlot),
    #[error("upload of {len} bytes overflows {slot:?} ({capacity} bytes)")]
    Overflow {
        slot: BufferSlot,
        len: usize,
        capacity: usize,
    },
}

/// Minimal buffer upload primitive.
pub trait GpuUpload {
    /// (Re)create the buffer behind `slot` with room for `size` bytes.
    fn allocate(&mut self, slot: BufferSlot, size: usize);

    /// Write `bytes` (elements of `stride` bytes) at the start of `slot`.
    fn upload(&mut self, slot: BufferSlot, bytes: &[u8], stride: u32) -> Result<(), RenderError>;
}

/// wgpu requires buffer sizes and copies to be multiples of 4; uniforms want 16.
fn aligned_size(size: usize) -> u64 {
    (size.max(16) as u64 + 15) & !15
}

/// Errors if `len` bytes do not fit a buffer of `capacity` bytes.
fn check_fits(slot: BufferSlot, len: usize, capacity: usize) -> Result<(), RenderError> {
    if len > capacity {
        return Err(RenderError::Overflow { slot, len, capacity });
    }
    Ok(())
}

/// Descriptor of the wgpu buffer backing `slot`.
fn buffer_descriptor(slot: BufferSlot, size: usize) -> wgpu::BufferDescriptor<'static> {
    let usage = if slot.is_uniform() {
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST
    } else {
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST
    };
    wgpu::BufferDescriptor {
        label: Some(slot.label()),
        size: aligned_size(size),
        usage,
        mapped_at_creation: false,
    }
}

/// Uploads into wgpu buffers.
pub struct WgpuUpload {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    buffers: HashMap<BufferSlot, wgpu::Buffer>,
}

impl WgpuUpload {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
        }
    }

    /// Buffer for bind group creation.
    pub fn buffer(&self, slot: BufferSlot) -> Option<&wgpu::Buffer> {
        self.buffers.get(&slot)
    }
}

impl GpuUpload for WgpuUpload {
    fn allocate(&mut self, slot: BufferSlot, size: usize) {
        let buffer = self.device.create_buffer(&buffer_descriptor(slot, size));
        if let Some(old) = self.buffers.insert(slot, buffer) {
            old.destroy();
        }
    }

    fn upload(&mut self, slot: BufferSlot, bytes: &[u8], _stride: u32) -> Result<(), RenderError> {
        let buffer = self.buffers.get(&slot).ok_or(RenderError::Unallocated(slot))?;
        check_fits(slot, bytes.len(), buffer.size() as usize)?;
        if !bytes.is_empty() {
            self.queue.write_buffer(buffer, 0, bytes);
        }
        Ok(())
    }
}

/// Last upload received by a [`CpuUpload`] slot.
#[derive(Debug, Clone, Default)]
pub struct CpuBuffer {
    pub capacity: usize,
    pub stride: u32,
    pub bytes: Vec<u8>,
}

/// In-memory upload target.
#[derive(Debug, Default)]
pub struct CpuUpload {
    buffers: HashMap<BufferSlot, CpuBuffer>,
    /// Number of `allocate` calls seen.
    pub allocations: usize,
}

impl CpuUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, slot: BufferSlot) -> Option<&CpuBuffer> {
        self.buffers.get(&slot)
    }

    /// Contents of `slot` reinterpreted as `T` records.
    pub fn read<T: bytemuck::Pod>(&self, slot: BufferSlot) -> Vec<T> {
        self.buffers
            .get(&slot)
            .map(|b| {
                b.bytes
                    .chunks_exact(std::mem::size_of::<T>())
                    .map(bytemuck::pod_read_unaligned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl GpuUpload for CpuUpload {
    fn allocate(&mut self, slot: BufferSlot, size: usize) {
        self.allocations += 1;
        self.buffers.insert(
            slot,
            CpuBuffer {
                capacity: aligned_size(size) as usize,
                stride: 0,
                bytes: Vec::new(),
            },
        );
    }

    fn upload(&mut self, slot: BufferSlot, bytes: &[u8], stride: u32) -> Result<(), RenderError> {
        let buffer = self.buffers.get_mut(&slot).ok_or(RenderError::Unallocated(slot))?;
        check_fits(slot, bytes.len(), buffer.capacity)?;
        buffer.stride = stride;
        buffer.bytes.clear();
        buffer.bytes.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_requires_allocation() {
        let mut gpu = CpuUpload::new();
        assert!(matches!(
            gpu.upload(BufferSlot::Decals, &[0; 4], 4),
            Err(RenderError::Unallocated(BufferSlot::Decals))
        ));
    }

    #[test]
    fn upload_rejects_overflow_and_keeps_last_write() {
        let mut gpu = CpuUpload::new();
        gpu.allocate(BufferSlot::DecalIndices, 8);
        assert_eq!(gpu.buffer(BufferSlot::DecalIndices).unwrap().capacity, 16);
        gpu.upload(BufferSlot::DecalIndices, bytemuck::cast_slice(&[1u32, 2, 3]), 4)
            .unwrap();
        assert_eq!(gpu.read::<u32>(BufferSlot::DecalIndices), vec![1, 2, 3]);
        assert!(gpu.upload(BufferSlot::DecalIndices, &[0; 32], 4).is_err());
    }

    #[test]
    fn aligned_sizes() {
        assert_eq!(aligned_size(0), 16);
        assert_eq!(aligned_size(17), 32);
        assert_eq!(aligned_size(64), 64);
    }

    #[test]
    fn wgpu_buffers_match_their_binding_kind() {
        for slot in [BufferSlot::DecalCount, BufferSlot::TileUniforms] {
            let desc = buffer_descriptor(slot, 4);
            assert_eq!(desc.usage, wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST);
            assert_eq!(desc.size, 16);
            assert_eq!(desc.label, Some(slot.label()));
            assert!(!desc.mapped_at_creation);
        }
        for slot in [BufferSlot::Decals, BufferSlot::DecalTiles, BufferSlot::DecalIndices] {
            let desc = buffer_descriptor(slot, 100);
            assert_eq!(desc.usage, wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST);
            assert_eq!(desc.size, 112);
        }
    }

    #[test]
    fn overflow_reports_slot_and_sizes() {
        assert!(check_fits(BufferSlot::Decals, 64, 64).is_ok());
        assert!(check_fits(BufferSlot::Decals, 0, 16).is_ok());
        let err = check_fits(BufferSlot::DecalTiles, 65, 64).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Overflow {
                slot: BufferSlot::DecalTiles,
                len: 65,
                capacity: 64
            }
        ));
        assert_eq!(err.to_string(), "upload of 65 bytes overflows DecalTiles (64 bytes)");
    }
}
