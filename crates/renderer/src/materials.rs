//! Material name to decal atlas rectangle lookup.

use glam::Vec4;
use std::collections::HashMap;

/// Resolves a material name to its UV rectangle in the decal atlas.
pub trait MaterialLookup {
    /// `(min_u, min_v, max_u, max_v)`, or `None` if the material has no
    /// decal image.
    fn decal_rect(&self, material: &str) -> Option<Vec4>;
}

/// In-memory material table.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    rects: HashMap<String, Vec4>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the impact and spray materials the weapons emit, packed
    /// as a 4x4 grid over the atlas.
    pub fn with_builtin() -> Self {
        const NAMES: [&str; 8] = [
            "weapons/bullet_impact",
            "weapons/blade_impact",
            "weapons/explosion_scorch",
            "weapons/plasma_impact",
            "weapons/bubble_impact",
            "weapons/rail_impact",
            "weapons/laser_impact",
            "sprays/default",
        ];
        let mut table = Self::new();
        for (i, name) in NAMES.iter().enumerate() {
            let (col, row) = ((i % 4) as f32, (i / 4) as f32);
            table.insert(
                name,
                Vec4::new(col * 0.25, row * 0.25, col * 0.25 + 0.25, row * 0.25 + 0.25),
            );
        }
        table
    }

    pub fn insert(&mut self, material: &str, rect: Vec4) {
        self.rects.insert(material.to_owned(), rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl MaterialLookup for MaterialTable {
    fn decal_rect(&self, material: &str) -> Option<Vec4> {
        self.rects.get(material).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rects_stay_inside_atlas() {
        let table = MaterialTable::with_builtin();
        assert_eq!(table.len(), 8);
        let rect = table.decal_rect("sprays/default").unwrap();
        assert_eq!(rect, Vec4::new(0.75, 0.25, 1.0, 0.5));
        assert!(table.decal_rect("missing").is_none());
    }
}
