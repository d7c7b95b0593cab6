use serde::{Deserialize, Serialize};
use stratum_geom::Direction;

/// Identifies a 16^3 section: `x`/`z` are chunk column coordinates, `y` the section index
/// within the column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SectionPos {
    /// Valid section indices within a column are `0..COLUMN_SECTIONS`.
    pub const COLUMN_SECTIONS: i32 = 16;

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Section containing the world block `(wx, wy, wz)`.
    #[inline]
    pub const fn containing(wx: i32, wy: i32, wz: i32) -> Self {
        Self::new(wx >> 4, wy >> 4, wz >> 4)
    }

    /// World coordinates of the section's minimum corner.
    #[inline]
    pub const fn origin(self) -> (i32, i32, i32) {
        (self.x << 4, self.y << 4, self.z << 4)
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn neighbor(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        self.offset(dx, dy, dz)
    }

    #[inline]
    pub const fn in_column(self) -> bool {
        self.y >= 0 && self.y < Self::COLUMN_SECTIONS
    }

    /// Seed for the per-section variant stream: `chunkX | (chunkZ << 32)`.
    /// Sections stacked in one column share a seed.
    #[inline]
    pub const fn variant_seed(self) -> u64 {
        (self.x as u32 as u64) | ((self.z as u32 as u64) << 32)
    }
}

impl From<(i32, i32, i32)> for SectionPos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<SectionPos> for (i32, i32, i32) {
    fn from(value: SectionPos) -> Self {
        (value.x, value.y, value.z)
    }
}
