use std::sync::Arc;

use stratum_blocks::{Block, BlockRegistry, BlockType};

use crate::section::MAX_LIGHT;

/// Cells of border kept around a section on every side.
pub const SNAPSHOT_BORDER: i32 = 2;
/// Edge length of a section snapshot: 16 plus the border on both sides.
pub const SNAPSHOT_SIZE: usize = 16 + 2 * SNAPSHOT_BORDER as usize;

/// Read-only cuboid copy of world blocks and light.
///
/// `origin` is the world position of local cell `(0, 0, 0)`. Accessors take coordinates
/// relative to a caller-settable relative origin: with `set_relative_origin(-2, -2, -2)` a
/// 20^3 snapshot answers `block(x, y, z)` for `x, y, z` in `[-2, 18)`.
#[derive(Clone, Debug)]
pub struct BlockSnapshot {
    registry: Arc<BlockRegistry>,
    origin: (i32, i32, i32),
    rel: (i32, i32, i32),
    w: usize,
    h: usize,
    d: usize,
    blocks: Vec<Block>,
    block_light: Vec<u8>,
    sky_light: Vec<u8>,
}

impl BlockSnapshot {
    pub fn new(registry: Arc<BlockRegistry>, w: usize, h: usize, d: usize) -> Self {
        let n = w * h * d;
        Self {
            registry,
            origin: (0, 0, 0),
            rel: (0, 0, 0),
            w,
            h,
            d,
            blocks: vec![Block::AIR; n],
            block_light: vec![0; n],
            sky_light: vec![MAX_LIGHT; n],
        }
    }

    /// Snapshot of the standard bordered section size.
    pub fn section_sized(registry: Arc<BlockRegistry>) -> Self {
        Self::new(registry, SNAPSHOT_SIZE, SNAPSHOT_SIZE, SNAPSHOT_SIZE)
    }

    /// Re-targets the snapshot at a new world origin, clearing the relative origin.
    /// Contents are stale until refilled.
    pub fn reset(&mut self, registry: Arc<BlockRegistry>, ox: i32, oy: i32, oz: i32) {
        self.registry = registry;
        self.origin = (ox, oy, oz);
        self.rel = (0, 0, 0);
    }

    #[inline]
    pub fn set_relative_origin(&mut self, x: i32, y: i32, z: i32) {
        self.rel = (x, y, z);
    }

    #[inline]
    pub fn world_origin(&self) -> (i32, i32, i32) {
        self.origin
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.w, self.h, self.d)
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    #[inline]
    fn cell_index(&self, lx: usize, ly: usize, lz: usize) -> usize {
        (ly * self.d + lz) * self.w + lx
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let lx = x - self.rel.0;
        let ly = y - self.rel.1;
        let lz = z - self.rel.2;
        assert!(
            lx >= 0
                && ly >= 0
                && lz >= 0
                && (lx as usize) < self.w
                && (ly as usize) < self.h
                && (lz as usize) < self.d,
            "snapshot access ({x},{y},{z}) outside {:?} relative to {:?}",
            (self.w, self.h, self.d),
            self.rel
        );
        self.cell_index(lx as usize, ly as usize, lz as usize)
    }

    /// True when `(x, y, z)` (relative coordinates) lies inside the snapshot.
    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        let lx = x - self.rel.0;
        let ly = y - self.rel.1;
        let lz = z - self.rel.2;
        lx >= 0
            && ly >= 0
            && lz >= 0
            && (lx as usize) < self.w
            && (ly as usize) < self.h
            && (lz as usize) < self.d
    }

    #[inline]
    pub fn block(&self, x: i32, y: i32, z: i32) -> Block {
        self.blocks[self.index(x, y, z)]
    }

    #[inline]
    pub fn block_type(&self, x: i32, y: i32, z: i32) -> &BlockType {
        self.registry.block_type(self.block(x, y, z))
    }

    #[inline]
    pub fn block_light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.block_light[self.index(x, y, z)]
    }

    #[inline]
    pub fn sky_light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.sky_light[self.index(x, y, z)]
    }

    /// Overwrites one cell. `(x, y, z)` are relative coordinates.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        let i = self.index(x, y, z);
        self.blocks[i] = block;
    }

    pub fn set_light(&mut self, x: i32, y: i32, z: i32, block_light: u8, sky_light: u8) {
        let i = self.index(x, y, z);
        self.block_light[i] = block_light.min(MAX_LIGHT);
        self.sky_light[i] = sky_light.min(MAX_LIGHT);
    }

    /// Fills every cell with `block` and the given light levels.
    pub fn fill(&mut self, block: Block, block_light: u8, sky_light: u8) {
        self.blocks.fill(block);
        self.block_light.fill(block_light.min(MAX_LIGHT));
        self.sky_light.fill(sky_light.min(MAX_LIGHT));
    }

    // Raw write by local (unshifted) coordinates, used while copying from the world.
    #[inline]
    pub(crate) fn write_local(
        &mut self,
        lx: usize,
        ly: usize,
        lz: usize,
        block: Block,
        block_light: u8,
        sky_light: u8,
    ) {
        let i = self.cell_index(lx, ly, lz);
        self.blocks[i] = block;
        self.block_light[i] = block_light;
        self.sky_light[i] = sky_light;
    }
}
