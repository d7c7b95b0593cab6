use stratum_blocks::Block;

pub const SECTION_SIZE: usize = 16;
pub const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

pub const MAX_LIGHT: u8 = 15;

/// Block and light storage for one 16^3 section. Cells are laid out `x | z << 4 | y << 8`.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionData {
    blocks: Vec<Block>,
    block_light: Vec<u8>,
    sky_light: Vec<u8>,
}

impl Default for SectionData {
    fn default() -> Self {
        Self::filled(Block::AIR)
    }
}

impl SectionData {
    /// Section holding `block` everywhere, fully sky-lit and without block light.
    pub fn filled(block: Block) -> Self {
        Self {
            blocks: vec![block; SECTION_VOLUME],
            block_light: vec![0; SECTION_VOLUME],
            sky_light: vec![MAX_LIGHT; SECTION_VOLUME],
        }
    }

    #[inline]
    pub const fn idx(x: usize, y: usize, z: usize) -> usize {
        x | (z << 4) | (y << 8)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: Block) {
        self.blocks[Self::idx(x, y, z)] = block;
    }

    #[inline]
    pub fn block_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.block_light[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky_light[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn set_block_light(&mut self, x: usize, y: usize, z: usize, level: u8) {
        self.block_light[Self::idx(x, y, z)] = level.min(MAX_LIGHT);
    }

    #[inline]
    pub fn set_sky_light(&mut self, x: usize, y: usize, z: usize, level: u8) {
        self.sky_light[Self::idx(x, y, z)] = level.min(MAX_LIGHT);
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        self.blocks.iter().all(|b| *b == Block::AIR)
    }
}
