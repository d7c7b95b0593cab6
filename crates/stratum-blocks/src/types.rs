use serde::{Deserialize, Serialize};

use crate::texture::TextureRegion;

pub type BlockId = u16;
pub type BlockState = u16;

// Compact voxel representation stored in sections and snapshots
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub state: BlockState,
}

impl Block {
    pub const AIR: Block = Block { id: 0, state: 0 };

    #[inline]
    pub const fn new(id: BlockId, state: BlockState) -> Self {
        Self { id, state }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidKind {
    Water,
    Lava,
}

/// Liquid rendering data. The liquid level lives in the low three bits of the block state:
/// 0 is a source block, 7 the thinnest flow.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Liquid {
    pub kind: LiquidKind,
    pub texture: TextureRegion,
}

impl Liquid {
    pub const MAX_LEVEL: u16 = 7;

    #[inline]
    pub fn level(state: BlockState) -> u16 {
        state & Self::MAX_LEVEL
    }

    /// Surface height within the cell, in block units.
    #[inline]
    pub fn surface_height(state: BlockState) -> f32 {
        (8 - Self::level(state)) as f32 / 9.0
    }
}
