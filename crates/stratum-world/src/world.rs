use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use stratum_blocks::{Block, BlockRegistry};

use crate::coord::SectionPos;
use crate::section::{MAX_LIGHT, SECTION_SIZE, SectionData};
use crate::snapshot::BlockSnapshot;

/// Loaded sections keyed by position. Section data is shared copy-on-write so a snapshot
/// copy never observes a half-applied edit.
pub struct World {
    registry: Arc<BlockRegistry>,
    sections: RwLock<HashMap<SectionPos, Arc<SectionData>>>,
}

impl World {
    pub fn new(registry: Arc<BlockRegistry>) -> Self {
        Self {
            registry,
            sections: RwLock::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    pub fn insert_section(&self, pos: SectionPos, data: SectionData) {
        let mut sections = self.sections.write().unwrap_or_else(PoisonError::into_inner);
        sections.insert(pos, Arc::new(data));
    }

    pub fn section(&self, pos: SectionPos) -> Option<Arc<SectionData>> {
        let sections = self.sections.read().unwrap_or_else(PoisonError::into_inner);
        sections.get(&pos).cloned()
    }

    pub fn loaded_sections(&self) -> Vec<SectionPos> {
        let sections = self.sections.read().unwrap_or_else(PoisonError::into_inner);
        sections.keys().copied().collect()
    }

    /// Block at a world position; unloaded space reads as air.
    pub fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Block {
        let pos = SectionPos::containing(wx, wy, wz);
        let sections = self.sections.read().unwrap_or_else(PoisonError::into_inner);
        sections
            .get(&pos)
            .map(|s| s.get((wx & 15) as usize, (wy & 15) as usize, (wz & 15) as usize))
            .unwrap_or(Block::AIR)
    }

    /// Sets a block in a loaded section. Returns false when the section is not loaded.
    pub fn set_block(&self, wx: i32, wy: i32, wz: i32, block: Block) -> bool {
        let pos = SectionPos::containing(wx, wy, wz);
        let mut sections = self.sections.write().unwrap_or_else(PoisonError::into_inner);
        match sections.get_mut(&pos) {
            Some(data) => {
                Arc::make_mut(data).set(
                    (wx & 15) as usize,
                    (wy & 15) as usize,
                    (wz & 15) as usize,
                    block,
                );
                true
            }
            None => false,
        }
    }

    /// Copies the region covered by `snap` (from its world origin, over its dimensions).
    /// The whole copy happens under one read lock, so it reflects a single moment of the
    /// world. Cells of unloaded sections read as air with full sky light.
    pub fn fill_snapshot(&self, snap: &mut BlockSnapshot) {
        let (ox, oy, oz) = snap.world_origin();
        let (w, h, d) = snap.dims();
        let (w, h, d) = (w as i32, h as i32, d as i32);
        let size = SECTION_SIZE as i32;
        let sections = self.sections.read().unwrap_or_else(PoisonError::into_inner);
        for sy in (oy >> 4)..=((oy + h - 1) >> 4) {
            for sz in (oz >> 4)..=((oz + d - 1) >> 4) {
                for sx in (ox >> 4)..=((ox + w - 1) >> 4) {
                    let pos = SectionPos::new(sx, sy, sz);
                    let (bx, by, bz) = pos.origin();
                    let (x0, x1) = (ox.max(bx), (ox + w).min(bx + size));
                    let (y0, y1) = (oy.max(by), (oy + h).min(by + size));
                    let (z0, z1) = (oz.max(bz), (oz + d).min(bz + size));
                    let data = sections.get(&pos);
                    for y in y0..y1 {
                        for z in z0..z1 {
                            for x in x0..x1 {
                                let (lx, ly, lz) =
                                    ((x - ox) as usize, (y - oy) as usize, (z - oz) as usize);
                                match data {
                                    Some(s) => {
                                        let (cx, cy, cz) = (
                                            (x - bx) as usize,
                                            (y - by) as usize,
                                            (z - bz) as usize,
                                        );
                                        snap.write_local(
                                            lx,
                                            ly,
                                            lz,
                                            s.get(cx, cy, cz),
                                            s.block_light(cx, cy, cz),
                                            s.sky_light(cx, cy, cz),
                                        );
                                    }
                                    None => {
                                        snap.write_local(lx, ly, lz, Block::AIR, 0, MAX_LIGHT)
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
