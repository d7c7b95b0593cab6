use hashbrown::HashMap;
use stratum_geom::{Aabb, Direction};
use stratum_mesh_cpu::{ALL_FACES_VISIBLE, can_see};
use stratum_world::SectionPos;

/// Handle to a live buffer in a `BufferStore`. Handles of removed buffers never resolve,
/// even after their slot is reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId {
    index: u32,
    generation: u32,
}

/// Render-side copy of one section's geometry. Vertex bytes stand in for GPU arrays.
#[derive(Debug)]
pub struct ChunkBuffer {
    pos: SectionPos,
    opaque: Vec<u8>,
    translucent: Vec<u8>,
    count: u32,
    count_t: u32,
    cull_bits: u64,
    pub(crate) rendered_on: u32,
    neighbors: [Option<BufferId>; 6],
    uploads: u32,
}

impl ChunkBuffer {
    fn new(pos: SectionPos) -> Self {
        Self {
            pos,
            opaque: Vec::new(),
            translucent: Vec::new(),
            count: 0,
            count_t: 0,
            // Unmeshed sections don't block traversal.
            cull_bits: ALL_FACES_VISIBLE,
            rendered_on: 0,
            neighbors: [None; 6],
            uploads: 0,
        }
    }

    /// Replaces the opaque geometry and the visibility matrix.
    pub fn upload(&mut self, bytes: &[u8], count: u32, cull_bits: u64) {
        self.opaque.clear();
        self.opaque.extend_from_slice(bytes);
        self.count = count;
        self.cull_bits = cull_bits;
        self.uploads += 1;
    }

    /// Replaces the translucent geometry.
    pub fn upload_trans(&mut self, bytes: &[u8], count: u32) {
        self.translucent.clear();
        self.translucent.extend_from_slice(bytes);
        self.count_t = count;
    }

    #[inline]
    pub fn pos(&self) -> SectionPos {
        self.pos
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn translucent_count(&self) -> u32 {
        self.count_t
    }

    #[inline]
    pub fn opaque_bytes(&self) -> &[u8] {
        &self.opaque
    }

    #[inline]
    pub fn translucent_bytes(&self) -> &[u8] {
        &self.translucent
    }

    #[inline]
    pub fn cull_bits(&self) -> u64 {
        self.cull_bits
    }

    #[inline]
    pub fn rendered_on(&self) -> u32 {
        self.rendered_on
    }

    /// Number of opaque uploads applied so far.
    #[inline]
    pub fn uploads(&self) -> u32 {
        self.uploads
    }

    #[inline]
    pub fn neighbor(&self, dir: Direction) -> Option<BufferId> {
        self.neighbors[dir.index()]
    }

    #[inline]
    pub(crate) fn neighbors(&self) -> [Option<BufferId>; 6] {
        self.neighbors
    }

    #[inline]
    pub fn is_visible(&self, from: Direction, to: Direction) -> bool {
        can_see(self.cull_bits, from, to)
    }

    #[inline]
    pub fn has_opaque(&self) -> bool {
        self.count != 0 && !self.opaque.is_empty()
    }

    #[inline]
    pub fn has_translucent(&self) -> bool {
        self.count_t != 0 && !self.translucent.is_empty()
    }

    /// World-space bounds, grown by one unit on every axis.
    pub fn aabb(&self) -> Aabb {
        let (x, y, z) = self.pos.origin();
        Aabb::section(x, y, z).grow(1.0, 1.0, 1.0)
    }
}

struct Slot {
    generation: u32,
    buffer: Option<ChunkBuffer>,
}

/// Owner of all chunk buffers, keyed by section. Buffers are linked to their six face
/// neighbours as they come and go.
#[derive(Default)]
pub struct BufferStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_pos: HashMap<SectionPos, BufferId>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the buffer for `pos` (or returns the existing one) and links it with every
    /// loaded neighbour in both directions.
    pub fn insert(&mut self, pos: SectionPos) -> BufferId {
        if let Some(id) = self.by_pos.get(&pos) {
            return *id;
        }
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.buffer = Some(ChunkBuffer::new(pos));
                BufferId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    buffer: Some(ChunkBuffer::new(pos)),
                });
                BufferId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        for dir in Direction::ALL {
            let Some(nid) = self.by_pos.get(&pos.neighbor(dir)).copied() else {
                continue;
            };
            if let Some(nb) = self.get_mut(nid) {
                nb.neighbors[dir.opposite().index()] = Some(id);
            }
            if let Some(me) = self.get_mut(id) {
                me.neighbors[dir.index()] = Some(nid);
            }
        }
        self.by_pos.insert(pos, id);
        log::trace!(target: "render", "buffer created for {:?}", pos);
        id
    }

    /// Unlinks and destroys the buffer for `pos`. Returns false if none existed.
    pub fn remove(&mut self, pos: SectionPos) -> bool {
        let Some(id) = self.by_pos.remove(&pos) else {
            return false;
        };
        let Some(buffer) = self.slots[id.index as usize].buffer.take() else {
            return false;
        };
        for dir in Direction::ALL {
            if let Some(nid) = buffer.neighbors[dir.index()] {
                if let Some(nb) = self.get_mut(nid) {
                    nb.neighbors[dir.opposite().index()] = None;
                }
            }
        }
        let slot = &mut self.slots[id.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        log::trace!(target: "render", "buffer destroyed for {:?}", pos);
        true
    }

    pub fn get(&self, id: BufferId) -> Option<&ChunkBuffer> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.buffer.as_ref()
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut ChunkBuffer> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.buffer.as_mut()
    }

    #[inline]
    pub fn id_at(&self, pos: SectionPos) -> Option<BufferId> {
        self.by_pos.get(&pos).copied()
    }

    pub fn get_at(&self, pos: SectionPos) -> Option<&ChunkBuffer> {
        self.id_at(pos).and_then(|id| self.get(id))
    }

    pub fn get_at_mut(&mut self, pos: SectionPos) -> Option<&mut ChunkBuffer> {
        let id = self.id_at(pos)?;
        self.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.by_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pos.is_empty()
    }
}
