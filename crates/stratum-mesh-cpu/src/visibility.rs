use stratum_geom::Direction;
use stratum_world::{BlockSnapshot, SECTION_VOLUME};

/// Every one of the 36 face pairs connected.
pub const ALL_FACES_VISIBLE: u64 = (1 << 36) - 1;

const BITS_PER_WORD: usize = 64;

/// One bit per section cell, indexed `x | z << 4 | y << 8`.
#[derive(Clone)]
pub struct VisitedSet {
    words: [u64; SECTION_VOLUME / BITS_PER_WORD],
}

impl Default for VisitedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitedSet {
    pub fn new() -> Self {
        Self {
            words: [0; SECTION_VOLUME / BITS_PER_WORD],
        }
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> usize {
        (x | (z << 4) | (y << 8)) as usize
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> bool {
        let i = Self::index(x, y, z);
        (self.words[i / BITS_PER_WORD] >> (i % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32) {
        let i = Self::index(x, y, z);
        self.words[i / BITS_PER_WORD] |= 1 << (i % BITS_PER_WORD);
    }

    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

/// True when `cull_bits` records that a viewer entering through `from` can reach `to`.
#[inline]
pub fn can_see(cull_bits: u64, from: Direction, to: Direction) -> bool {
    cull_bits & (1 << (from.index() * Direction::COUNT + to.index())) != 0
}

/// Face-to-face visibility matrix of the section in `snap` (section cells at `[0, 16)`).
/// Bit `from * 6 + to` is set when open space connects face `from` to face `to`.
pub fn build_cull_bits(snap: &BlockSnapshot) -> u64 {
    let mut visited = VisitedSet::new();
    let mut bits = 0u64;
    for y in 0..16 {
        for x in 0..16 {
            for z in 0..16 {
                if visited.get(x, y, z) {
                    continue;
                }
                let touched = flood_fill(snap, &mut visited, x, y, z);
                if touched == 0 {
                    continue;
                }
                for from in Direction::ALL {
                    if touched & from.bit() == 0 {
                        continue;
                    }
                    for to in Direction::ALL {
                        if touched & to.bit() != 0 {
                            bits |= 1 << (from.index() * Direction::COUNT + to.index());
                        }
                    }
                }
            }
        }
    }
    bits
}

/// Fills the open region containing `(x, y, z)` and returns the mask (bit per
/// `Direction::index()`) of section faces it touches. Cells are marked visited before the
/// solidity check, so solid cells are visited but never expanded.
pub fn flood_fill(snap: &BlockSnapshot, visited: &mut VisitedSet, x: i32, y: i32, z: i32) -> u8 {
    let mut touched = 0u8;
    let mut stack = Vec::with_capacity(256);
    stack.push((x, y, z));
    while let Some((x, y, z)) = stack.pop() {
        if !(0..16).contains(&x) || !(0..16).contains(&y) || !(0..16).contains(&z) {
            continue;
        }
        if visited.get(x, y, z) {
            continue;
        }
        visited.set(x, y, z);
        if snap.block_type(x, y, z).should_cull_against() {
            continue;
        }

        if x == 0 {
            touched |= Direction::West.bit();
        } else if x == 15 {
            touched |= Direction::East.bit();
        }
        if y == 0 {
            touched |= Direction::Down.bit();
        } else if y == 15 {
            touched |= Direction::Up.bit();
        }
        if z == 0 {
            touched |= Direction::North.bit();
        } else if z == 15 {
            touched |= Direction::South.bit();
        }

        for d in Direction::ALL {
            let (dx, dy, dz) = d.offset();
            stack.push((x + dx, y + dy, z + dz));
        }
    }
    touched
}
