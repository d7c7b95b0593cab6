use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::snapshot::BlockSnapshot;
use crate::world::World;

/// Counters describing pool traffic since creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated: usize,
    pub acquired: usize,
    pub released: usize,
    pub idle: usize,
}

impl PoolStats {
    /// Snapshots currently held by callers.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }
}

/// Lock-free free-list of bordered section snapshots. Capacity is unbounded; in steady state
/// it holds about one snapshot per worker.
pub struct SnapshotPool {
    available_tx: Sender<BlockSnapshot>,
    available_rx: Receiver<BlockSnapshot>,
    allocated: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl Default for SnapshotPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPool {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            available_tx: tx,
            available_rx: rx,
            allocated: AtomicUsize::new(0),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Acquire a snapshot of the 20^3 region whose minimum corner is `(ox, oy, oz)`, filled
    /// from `world`. Callers pass the section origin already shifted by the border.
    pub fn acquire<'pool>(
        &'pool self,
        world: &World,
        ox: i32,
        oy: i32,
        oz: i32,
    ) -> PooledSnapshot<'pool> {
        let mut snap = match self.available_rx.try_recv() {
            Ok(snap) => snap,
            Err(_) => {
                self.allocated.fetch_add(1, Ordering::AcqRel);
                BlockSnapshot::section_sized(world.registry().clone())
            }
        };
        snap.reset(world.registry().clone(), ox, oy, oz);
        world.fill_snapshot(&mut snap);
        self.acquired.fetch_add(1, Ordering::AcqRel);
        PooledSnapshot {
            snap: Some(snap),
            pool: self,
        }
    }

    fn release(&self, snap: BlockSnapshot) {
        self.released.fetch_add(1, Ordering::AcqRel);
        let _ = self.available_tx.send(snap);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Acquire),
            acquired: self.acquired.load(Ordering::Acquire),
            released: self.released.load(Ordering::Acquire),
            idle: self.available_rx.len(),
        }
    }
}

pub struct PooledSnapshot<'pool> {
    snap: Option<BlockSnapshot>,
    pool: &'pool SnapshotPool,
}

impl PooledSnapshot<'_> {
    /// Returns the snapshot to its pool now rather than at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl<'pool> Deref for PooledSnapshot<'pool> {
    type Target = BlockSnapshot;

    fn deref(&self) -> &Self::Target {
        self.snap.as_ref().expect("snapshot already released")
    }
}

impl<'pool> DerefMut for PooledSnapshot<'pool> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.snap.as_mut().expect("snapshot already released")
    }
}

impl<'pool> Drop for PooledSnapshot<'pool> {
    fn drop(&mut self) {
        if let Some(snap) = self.snap.take() {
            self.pool.release(snap);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stratum_blocks::{Block, BlockRegistry};

    use super::*;
    use crate::coord::SectionPos;
    use crate::section::SectionData;

    fn world() -> World {
        World::new(Arc::new(BlockRegistry::builtin().unwrap()))
    }

    #[test]
    fn released_snapshots_are_reused() {
        let w = world();
        let pool = SnapshotPool::new();
        {
            let _a = pool.acquire(&w, -2, -2, -2);
            let _b = pool.acquire(&w, 14, -2, -2);
        }
        let _c = pool.acquire(&w, 30, -2, -2);
        let stats = pool.stats();
        assert_eq!(stats.allocated, 2);
        assert_eq!(stats.acquired, 3);
        assert_eq!(stats.released, 2);
        assert_eq!(stats.outstanding(), 1);
        assert_eq!(stats.idle, 1);
    }

    #[test]
    fn reused_snapshot_reflects_new_region() {
        let w = world();
        let stone = w.registry().block("stone").unwrap();
        w.insert_section(SectionPos::new(1, 0, 0), SectionData::filled(stone));
        let pool = SnapshotPool::new();
        pool.acquire(&w, -2, -2, -2).release();

        let mut snap = pool.acquire(&w, 14, -2, -2);
        snap.set_relative_origin(-2, -2, -2);
        assert_eq!(snap.world_origin(), (14, -2, -2));
        assert_eq!(snap.block(0, 0, 0), stone);
        assert_eq!(snap.block(-1, 0, 0), Block::AIR);
        assert_eq!(pool.stats().allocated, 1);
    }
}
