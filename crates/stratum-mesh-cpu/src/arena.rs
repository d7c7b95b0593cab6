use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::vertex::ChunkVertex;

// Initial capacity for freshly allocated buffers, in vertices.
const INITIAL_VERTEX_CAP: usize = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub allocated: usize,
    pub taken: usize,
    pub returned: usize,
    pub idle: usize,
}

impl ArenaStats {
    /// Buffers currently held outside the arena.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.taken - self.returned
    }
}

/// Free-list of vertex buffers. Returned buffers keep their capacity, so a warmed-up
/// arena meshes without allocating.
pub struct VertexArena {
    free_tx: Sender<Vec<ChunkVertex>>,
    free_rx: Receiver<Vec<ChunkVertex>>,
    allocated: AtomicUsize,
    taken: AtomicUsize,
    returned: AtomicUsize,
}

impl Default for VertexArena {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexArena {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            free_tx: tx,
            free_rx: rx,
            allocated: AtomicUsize::new(0),
            taken: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
        }
    }

    /// Empty buffer, reusing a returned one's capacity when available.
    pub fn take(&self) -> Vec<ChunkVertex> {
        self.taken.fetch_add(1, Ordering::AcqRel);
        match self.free_rx.try_recv() {
            Ok(mut buf) => {
                buf.clear();
                buf
            }
            Err(_) => {
                self.allocated.fetch_add(1, Ordering::AcqRel);
                Vec::with_capacity(INITIAL_VERTEX_CAP)
            }
        }
    }

    /// Returns a buffer. Capacity is kept.
    pub fn put(&self, mut buf: Vec<ChunkVertex>) {
        buf.clear();
        self.returned.fetch_add(1, Ordering::AcqRel);
        let _ = self.free_tx.send(buf);
    }

    /// Like `take`, but the buffer goes back to the arena when the guard drops.
    pub fn take_pooled(self: &Arc<Self>) -> PooledVertices {
        PooledVertices {
            buf: Some(self.take()),
            arena: Arc::clone(self),
        }
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            allocated: self.allocated.load(Ordering::Acquire),
            taken: self.taken.load(Ordering::Acquire),
            returned: self.returned.load(Ordering::Acquire),
            idle: self.free_rx.len(),
        }
    }
}

/// Owned vertex buffer that returns to its arena on drop. Holds the arena by `Arc` so it
/// can travel into closures run on another thread.
pub struct PooledVertices {
    buf: Option<Vec<ChunkVertex>>,
    arena: Arc<VertexArena>,
}

impl Deref for PooledVertices {
    type Target = Vec<ChunkVertex>;

    fn deref(&self) -> &Self::Target {
        self.buf.as_ref().expect("vertex buffer already returned")
    }
}

impl DerefMut for PooledVertices {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_mut().expect("vertex buffer already returned")
    }
}

impl Drop for PooledVertices {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.arena.put(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_keeps_capacity() {
        let arena = VertexArena::new();
        let mut buf = arena.take();
        buf.extend(std::iter::repeat_n(ChunkVertex::default(), 10_000));
        let cap = buf.capacity();
        arena.put(buf);
        let again = arena.take();
        assert!(again.is_empty());
        assert_eq!(again.capacity(), cap);
        assert_eq!(arena.stats().allocated, 1);
    }

    #[test]
    fn pooled_guard_returns_on_drop() {
        let arena = Arc::new(VertexArena::new());
        {
            let mut a = arena.take_pooled();
            let _b = arena.take_pooled();
            a.push(ChunkVertex::new([0.0; 3]));
            assert_eq!(arena.stats().outstanding(), 2);
        }
        let stats = arena.stats();
        assert_eq!(stats.outstanding(), 0);
        assert_eq!(stats.idle, 2);
    }

    #[test]
    fn guard_moves_across_threads() {
        let arena = Arc::new(VertexArena::new());
        let mut buf = arena.take_pooled();
        buf.push(ChunkVertex::new([1.0, 2.0, 3.0]));
        let handle = std::thread::spawn(move || buf.len());
        assert_eq!(handle.join().unwrap(), 1);
        assert_eq!(arena.stats().returned, 1);
    }
}
