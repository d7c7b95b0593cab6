//! Mesh build scheduling: worker pool, pooled resources, and the hand-off to the render thread.
#![forbid(unsafe_code)]

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::Sender;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use stratum_mesh_cpu::{ArenaStats, VertexArena, VertexStride, encode_vertices, mesh_section};
use stratum_render::{BufferStore, SyncSender};
use stratum_world::{PoolStats, SNAPSHOT_BORDER, SectionPos, SnapshotPool, World};

/// Sends the section's completion when dropped, so every exit path signals, unwinding included.
struct Completion {
    pos: SectionPos,
    tx: Sender<SectionPos>,
    inflight: Arc<AtomicUsize>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
        if self.tx.send(self.pos).is_err() {
            log::warn!(target: "runtime", "completion receiver gone for {:?}", self.pos);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

fn build_section(
    pos: SectionPos,
    world: &World,
    snapshots: &SnapshotPool,
    arena: &Arc<VertexArena>,
    sync: &SyncSender<BufferStore>,
    stride: VertexStride,
) {
    let t0 = Instant::now();
    let (ox, oy, oz) = pos.origin();
    let b = SNAPSHOT_BORDER;
    let mut snap = snapshots.acquire(world, ox - b, oy - b, oz - b);
    let mut opaque = arena.take_pooled();
    let mut translucent = arena.take_pooled();
    let mesh = mesh_section(&mut snap, pos.variant_seed(), &mut opaque, &mut translucent);
    snap.release();
    let t_mesh_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;

    log::debug!(
        target: "mesh",
        "built {:?}: opaque={} translucent={} cull_bits={:#011x} in {}ms",
        pos,
        mesh.opaque_count,
        mesh.translucent_count,
        mesh.cull_bits,
        t_mesh_ms
    );

    let posted = sync.sync(move |buffers: &mut BufferStore| {
        // Pooled vertices return to the arena when this closure is dropped, uploaded or not.
        let Some(buffer) = buffers.get_at_mut(pos) else {
            log::trace!(target: "mesh", "buffer for {:?} gone; upload dropped", pos);
            return;
        };
        let mut bytes = Vec::with_capacity(opaque.len() * stride.bytes());
        encode_vertices(&opaque, stride, &mut bytes);
        buffer.upload(&bytes, mesh.opaque_count, mesh.cull_bits);
        encode_vertices(&translucent, stride, &mut bytes);
        buffer.upload_trans(&bytes, mesh.translucent_count);
    });
    if !posted {
        log::debug!(target: "mesh", "render bridge closed; dropping upload for {:?}", pos);
    }
}

/// Runs section mesh builds on a dedicated worker pool. Results reach the render thread
/// through the sync bridge; callers learn about finished builds on their completion channel.
pub struct MeshScheduler {
    pool: ThreadPool,
    world: Arc<World>,
    snapshots: Arc<SnapshotPool>,
    arena: Arc<VertexArena>,
    sync: SyncSender<BufferStore>,
    stride: VertexStride,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    workers: usize,
}

impl MeshScheduler {
    /// `workers == 0` sizes the pool from the available parallelism.
    pub fn new(
        world: Arc<World>,
        sync: SyncSender<BufferStore>,
        workers: usize,
        stride: VertexStride,
    ) -> Result<Self, ThreadPoolBuildError> {
        let workers = if workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            workers
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("stratum-mesh-{i}"))
            .panic_handler(|payload| {
                log::error!(
                    target: "runtime",
                    "mesh worker panicked: {}",
                    panic_message(&*payload)
                );
            })
            .build()?;
        log::info!(target: "runtime", "mesh scheduler started with {} workers", workers);
        Ok(Self {
            pool,
            world,
            snapshots: Arc::new(SnapshotPool::new()),
            arena: Arc::new(VertexArena::new()),
            sync,
            stride,
            queued: Arc::new(AtomicUsize::new(0)),
            inflight: Arc::new(AtomicUsize::new(0)),
            workers,
        })
    }

    /// Queues a build of `pos`. `completion` receives `pos` once the build has finished,
    /// whatever happened to the upload.
    pub fn build(&self, pos: SectionPos, completion: Sender<SectionPos>) {
        let world = Arc::clone(&self.world);
        let snapshots = Arc::clone(&self.snapshots);
        let arena = Arc::clone(&self.arena);
        let sync = self.sync.clone();
        let stride = self.stride;
        let queued = Arc::clone(&self.queued);
        let inflight = Arc::clone(&self.inflight);
        queued.fetch_add(1, Ordering::Relaxed);
        self.pool.spawn(move || {
            queued.fetch_sub(1, Ordering::Relaxed);
            inflight.fetch_add(1, Ordering::Relaxed);
            let _done = Completion {
                pos,
                tx: completion,
                inflight,
            };
            build_section(pos, &world, &snapshots, &arena, &sync, stride);
        });
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn stride(&self) -> VertexStride {
        self.stride
    }

    pub fn snapshot_stats(&self) -> PoolStats {
        self.snapshots.stats()
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// `(queued, inflight)` build counts.
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_both_string_kinds() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*a), "static");
        assert_eq!(panic_message(&*b), "owned");
        assert_eq!(panic_message(&*c), "non-string panic payload");
    }
}
