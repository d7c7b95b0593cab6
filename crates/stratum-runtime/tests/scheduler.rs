use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::unbounded;
use stratum_blocks::BlockRegistry;
use stratum_geom::Vec3;
use stratum_mesh_cpu::VertexStride;
use stratum_render::{Camera, DrawRecorder, Renderer};
use stratum_runtime::MeshScheduler;
use stratum_world::{SectionData, SectionPos, World, WorldGenConfig};

const WAIT: Duration = Duration::from_secs(30);

fn stone_world() -> Arc<World> {
    let reg = Arc::new(BlockRegistry::builtin().unwrap());
    let stone = reg.block("stone").unwrap();
    let world = World::new(reg);
    world.insert_section(SectionPos::new(0, 0, 0), SectionData::filled(stone));
    Arc::new(world)
}

fn scheduler(
    world: Arc<World>,
    renderer: &Renderer,
    workers: usize,
    stride: VertexStride,
) -> MeshScheduler {
    MeshScheduler::new(world, renderer.sync_sender(), workers, stride).unwrap()
}

fn camera_in(pos: SectionPos) -> Camera {
    let (x, y, z) = pos.origin();
    Camera::new(
        Vec3::new(x as f32 + 8.0, y as f32 + 8.0, z as f32 + 8.0),
        0.0,
        0.0,
    )
}

#[test]
fn build_uploads_through_the_bridge() {
    let world = stone_world();
    let mut renderer = Renderer::new(16);
    let pos = SectionPos::new(0, 0, 0);
    renderer.buffers_mut().insert(pos);
    let sched = scheduler(world, &renderer, 2, VertexStride::Packed36);

    let (tx, rx) = unbounded();
    sched.build(pos, tx);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), pos);

    let mut sink = DrawRecorder::default();
    let stats = renderer.draw_frame(&camera_in(pos), &mut sink);
    assert_eq!(stats.bridge_tasks, 1);

    let buf = renderer.buffers().get_at(pos).unwrap();
    assert_eq!(buf.uploads(), 1);
    assert_eq!(buf.cull_bits(), 0);
    // Only the six outer faces border air: 16*16 quads each, 6 elements per quad.
    assert_eq!(buf.count(), 6 * 256 * 6);
    assert_eq!(buf.opaque_bytes().len(), 6 * 256 * 4 * 36);
    assert_eq!(buf.translucent_count(), 0);
    assert_eq!(sink.opaque, vec![(pos, buf.count())]);
}

#[test]
fn padded_stride_changes_upload_size() {
    let world = stone_world();
    let mut renderer = Renderer::new(16);
    let pos = SectionPos::new(0, 0, 0);
    renderer.buffers_mut().insert(pos);
    let sched = scheduler(world, &renderer, 1, VertexStride::Padded40);
    let (tx, rx) = unbounded();
    sched.build(pos, tx);
    rx.recv_timeout(WAIT).unwrap();
    renderer.draw_frame(&camera_in(pos), &mut DrawRecorder::default());
    let buf = renderer.buffers().get_at(pos).unwrap();
    assert_eq!(buf.opaque_bytes().len(), 6 * 256 * 4 * 40);
}

#[test]
fn destroyed_buffer_drops_upload_but_completes() {
    let world = stone_world();
    let mut renderer = Renderer::new(16);
    let pos = SectionPos::new(0, 0, 0);
    renderer.buffers_mut().insert(pos);
    let sched = scheduler(world, &renderer, 1, VertexStride::Packed36);

    let (tx, rx) = unbounded();
    sched.build(pos, tx);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), pos);
    assert!(renderer.buffers_mut().remove(pos));

    let stats = renderer.draw_frame(&camera_in(pos), &mut DrawRecorder::default());
    assert_eq!(stats.bridge_tasks, 1);
    assert!(renderer.buffers().get_at(pos).is_none());
    assert_eq!(sched.arena_stats().outstanding(), 0);
}

#[test]
fn closed_bridge_still_completes_and_returns_buffers() {
    let world = stone_world();
    let renderer = Renderer::new(16);
    let sched = scheduler(world, &renderer, 1, VertexStride::Packed36);
    drop(renderer);

    let (tx, rx) = unbounded();
    let pos = SectionPos::new(0, 0, 0);
    sched.build(pos, tx);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), pos);
    assert_eq!(sched.arena_stats().outstanding(), 0);
    assert_eq!(sched.snapshot_stats().outstanding(), 0);
}

#[test]
fn many_builds_leave_no_outstanding_resources() {
    let reg = Arc::new(BlockRegistry::builtin().unwrap());
    let world = World::new(reg);
    let cfg = WorldGenConfig {
        columns_x: 2,
        columns_z: 2,
        ..WorldGenConfig::default()
    };
    cfg.populate(&world);
    let world = Arc::new(world);
    let sections = world.loaded_sections();
    assert!(!sections.is_empty());

    let mut renderer = Renderer::new(8);
    for pos in &sections {
        renderer.buffers_mut().insert(*pos);
    }
    let sched = scheduler(world, &renderer, 4, VertexStride::Packed36);
    let (tx, rx) = unbounded();
    for pos in &sections {
        sched.build(*pos, tx.clone());
    }
    drop(tx);

    // The bridge is smaller than the build count, so keep draining while waiting.
    let mut done = 0;
    let mut sink = DrawRecorder::default();
    let camera = camera_in(sections[0]);
    while done < sections.len() {
        renderer.draw_frame(&camera, &mut sink);
        while rx.try_recv().is_ok() {
            done += 1;
        }
        std::thread::yield_now();
    }
    renderer.draw_frame(&camera, &mut sink);

    for pos in &sections {
        assert_eq!(renderer.buffers().get_at(*pos).unwrap().uploads(), 1);
    }
    let arena = sched.arena_stats();
    assert_eq!(arena.taken, 2 * sections.len());
    assert_eq!(arena.outstanding(), 0);
    let snaps = sched.snapshot_stats();
    assert_eq!(snaps.acquired, sections.len());
    assert_eq!(snaps.outstanding(), 0);
    assert!(snaps.allocated <= sched.workers());
    assert_eq!(sched.queue_debug_counts(), (0, 0));
}
