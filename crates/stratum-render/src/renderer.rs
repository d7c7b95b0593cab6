use stratum_geom::{Direction, Frustum};
use stratum_mesh_cpu::can_see;
use stratum_world::SectionPos;

use crate::buffer::{BufferId, BufferStore, ChunkBuffer};
use crate::camera::Camera;
use crate::queue::{RenderQueue, RenderRequest};
use crate::sync::{SyncReceiver, SyncSender, render_sync};

/// Receives the draw calls issued by a frame.
pub trait DrawSink {
    fn draw_opaque(&mut self, pos: SectionPos, buffer: &ChunkBuffer);
    fn draw_translucent(&mut self, pos: SectionPos, buffer: &ChunkBuffer);
}

/// Sink that remembers every draw as `(section, element count)`.
#[derive(Default, Debug)]
pub struct DrawRecorder {
    pub opaque: Vec<(SectionPos, u32)>,
    pub translucent: Vec<(SectionPos, u32)>,
}

impl DrawRecorder {
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.translucent.clear();
    }
}

impl DrawSink for DrawRecorder {
    fn draw_opaque(&mut self, pos: SectionPos, buffer: &ChunkBuffer) {
        self.opaque.push((pos, buffer.count()));
    }

    fn draw_translucent(&mut self, pos: SectionPos, buffer: &ChunkBuffer) {
        self.translucent.push((pos, buffer.translucent_count()));
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame_id: u32,
    pub bridge_tasks: usize,
    pub visited: usize,
    pub frustum_culled: usize,
    pub opaque_draws: usize,
    pub translucent_draws: usize,
    pub opaque_elements: u64,
    pub translucent_elements: u64,
}

/// Render-thread owner of the chunk buffers. Workers reach it only through the sync bridge.
pub struct Renderer {
    buffers: BufferStore,
    sync_rx: SyncReceiver<BufferStore>,
    sync_tx: SyncSender<BufferStore>,
    frame_id: u32,
    queue: RenderQueue,
    render_order: Vec<BufferId>,
    valid_dirs: [bool; 6],
    frustum: Frustum,
}

impl Renderer {
    pub fn new(sync_capacity: usize) -> Self {
        let (sync_tx, sync_rx) = render_sync(sync_capacity);
        Self {
            buffers: BufferStore::new(),
            sync_rx,
            sync_tx,
            frame_id: 0,
            queue: RenderQueue::new(),
            render_order: Vec::new(),
            valid_dirs: [true; 6],
            frustum: Frustum::default(),
        }
    }

    /// Producer handle for worker threads.
    pub fn sync_sender(&self) -> SyncSender<BufferStore> {
        self.sync_tx.clone()
    }

    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut BufferStore {
        &mut self.buffers
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Sections visited by the last frame, in traversal order.
    pub fn render_order(&self) -> impl Iterator<Item = SectionPos> + '_ {
        self.render_order
            .iter()
            .filter_map(|id| self.buffers.get(*id))
            .map(ChunkBuffer::pos)
    }

    pub fn draw_frame(&mut self, camera: &Camera, sink: &mut dyn DrawSink) -> FrameStats {
        self.frame_id = self.frame_id.wrapping_add(1);
        let mut stats = FrameStats {
            frame_id: self.frame_id,
            ..FrameStats::default()
        };
        stats.bridge_tasks = self.sync_rx.drain(&mut self.buffers);

        self.valid_dirs = camera.valid_dirs();
        self.frustum = camera.frustum();

        let pos = camera.section_pos();
        self.render_order.clear();
        match self.buffers.id_at(pos) {
            Some(origin) => self.render_buffer(origin, pos, sink, &mut stats),
            None => log::trace!(target: "render", "no buffer under camera at {:?}", pos),
        }

        for id in &self.render_order {
            let Some(chunk) = self.buffers.get(*id) else {
                continue;
            };
            if chunk.has_translucent() {
                sink.draw_translucent(chunk.pos(), chunk);
                stats.translucent_draws += 1;
                stats.translucent_elements += u64::from(chunk.translucent_count());
            }
        }
        stats.visited = self.render_order.len();

        log::trace!(
            target: "render",
            "frame {}: bridge={} visited={} culled={} draws={}+{}",
            stats.frame_id,
            stats.bridge_tasks,
            stats.visited,
            stats.frustum_culled,
            stats.opaque_draws,
            stats.translucent_draws
        );
        stats
    }

    fn render_buffer(
        &mut self,
        origin: BufferId,
        pos: SectionPos,
        sink: &mut dyn DrawSink,
        stats: &mut FrameStats,
    ) {
        let frame = self.frame_id;
        self.queue.clear();
        self.queue.push(RenderRequest {
            buffer: origin,
            pos,
            from: None,
        });

        while let Some(req) = self.queue.pop() {
            let Some(chunk) = self.buffers.get_mut(req.buffer) else {
                continue;
            };
            if chunk.rendered_on == frame {
                continue;
            }
            chunk.rendered_on = frame;
            if !self.frustum.intersects_aabb(&chunk.aabb()) {
                stats.frustum_culled += 1;
                continue;
            }
            self.render_order.push(req.buffer);

            if chunk.has_opaque() {
                sink.draw_opaque(req.pos, chunk);
                stats.opaque_draws += 1;
                stats.opaque_elements += u64::from(chunk.count());
            }

            let neighbors = chunk.neighbors();
            let cull_bits = chunk.cull_bits();
            for dir in Direction::ALL {
                if Some(dir) == req.from {
                    continue;
                }
                let Some(nid) = neighbors[dir.index()] else {
                    continue;
                };
                match self.buffers.get(nid) {
                    Some(nb) if nb.rendered_on != frame => {}
                    _ => continue,
                }
                if let Some(from) = req.from {
                    if !can_see(cull_bits, from, dir) || !self.valid_dirs[dir.index()] {
                        continue;
                    }
                }
                self.queue.push(RenderRequest {
                    buffer: nid,
                    pos: req.pos.neighbor(dir),
                    from: Some(dir.opposite()),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use stratum_geom::Vec3;
    use stratum_mesh_cpu::ALL_FACES_VISIBLE;

    use super::*;

    // Looking east (+x) from the middle of section (0, 0, 0).
    fn east_camera() -> Camera {
        Camera::new(Vec3::new(8.0, 8.0, 8.0), 0.0, 0.0)
    }

    fn row(renderer: &mut Renderer, xs: std::ops::RangeInclusive<i32>) {
        for x in xs {
            renderer.buffers_mut().insert(SectionPos::new(x, 0, 0));
        }
    }

    fn upload(renderer: &mut Renderer, pos: SectionPos, count: u32, cull_bits: u64) {
        let buf = renderer.buffers_mut().get_at_mut(pos).unwrap();
        buf.upload(&[0; 36], count, cull_bits);
    }

    #[test]
    fn sections_behind_camera_are_culled_and_not_expanded() {
        let mut r = Renderer::new(8);
        row(&mut r, -3..=3);
        let mut sink = DrawRecorder::default();
        let stats = r.draw_frame(&east_camera(), &mut sink);
        let order: Vec<i32> = r.render_order().map(|p| p.x).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(stats.frustum_culled, 1);
        let far_west = r.buffers().get_at(SectionPos::new(-2, 0, 0)).unwrap();
        assert_ne!(far_west.rendered_on(), stats.frame_id);
    }

    #[test]
    fn each_section_visited_once_per_frame() {
        let mut r = Renderer::new(8);
        for x in 0..3 {
            for z in 0..3 {
                r.buffers_mut().insert(SectionPos::new(x, 0, z));
            }
        }
        let mut sink = DrawRecorder::default();
        r.draw_frame(&east_camera(), &mut sink);
        let mut order: Vec<SectionPos> = r.render_order().collect();
        let n = order.len();
        order.sort_by_key(|p| (p.x, p.z));
        order.dedup();
        assert_eq!(order.len(), n);

        // A second frame visits the same set again.
        let again = r.draw_frame(&east_camera(), &mut sink);
        assert_eq!(again.visited, n);
        assert_eq!(again.frame_id, 2);
    }

    #[test]
    fn closed_cull_bits_stop_expansion() {
        let mut r = Renderer::new(8);
        row(&mut r, 0..=3);
        upload(&mut r, SectionPos::new(1, 0, 0), 6, 0);
        let mut sink = DrawRecorder::default();
        r.draw_frame(&east_camera(), &mut sink);
        let order: Vec<i32> = r.render_order().map(|p| p.x).collect();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(sink.opaque, vec![(SectionPos::new(1, 0, 0), 6)]);
    }

    #[test]
    fn origin_expands_regardless_of_its_cull_bits() {
        let mut r = Renderer::new(8);
        row(&mut r, 0..=2);
        upload(&mut r, SectionPos::new(0, 0, 0), 6, 0);
        let mut sink = DrawRecorder::default();
        r.draw_frame(&east_camera(), &mut sink);
        assert_eq!(r.render_order().count(), 3);
    }

    #[test]
    fn west_facing_exit_is_gated_by_view() {
        let mut r = Renderer::new(8);
        for pos in [
            SectionPos::new(0, 0, 0),
            SectionPos::new(-1, 0, 0),
            SectionPos::new(0, 0, 1),
            SectionPos::new(-1, 0, 1),
        ] {
            r.buffers_mut().insert(pos);
        }
        let mut sink = DrawRecorder::default();
        let stats = r.draw_frame(&east_camera(), &mut sink);
        // (-1,0,0) is reached from the origin ungated and culled; (-1,0,1) would need a
        // westward step from (0,0,1).
        assert_eq!(stats.frustum_culled, 1);
        let gated = r.buffers().get_at(SectionPos::new(-1, 0, 1)).unwrap();
        assert_ne!(gated.rendered_on(), stats.frame_id);
        let culled = r.buffers().get_at(SectionPos::new(-1, 0, 0)).unwrap();
        assert_eq!(culled.rendered_on(), stats.frame_id);
    }

    #[test]
    fn translucent_pass_follows_traversal_order() {
        let mut r = Renderer::new(8);
        row(&mut r, 0..=3);
        for x in [3, 1] {
            let buf = r.buffers_mut().get_at_mut(SectionPos::new(x, 0, 0)).unwrap();
            buf.upload_trans(&[0; 36], 12);
        }
        upload(&mut r, SectionPos::new(2, 0, 0), 6, ALL_FACES_VISIBLE);
        let mut sink = DrawRecorder::default();
        let stats = r.draw_frame(&east_camera(), &mut sink);
        assert_eq!(
            sink.translucent,
            vec![(SectionPos::new(1, 0, 0), 12), (SectionPos::new(3, 0, 0), 12)]
        );
        assert_eq!(sink.opaque, vec![(SectionPos::new(2, 0, 0), 6)]);
        assert_eq!(stats.translucent_elements, 24);
    }

    #[test]
    fn bridge_uploads_land_before_traversal() {
        let mut r = Renderer::new(8);
        row(&mut r, 0..=1);
        let tx = r.sync_sender();
        let target = SectionPos::new(1, 0, 0);
        assert!(tx.sync(move |store: &mut BufferStore| {
            if let Some(buf) = store.get_at_mut(target) {
                buf.upload(&[7; 72], 12, 0);
            }
        }));
        let mut sink = DrawRecorder::default();
        let stats = r.draw_frame(&east_camera(), &mut sink);
        assert_eq!(stats.bridge_tasks, 1);
        assert_eq!(sink.opaque, vec![(target, 12)]);
    }

    #[test]
    fn nothing_drawn_without_buffer_under_camera() {
        let mut r = Renderer::new(8);
        row(&mut r, 1..=3);
        let mut sink = DrawRecorder::default();
        let stats = r.draw_frame(&east_camera(), &mut sink);
        assert_eq!(stats.visited, 0);
        assert!(sink.opaque.is_empty());
    }
}
