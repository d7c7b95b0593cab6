use std::collections::VecDeque;

use stratum_geom::Direction;
use stratum_world::SectionPos;

use crate::buffer::BufferId;

/// Initial request capacity; the queue keeps its allocation between frames.
pub const RENDER_QUEUE_CAPACITY: usize = 5000;

/// A pending visit. `from` is the face through which the walk entered, `None` for the
/// section under the camera.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    pub buffer: BufferId,
    pub pos: SectionPos,
    pub from: Option<Direction>,
}

/// FIFO of traversal requests.
#[derive(Debug)]
pub struct RenderQueue {
    items: VecDeque<RenderRequest>,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueue {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(RENDER_QUEUE_CAPACITY),
        }
    }

    #[inline]
    pub fn push(&mut self, req: RenderRequest) {
        self.items.push_back(req);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<RenderRequest> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
