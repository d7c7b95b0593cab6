//! Render-thread state: chunk buffers, the sync bridge, and the visibility-guided traversal.
#![forbid(unsafe_code)]

mod buffer;
mod camera;
mod queue;
mod renderer;
pub mod sync;

pub use buffer::{BufferId, BufferStore, ChunkBuffer};
pub use camera::Camera;
pub use queue::{RENDER_QUEUE_CAPACITY, RenderQueue, RenderRequest};
pub use renderer::{DrawRecorder, DrawSink, FrameStats, Renderer};
pub use sync::{DEFAULT_SYNC_CAPACITY, SyncReceiver, SyncSender, render_sync};
