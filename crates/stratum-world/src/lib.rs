//! Voxel world storage, bordered snapshots, and world generation.
#![forbid(unsafe_code)]

mod coord;
pub mod pool;
pub mod section;
pub mod snapshot;
mod world;
pub mod worldgen;

pub use coord::SectionPos;
pub use pool::{PoolStats, PooledSnapshot, SnapshotPool};
pub use section::{MAX_LIGHT, SECTION_SIZE, SECTION_VOLUME, SectionData};
pub use snapshot::{BlockSnapshot, SNAPSHOT_BORDER, SNAPSHOT_SIZE};
pub use world::World;
pub use worldgen::{WorldGenConfig, WorldGenMode};
