//! CPU section mesher: vertex packing, model emission, and face-to-face visibility.
#![forbid(unsafe_code)]

pub mod arena;
mod build;
mod emit;
pub mod vertex;
pub mod visibility;

pub use arena::{ArenaStats, PooledVertices, VertexArena};
pub use build::{SectionMesh, mesh_section};
pub use emit::{RenderModel, render_liquid};
pub use vertex::{ChunkVertex, VertexStride, encode_vertices};
pub use visibility::{ALL_FACES_VISIBLE, VisitedSet, build_cull_bits, can_see, flood_fill};
