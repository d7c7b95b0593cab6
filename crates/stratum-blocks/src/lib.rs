//! Block, texture, model, and registry crate.
#![forbid(unsafe_code)]

pub mod config;
pub mod model;
pub mod registry;
pub mod texture;
pub mod types;

pub use model::{ModelKind, ModelSet, Variant};
pub use registry::{BlockRegistry, BlockType, RegistryError};
pub use texture::{TextureCatalog, TextureRegion};
pub use types::{Block, BlockId, BlockState, Liquid, LiquidKind};
