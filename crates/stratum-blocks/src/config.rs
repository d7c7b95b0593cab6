use std::collections::HashMap;

use serde::Deserialize;

use crate::texture::TextureRegion;
use crate::types::LiquidKind;

// Top-level blocks config file
#[derive(Deserialize, Debug, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub textures: HashMap<String, TextureRegion>,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlockDef {
    pub name: String,
    // Defaults to true when models or a liquid are present
    #[serde(default)]
    pub renderable: Option<bool>,
    #[serde(default)]
    pub translucent: Option<bool>,
    // Defaults to true for opaque blocks whose models are all full cubes
    #[serde(default)]
    pub cull_against: Option<bool>,
    #[serde(default)]
    pub liquid: Option<LiquidDef>,
    #[serde(default)]
    pub models: Vec<ModelDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LiquidDef {
    pub kind: LiquidKind,
    pub texture: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKindDef {
    #[default]
    Cube,
    Cross,
}

// Per-face texture keys; the most specific key wins (north > side > all)
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ModelDef {
    #[serde(default)]
    pub kind: ModelKindDef,
    #[serde(default)]
    pub all: Option<String>,
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub north: Option<String>,
    #[serde(default)]
    pub south: Option<String>,
    #[serde(default)]
    pub west: Option<String>,
    #[serde(default)]
    pub east: Option<String>,
    #[serde(default)]
    pub tint: Option<[u8; 3]>,
    #[serde(default)]
    pub weight: Option<u32>,
}
