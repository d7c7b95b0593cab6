use std::collections::HashMap;

use serde::Deserialize;

/// A sub-rectangle of one layer of the block texture atlas, in texels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct TextureRegion {
    pub x: u16,
    pub y: u16,
    #[serde(default = "default_tile")]
    pub w: u16,
    #[serde(default = "default_tile")]
    pub h: u16,
    #[serde(default)]
    pub atlas: i16,
}

fn default_tile() -> u16 {
    16
}

impl TextureRegion {
    #[inline]
    pub const fn new(x: u16, y: u16, w: u16, h: u16, atlas: i16) -> Self {
        Self { x, y, w, h, atlas }
    }
}

#[derive(Default, Clone, Debug)]
pub struct TextureCatalog {
    by_key: HashMap<String, TextureRegion>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, region: TextureRegion) {
        self.by_key.insert(key.into(), region);
    }

    pub fn get(&self, key: &str) -> Option<TextureRegion> {
        self.by_key.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl From<HashMap<String, TextureRegion>> for TextureCatalog {
    fn from(by_key: HashMap<String, TextureRegion>) -> Self {
        Self { by_key }
    }
}
