use rand::RngCore;
use stratum_geom::Direction;

use crate::texture::TextureRegion;

/// Geometry emitted for a variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// Full unit cube; faces against `cull_against` neighbours are skipped.
    Cube,
    /// Two diagonal quads (plants). Never face-culled.
    Cross,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub kind: ModelKind,
    /// Per-face textures indexed by `Direction::index()`. Cross models use the `Up` entry.
    pub textures: [TextureRegion; 6],
    pub tint: [u8; 3],
    pub weight: u32,
}

impl Variant {
    pub fn cube(texture: TextureRegion) -> Self {
        Self {
            kind: ModelKind::Cube,
            textures: [texture; 6],
            tint: [255, 255, 255],
            weight: 1,
        }
    }

    pub fn cross(texture: TextureRegion) -> Self {
        Self {
            kind: ModelKind::Cross,
            ..Self::cube(texture)
        }
    }

    #[inline]
    pub fn texture(&self, face: Direction) -> TextureRegion {
        self.textures[face.index()]
    }
}

/// The weighted set of variants a block can render as.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelSet {
    variants: Vec<Variant>,
    total_weight: u32,
}

impl ModelSet {
    pub fn new(variants: Vec<Variant>) -> Self {
        let variants: Vec<Variant> = variants
            .into_iter()
            .map(|mut v| {
                v.weight = v.weight.max(1);
                v
            })
            .collect();
        let total_weight = variants
            .iter()
            .fold(0u32, |acc, v| acc.saturating_add(v.weight));
        Self {
            variants,
            total_weight,
        }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Picks a variant by weight. Consumes exactly one draw from `rng` on every call,
    /// including for empty and single-variant sets, so the caller's stream advances
    /// by one step per cell regardless of what the cell holds.
    pub fn select_model<R: RngCore + ?Sized>(&self, rng: &mut R) -> Option<&Variant> {
        let roll = rng.next_u32();
        if self.total_weight == 0 {
            return None;
        }
        let mut pick = roll % self.total_weight;
        for v in &self.variants {
            if pick < v.weight {
                return Some(v);
            }
            pick -= v.weight;
        }
        self.variants.last()
    }

    /// True when every variant is a full cube.
    pub fn all_cubes(&self) -> bool {
        !self.variants.is_empty() && self.variants.iter().all(|v| v.kind == ModelKind::Cube)
    }
}
