use std::collections::HashMap;
use std::fs;
use std::path::Path;

use stratum_geom::Direction;
use thiserror::Error;

use crate::config::{BlockDef, BlocksConfig, ModelDef, ModelKindDef};
use crate::model::{ModelKind, ModelSet, Variant};
use crate::texture::{TextureCatalog, TextureRegion};
use crate::types::{Block, BlockId, Liquid};

const BUILTIN_BLOCKS: &str = include_str!("../assets/blocks.toml");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read block config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse block config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("the first block must be `air`, found `{0}`")]
    MissingAir(String),
    #[error("block `{0}` is defined more than once")]
    DuplicateName(String),
    #[error("block `{block}` references unknown texture `{texture}`")]
    UnknownTexture { block: String, texture: String },
    #[error("variant weights of block `{0}` exceed u32::MAX")]
    WeightOverflow(String),
    #[error("texture `{0}` is larger than 32767 texels on a side")]
    TextureTooLarge(String),
    #[error("too many block types ({0})")]
    TooManyBlocks(usize),
}

/// Runtime description of a block id: the capability set the mesher dispatches on.
#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    renderable: bool,
    translucent: bool,
    cull_against: bool,
    liquid: Option<Liquid>,
    models: ModelSet,
}

impl BlockType {
    #[inline]
    pub fn renderable(&self) -> bool {
        self.renderable
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    /// True when the block fully occupies its cell: it hides neighbouring faces and
    /// blocks the visibility flood fill.
    #[inline]
    pub fn should_cull_against(&self) -> bool {
        self.cull_against
    }

    #[inline]
    pub fn is_liquid(&self) -> bool {
        self.liquid.is_some()
    }

    #[inline]
    pub fn liquid(&self) -> Option<&Liquid> {
        self.liquid.as_ref()
    }

    #[inline]
    pub fn models(&self) -> &ModelSet {
        &self.models
    }
}

#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub textures: TextureCatalog,
    blocks: Vec<BlockType>,
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Registry compiled from the embedded default block table.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_BLOCKS)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, RegistryError> {
        let cfg: BlocksConfig = toml::from_str(s)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        let limit = i16::MAX as u16;
        if let Some((key, _)) = cfg.textures.iter().find(|(_, r)| r.w > limit || r.h > limit) {
            return Err(RegistryError::TextureTooLarge(key.clone()));
        }
        let textures = TextureCatalog::from(cfg.textures);
        match cfg.blocks.first() {
            Some(def) if def.name == "air" => {}
            Some(def) => return Err(RegistryError::MissingAir(def.name.clone())),
            None => return Err(RegistryError::MissingAir(String::new())),
        }
        if cfg.blocks.len() > usize::from(BlockId::MAX) {
            return Err(RegistryError::TooManyBlocks(cfg.blocks.len()));
        }

        let mut blocks = Vec::with_capacity(cfg.blocks.len());
        let mut by_name = HashMap::with_capacity(cfg.blocks.len());
        for (i, def) in cfg.blocks.into_iter().enumerate() {
            let id = i as BlockId;
            if by_name.insert(def.name.clone(), id).is_some() {
                return Err(RegistryError::DuplicateName(def.name));
            }
            blocks.push(compile_block(id, def, &textures)?);
        }
        Ok(Self {
            textures,
            blocks,
            by_name,
        })
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize)
    }

    /// Capability lookup for a stored block. Unknown ids resolve to air.
    #[inline]
    pub fn block_type(&self, block: Block) -> &BlockType {
        self.blocks
            .get(block.id as usize)
            .unwrap_or(&self.blocks[0])
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Default-state block for `name`.
    pub fn block(&self, name: &str) -> Option<Block> {
        self.id_by_name(name).map(|id| Block::new(id, 0))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn compile_block(
    id: BlockId,
    def: BlockDef,
    textures: &TextureCatalog,
) -> Result<BlockType, RegistryError> {
    let lookup = |key: &str| {
        textures.get(key).ok_or_else(|| RegistryError::UnknownTexture {
            block: def.name.clone(),
            texture: key.to_string(),
        })
    };

    let liquid = match &def.liquid {
        Some(l) => Some(Liquid {
            kind: l.kind,
            texture: lookup(&l.texture)?,
        }),
        None => None,
    };
    let mut variants = Vec::with_capacity(def.models.len());
    let mut total = 0u32;
    for m in &def.models {
        let v = compile_variant(m, &lookup)?;
        total = total
            .checked_add(v.weight.max(1))
            .ok_or_else(|| RegistryError::WeightOverflow(def.name.clone()))?;
        variants.push(v);
    }
    let models = ModelSet::new(variants);

    let renderable = def
        .renderable
        .unwrap_or(liquid.is_some() || !models.is_empty());
    let translucent = def.translucent.unwrap_or(false);
    let cull_against = def
        .cull_against
        .unwrap_or(renderable && !translucent && liquid.is_none() && models.all_cubes());

    Ok(BlockType {
        id,
        name: def.name,
        renderable,
        translucent,
        cull_against,
        liquid,
        models,
    })
}

fn compile_variant(
    m: &ModelDef,
    lookup: &impl Fn(&str) -> Result<TextureRegion, RegistryError>,
) -> Result<Variant, RegistryError> {
    let pick = |specific: &Option<String>, group: &Option<String>| -> Option<String> {
        specific.clone().or_else(|| group.clone()).or_else(|| m.all.clone())
    };
    let none = None;
    let mut textures = [TextureRegion::default(); 6];
    for d in Direction::ALL {
        let key = match d {
            Direction::Up => pick(&m.top, &none),
            Direction::Down => pick(&m.bottom, &none),
            Direction::North => pick(&m.north, &m.side),
            Direction::South => pick(&m.south, &m.side),
            Direction::West => pick(&m.west, &m.side),
            Direction::East => pick(&m.east, &m.side),
        };
        if let Some(key) = key {
            textures[d.index()] = lookup(&key)?;
        }
    }
    Ok(Variant {
        kind: match m.kind {
            ModelKindDef::Cube => ModelKind::Cube,
            ModelKindDef::Cross => ModelKind::Cross,
        },
        textures,
        tint: m.tint.unwrap_or([255, 255, 255]),
        weight: m.weight.unwrap_or(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_loads() {
        let reg = BlockRegistry::builtin().unwrap();
        assert_eq!(reg.id_by_name("air"), Some(0));
        let air = reg.block_type(Block::AIR);
        assert!(!air.renderable());
        assert!(!air.should_cull_against());

        let stone = reg.block_type(reg.block("stone").unwrap());
        assert!(stone.renderable());
        assert!(stone.should_cull_against());
        assert!(!stone.is_translucent());

        let glass = reg.block_type(reg.block("glass").unwrap());
        assert!(glass.is_translucent());
        assert!(!glass.should_cull_against());

        let water = reg.block_type(reg.block("water").unwrap());
        assert!(water.is_liquid());
        assert!(water.renderable());
        assert!(!water.should_cull_against());
    }

    #[test]
    fn unknown_ids_resolve_to_air() {
        let reg = BlockRegistry::builtin().unwrap();
        let ty = reg.block_type(Block::new(u16::MAX, 0));
        assert_eq!(ty.name, "air");
    }

    #[test]
    fn overflowing_weights_are_rejected() {
        let res = BlockRegistry::from_toml_str(
            r#"
            [textures]
            a = { x = 0, y = 0 }

            [[blocks]]
            name = "air"

            [[blocks]]
            name = "moss"
            models = [{ all = "a", weight = 4000000000 }, { all = "a", weight = 4000000000 }]
        "#,
        );
        assert!(matches!(res, Err(RegistryError::WeightOverflow(name)) if name == "moss"));
    }

    #[test]
    fn oversized_texture_regions_are_rejected() {
        let res = BlockRegistry::from_toml_str(
            r#"
            [textures]
            huge = { x = 0, y = 0, w = 40000 }

            [[blocks]]
            name = "air"
        "#,
        );
        assert!(matches!(res, Err(RegistryError::TextureTooLarge(key)) if key == "huge"));
    }

    #[test]
    fn loads_block_table_from_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/blocks.toml");
        let reg = BlockRegistry::load_from_path(&path).unwrap();
        assert_eq!(reg.len(), BlockRegistry::builtin().unwrap().len());
        assert!(matches!(
            BlockRegistry::load_from_path(path.with_extension("missing")),
            Err(RegistryError::Io(_))
        ));
    }

    #[test]
    fn face_keys_fall_back_to_side_then_all() {
        let reg = BlockRegistry::from_toml_str(
            r#"
            [textures]
            top = { x = 0, y = 0 }
            side = { x = 16, y = 0 }
            base = { x = 32, y = 0 }

            [[blocks]]
            name = "air"

            [[blocks]]
            name = "log"
            models = [{ all = "base", top = "top", side = "side" }]
        "#,
        )
        .unwrap();
        let log = reg.block_type(reg.block("log").unwrap());
        let v = &log.models().variants()[0];
        assert_eq!(v.texture(Direction::Up).x, 0);
        assert_eq!(v.texture(Direction::North).x, 16);
        assert_eq!(v.texture(Direction::Down).x, 32);
        assert!(log.should_cull_against());
    }
}
