use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::atlas::SpriteAtlas;
use super::config::{BlockDef, BlocksConfig};
use super::error::BlocksError;
use super::types::{AIR, BlockId, BlockSprites, Light, LightColor};

/// Immutable per-block metadata, addressed by block id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub id: BlockId,
    pub name: String,
    pub solid: bool,
    pub transparent: bool,
    pub absorption: u8,
    pub emission: LightColor,
    pub sprites: BlockSprites,
}

impl BlockDescriptor {
    fn air() -> Self {
        BlockDescriptor {
            id: AIR,
            name: "air".into(),
            solid: false,
            transparent: true,
            absorption: 0,
            emission: LightColor::default(),
            sprites: BlockSprites::default(),
        }
    }

    // Stand-in for ids no definition claimed: behaves like plain stone.
    fn missing(id: BlockId) -> Self {
        BlockDescriptor {
            id,
            name: String::new(),
            solid: true,
            transparent: false,
            absorption: 0,
            emission: LightColor::default(),
            sprites: BlockSprites::default(),
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        !self.transparent
    }
}

#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockDescriptor>,
    pub by_name: HashMap<String, BlockId>,
    pub atlas: SpriteAtlas,
    fallback: BlockDescriptor,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Registry holding only air.
    pub fn new() -> Self {
        let air = BlockDescriptor::air();
        BlockRegistry {
            by_name: HashMap::from([(air.name.clone(), AIR)]),
            blocks: vec![air],
            atlas: SpriteAtlas::default(),
            fallback: BlockDescriptor::missing(BlockId::MAX),
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockDescriptor> {
        self.blocks.get(id as usize)
    }

    /// Descriptor for `id`; unknown ids read as an opaque solid block.
    #[inline]
    pub fn descriptor(&self, id: BlockId) -> &BlockDescriptor {
        self.blocks.get(id as usize).unwrap_or(&self.fallback)
    }

    #[inline]
    pub fn is_transparent(&self, id: BlockId) -> bool {
        self.descriptor(id).transparent
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.descriptor(id).solid
    }

    #[inline]
    pub fn absorption(&self, id: BlockId) -> u8 {
        self.descriptor(id).absorption
    }

    #[inline]
    pub fn emission(&self, id: BlockId) -> LightColor {
        self.descriptor(id).emission
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, BlocksError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BlocksError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, BlocksError> {
        let cfg: BlocksConfig = toml::from_str(text)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, BlocksError> {
        let atlas = SpriteAtlas::build(
            cfg.blocks
                .iter()
                .filter_map(|def| def.sprites.as_ref())
                .flat_map(|s| s.face_names())
                .flatten(),
        )?;

        let mut slots: Vec<Option<BlockDescriptor>> = vec![None];
        let mut by_name: HashMap<String, BlockId> = HashMap::new();
        let mut next_id: BlockId = 1;
        for def in cfg.blocks {
            let id = match def.id {
                Some(id) => id,
                None if def.name == "air" => AIR,
                None => next_id,
            };
            if by_name.contains_key(&def.name) {
                return Err(BlocksError::DuplicateName(def.name));
            }
            let desc = compile(def, id, &atlas);
            if id == AIR && (desc.solid || !desc.transparent || desc.absorption != 0) {
                return Err(BlocksError::ReservedAir(desc.name));
            }
            let slot = id as usize;
            if slots.len() <= slot {
                slots.resize(slot + 1, None);
            }
            if let Some(prev) = &slots[slot] {
                return Err(BlocksError::DuplicateId {
                    id,
                    first: prev.name.clone(),
                    second: desc.name,
                });
            }
            next_id = next_id.max(id.saturating_add(1));
            by_name.insert(desc.name.clone(), id);
            slots[slot] = Some(desc);
        }
        if slots[0].is_none() {
            slots[0] = Some(BlockDescriptor::air());
            by_name.entry("air".into()).or_insert(AIR);
        }

        let blocks: Vec<BlockDescriptor> = slots
            .into_iter()
            .enumerate()
            .map(|(i, d)| d.unwrap_or_else(|| BlockDescriptor::missing(i as BlockId)))
            .collect();
        log::debug!(
            "block registry: {} blocks, {} sprites in a {}x{} atlas",
            blocks.len(),
            atlas.len(),
            atlas.size(),
            atlas.size()
        );
        Ok(BlockRegistry {
            blocks,
            by_name,
            atlas,
            fallback: BlockDescriptor::missing(BlockId::MAX),
        })
    }
}

fn compile(def: BlockDef, id: BlockId, atlas: &SpriteAtlas) -> BlockDescriptor {
    let solid = def.solid.unwrap_or(id != AIR);
    let transparent = def.transparent.unwrap_or(id == AIR);
    let sprite = |name: Option<&str>| name.and_then(|n| atlas.id(n)).unwrap_or(0);
    let sprites = match &def.sprites {
        Some(cfg) => {
            let [right, left, top, bottom, front, back] = cfg.face_names();
            BlockSprites {
                right: sprite(right),
                left: sprite(left),
                top: sprite(top),
                bottom: sprite(bottom),
                front: sprite(front),
                back: sprite(back),
            }
        }
        None => BlockSprites::default(),
    };
    BlockDescriptor {
        id,
        name: def.name,
        solid,
        transparent,
        absorption: def.absorption.unwrap_or(0).min(Light::MAX),
        emission: def.emission.unwrap_or_default().clamped(),
        sprites,
    }
}
