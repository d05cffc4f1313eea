use serde::Deserialize;

use crate::types::{BlockId, LightColor};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub id: Option<BlockId>,
    pub solid: Option<bool>,
    pub transparent: Option<bool>,
    pub absorption: Option<u8>,
    pub emission: Option<LightColor>,
    pub sprites: Option<SpritesConfig>,
}

impl BlockDef {
    pub fn named(name: impl Into<String>) -> Self {
        BlockDef {
            name: name.into(),
            id: None,
            solid: None,
            transparent: None,
            absorption: None,
            emission: None,
            sprites: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SpritesConfig {
    // sprites = "stone"
    All(String),
    // sprites = { top = "grass_top", bottom = "dirt", side = "grass_side" }
    Faces(SpriteFaces),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpriteFaces {
    pub all: Option<String>,
    pub side: Option<String>,
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub right: Option<String>,
    pub left: Option<String>,
    pub front: Option<String>,
    pub back: Option<String>,
}

impl SpritesConfig {
    /// Sprite names in right, left, top, bottom, front, back order.
    pub fn face_names(&self) -> [Option<&str>; 6] {
        match self {
            SpritesConfig::All(name) => [Some(name.as_str()); 6],
            SpritesConfig::Faces(f) => {
                let all = f.all.as_deref();
                let side = f.side.as_deref().or(all);
                [
                    f.right.as_deref().or(side),
                    f.left.as_deref().or(side),
                    f.top.as_deref().or(all),
                    f.bottom.as_deref().or(all),
                    f.front.as_deref().or(side),
                    f.back.as_deref().or(side),
                ]
            }
        }
    }
}
