use std::path::PathBuf;

use thiserror::Error;

use crate::types::BlockId;

#[derive(Debug, Error)]
pub enum BlocksError {
    #[error("failed to read block table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse block table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("block id {id} is claimed by both `{first}` and `{second}`")]
    DuplicateId {
        id: BlockId,
        first: String,
        second: String,
    },
    #[error("block name `{0}` is defined twice")]
    DuplicateName(String),
    #[error("block `{0}` takes id 0, which only non-solid transparent air may use")]
    ReservedAir(String),
    #[error("{sprites} sprites need a {size}x{size} atlas, the limit is {max}")]
    AtlasOverflow {
        sprites: usize,
        size: usize,
        max: usize,
    },
}
