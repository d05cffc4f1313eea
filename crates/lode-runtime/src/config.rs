use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

fn default_distance() -> i32 {
    3
}

fn default_height() -> i32 {
    16
}

fn default_load_batch() -> usize {
    1
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
}

fn default_mesh_budget() -> usize {
    64
}

/// Streaming and scheduling knobs for a [`crate::VoxelWorld`].
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct WorldConfig {
    /// Rendered radius in columns around the center.
    #[serde(default = "default_distance")]
    pub distance: i32,
    /// World height in chunks.
    #[serde(default = "default_height")]
    pub height: i32,
    /// Columns spawned per tick.
    #[serde(default = "default_load_batch")]
    pub load_batch: usize,
    /// Worker threads; `0` runs every job on the calling thread.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Background mesh jobs submitted per tick.
    #[serde(default = "default_mesh_budget")]
    pub mesh_budget: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            distance: default_distance(),
            height: default_height(),
            load_batch: default_load_batch(),
            workers: default_workers(),
            mesh_budget: default_mesh_budget(),
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height < 1 {
            return Err(ConfigError::Height(self.height));
        }
        Ok(())
    }
}

pub fn load_world_config(path: &Path) -> Result<WorldConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: WorldConfig = toml::from_str(&text)?;
    cfg.validate()?;
    Ok(cfg)
}
