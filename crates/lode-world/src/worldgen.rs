use std::fs;
use std::path::{Path, PathBuf};

use fastnoise_lite::{FastNoiseLite, NoiseType};
use lode_blocks::{BlockId, BlockRegistry, Voxel};
use lode_chunk::{CHUNK_SIZE, VoxelBuf};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldGenError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid worldgen config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("worldgen refers to unknown block '{0}'")]
    UnknownBlock(String),
}

/// Fills freshly spawned chunks. Runs on worker threads.
pub trait TerrainGenerator: Send + Sync {
    fn generate(&self, buf: &mut VoxelBuf);
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Flat,
}

fn default_mode() -> Mode {
    Mode::Normal
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub surface: Surface,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            flat: Flat::default(),
            height: Height::default(),
            surface: Surface::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_ground")]
    pub ground: i32,
    #[serde(default = "default_flat_block")]
    pub block: String,
}
fn default_flat_ground() -> i32 {
    8
}
fn default_flat_block() -> String {
    "stone".into()
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            ground: default_flat_ground(),
            block: default_flat_block(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_min_y_ratio")]
    pub min_y_ratio: f32,
    #[serde(default = "default_max_y_ratio")]
    pub max_y_ratio: f32,
}
fn default_height_freq() -> f32 {
    0.02
}
fn default_min_y_ratio() -> f32 {
    0.15
}
fn default_max_y_ratio() -> f32 {
    0.45
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            min_y_ratio: default_min_y_ratio(),
            max_y_ratio: default_max_y_ratio(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_topsoil")]
    pub topsoil_thickness: i32,
    #[serde(default = "default_top")]
    pub top: String,
    #[serde(default = "default_subsoil")]
    pub subsoil: String,
    #[serde(default = "default_deep")]
    pub deep: String,
}
fn default_topsoil() -> i32 {
    3
}
fn default_top() -> String {
    "grass".into()
}
fn default_subsoil() -> String {
    "dirt".into()
}
fn default_deep() -> String {
    "stone".into()
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            topsoil_thickness: default_topsoil(),
            top: default_top(),
            subsoil: default_subsoil(),
            deep: default_deep(),
        }
    }
}

pub fn load_worldgen_from_path(path: &Path) -> Result<WorldGenConfig, WorldGenError> {
    let text = fs::read_to_string(path).map_err(|source| WorldGenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

fn resolve(reg: &BlockRegistry, name: &str) -> Result<BlockId, WorldGenError> {
    reg.id_by_name(name)
        .ok_or_else(|| WorldGenError::UnknownBlock(name.to_string()))
}

/// Builds the generator a config asks for.
pub fn generator_from_config(
    cfg: &WorldGenConfig,
    reg: &BlockRegistry,
    seed: i32,
    world_height: i32,
) -> Result<Box<dyn TerrainGenerator>, WorldGenError> {
    Ok(match cfg.mode {
        Mode::Flat => Box::new(FlatGenerator {
            ground: cfg.flat.ground,
            block: resolve(reg, &cfg.flat.block)?,
        }),
        Mode::Normal => Box::new(NoiseGenerator::new(cfg, reg, seed, world_height)?),
    })
}

/// Solid `block` below `ground`, air above.
#[derive(Copy, Clone, Debug)]
pub struct FlatGenerator {
    pub ground: i32,
    pub block: BlockId,
}

impl TerrainGenerator for FlatGenerator {
    fn generate(&self, buf: &mut VoxelBuf) {
        let (_, oy, _) = buf.coord.origin();
        for y in 0..CHUNK_SIZE {
            if oy + y as i32 >= self.ground {
                break;
            }
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    buf.set_local(x, y, z, Voxel::new(self.block));
                }
            }
        }
    }
}

/// Height-map terrain from 2D OpenSimplex noise, layered top/subsoil/deep.
pub struct NoiseGenerator {
    noise: FastNoiseLite,
    min_y: f32,
    max_y: f32,
    topsoil: i32,
    top: BlockId,
    subsoil: BlockId,
    deep: BlockId,
}

impl NoiseGenerator {
    pub fn new(
        cfg: &WorldGenConfig,
        reg: &BlockRegistry,
        seed: i32,
        world_height: i32,
    ) -> Result<Self, WorldGenError> {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(cfg.height.frequency));
        let h = world_height as f32;
        Ok(NoiseGenerator {
            noise,
            min_y: cfg.height.min_y_ratio * h,
            max_y: cfg.height.max_y_ratio * h,
            topsoil: cfg.surface.topsoil_thickness.max(1),
            top: resolve(reg, &cfg.surface.top)?,
            subsoil: resolve(reg, &cfg.surface.subsoil)?,
            deep: resolve(reg, &cfg.surface.deep)?,
        })
    }

    /// Topmost solid voxel of world column `(wx, wz)`.
    pub fn surface_y(&self, wx: i32, wz: i32) -> i32 {
        let n = self.noise.get_noise_2d(wx as f32, wz as f32) * 0.5 + 0.5;
        (self.min_y + n.clamp(0.0, 1.0) * (self.max_y - self.min_y)).floor() as i32
    }
}

impl TerrainGenerator for NoiseGenerator {
    fn generate(&self, buf: &mut VoxelBuf) {
        let (ox, oy, oz) = buf.coord.origin();
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let surface = self.surface_y(ox + x as i32, oz + z as i32);
                for y in 0..CHUNK_SIZE {
                    let wy = oy + y as i32;
                    if wy > surface {
                        break;
                    }
                    let block = if wy == surface {
                        self.top
                    } else if wy > surface - self.topsoil {
                        self.subsoil
                    } else {
                        self.deep
                    };
                    buf.set_local(x, y, z, Voxel::new(block));
                }
            }
        }
    }
}
