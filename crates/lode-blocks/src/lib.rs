//! Voxel values, block descriptors, and the block registry.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use atlas::{MAX_ATLAS_SIZE, SpriteAtlas};
pub use error::BlocksError;
pub use registry::{BlockDescriptor, BlockRegistry};
pub use types::{AIR, BlockId, BlockSprites, Light, LightChannel, LightColor, Voxel};
