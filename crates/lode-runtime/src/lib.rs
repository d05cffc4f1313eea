//! Worker pool and the tick-driven world that streams, lights, and meshes chunks.
#![forbid(unsafe_code)]

mod config;
mod error;
mod pool;
mod world;

pub use config::{WorldConfig, load_world_config};
pub use error::{ConfigError, RuntimeError};
pub use pool::{Job, JobKind, JobOut, Runtime};
pub use world::{TickStats, VoxelWorld, WorldEvents};

#[cfg(test)]
mod tests;
