//! Chunk index, streaming order, structural mutations, and terrain generation.
#![forbid(unsafe_code)]

mod arena;
mod loading;
mod mutation;
mod raycast;
mod store;
pub mod worldgen;

pub use arena::{ChunkArena, ChunkHandle};
pub use loading::{ColumnVisit, LoadingQueue, Spiral, VisibilityChanges};
pub use mutation::{Applied, Mutation, MutationQueue};
pub use raycast::{RayHit, raycast_first_hit};
pub use store::{BUFFER_MARGIN, ChunkStore, Destroyed, neighborhood, size_for};
pub use worldgen::{FlatGenerator, NoiseGenerator, TerrainGenerator, WorldGenConfig};
