use bitflags::bitflags;

bitflags! {
    /// Lifecycle markers on a chunk record. Several may be set at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChunkStatus: u8 {
        /// Terrain has not been written yet.
        const NOT_GENERATED   = 0b0000_0001;
        /// Some chunk in the 3x3x3 neighborhood still lacks its sunlight pass.
        const NOT_ILLUMINATED = 0b0000_0010;
        /// Mesh is stale.
        const DIRTY           = 0b0000_0100;
        /// A background job owns the voxel buffer.
        const IN_FLIGHT       = 0b0000_1000;
        /// Rebuild synchronously this tick.
        const IMMEDIATE       = 0b0001_0000;
        /// The column flood-down for this chunk has run.
        const ILLUMINATED     = 0b0010_0000;
        /// Inside the rendered area (not in the buffer ring).
        const VISIBLE         = 0b0100_0000;
    }
}

impl ChunkStatus {
    /// Flags of a freshly spawned chunk.
    pub const SPAWNED: ChunkStatus = ChunkStatus::NOT_GENERATED
        .union(ChunkStatus::NOT_ILLUMINATED)
        .union(ChunkStatus::DIRTY);

    #[inline]
    pub fn is_generated(self) -> bool {
        !self.contains(ChunkStatus::NOT_GENERATED)
    }

    #[inline]
    pub fn is_in_flight(self) -> bool {
        self.contains(ChunkStatus::IN_FLIGHT)
    }
}
