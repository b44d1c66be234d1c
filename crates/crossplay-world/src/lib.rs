pub mod chunk;
pub mod registry;

pub use chunk::{BlockAccess, Chunk, ChunkCache, ChunkSection, MIN_Y, SECTION_COUNT};
pub use registry::{
    BlockRegistry, BlockState, BlockView, CollisionBehavior, RegistryError, RemapChain, SurfaceKind, AIR,
};
