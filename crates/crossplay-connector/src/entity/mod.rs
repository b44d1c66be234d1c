mod cache;
pub mod components;
mod definition;
mod kinds;
mod metadata;

pub use cache::{EntityCache, SpawnInfo, Spawned, PLAYER_HEIGHT, PLAYER_RUNTIME_ID, PLAYER_WIDTH};
pub use definition::{EntityFactory, EntityKind, EntityRegistry, KindDefinition, MetadataHandler, PropertyLookup};
pub use metadata::{MetadataBag, MetadataTarget};
