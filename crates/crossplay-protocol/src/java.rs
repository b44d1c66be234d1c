//! Java edition packets. Clientbound packets arrive from the server and are
//! dispatched to translators; serverbound packets are what the proxy sends back.

use crate::metadata::MetadataEntry;
use crate::packet::packet_enum;
use crossplay_types::{BlockPos, GameMode, ItemStack, Vec3d};
use uuid::Uuid;

// Clientbound

/// Play-state login; carries the player's own entity id.
#[derive(Debug, Clone, PartialEq)]
pub struct Login {
    pub entity_id: i32,
    pub game_mode: GameMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntity {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub entity_type: i32,
    pub position: Vec3d,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub data: i32,
    pub velocity: Vec3d,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityMetadata {
    pub entity_id: i32,
    pub entries: Vec<MetadataEntry>,
}

/// Relative move; deltas are in 1/4096 of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEntityPosition {
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEntityPositionRotation {
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleportEntity {
    pub entity_id: i32,
    pub position: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Velocity in blocks per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityVelocity {
    pub entity_id: i32,
    pub velocity: Vec3d,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveEntities {
    pub entity_ids: Vec<i32>,
}

/// Chunk column; `data` is the raw paletted section payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkData {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnloadChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockUpdate {
    pub position: BlockPos,
    pub block_state: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynchronizePlayerPosition {
    pub position: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    pub teleport_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenScreen {
    pub window_id: i32,
    pub menu_type: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetContainerContent {
    pub window_id: i32,
    pub state_id: i32,
    pub items: Vec<ItemStack>,
    pub carried: ItemStack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetContainerSlot {
    pub window_id: i32,
    pub state_id: i32,
    pub slot: i16,
    pub item: ItemStack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetContainerProperty {
    pub window_id: i32,
    pub property: i16,
    pub value: i16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseContainer {
    pub window_id: i32,
}

crate::impl_packet!(
    Login,
    SpawnEntity,
    SetEntityMetadata,
    UpdateEntityPosition,
    UpdateEntityPositionRotation,
    TeleportEntity,
    SetEntityVelocity,
    RemoveEntities,
    ChunkData,
    UnloadChunk,
    BlockUpdate,
    SynchronizePlayerPosition,
    OpenScreen,
    SetContainerContent,
    SetContainerSlot,
    SetContainerProperty,
    CloseContainer,
);

// Serverbound

#[derive(Debug, Clone, PartialEq)]
pub struct SetPlayerPositionRotation {
    pub position: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmTeleportation {
    pub teleport_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerboundCloseContainer {
    pub window_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommandAction {
    StartSneaking,
    StopSneaking,
    StartSprinting,
    StopSprinting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
    pub entity_id: i32,
    pub action: PlayerCommandAction,
}

packet_enum! {
    /// Packets the proxy sends to the Java server.
    pub enum JavaPacket {
        SetPlayerPositionRotation,
        ConfirmTeleportation,
        ServerboundCloseContainer,
        PlayerCommand,
    }
}
