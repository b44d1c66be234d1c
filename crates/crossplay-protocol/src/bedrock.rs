//! Bedrock edition packets. Serverbound packets arrive from the client and are
//! dispatched to translators; clientbound packets are emitted to the client.

use crate::metadata::EntityDataMap;
use crate::packet::packet_enum;
use crossplay_types::{BlockPos, Vec3f};

/// Bedrock item stack as sent in inventory packets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemData {
    pub id: i32,
    pub count: u16,
    pub damage: u16,
    pub custom_name: Option<String>,
    pub repair_cost: Option<i32>,
}

impl ItemData {
    pub const AIR: ItemData = ItemData {
        id: 0,
        count: 0,
        damage: 0,
        custom_name: None,
        repair_cost: None,
    };

    pub fn is_air(&self) -> bool {
        self.id == 0 || self.count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    Normal,
    Reset,
    Teleport,
    Rotation,
}

/// Player movement. Sent by the client every tick and by the proxy to correct it.
/// `position` is at eye height.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlayer {
    pub runtime_id: u64,
    pub position: Vec3f,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub mode: MoveMode,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerActionType {
    StartSneak,
    StopSneak,
    StartSprint,
    StopSprint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAction {
    pub runtime_id: u64,
    pub action: PlayerActionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerClose {
    pub window_id: i8,
    pub server_initiated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    OpenInventory,
    MouseOverEntity,
    LeaveVehicle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interact {
    pub action: InteractAction,
    pub target_runtime_id: u64,
}

crate::impl_packet!(MovePlayer, PlayerAction, ContainerClose, Interact);

#[derive(Debug, Clone, PartialEq)]
pub struct AddEntity {
    pub unique_id: i64,
    pub runtime_id: u64,
    pub identifier: String,
    pub position: Vec3f,
    pub motion: Vec3f,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub metadata: EntityDataMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityData {
    pub runtime_id: u64,
    pub metadata: EntityDataMap,
    pub tick: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntityAbsolute {
    pub runtime_id: u64,
    pub position: Vec3f,
    /// (pitch, yaw, head yaw)
    pub rotation: Vec3f,
    pub on_ground: bool,
    pub teleported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityMotion {
    pub runtime_id: u64,
    pub motion: Vec3f,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveEntity {
    pub unique_id: i64,
}

/// One 16x16x16 sub-chunk in Bedrock runtime ids.
/// `indices` is in XZY order: `(x << 8) | (z << 4) | y`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubChunk {
    pub y_index: i8,
    pub palette: Vec<u32>,
    pub indices: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub sub_chunks: Vec<SubChunk>,
}

pub mod update_block_flags {
    pub const NEIGHBORS: u8 = 0x01;
    pub const NETWORK: u8 = 0x02;
    pub const PRIORITY: u8 = 0x08;
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBlock {
    pub position: BlockPos,
    pub runtime_id: u32,
    pub flags: u8,
    pub layer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    Inventory,
    Container,
    Workbench,
    Dispenser,
    Hopper,
    Anvil,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerOpen {
    pub window_id: u8,
    pub container_type: ContainerType,
    pub position: BlockPos,
    pub unique_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerCloseClientbound {
    pub window_id: u8,
    pub server_initiated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryContent {
    pub window_id: u32,
    pub items: Vec<ItemData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventorySlot {
    pub window_id: u32,
    pub slot: u32,
    pub item: ItemData,
}

/// Block entity data needed to pair two chests into a double chest.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntityData {
    pub position: BlockPos,
    pub pair_x: i32,
    pub pair_z: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetPlayerGameType {
    pub game_mode: i32,
}

packet_enum! {
    /// Packets the proxy sends to the Bedrock client.
    pub enum BedrockPacket {
        AddEntity,
        SetEntityData,
        MoveEntityAbsolute,
        MovePlayer,
        SetEntityMotion,
        RemoveEntity,
        LevelChunk,
        UpdateBlock,
        ContainerOpen,
        ContainerCloseClientbound,
        InventoryContent,
        InventorySlot,
        BlockEntityData,
        SetPlayerGameType,
    }
}

/// Well-known Bedrock container ids.
pub mod container_id {
    pub const INVENTORY: u32 = 0;
    pub const OFFHAND: u32 = 119;
    pub const ARMOR: u32 = 120;
    pub const UI: u32 = 124;
}
