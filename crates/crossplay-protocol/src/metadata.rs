//! Entity metadata value types for both editions.

use crossplay_types::{BlockPos, ItemStack, Vec3f};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Java entity pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Standing,
    FallFlying,
    Sleeping,
    Swimming,
    SpinAttack,
    Crouching,
    LongJumping,
    Dying,
}

/// A typed value from a Java entity metadata entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Byte(i8),
    VarInt(i32),
    VarLong(i64),
    Float(f32),
    String(String),
    OptChat(Option<String>),
    Slot(ItemStack),
    Boolean(bool),
    Rotation(Vec3f),
    BlockPos(BlockPos),
    OptBlockPos(Option<BlockPos>),
    OptUuid(Option<Uuid>),
    BlockState(i32),
    Pose(Pose),
}

impl MetadataValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            MetadataValue::Byte(_) => "byte",
            MetadataValue::VarInt(_) => "varint",
            MetadataValue::VarLong(_) => "varlong",
            MetadataValue::Float(_) => "float",
            MetadataValue::String(_) => "string",
            MetadataValue::OptChat(_) => "optional chat",
            MetadataValue::Slot(_) => "slot",
            MetadataValue::Boolean(_) => "boolean",
            MetadataValue::Rotation(_) => "rotation",
            MetadataValue::BlockPos(_) => "block pos",
            MetadataValue::OptBlockPos(_) => "optional block pos",
            MetadataValue::OptUuid(_) => "optional uuid",
            MetadataValue::BlockState(_) => "block state",
            MetadataValue::Pose(_) => "pose",
        }
    }
}

/// One entry of a Java metadata packet.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub index: u8,
    pub value: MetadataValue,
}

impl MetadataEntry {
    pub fn new(index: u8, value: MetadataValue) -> Self {
        Self { index, value }
    }
}

/// Bedrock entity data keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum EntityDataKey {
    Flags = 0,
    Health = 1,
    Variant = 2,
    Color = 3,
    Nametag = 4,
    OwnerEid = 5,
    TargetEid = 6,
    AirSupply = 7,
    EffectColor = 8,
    EffectAmbient = 9,
    HurtTime = 11,
    HurtDirection = 12,
    Scale = 38,
    MaxAirSupply = 42,
    BoundingBoxWidth = 53,
    BoundingBoxHeight = 54,
    FuseLength = 55,
    AlwaysShowNametag = 81,
    Flags2 = 92,
}

impl EntityDataKey {
    pub fn id(self) -> u32 {
        self as u32
    }
}

/// Bedrock entity flags, as bit indices into the two flag words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntityFlag {
    OnFire = 0,
    Sneaking = 1,
    Sprinting = 3,
    UsingItem = 4,
    Invisible = 5,
    Saddled = 8,
    Powered = 9,
    Ignited = 10,
    Baby = 11,
    Converting = 12,
    Critical = 13,
    CanShowName = 14,
    NoAi = 16,
    Silent = 17,
    Resting = 23,
    Sitting = 24,
    Angry = 25,
    Interested = 26,
    Charged = 27,
    Tamed = 28,
    Gliding = 32,
    HasCollision = 47,
    HasGravity = 48,
    Swimming = 56,
    InScaffolding = 68,
    OverScaffolding = 69,
    FallThroughScaffolding = 70,
}

impl EntityFlag {
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Flags at index 64 and above live in the second flag word.
    pub fn data_key(self) -> EntityDataKey {
        if self.bit() < 64 {
            EntityDataKey::Flags
        } else {
            EntityDataKey::Flags2
        }
    }

    pub fn mask(self) -> i64 {
        1i64 << (self.bit() % 64)
    }
}

/// A typed Bedrock entity data value.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDataValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    String(String),
    Long(i64),
    Vec3f(Vec3f),
}

/// Ordered entity data, as carried by spawn and update packets.
pub type EntityDataMap = BTreeMap<EntityDataKey, EntityDataValue>;
