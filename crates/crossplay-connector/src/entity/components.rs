use super::EntityKind;
use crossplay_types::Vec3d;
use uuid::Uuid;

/// Identity of an entity on both sides of the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityIds {
    pub java_id: i32,
    pub runtime_id: u64,
    pub uuid: Uuid,
}

/// Behavior family, fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kind(pub EntityKind);

/// Current position in Java coordinates (feet).
pub struct Position(pub Vec3d);

pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
}

/// Velocity in blocks per tick.
pub struct Motion(pub Vec3d);

pub struct OnGround(pub bool);

/// Base hitbox from the entity data tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

/// Tameable state that the collar color depends on.
#[derive(Debug, Default)]
pub struct TameState {
    pub tamed: bool,
    pub collar_color: Option<i8>,
    pub owner: Option<Uuid>,
}

/// Creepers ignite from two independent sources.
#[derive(Debug, Default)]
pub struct CreeperState {
    pub swelling: bool,
    pub ignited: bool,
}

/// Marks the entity controlled by this session's client.
pub struct LocalPlayer;
