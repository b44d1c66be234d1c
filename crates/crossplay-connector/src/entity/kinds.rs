//! Vanilla entity families and their Java metadata handlers.
//!
//! Java indices follow the 1.21 layout. Each family only knows its own
//! indices; everything else resolves through the parent.

use super::components::{CreeperState, TameState};
use super::definition::{EntityKind, KindDefinition};
use super::metadata::{
    as_bool, as_byte, as_float, as_opt_chat, as_opt_uuid, as_pose, as_varint, MetadataTarget,
};
use crate::error::MetadataError;
use crossplay_protocol::metadata::{EntityDataKey, EntityDataValue, EntityFlag, MetadataValue, Pose};

type HandlerResult = Result<(), MetadataError>;

const BABY_SCALE: f32 = 0.55;
const CREEPER_FUSE_TICKS: i32 = 30;

pub(super) fn vanilla() -> Vec<KindDefinition> {
    use EntityKind::*;
    vec![
        KindDefinition::new(Base, 0..=7)
            .handler(0, base_flags)
            .handler(1, air_supply)
            .handler(2, custom_name)
            .handler(3, custom_name_visible)
            .handler(4, silent)
            .handler(5, no_gravity)
            .handler(6, pose),
        KindDefinition::new(Living, 8..=14)
            .parent(Base)
            .handler(8, living_hand_state)
            .handler(9, living_health)
            .handler(10, living_effect_color)
            .handler(11, living_effect_ambient),
        KindDefinition::new(Mob, 15..=15).parent(Living).handler(15, mob_flags),
        KindDefinition::new(Ageable, 16..=16).parent(Mob).handler(16, baby),
        KindDefinition::new(Tameable, 17..=18)
            .parent(Ageable)
            .factory(add_tame_state)
            .handler(17, tameable_flags)
            .handler(18, tameable_owner),
        KindDefinition::new(Wolf, 19..=22)
            .parent(Tameable)
            .java_types(&["wolf"])
            .handler(19, wolf_begging)
            .handler(20, collar_color)
            .handler(21, wolf_anger),
        KindDefinition::new(Cat, 19..=22)
            .parent(Tameable)
            .java_types(&["cat"])
            .handler(19, variant)
            .handler(20, cat_lying)
            .handler(22, collar_color),
        KindDefinition::new(Pig, 17..=18)
            .parent(Ageable)
            .java_types(&["pig"])
            .handler(17, saddled),
        KindDefinition::new(Creeper, 16..=18)
            .parent(Mob)
            .java_types(&["creeper"])
            .factory(add_creeper_state)
            .handler(16, creeper_swell)
            .handler(17, creeper_powered)
            .handler(18, creeper_ignited),
        KindDefinition::new(Zombie, 16..=18)
            .parent(Mob)
            .java_types(&["zombie"])
            .handler(16, baby)
            .handler(18, converting),
        KindDefinition::new(Skeleton, 16..=16)
            .parent(Mob)
            .java_types(&["skeleton"])
            .handler(16, converting),
        KindDefinition::new(Ghast, 16..=16)
            .parent(Mob)
            .java_types(&["ghast"])
            .handler(16, ghast_attacking),
        KindDefinition::new(Slime, 16..=16)
            .parent(Mob)
            .java_types(&["slime"])
            .handler(16, slime_size),
        // Absorption, score, skin parts, main hand and shoulder parrots have
        // no entity data counterpart.
        KindDefinition::new(Player, 15..=20)
            .parent(Living)
            .java_types(&["player"])
            .y_offset(1.62),
        KindDefinition::new(Arrow, 8..=10)
            .parent(Base)
            .java_types(&["arrow"])
            .handler(8, arrow_flags),
        KindDefinition::new(Item, 8..=8).parent(Base).java_types(&["item"]),
    ]
}

fn add_tame_state(builder: &mut hecs::EntityBuilder) {
    builder.add(TameState::default());
}

fn add_creeper_state(builder: &mut hecs::EntityBuilder) {
    builder.add(CreeperState::default());
}

// Base

/// 0x04 (riding) and 0x40 (glowing) have no Bedrock flag and are dropped.
fn base_flags(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let flags = as_byte(value)?;
    let bag = &mut *target.bag;
    bag.set_flag(EntityFlag::OnFire, flags & 0x01 != 0);
    bag.set_flag(EntityFlag::Sneaking, flags & 0x02 != 0);
    bag.set_flag(EntityFlag::Sprinting, flags & 0x08 != 0);
    bag.set_flag(EntityFlag::Swimming, flags & 0x10 != 0);
    bag.set_flag(EntityFlag::Invisible, flags & 0x20 != 0);
    bag.set_flag(EntityFlag::Gliding, flags & 0x80u8 as i8 != 0);
    Ok(())
}

fn air_supply(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let air = as_varint(value)?;
    target.bag.put(
        EntityDataKey::AirSupply,
        EntityDataValue::Short(air.clamp(i16::MIN as i32, i16::MAX as i32) as i16),
    );
    Ok(())
}

fn custom_name(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let name = as_opt_chat(value)?.unwrap_or_default().to_string();
    target.bag.put(EntityDataKey::Nametag, EntityDataValue::String(name));
    Ok(())
}

fn custom_name_visible(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let visible = as_bool(value)?;
    target.bag.put(EntityDataKey::AlwaysShowNametag, EntityDataValue::Byte(visible as i8));
    Ok(())
}

fn silent(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let silent = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Silent, silent);
    Ok(())
}

fn no_gravity(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let no_gravity = as_bool(value)?;
    target.bag.set_flag(EntityFlag::HasGravity, !no_gravity);
    Ok(())
}

fn pose(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let pose = as_pose(value)?;
    target.bag.set_flag(EntityFlag::Gliding, pose == Pose::FallFlying);
    Ok(())
}

// Living

fn living_hand_state(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let state = as_byte(value)?;
    target.bag.set_flag(EntityFlag::UsingItem, state & 0x01 != 0);
    Ok(())
}

fn living_health(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let health = as_float(value)?;
    target
        .bag
        .put(EntityDataKey::Health, EntityDataValue::Int(health.ceil() as i32));
    Ok(())
}

fn living_effect_color(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let color = as_varint(value)?;
    target.bag.put(EntityDataKey::EffectColor, EntityDataValue::Int(color));
    Ok(())
}

fn living_effect_ambient(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let ambient = as_bool(value)?;
    target
        .bag
        .put(EntityDataKey::EffectAmbient, EntityDataValue::Byte(ambient as i8));
    Ok(())
}

fn mob_flags(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let flags = as_byte(value)?;
    target.bag.set_flag(EntityFlag::NoAi, flags & 0x01 != 0);
    Ok(())
}

/// Baby is both a flag and a scale on Bedrock.
fn baby(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let baby = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Baby, baby);
    let scale = if baby { BABY_SCALE } else { 1.0 };
    target.bag.put(EntityDataKey::Scale, EntityDataValue::Float(scale));
    Ok(())
}

// Tameable

/// The collar is only shown once the animal is tamed, whichever of the two
/// properties arrives last.
fn sync_collar(target: &mut MetadataTarget<'_>) {
    if let Some(tame) = target.tame.as_deref() {
        if let (true, Some(color)) = (tame.tamed, tame.collar_color) {
            target.bag.put(EntityDataKey::Color, EntityDataValue::Byte(color));
        }
    }
}

fn tameable_flags(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let flags = as_byte(value)?;
    let tamed = flags & 0x04 != 0;
    target.bag.set_flag(EntityFlag::Sitting, flags & 0x01 != 0);
    target.bag.set_flag(EntityFlag::Tamed, tamed);
    if let Some(tame) = target.tame.as_deref_mut() {
        tame.tamed = tamed;
    }
    sync_collar(target);
    Ok(())
}

fn tameable_owner(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let owner = as_opt_uuid(value)?;
    if let Some(tame) = target.tame.as_deref_mut() {
        tame.owner = owner;
    }
    Ok(())
}

fn collar_color(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let color = as_varint(value)?;
    if let Some(tame) = target.tame.as_deref_mut() {
        tame.collar_color = Some(color as i8);
    }
    sync_collar(target);
    Ok(())
}

fn wolf_begging(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let begging = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Interested, begging);
    Ok(())
}

fn wolf_anger(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let anger_ticks = as_varint(value)?;
    target.bag.set_flag(EntityFlag::Angry, anger_ticks > 0);
    Ok(())
}

fn variant(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let variant = as_varint(value)?;
    target.bag.put(EntityDataKey::Variant, EntityDataValue::Int(variant));
    Ok(())
}

fn cat_lying(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let lying = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Resting, lying);
    Ok(())
}

fn saddled(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let saddled = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Saddled, saddled);
    Ok(())
}

// Monsters

fn sync_ignited(target: &mut MetadataTarget<'_>) {
    if let Some(creeper) = target.creeper.as_deref() {
        let ignited = creeper.swelling || creeper.ignited;
        target.bag.set_flag(EntityFlag::Ignited, ignited);
    }
}

/// Swell direction: 1 while the fuse is burning, -1 otherwise.
fn creeper_swell(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let swelling = as_varint(value)? == 1;
    if let Some(creeper) = target.creeper.as_deref_mut() {
        creeper.swelling = swelling;
    }
    if swelling {
        target
            .bag
            .put(EntityDataKey::FuseLength, EntityDataValue::Int(CREEPER_FUSE_TICKS));
    }
    sync_ignited(target);
    Ok(())
}

fn creeper_powered(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let powered = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Powered, powered);
    Ok(())
}

fn creeper_ignited(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let ignited = as_bool(value)?;
    if let Some(creeper) = target.creeper.as_deref_mut() {
        creeper.ignited = ignited;
    }
    sync_ignited(target);
    Ok(())
}

fn converting(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let converting = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Converting, converting);
    Ok(())
}

fn ghast_attacking(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let attacking = as_bool(value)?;
    target.bag.set_flag(EntityFlag::Charged, attacking);
    Ok(())
}

fn slime_size(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let size = as_varint(value)?.max(1) as f32;
    let dimensions = *target.dimensions;
    target.bag.put(EntityDataKey::Scale, EntityDataValue::Float(0.10 + size));
    target.bag.put(
        EntityDataKey::BoundingBoxWidth,
        EntityDataValue::Float(dimensions.width * size),
    );
    target.bag.put(
        EntityDataKey::BoundingBoxHeight,
        EntityDataValue::Float(dimensions.height * size),
    );
    Ok(())
}

fn arrow_flags(target: &mut MetadataTarget<'_>, value: &MetadataValue) -> HandlerResult {
    let flags = as_byte(value)?;
    target.bag.set_flag(EntityFlag::Critical, flags & 0x01 != 0);
    Ok(())
}
