use crate::entity::components::{Dimensions, EntityIds, Kind, Motion, OnGround, Position, Rotation};
use crate::entity::SpawnInfo;
use crate::session::Session;
use crossplay_protocol::bedrock::{AddEntity, MoveEntityAbsolute, RemoveEntity, SetEntityMotion};
use crossplay_protocol::java::{
    RemoveEntities, SetEntityMetadata, SetEntityVelocity, SpawnEntity, TeleportEntity, UpdateEntityPosition,
    UpdateEntityPositionRotation,
};
use crossplay_types::{Vec3d, Vec3f};
use tracing::{debug, warn};

/// Relative moves are in 1/4096 of a block.
const DELTA_SCALE: f64 = 4096.0;

const DEFAULT_DIMENSIONS: (f32, f32) = (0.6, 1.8);

pub(super) fn translate_spawn(session: &mut Session, packet: &SpawnEntity) -> anyhow::Result<()> {
    let Some(name) = crossplay_data::java_entity_name(packet.entity_type) else {
        warn!("Unknown Java entity type {}", packet.entity_type);
        return Ok(());
    };
    let registry = session.entity_registry();
    let Some(kind) = registry.kind_for_java_type(name) else {
        warn!("No entity kind handles {}", name);
        return Ok(());
    };
    let Some(identifier) = crossplay_data::bedrock_entity_identifier(name) else {
        warn!("No Bedrock identifier for {}", name);
        return Ok(());
    };
    let (width, height) = crossplay_data::java_entity_dimensions(packet.entity_type).unwrap_or(DEFAULT_DIMENSIONS);

    let cache = session.entity_cache_mut();
    let spawned = cache.spawn(
        &registry,
        SpawnInfo {
            java_id: packet.entity_id,
            uuid: packet.uuid,
            kind,
            dimensions: Dimensions { width, height },
            position: packet.position,
            motion: packet.velocity,
            yaw: packet.yaw,
            pitch: packet.pitch,
            head_yaw: packet.head_yaw,
        },
    );
    let metadata = cache
        .metadata_mut(spawned.entity)
        .map(|mut bag| bag.snapshot())
        .unwrap_or_default();
    let runtime_id = spawned.runtime_id;

    if let Some(old) = spawned.replaced {
        session.send_upstream_packet(RemoveEntity { unique_id: old as i64 });
    }

    let y_offset = registry.y_offset(kind) as f64;
    session.send_upstream_packet(AddEntity {
        unique_id: runtime_id as i64,
        runtime_id,
        identifier: identifier.to_string(),
        position: packet.position.add(0.0, y_offset, 0.0).to_f32(),
        motion: packet.velocity.to_f32(),
        pitch: packet.pitch,
        yaw: packet.yaw,
        head_yaw: packet.head_yaw,
        metadata,
    });
    Ok(())
}

/// Metadata lands in the entity's bag; the tick flush sends it.
pub(super) fn translate_metadata(session: &mut Session, packet: &SetEntityMetadata) -> anyhow::Result<()> {
    let registry = session.entity_registry();
    if !session
        .entity_cache_mut()
        .apply_metadata(&registry, packet.entity_id, &packet.entries)
    {
        debug!("Metadata for untracked entity {}", packet.entity_id);
    }
    Ok(())
}

/// Applies `update` to a tracked entity and tells the client where it is now.
fn move_entity(
    session: &mut Session,
    java_id: i32,
    teleported: bool,
    update: impl FnOnce(&mut Vec3d, &mut Rotation, &mut bool),
) {
    let registry = session.entity_registry();
    let cache = session.entity_cache_mut();
    let Some(entity) = cache.get(java_id) else {
        return;
    };
    if entity == cache.player() {
        return;
    }
    let Ok((ids, kind, position, rotation, on_ground)) = cache
        .world_mut()
        .query_one_mut::<(&EntityIds, &Kind, &mut Position, &mut Rotation, &mut OnGround)>(entity)
    else {
        return;
    };
    update(&mut position.0, rotation, &mut on_ground.0);

    let y_offset = registry.y_offset(kind.0) as f64;
    let packet = MoveEntityAbsolute {
        runtime_id: ids.runtime_id,
        position: position.0.add(0.0, y_offset, 0.0).to_f32(),
        rotation: Vec3f::new(rotation.pitch, rotation.yaw, rotation.head_yaw),
        on_ground: on_ground.0,
        teleported,
    };
    session.send_upstream_packet(packet);
}

fn apply_delta(position: &mut Vec3d, dx: i16, dy: i16, dz: i16) {
    *position = position.add(dx as f64 / DELTA_SCALE, dy as f64 / DELTA_SCALE, dz as f64 / DELTA_SCALE);
}

pub(super) fn translate_move(session: &mut Session, packet: &UpdateEntityPosition) -> anyhow::Result<()> {
    move_entity(session, packet.entity_id, false, |position, _, on_ground| {
        apply_delta(position, packet.delta_x, packet.delta_y, packet.delta_z);
        *on_ground = packet.on_ground;
    });
    Ok(())
}

pub(super) fn translate_move_rotate(
    session: &mut Session,
    packet: &UpdateEntityPositionRotation,
) -> anyhow::Result<()> {
    move_entity(session, packet.entity_id, false, |position, rotation, on_ground| {
        apply_delta(position, packet.delta_x, packet.delta_y, packet.delta_z);
        rotation.yaw = packet.yaw;
        rotation.pitch = packet.pitch;
        rotation.head_yaw = packet.yaw;
        *on_ground = packet.on_ground;
    });
    Ok(())
}

pub(super) fn translate_teleport(session: &mut Session, packet: &TeleportEntity) -> anyhow::Result<()> {
    move_entity(session, packet.entity_id, true, |position, rotation, on_ground| {
        *position = packet.position;
        rotation.yaw = packet.yaw;
        rotation.pitch = packet.pitch;
        *on_ground = packet.on_ground;
    });
    Ok(())
}

pub(super) fn translate_velocity(session: &mut Session, packet: &SetEntityVelocity) -> anyhow::Result<()> {
    let cache = session.entity_cache_mut();
    let Some(entity) = cache.get(packet.entity_id) else {
        return Ok(());
    };
    let Ok((ids, motion)) = cache
        .world_mut()
        .query_one_mut::<(&EntityIds, &mut Motion)>(entity)
    else {
        return Ok(());
    };
    motion.0 = packet.velocity;
    let packet = SetEntityMotion {
        runtime_id: ids.runtime_id,
        motion: packet.velocity.to_f32(),
    };
    session.send_upstream_packet(packet);
    Ok(())
}

pub(super) fn translate_remove(session: &mut Session, packet: &RemoveEntities) -> anyhow::Result<()> {
    for &java_id in &packet.entity_ids {
        if let Some(runtime_id) = session.entity_cache_mut().remove(java_id) {
            session.send_upstream_packet(RemoveEntity {
                unique_id: runtime_id as i64,
            });
        }
    }
    Ok(())
}
