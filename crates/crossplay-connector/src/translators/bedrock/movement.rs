use crate::collision::PLAYER_EYE_HEIGHT;
use crate::entity::PLAYER_RUNTIME_ID;
use crate::session::Session;
use crossplay_protocol::bedrock::{MoveMode, MovePlayer, SetEntityData};
use crossplay_protocol::java::SetPlayerPositionRotation;
use crossplay_protocol::metadata::EntityFlag;
use tracing::debug;

/// Client movement. Corrected against cached blocks before it reaches the
/// server; rejected moves snap the client back instead.
pub(super) fn translate_move_player(session: &mut Session, packet: &MovePlayer) -> anyhow::Result<()> {
    if packet.runtime_id != PLAYER_RUNTIME_ID {
        return Ok(());
    }
    let Some(position) = session.adjust_player_position(packet.position, packet.on_ground) else {
        debug!("Rejected movement to {:?}", packet.position);
        recalculate_position(session, packet);
        return Ok(());
    };

    update_scaffolding_flags(session);
    session.set_player_position(position);
    session.send_downstream_packet(SetPlayerPositionRotation {
        position,
        yaw: packet.yaw,
        pitch: packet.pitch,
        on_ground: packet.on_ground,
    });
    Ok(())
}

fn update_scaffolding_flags(session: &mut Session) {
    let contact = session.collision_manager().scaffolding();
    let descending = (contact.touching || contact.on) && session.is_sneaking();
    session.set_player_flag(EntityFlag::InScaffolding, contact.touching);
    session.set_player_flag(EntityFlag::OverScaffolding, descending);
    session.set_player_flag(EntityFlag::FallThroughScaffolding, descending);
}

/// Resends the player's full metadata and the last accepted position.
fn recalculate_position(session: &mut Session, packet: &MovePlayer) {
    let tick = session.ticks();
    let player = session.entity_cache().player();
    let metadata = session
        .entity_cache_mut()
        .metadata_mut(player)
        .map(|mut bag| bag.snapshot())
        .unwrap_or_default();
    session.send_upstream_packet(SetEntityData {
        runtime_id: PLAYER_RUNTIME_ID,
        metadata,
        tick,
    });

    let accepted = session.collision_manager().player_box().bottom_center();
    session.send_upstream_packet(MovePlayer {
        runtime_id: PLAYER_RUNTIME_ID,
        position: accepted.add(0.0, PLAYER_EYE_HEIGHT, 0.0).to_f32(),
        pitch: packet.pitch,
        yaw: packet.yaw,
        head_yaw: packet.head_yaw,
        mode: MoveMode::Reset,
        on_ground: true,
    });
}
