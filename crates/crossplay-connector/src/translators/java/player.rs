use crate::collision::PLAYER_EYE_HEIGHT;
use crate::entity::PLAYER_RUNTIME_ID;
use crate::session::Session;
use crossplay_protocol::bedrock::{MoveMode, MovePlayer, SetPlayerGameType};
use crossplay_protocol::java::{ConfirmTeleportation, Login, SynchronizePlayerPosition};
use tracing::debug;

pub(super) fn translate_login(session: &mut Session, packet: &Login) -> anyhow::Result<()> {
    debug!("Session {} is Java entity {}", session.id(), packet.entity_id);
    session.entity_cache_mut().bind_player(packet.entity_id);
    session.set_game_mode(packet.game_mode);
    session.send_upstream_packet(SetPlayerGameType {
        game_mode: packet.game_mode.id() as i32,
    });
    Ok(())
}

/// The server moved the player: teleport the client and confirm.
pub(super) fn translate_synchronize_position(
    session: &mut Session,
    packet: &SynchronizePlayerPosition,
) -> anyhow::Result<()> {
    session.collision_manager_mut().update_player_box(packet.position);
    session.set_player_position(packet.position);
    session.send_upstream_packet(MovePlayer {
        runtime_id: PLAYER_RUNTIME_ID,
        position: packet.position.add(0.0, PLAYER_EYE_HEIGHT, 0.0).to_f32(),
        pitch: packet.pitch,
        yaw: packet.yaw,
        head_yaw: packet.yaw,
        mode: MoveMode::Teleport,
        on_ground: false,
    });
    session.send_downstream_packet(ConfirmTeleportation {
        teleport_id: packet.teleport_id,
    });
    Ok(())
}
