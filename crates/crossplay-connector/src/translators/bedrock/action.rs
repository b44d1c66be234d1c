use crate::session::Session;
use crossplay_protocol::bedrock::{PlayerAction, PlayerActionType};
use crossplay_protocol::java::{PlayerCommand, PlayerCommandAction};
use crossplay_protocol::metadata::EntityFlag;

pub(super) fn translate_player_action(session: &mut Session, packet: &PlayerAction) -> anyhow::Result<()> {
    let action = match packet.action {
        PlayerActionType::StartSneak => {
            session.set_sneaking(true);
            PlayerCommandAction::StartSneaking
        }
        PlayerActionType::StopSneak => {
            session.set_sneaking(false);
            PlayerCommandAction::StopSneaking
        }
        PlayerActionType::StartSprint => {
            session.set_player_flag(EntityFlag::Sprinting, true);
            PlayerCommandAction::StartSprinting
        }
        PlayerActionType::StopSprint => {
            session.set_player_flag(EntityFlag::Sprinting, false);
            PlayerCommandAction::StopSprinting
        }
    };
    let entity_id = session.player_java_id();
    session.send_downstream_packet(PlayerCommand { entity_id, action });
    Ok(())
}
