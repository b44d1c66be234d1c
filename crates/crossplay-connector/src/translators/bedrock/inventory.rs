use crate::inventory::PLAYER_WINDOW_ID;
use crate::session::Session;
use crossplay_protocol::bedrock::{ContainerClose, ContainerCloseClientbound, Interact, InteractAction};
use crossplay_protocol::java::ServerboundCloseContainer;

/// The client closed a window: tell the server and clean up fake blocks.
pub(super) fn translate_container_close(session: &mut Session, packet: &ContainerClose) -> anyhow::Result<()> {
    let window_id = packet.window_id as i32;
    let known = window_id == PLAYER_WINDOW_ID || session.inventory_of(window_id).is_some();
    if known {
        session.send_downstream_packet(ServerboundCloseContainer { window_id });
        session.close_inventory(window_id, false);
    }
    session.send_upstream_packet(ContainerCloseClientbound {
        window_id: packet.window_id as u8,
        server_initiated: false,
    });
    Ok(())
}

pub(super) fn translate_interact(session: &mut Session, packet: &Interact) -> anyhow::Result<()> {
    if packet.action == InteractAction::OpenInventory {
        session.open_player_inventory();
    }
    Ok(())
}
