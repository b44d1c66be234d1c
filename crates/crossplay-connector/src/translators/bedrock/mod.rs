mod action;
mod inventory;
mod movement;

use crate::error::RegistrationError;
use crate::registry::TranslatorRegistry;
use crossplay_protocol::bedrock::{ContainerClose, Interact, MovePlayer, PlayerAction};

pub(crate) fn register(registry: &mut TranslatorRegistry) -> Result<(), RegistrationError> {
    registry.register::<MovePlayer, _>(movement::translate_move_player)?;
    registry.register::<PlayerAction, _>(action::translate_player_action)?;
    registry.register::<ContainerClose, _>(inventory::translate_container_close)?;
    registry.register::<Interact, _>(inventory::translate_interact)?;
    Ok(())
}
