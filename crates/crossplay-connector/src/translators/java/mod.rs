mod entity;
mod inventory;
mod player;
mod world;

use crate::error::RegistrationError;
use crate::registry::TranslatorRegistry;
use crossplay_protocol::java::*;

pub(crate) fn register(registry: &mut TranslatorRegistry) -> Result<(), RegistrationError> {
    registry.register::<Login, _>(player::translate_login)?;
    registry.register::<SynchronizePlayerPosition, _>(player::translate_synchronize_position)?;

    registry.register::<SpawnEntity, _>(entity::translate_spawn)?;
    registry.register::<SetEntityMetadata, _>(entity::translate_metadata)?;
    registry.register::<UpdateEntityPosition, _>(entity::translate_move)?;
    registry.register::<UpdateEntityPositionRotation, _>(entity::translate_move_rotate)?;
    registry.register::<TeleportEntity, _>(entity::translate_teleport)?;
    registry.register::<SetEntityVelocity, _>(entity::translate_velocity)?;
    registry.register::<RemoveEntities, _>(entity::translate_remove)?;

    registry.register::<ChunkData, _>(world::translate_chunk)?;
    registry.register::<UnloadChunk, _>(world::translate_unload)?;
    registry.register::<BlockUpdate, _>(world::translate_block_update)?;

    registry.register::<OpenScreen, _>(inventory::translate_open_screen)?;
    registry.register::<SetContainerContent, _>(inventory::translate_content)?;
    registry.register::<SetContainerSlot, _>(inventory::translate_slot)?;
    registry.register::<SetContainerProperty, _>(inventory::translate_property)?;
    registry.register::<CloseContainer, _>(inventory::translate_close)?;
    Ok(())
}
