use super::{ClientContainer, ClientSlot, ContainerContext, Inventory, InventoryTranslator, PLAYER_WINDOW_ID};
use crossplay_protocol::bedrock::{BedrockPacket, ContainerOpen, ContainerType};

/// Java window 0: crafting grid, armor, main inventory, hotbar and offhand.
pub struct PlayerInventoryTranslator;

impl InventoryTranslator for PlayerInventoryTranslator {
    fn container_type(&self) -> ContainerType {
        ContainerType::Inventory
    }

    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot> {
        let target = match slot {
            0 => ClientSlot::new(ClientContainer::Ui, 50),
            1..=4 => ClientSlot::new(ClientContainer::Ui, 28 + slot as u32 - 1),
            5..=8 => ClientSlot::new(ClientContainer::Armor, slot as u32 - 5),
            9..=35 => ClientSlot::new(ClientContainer::Inventory, slot as u32),
            36..=44 => ClientSlot::new(ClientContainer::Inventory, slot as u32 - 36),
            45 => ClientSlot::new(ClientContainer::Offhand, 0),
            _ => return None,
        };
        Some(target)
    }

    /// The client opens its own inventory; the window hangs off the player.
    fn open(&self, _inventory: &Inventory, ctx: &ContainerContext<'_>) -> Vec<BedrockPacket> {
        vec![ContainerOpen {
            window_id: PLAYER_WINDOW_ID as u8,
            container_type: ContainerType::Inventory,
            position: ctx.player_position.block_pos(),
            unique_id: ctx.player_unique_id,
        }
        .into()]
    }
}
