use super::{ClientContainer, ClientSlot, InventoryTranslator};
use crossplay_protocol::bedrock::ContainerType;

/// Bedrock UI slot of every crafting result.
const CRAFTING_OUTPUT: u32 = 50;
const CRAFTING_GRID_START: u32 = 32;

pub struct DispenserTranslator;

impl InventoryTranslator for DispenserTranslator {
    fn container_type(&self) -> ContainerType {
        ContainerType::Dispenser
    }

    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot> {
        Some(ClientSlot::new(ClientContainer::Open, slot as u32))
    }

    fn holder_block(&self) -> Option<&'static str> {
        Some("minecraft:dispenser")
    }
}

pub struct HopperTranslator;

impl InventoryTranslator for HopperTranslator {
    fn container_type(&self) -> ContainerType {
        ContainerType::Hopper
    }

    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot> {
        Some(ClientSlot::new(ClientContainer::Open, slot as u32))
    }

    fn holder_block(&self) -> Option<&'static str> {
        Some("minecraft:hopper")
    }
}

/// Crafting table: Java result slot 0, then the 3x3 grid.
pub struct CraftingTranslator;

impl InventoryTranslator for CraftingTranslator {
    fn container_type(&self) -> ContainerType {
        ContainerType::Workbench
    }

    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot> {
        match slot {
            0 => Some(ClientSlot::new(ClientContainer::Ui, CRAFTING_OUTPUT)),
            1..=9 => Some(ClientSlot::new(ClientContainer::Ui, CRAFTING_GRID_START + slot as u32 - 1)),
            _ => None,
        }
    }

    fn holder_block(&self) -> Option<&'static str> {
        Some("minecraft:crafting_table")
    }
}
