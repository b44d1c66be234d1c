use super::{to_bedrock_item, ClientContainer, ClientSlot, Inventory, InventoryTranslator};
use crossplay_protocol::bedrock::{ContainerType, ItemData};

const INPUT: usize = 0;
const MATERIAL: usize = 1;
const RESULT: usize = 2;

/// Java window property carrying the repair cost.
pub const REPAIR_COST_PROPERTY: i16 = 0;

/// Anvil: input, material and result. The client shows the repair cost on
/// whichever input is last occupied, so the two inputs refresh together.
pub struct AnvilTranslator;

impl AnvilTranslator {
    /// Slot the repair cost is rendered on.
    pub fn cost_slot(inventory: &Inventory) -> usize {
        if inventory.item(MATERIAL).is_empty() {
            INPUT
        } else {
            MATERIAL
        }
    }
}

impl InventoryTranslator for AnvilTranslator {
    fn container_type(&self) -> ContainerType {
        ContainerType::Anvil
    }

    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot> {
        let ui_slot = match slot {
            INPUT => 1,
            MATERIAL => 2,
            RESULT => 50,
            _ => return None,
        };
        Some(ClientSlot::new(ClientContainer::Ui, ui_slot))
    }

    fn dependent_slot(&self, _inventory: &Inventory, slot: usize) -> Option<usize> {
        match slot {
            INPUT => Some(MATERIAL),
            MATERIAL => Some(INPUT),
            _ => None,
        }
    }

    fn client_item(&self, inventory: &Inventory, slot: usize) -> ItemData {
        let mut item = to_bedrock_item(inventory.item(slot));
        if slot == Self::cost_slot(inventory) && !item.is_air() {
            item.repair_cost = inventory.properties.get(&REPAIR_COST_PROPERTY).map(|&cost| cost as i32);
        }
        item
    }

    fn holder_block(&self) -> Option<&'static str> {
        Some("minecraft:anvil")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ContainerKind;
    use crossplay_protocol::bedrock::BedrockPacket;
    use crossplay_types::ItemStack;

    fn slot_items(packets: &[BedrockPacket]) -> Vec<(u32, ItemData)> {
        packets
            .iter()
            .filter_map(|p| match p {
                BedrockPacket::InventorySlot(s) => Some((s.slot, s.item.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cost_moves_to_material_and_both_inputs_refresh() {
        let mut inventory = Inventory::new(3, ContainerKind::Anvil, "Repair");
        inventory.properties.insert(REPAIR_COST_PROPERTY, 5);
        inventory.set_item(INPUT, ItemStack::new(820, 1));

        let packets = AnvilTranslator.update_slot(&inventory, INPUT);
        let items = slot_items(&packets);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0, 1);
        assert_eq!(items[0].1.repair_cost, Some(5));

        inventory.set_item(MATERIAL, ItemStack::new(848, 1));
        let items = slot_items(&AnvilTranslator.update_slot(&inventory, MATERIAL));
        assert_eq!(items.len(), 2);
        let (material_slot, material) = &items[0];
        assert_eq!(*material_slot, 2);
        assert_eq!(material.repair_cost, Some(5));
        let (input_slot, input) = &items[1];
        assert_eq!(*input_slot, 1);
        assert_eq!(input.repair_cost, None);
    }

    #[test]
    fn test_result_has_no_dependent() {
        let inventory = Inventory::new(3, ContainerKind::Anvil, "");
        assert_eq!(AnvilTranslator.dependent_slot(&inventory, RESULT), None);
        assert_eq!(AnvilTranslator.update_slot(&inventory, RESULT).len(), 1);
    }
}
