use super::{
    fake_block, holder_position, ClientContainer, ClientSlot, ContainerContext, Inventory, InventoryTranslator,
};
use crossplay_protocol::bedrock::{BedrockPacket, BlockEntityData, ContainerType};

const SINGLE_CHEST_SIZE: usize = 27;
const DOUBLE_CHEST_SIZE: usize = 54;
/// The client needs the paired chest in place before the window opens.
const DOUBLE_CHEST_OPEN_DELAY: u64 = 4;

/// Generic 9xN containers, shown as a single or double chest.
pub struct ChestTranslator;

fn is_double(inventory: &Inventory) -> bool {
    inventory.size() > SINGLE_CHEST_SIZE
}

impl InventoryTranslator for ChestTranslator {
    fn container_type(&self) -> ContainerType {
        ContainerType::Container
    }

    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot> {
        Some(ClientSlot::new(ClientContainer::Open, slot as u32))
    }

    fn padded_size(&self, size: usize) -> usize {
        if size <= SINGLE_CHEST_SIZE {
            SINGLE_CHEST_SIZE
        } else {
            DOUBLE_CHEST_SIZE
        }
    }

    fn holder_block(&self) -> Option<&'static str> {
        Some("minecraft:chest")
    }

    fn open_delay(&self, inventory: &Inventory) -> u64 {
        if is_double(inventory) {
            DOUBLE_CHEST_OPEN_DELAY
        } else {
            0
        }
    }

    fn prepare(&self, inventory: &mut Inventory, ctx: &ContainerContext<'_>) -> Vec<BedrockPacket> {
        let pos = holder_position(ctx.player_position);
        if !is_double(inventory) {
            inventory.holders = vec![pos];
            return fake_block(ctx.registry, "minecraft:chest", pos).into_iter().collect();
        }

        let pair = pos.offset(1, 0, 0);
        inventory.holders = vec![pos, pair];
        let mut packets: Vec<BedrockPacket> = [pos, pair]
            .into_iter()
            .filter_map(|p| fake_block(ctx.registry, "minecraft:chest", p))
            .collect();
        packets.push(
            BlockEntityData {
                position: pos,
                pair_x: pair.x,
                pair_z: pair.z,
            }
            .into(),
        );
        packets.push(
            BlockEntityData {
                position: pair,
                pair_x: pos.x,
                pair_z: pos.z,
            }
            .into(),
        );
        packets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{placeholder_item, ContainerKind};
    use crossplay_data::MappingData;
    use crossplay_protocol::bedrock::{ContainerOpen, InventoryContent, UpdateBlock};
    use crossplay_types::{BlockPos, ItemStack, Vec3d};
    use crossplay_world::BlockRegistry;
    use std::collections::HashMap;

    fn open_content(packets: &[BedrockPacket], window_id: u32) -> &InventoryContent {
        packets
            .iter()
            .find_map(|p| match p {
                BedrockPacket::InventoryContent(c) if c.window_id == window_id => Some(c),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_full_single_chest_has_no_padding() {
        let mut inventory = Inventory::new(4, ContainerKind::Chest { rows: 3 }, "Chest");
        inventory.set_item(26, ItemStack::new(1, 64));
        let packets = ChestTranslator.update_inventory(&inventory);
        let content = open_content(&packets, 4);
        assert_eq!(content.items.len(), 27);
        assert_eq!(content.items[26].id, 1);
        assert!(content.items.iter().all(|i| *i != placeholder_item()));
    }

    #[test]
    fn test_small_chest_is_padded_with_placeholders() {
        let inventory = Inventory::new(4, ContainerKind::Chest { rows: 1 }, "Barrel");
        let packets = ChestTranslator.update_inventory(&inventory);
        let content = open_content(&packets, 4);
        assert_eq!(content.items.len(), 27);
        for (slot, item) in content.items.iter().enumerate() {
            if slot < 9 {
                assert!(item.is_air());
            } else {
                assert_eq!(*item, placeholder_item());
            }
        }
    }

    #[test]
    fn test_four_rows_pad_to_double_chest() {
        let inventory = Inventory::new(4, ContainerKind::Chest { rows: 4 }, "");
        let packets = ChestTranslator.update_inventory(&inventory);
        let content = open_content(&packets, 4);
        assert_eq!(content.items.len(), 54);
        assert_eq!(content.items[36], placeholder_item());
    }

    #[test]
    fn test_double_chest_places_a_pair() {
        let registry = BlockRegistry::build(&MappingData::bundled().unwrap()).unwrap();
        let world: HashMap<BlockPos, u32> = HashMap::new();
        let ctx = ContainerContext {
            registry: &registry,
            world: &world,
            player_position: Vec3d::new(0.5, 64.0, 0.5),
            player_unique_id: 1,
        };
        let mut inventory = Inventory::new(4, ContainerKind::Chest { rows: 6 }, "");
        let packets = ChestTranslator.prepare(&mut inventory, &ctx);
        assert_eq!(inventory.holders, vec![BlockPos::new(0, 66, 0), BlockPos::new(1, 66, 0)]);
        assert_eq!(packets.len(), 4);
        assert_eq!(ChestTranslator.open_delay(&inventory), DOUBLE_CHEST_OPEN_DELAY);

        let open = ChestTranslator.open(&inventory, &ctx);
        assert!(matches!(
            &open[0],
            BedrockPacket::ContainerOpen(ContainerOpen { window_id: 4, position, .. }) if *position == BlockPos::new(0, 66, 0)
        ));

        // Closing restores air from the (empty) world.
        let restored = ChestTranslator.close(&inventory, &ctx);
        assert_eq!(restored.len(), 2);
        let air = registry.bedrock_runtime_id(crossplay_world::AIR);
        assert!(restored
            .iter()
            .all(|p| matches!(p, BedrockPacket::UpdateBlock(UpdateBlock { runtime_id, .. }) if *runtime_id == air)));
    }
}
