use crate::inventory::{
    AnvilTranslator, ContainerKind, Inventory, InventoryTranslator, PLAYER_SECTION_SIZE, PLAYER_WINDOW_ID,
    REPAIR_COST_PROPERTY,
};
use crate::session::Session;
use crossplay_protocol::java::{
    CloseContainer, OpenScreen, ServerboundCloseContainer, SetContainerContent, SetContainerProperty,
    SetContainerSlot,
};
use crossplay_types::ItemStack;
use tracing::{debug, warn};

/// Window id the server uses for the item on the cursor.
const CURSOR_WINDOW_ID: i32 = -1;
/// Player inventory slot the player section of a container starts at.
const PLAYER_SECTION_START: usize = 9;

pub(super) fn translate_open_screen(session: &mut Session, packet: &OpenScreen) -> anyhow::Result<()> {
    let kind = crossplay_data::java_menu_name(packet.menu_type).and_then(ContainerKind::from_menu);
    let Some(kind) = kind else {
        warn!("Unsupported container type {}, closing it", packet.menu_type);
        session.send_downstream_packet(ServerboundCloseContainer {
            window_id: packet.window_id,
        });
        return Ok(());
    };
    session.open_inventory(Inventory::new(packet.window_id, kind, packet.title.clone()));
    Ok(())
}

/// Keeps the player inventory in step with the player section of a container.
fn mirror_player_section(session: &mut Session, container_size: usize, slot: usize, item: &ItemStack) {
    if slot < container_size || slot >= container_size + PLAYER_SECTION_SIZE {
        return;
    }
    let player_slot = PLAYER_SECTION_START + slot - container_size;
    session.player_inventory_mut().set_item(player_slot, item.clone());
}

pub(super) fn translate_content(session: &mut Session, packet: &SetContainerContent) -> anyhow::Result<()> {
    session.set_cursor(packet.carried.clone());
    let Some(inventory) = session.inventory_of_mut(packet.window_id) else {
        debug!("Content for unknown container {}", packet.window_id);
        return Ok(());
    };
    inventory.set_items(&packet.items);
    inventory.state_id = packet.state_id;
    let size = inventory.size();
    let pending = inventory.pending_open;

    if packet.window_id != PLAYER_WINDOW_ID {
        for (slot, item) in packet.items.iter().enumerate() {
            mirror_player_section(session, size, slot, item);
        }
    }
    if pending {
        return Ok(());
    }
    let Some(inventory) = session.inventory_of(packet.window_id) else {
        return Ok(());
    };
    let packets = inventory.kind.translator().update_inventory(inventory);
    session.send_upstream_packets(packets);
    Ok(())
}

pub(super) fn translate_slot(session: &mut Session, packet: &SetContainerSlot) -> anyhow::Result<()> {
    if packet.window_id == CURSOR_WINDOW_ID {
        session.set_cursor(packet.item.clone());
        return Ok(());
    }
    let Ok(slot) = usize::try_from(packet.slot) else {
        debug!("Ignoring slot {} of container {}", packet.slot, packet.window_id);
        return Ok(());
    };
    let Some(inventory) = session.inventory_of_mut(packet.window_id) else {
        debug!("Slot update for unknown container {}", packet.window_id);
        return Ok(());
    };
    if !inventory.set_item(slot, packet.item.clone()) {
        debug!("Slot {} is outside container {}", slot, packet.window_id);
        return Ok(());
    }
    inventory.state_id = packet.state_id;
    let size = inventory.size();
    let pending = inventory.pending_open;

    if packet.window_id != PLAYER_WINDOW_ID {
        mirror_player_section(session, size, slot, &packet.item);
    }
    if pending {
        return Ok(());
    }
    let Some(inventory) = session.inventory_of(packet.window_id) else {
        return Ok(());
    };
    let packets = inventory.kind.translator().update_slot(inventory, slot);
    session.send_upstream_packets(packets);
    Ok(())
}

pub(super) fn translate_property(session: &mut Session, packet: &SetContainerProperty) -> anyhow::Result<()> {
    let Some(inventory) = session.inventory_of_mut(packet.window_id) else {
        return Ok(());
    };
    inventory.properties.insert(packet.property, packet.value);
    if inventory.kind != ContainerKind::Anvil || packet.property != REPAIR_COST_PROPERTY || inventory.pending_open {
        return Ok(());
    }
    let inventory: &Inventory = inventory;
    let packets = AnvilTranslator.update_slot(inventory, AnvilTranslator::cost_slot(inventory));
    session.send_upstream_packets(packets);
    Ok(())
}

pub(super) fn translate_close(session: &mut Session, packet: &CloseContainer) -> anyhow::Result<()> {
    session.close_inventory(packet.window_id, true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::test_session;
    use crossplay_protocol::bedrock::{container_id, BedrockPacket};
    use crossplay_protocol::java::JavaPacket;

    fn open(session: &mut Session, window_id: i32, menu_type: i32) {
        translate_open_screen(
            session,
            &OpenScreen {
                window_id,
                menu_type,
                title: "Test".into(),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_unsupported_screen_is_closed_on_the_server() {
        let mut session = test_session();
        open(&mut session, 5, 99);
        assert_eq!(
            session.take_downstream(),
            vec![JavaPacket::ServerboundCloseContainer(ServerboundCloseContainer { window_id: 5 })]
        );
        assert!(session.inventory_of(5).is_none());
    }

    #[test]
    fn test_chest_content_updates_client_and_player_section() {
        let mut session = test_session();
        open(&mut session, 2, 2);
        assert_eq!(session.inventory_of(2).map(|i| i.kind), Some(ContainerKind::Chest { rows: 3 }));
        session.take_upstream();

        let mut items = vec![ItemStack::empty(); 27 + 36];
        items[0] = ItemStack::new(1, 5);
        items[27 + 27] = ItemStack::new(848, 2);
        translate_content(
            &mut session,
            &SetContainerContent {
                window_id: 2,
                state_id: 9,
                items,
                carried: ItemStack::empty(),
            },
        )
        .unwrap();

        // First hotbar slot of the player section.
        assert_eq!(session.inventory_of(PLAYER_WINDOW_ID).unwrap().item(36).item_id, 848);
        let packets = session.take_upstream();
        let open_content = packets
            .iter()
            .find_map(|p| match p {
                BedrockPacket::InventoryContent(c) if c.window_id == 2 => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(open_content.items.len(), 27);
        assert_eq!(open_content.items[0].count, 5);
        assert!(packets
            .iter()
            .any(|p| matches!(p, BedrockPacket::InventoryContent(c) if c.window_id == container_id::INVENTORY)));
    }

    #[test]
    fn test_cursor_slot() {
        let mut session = test_session();
        translate_slot(
            &mut session,
            &SetContainerSlot {
                window_id: -1,
                state_id: 0,
                slot: -1,
                item: ItemStack::new(848, 1),
            },
        )
        .unwrap();
        assert_eq!(session.cursor().item_id, 848);
        assert!(session.take_upstream().is_empty());
    }

    #[test]
    fn test_player_slot_update() {
        let mut session = test_session();
        translate_slot(
            &mut session,
            &SetContainerSlot {
                window_id: 0,
                state_id: 1,
                slot: 45,
                item: ItemStack::new(848, 1),
            },
        )
        .unwrap();
        let packets = session.take_upstream();
        assert_eq!(packets.len(), 1);
        assert!(matches!(&packets[0], BedrockPacket::InventorySlot(s) if s.window_id == container_id::OFFHAND && s.slot == 0));
    }

    #[test]
    fn test_anvil_cost_refreshes_cost_slot() {
        let mut session = test_session();
        open(&mut session, 4, 8);
        translate_slot(
            &mut session,
            &SetContainerSlot {
                window_id: 4,
                state_id: 1,
                slot: 0,
                item: ItemStack::new(820, 1),
            },
        )
        .unwrap();
        session.take_upstream();

        translate_property(
            &mut session,
            &SetContainerProperty {
                window_id: 4,
                property: 0,
                value: 7,
            },
        )
        .unwrap();
        let packets = session.take_upstream();
        let BedrockPacket::InventorySlot(slot) = &packets[0] else {
            panic!("expected a slot update");
        };
        assert_eq!(slot.window_id, container_id::UI);
        assert_eq!(slot.slot, 1);
        assert_eq!(slot.item.repair_cost, Some(7));
        let inventory = session.inventory_of(4).unwrap();
        assert_eq!(AnvilTranslator.client_item(inventory, 0).repair_cost, Some(7));
    }

    #[test]
    fn test_server_close() {
        let mut session = test_session();
        open(&mut session, 3, 16);
        session.take_upstream();
        translate_close(&mut session, &CloseContainer { window_id: 3 }).unwrap();
        assert!(session.inventory_of(3).is_none());
        assert!(session
            .take_upstream()
            .iter()
            .any(|p| matches!(p, BedrockPacket::ContainerCloseClientbound(_))));
    }
}
