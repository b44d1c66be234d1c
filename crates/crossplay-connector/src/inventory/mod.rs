//! Container state and the mapping between Java and Bedrock slot layouts.

mod anvil;
mod chest;
mod player;
mod workstation;

pub use anvil::{AnvilTranslator, REPAIR_COST_PROPERTY};
pub use chest::ChestTranslator;
pub use player::PlayerInventoryTranslator;
pub use workstation::{CraftingTranslator, DispenserTranslator, HopperTranslator};

use crossplay_protocol::bedrock::{
    container_id, update_block_flags, BedrockPacket, ContainerOpen, ContainerType, InventoryContent,
    InventorySlot, ItemData, UpdateBlock,
};
use crossplay_types::{BlockPos, ItemStack, Vec3d};
use crossplay_world::{BlockAccess, BlockRegistry};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Java window id of the player inventory.
pub const PLAYER_WINDOW_ID: i32 = 0;
/// Slots of the player inventory section appended to every Java container.
pub const PLAYER_SECTION_SIZE: usize = 36;
pub const PLAYER_INVENTORY_SIZE: usize = 46;

const PLACEHOLDER_NAME: &str = "Unusable Space";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Player,
    Chest { rows: u8 },
    Generic3x3,
    Hopper,
    Anvil,
    Crafting,
}

impl ContainerKind {
    /// Resolves a Java menu type name.
    pub fn from_menu(name: &str) -> Option<Self> {
        let name = name.strip_prefix("minecraft:").unwrap_or(name);
        let kind = match name {
            "generic_3x3" => ContainerKind::Generic3x3,
            "hopper" => ContainerKind::Hopper,
            "anvil" => ContainerKind::Anvil,
            "crafting" => ContainerKind::Crafting,
            _ => {
                let rows: u8 = name.strip_prefix("generic_9x")?.parse().ok()?;
                if !(1..=6).contains(&rows) {
                    return None;
                }
                ContainerKind::Chest { rows }
            }
        };
        Some(kind)
    }

    /// Container slots, excluding the player section.
    pub fn size(self) -> usize {
        match self {
            ContainerKind::Player => PLAYER_INVENTORY_SIZE,
            ContainerKind::Chest { rows } => rows as usize * 9,
            ContainerKind::Generic3x3 => 9,
            ContainerKind::Hopper => 5,
            ContainerKind::Anvil => 3,
            ContainerKind::Crafting => 10,
        }
    }

    pub fn translator(self) -> &'static dyn InventoryTranslator {
        match self {
            ContainerKind::Player => &PlayerInventoryTranslator,
            ContainerKind::Chest { .. } => &ChestTranslator,
            ContainerKind::Generic3x3 => &DispenserTranslator,
            ContainerKind::Hopper => &HopperTranslator,
            ContainerKind::Anvil => &AnvilTranslator,
            ContainerKind::Crafting => &CraftingTranslator,
        }
    }
}

/// An open (or opening) Java container and its slot contents.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub java_id: i32,
    pub kind: ContainerKind,
    pub title: String,
    pub state_id: i32,
    items: Vec<ItemStack>,
    /// Fake blocks placed on the client to host the container UI.
    pub holders: Vec<BlockPos>,
    pub properties: HashMap<i16, i16>,
    /// Waiting for a delayed open; slot updates are held back until then.
    pub pending_open: bool,
}

impl Inventory {
    pub fn new(java_id: i32, kind: ContainerKind, title: impl Into<String>) -> Self {
        let total = match kind {
            ContainerKind::Player => PLAYER_INVENTORY_SIZE,
            _ => kind.size() + PLAYER_SECTION_SIZE,
        };
        Self {
            java_id,
            kind,
            title: title.into(),
            state_id: 0,
            items: vec![ItemStack::empty(); total],
            holders: Vec::new(),
            properties: HashMap::new(),
            pending_open: false,
        }
    }

    pub fn player() -> Self {
        Self::new(PLAYER_WINDOW_ID, ContainerKind::Player, "")
    }

    pub fn size(&self) -> usize {
        self.kind.size()
    }

    pub fn total_slots(&self) -> usize {
        self.items.len()
    }

    /// Bedrock window id; the Java one is reused.
    pub fn bedrock_id(&self) -> u32 {
        self.java_id as u32
    }

    pub fn item(&self, slot: usize) -> &ItemStack {
        static EMPTY: ItemStack = ItemStack {
            item_id: 0,
            count: 0,
            custom_name: None,
        };
        self.items.get(slot).unwrap_or(&EMPTY)
    }

    pub fn items(&self) -> &[ItemStack] {
        &self.items
    }

    /// Returns false for slots outside the container.
    pub fn set_item(&mut self, slot: usize, item: ItemStack) -> bool {
        match self.items.get_mut(slot) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false,
        }
    }

    /// Replaces every slot; missing trailing slots become empty.
    pub fn set_items(&mut self, items: &[ItemStack]) {
        for (slot, existing) in self.items.iter_mut().enumerate() {
            *existing = items.get(slot).cloned().unwrap_or_default();
        }
        if items.len() > self.items.len() {
            debug!(
                "Container {} sent {} slots, expected {}",
                self.java_id,
                items.len(),
                self.items.len()
            );
        }
    }
}

/// Bedrock-side containers a Java slot can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClientContainer {
    /// The window opened for this inventory.
    Open,
    Inventory,
    Armor,
    Offhand,
    Ui,
}

impl ClientContainer {
    pub fn window_id(self, inventory: &Inventory) -> u32 {
        match self {
            ClientContainer::Open => inventory.bedrock_id(),
            ClientContainer::Inventory => container_id::INVENTORY,
            ClientContainer::Armor => container_id::ARMOR,
            ClientContainer::Offhand => container_id::OFFHAND,
            ClientContainer::Ui => container_id::UI,
        }
    }

    fn capacity(self, padded_size: usize) -> usize {
        match self {
            ClientContainer::Open => padded_size,
            ClientContainer::Inventory => PLAYER_SECTION_SIZE,
            ClientContainer::Armor => 4,
            ClientContainer::Offhand => 1,
            ClientContainer::Ui => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientSlot {
    pub container: ClientContainer,
    pub slot: u32,
}

impl ClientSlot {
    pub const fn new(container: ClientContainer, slot: u32) -> Self {
        Self { container, slot }
    }
}

/// World state needed to place and remove fake container blocks.
pub struct ContainerContext<'a> {
    pub registry: &'a BlockRegistry,
    pub world: &'a dyn BlockAccess,
    pub player_position: Vec3d,
    pub player_unique_id: i64,
}

pub fn to_bedrock_item(stack: &ItemStack) -> ItemData {
    if stack.is_empty() {
        return ItemData::AIR;
    }
    match crossplay_data::bedrock_item_id(stack.item_id) {
        Some(id) => ItemData {
            id,
            count: stack.count.max(0) as u16,
            damage: 0,
            custom_name: stack.custom_name.clone(),
            repair_cost: None,
        },
        None => {
            debug!("No Bedrock item for Java item {}", stack.item_id);
            ItemData::AIR
        }
    }
}

/// Rendered in padded slots that have no Java counterpart.
pub fn placeholder_item() -> ItemData {
    let id = crossplay_data::java_item_id("barrier")
        .and_then(crossplay_data::bedrock_item_id)
        .unwrap_or(ItemData::AIR.id);
    ItemData {
        id,
        count: 1,
        damage: 0,
        custom_name: Some(PLACEHOLDER_NAME.to_string()),
        repair_cost: None,
    }
}

/// Player section slots appended after a container's own slots.
fn player_section_slot(index: usize) -> Option<ClientSlot> {
    match index {
        0..=26 => Some(ClientSlot::new(ClientContainer::Inventory, index as u32 + 9)),
        27..=35 => Some(ClientSlot::new(ClientContainer::Inventory, index as u32 - 27)),
        _ => None,
    }
}

/// Client slot for any Java slot of `inventory`, player section included.
pub fn client_slot(inventory: &Inventory, slot: usize) -> Option<ClientSlot> {
    let translator = inventory.kind.translator();
    let size = inventory.size();
    if slot < size {
        translator.to_client_slot(slot)
    } else if inventory.kind == ContainerKind::Player {
        None
    } else {
        player_section_slot(slot - size)
    }
}

pub(crate) fn fake_block(registry: &BlockRegistry, name: &str, pos: BlockPos) -> Option<BedrockPacket> {
    let Some(state) = registry.find(name, &[]) else {
        warn!("No block state {} to host a container", name);
        return None;
    };
    Some(
        UpdateBlock {
            position: pos,
            runtime_id: registry.bedrock_runtime_id(state),
            flags: update_block_flags::PRIORITY,
            layer: 0,
        }
        .into(),
    )
}

/// Where fake container blocks go: just above the player's head.
pub(crate) fn holder_position(player_position: Vec3d) -> BlockPos {
    player_position.block_pos().offset(0, 2, 0)
}

/// Per-kind slot layout. Flushing is shared; kinds only describe where
/// slots go and which slots depend on each other.
pub trait InventoryTranslator: Send + Sync {
    fn container_type(&self) -> ContainerType;

    /// Client slot for a container slot (`slot < size`).
    fn to_client_slot(&self, slot: usize) -> Option<ClientSlot>;

    /// Size of the client window; slots past the Java size get placeholders.
    fn padded_size(&self, size: usize) -> usize {
        size
    }

    /// A slot whose client rendering depends on `slot`.
    fn dependent_slot(&self, _inventory: &Inventory, _slot: usize) -> Option<usize> {
        None
    }

    fn client_item(&self, inventory: &Inventory, slot: usize) -> ItemData {
        to_bedrock_item(inventory.item(slot))
    }

    /// Block name placed on the client to host the window.
    fn holder_block(&self) -> Option<&'static str> {
        None
    }

    /// Ticks to wait between placing the holder and opening the window.
    fn open_delay(&self, _inventory: &Inventory) -> u64 {
        0
    }

    fn prepare(&self, inventory: &mut Inventory, ctx: &ContainerContext<'_>) -> Vec<BedrockPacket> {
        let Some(name) = self.holder_block() else {
            return Vec::new();
        };
        let pos = holder_position(ctx.player_position);
        inventory.holders = vec![pos];
        fake_block(ctx.registry, name, pos).into_iter().collect()
    }

    fn open(&self, inventory: &Inventory, ctx: &ContainerContext<'_>) -> Vec<BedrockPacket> {
        let position = inventory
            .holders
            .first()
            .copied()
            .unwrap_or_else(|| ctx.player_position.block_pos());
        vec![ContainerOpen {
            window_id: inventory.bedrock_id() as u8,
            container_type: self.container_type(),
            position,
            unique_id: -1,
        }
        .into()]
    }

    /// Puts the real blocks back where fake holders were placed.
    fn close(&self, inventory: &Inventory, ctx: &ContainerContext<'_>) -> Vec<BedrockPacket> {
        inventory
            .holders
            .iter()
            .map(|&pos| {
                UpdateBlock {
                    position: pos,
                    runtime_id: ctx.registry.bedrock_runtime_id(ctx.world.block_at(pos)),
                    flags: update_block_flags::PRIORITY,
                    layer: 0,
                }
                .into()
            })
            .collect()
    }

    /// Every slot, grouped into one content packet per client container.
    fn update_inventory(&self, inventory: &Inventory) -> Vec<BedrockPacket> {
        let padded = self.padded_size(inventory.size());
        let mut contents: BTreeMap<ClientContainer, Vec<ItemData>> = BTreeMap::new();
        let mut ui_slots = Vec::new();

        for slot in 0..inventory.total_slots() {
            let Some(target) = client_slot(inventory, slot) else {
                continue;
            };
            let item = self.client_item(inventory, slot);
            if target.container == ClientContainer::Ui {
                ui_slots.push(InventorySlot {
                    window_id: container_id::UI,
                    slot: target.slot,
                    item,
                });
                continue;
            }
            let items = contents.entry(target.container).or_insert_with(|| {
                vec![placeholder_item(); target.container.capacity(padded)]
            });
            match items.get_mut(target.slot as usize) {
                Some(existing) => *existing = item,
                None => debug!("Slot {} maps outside {:?}", slot, target.container),
            }
        }

        let mut packets: Vec<BedrockPacket> = contents
            .into_iter()
            .map(|(container, items)| {
                InventoryContent {
                    window_id: container.window_id(inventory),
                    items,
                }
                .into()
            })
            .collect();
        packets.extend(ui_slots.into_iter().map(BedrockPacket::from));
        packets
    }

    /// One slot, plus its dependent slot if it has one.
    fn update_slot(&self, inventory: &Inventory, slot: usize) -> Vec<BedrockPacket> {
        let mut packets = Vec::new();
        let mut slots = vec![slot];
        if let Some(dependent) = self.dependent_slot(inventory, slot) {
            if dependent != slot {
                slots.push(dependent);
            }
        }
        for slot in slots {
            let Some(target) = client_slot(inventory, slot) else {
                debug!("Slot {} of container {} has no client slot", slot, inventory.java_id);
                continue;
            };
            packets.push(
                InventorySlot {
                    window_id: target.container.window_id(inventory),
                    slot: target.slot,
                    item: self.client_item(inventory, slot),
                }
                .into(),
            );
        }
        packets
    }
}
