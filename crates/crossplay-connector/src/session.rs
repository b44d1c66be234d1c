use crate::collision::CollisionManager;
use crate::entity::components::Position;
use crate::entity::{EntityCache, EntityRegistry, PLAYER_RUNTIME_ID};
use crate::inventory::{ContainerContext, Inventory, PLAYER_WINDOW_ID};
use crate::worker::SessionEvent;
use crossplay_data::MappingData;
use crossplay_protocol::bedrock::{BedrockPacket, ContainerCloseClientbound};
use crossplay_protocol::java::JavaPacket;
use crossplay_protocol::metadata::EntityFlag;
use crossplay_types::{GameMode, ItemStack, Vec3d, Vec3f};
use crossplay_world::{BlockRegistry, BlockView, ChunkCache, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Registries built once at startup and shared by every session.
#[derive(Clone)]
pub struct Registries {
    pub blocks: Arc<BlockRegistry>,
    pub entities: Arc<EntityRegistry>,
}

impl Registries {
    pub fn build(data: &MappingData) -> anyhow::Result<Self> {
        let blocks = BlockRegistry::build(data)?;
        let entities = EntityRegistry::build()?;
        info!(
            "Loaded {} block states, canonical protocol {}",
            blocks.len(),
            blocks.canonical_version()
        );
        Ok(Self {
            blocks: Arc::new(blocks),
            entities: Arc::new(entities),
        })
    }
}

/// The part of the proxy configuration a session needs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Protocol version of the Java server; selects the block remap chain.
    pub protocol_version: u32,
    /// Mirror chunks so movement can be corrected against real blocks.
    pub cache_chunks: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            protocol_version: 767,
            cache_chunks: true,
        }
    }
}

type Task = Box<dyn FnOnce(&mut Session) + Send>;

struct ScheduledTask {
    due: u64,
    task: Task,
}

/// Per-connection state. Owned by exactly one worker; nothing in here is shared
/// mutably between sessions.
pub struct Session {
    id: u64,
    active: bool,
    view: BlockView,
    entity_registry: Arc<EntityRegistry>,
    entity_cache: EntityCache,
    chunk_cache: ChunkCache,
    collision: CollisionManager,
    inventories: HashMap<i32, Inventory>,
    open_window: Option<i32>,
    cursor: ItemStack,
    game_mode: GameMode,
    sneaking: bool,
    ticks: u64,
    scheduled: Vec<ScheduledTask>,
    upstream: Vec<BedrockPacket>,
    downstream: Vec<JavaPacket>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl Session {
    pub fn new(
        id: u64,
        player_uuid: Uuid,
        config: &SessionConfig,
        registries: &Registries,
    ) -> Result<Self, RegistryError> {
        let view = BlockView::new(Arc::clone(&registries.blocks), config.protocol_version)?;
        let mut inventories = HashMap::new();
        inventories.insert(PLAYER_WINDOW_ID, Inventory::player());
        Ok(Self {
            id,
            active: true,
            view,
            entity_registry: Arc::clone(&registries.entities),
            entity_cache: EntityCache::new(player_uuid),
            chunk_cache: ChunkCache::new(config.cache_chunks),
            collision: CollisionManager::new(),
            inventories,
            open_window: None,
            cursor: ItemStack::empty(),
            game_mode: GameMode::Survival,
            sneaking: false,
            ticks: 0,
            scheduled: Vec::new(),
            upstream: Vec::new(),
            downstream: Vec::new(),
            events: None,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the session closed. Scheduled tasks stop running.
    pub fn disconnect(&mut self, reason: &str) {
        if self.active {
            info!("Session {} disconnected: {}", self.id, reason);
            self.active = false;
            self.scheduled.clear();
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Queues a packet for the Bedrock client.
    pub fn send_upstream_packet(&mut self, packet: impl Into<BedrockPacket>) {
        self.upstream.push(packet.into());
    }

    pub fn send_upstream_packets(&mut self, packets: impl IntoIterator<Item = BedrockPacket>) {
        self.upstream.extend(packets);
    }

    /// Queues a packet for the Java server.
    pub fn send_downstream_packet(&mut self, packet: impl Into<JavaPacket>) {
        self.downstream.push(packet.into());
    }

    /// Drains queued client packets in emission order.
    pub fn take_upstream(&mut self) -> Vec<BedrockPacket> {
        std::mem::take(&mut self.upstream)
    }

    pub fn take_downstream(&mut self) -> Vec<JavaPacket> {
        std::mem::take(&mut self.downstream)
    }

    pub fn block_view(&self) -> &BlockView {
        &self.view
    }

    pub fn block_registry(&self) -> &BlockRegistry {
        self.view.registry()
    }

    pub fn entity_registry(&self) -> Arc<EntityRegistry> {
        Arc::clone(&self.entity_registry)
    }

    pub fn entity_cache(&self) -> &EntityCache {
        &self.entity_cache
    }

    pub fn entity_cache_mut(&mut self) -> &mut EntityCache {
        &mut self.entity_cache
    }

    pub fn chunk_cache(&self) -> &ChunkCache {
        &self.chunk_cache
    }

    pub fn chunk_cache_mut(&mut self) -> &mut ChunkCache {
        &mut self.chunk_cache
    }

    pub fn collision_manager(&self) -> &CollisionManager {
        &self.collision
    }

    pub fn collision_manager_mut(&mut self) -> &mut CollisionManager {
        &mut self.collision
    }

    pub fn inventory_of(&self, java_id: i32) -> Option<&Inventory> {
        self.inventories.get(&java_id)
    }

    pub fn inventory_of_mut(&mut self, java_id: i32) -> Option<&mut Inventory> {
        self.inventories.get_mut(&java_id)
    }

    pub fn player_inventory_mut(&mut self) -> &mut Inventory {
        self.inventories
            .entry(PLAYER_WINDOW_ID)
            .or_insert_with(Inventory::player)
    }

    pub fn open_window(&self) -> Option<i32> {
        self.open_window
    }

    pub fn cursor(&self) -> &ItemStack {
        &self.cursor
    }

    pub fn set_cursor(&mut self, item: ItemStack) {
        self.cursor = item;
    }

    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    pub fn set_game_mode(&mut self, game_mode: GameMode) {
        self.game_mode = game_mode;
    }

    pub fn is_sneaking(&self) -> bool {
        self.sneaking
    }

    pub fn set_sneaking(&mut self, sneaking: bool) {
        self.sneaking = sneaking;
        self.set_player_flag(EntityFlag::Sneaking, sneaking);
    }

    /// Java entity id of the local player, once the server has sent it.
    pub fn player_java_id(&self) -> i32 {
        self.entity_cache
            .ids(self.entity_cache.player())
            .map(|ids| ids.java_id)
            .unwrap_or(-1)
    }

    pub fn player_position(&self) -> Vec3d {
        self.entity_cache
            .world()
            .get::<&Position>(self.entity_cache.player())
            .map(|position| position.0)
            .unwrap_or_default()
    }

    pub fn set_player_position(&mut self, position: Vec3d) {
        let player = self.entity_cache.player();
        if let Ok(mut current) = self.entity_cache.world_mut().get::<&mut Position>(player) {
            current.0 = position;
        }
    }

    pub fn set_player_flag(&mut self, flag: EntityFlag, value: bool) {
        let player = self.entity_cache.player();
        if let Some(mut bag) = self.entity_cache.metadata_mut(player) {
            bag.set_flag(flag, value);
        }
    }

    /// Runs the collision engine on a client movement. `None` rejects it.
    pub fn adjust_player_position(&mut self, position: Vec3f, on_ground: bool) -> Option<Vec3d> {
        self.collision.adjust_bedrock_position(
            position,
            on_ground,
            &self.chunk_cache,
            self.view.registry(),
            self.chunk_cache.is_enabled(),
        )
    }

    /// Runs `task` on the tick `delay` ticks from now.
    pub fn schedule(&mut self, delay: u64, task: impl FnOnce(&mut Session) + Send + 'static) {
        self.scheduled.push(ScheduledTask {
            due: self.ticks + delay,
            task: Box::new(task),
        });
    }

    pub fn has_scheduled(&self) -> bool {
        !self.scheduled.is_empty()
    }

    /// Advances one tick: due tasks run in scheduling order, then every
    /// entity with changed metadata gets one update.
    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        self.ticks += 1;

        let now = self.ticks;
        let (due, pending): (Vec<ScheduledTask>, Vec<ScheduledTask>) =
            std::mem::take(&mut self.scheduled).into_iter().partition(|t| t.due <= now);
        self.scheduled = pending;
        for scheduled in due {
            if !self.active {
                break;
            }
            (scheduled.task)(self);
        }

        let updates = self.entity_cache.flush_dirty(now);
        self.upstream.extend(updates.into_iter().map(BedrockPacket::from));
    }

    pub(crate) fn attach_events(&mut self, events: mpsc::UnboundedSender<SessionEvent>) {
        self.events = Some(events);
    }

    /// Runs `work` on the blocking pool and hands its result back to this
    /// session on its own worker. Outside a worker the work runs inline.
    pub fn run_blocking<R, W, F>(&mut self, work: W, then: F)
    where
        R: Send + 'static,
        W: FnOnce() -> R + Send + 'static,
        F: FnOnce(&mut Session, R) + Send + 'static,
    {
        let handle = tokio::runtime::Handle::try_current();
        match (&self.events, handle) {
            (Some(events), Ok(handle)) => {
                let events = events.clone();
                handle.spawn_blocking(move || {
                    let result = work();
                    let task: Task = Box::new(move |session: &mut Session| then(session, result));
                    if events.send(SessionEvent::Task(task)).is_err() {
                        debug!("Session closed before blocking work finished");
                    }
                });
            }
            _ => {
                let result = work();
                then(self, result);
            }
        }
    }

    fn container_context(&self) -> ContainerContext<'_> {
        ContainerContext {
            registry: self.view.registry(),
            world: &self.chunk_cache,
            player_position: self.player_position(),
            player_unique_id: PLAYER_RUNTIME_ID as i64,
        }
    }

    /// Takes over a container the server opened. Any other open container
    /// is closed on the client first.
    pub fn open_inventory(&mut self, mut inventory: Inventory) {
        if let Some(previous) = self.open_window {
            if previous != inventory.java_id {
                self.close_inventory(previous, true);
            }
        }
        let java_id = inventory.java_id;
        let translator = inventory.kind.translator();
        let packets = translator.prepare(&mut inventory, &self.container_context());
        self.upstream.extend(packets);

        let delay = translator.open_delay(&inventory);
        inventory.pending_open = delay > 0;
        self.inventories.insert(java_id, inventory);
        self.open_window = Some(java_id);

        if delay == 0 {
            self.finish_open(java_id);
        } else {
            debug!("Opening container {} in {} ticks", java_id, delay);
            self.schedule(delay, move |session| session.finish_open(java_id));
        }
    }

    fn finish_open(&mut self, java_id: i32) {
        if self.open_window != Some(java_id) {
            return;
        }
        let Some(inventory) = self.inventories.get_mut(&java_id) else {
            return;
        };
        inventory.pending_open = false;
        let inventory = &self.inventories[&java_id];
        let translator = inventory.kind.translator();
        let mut packets = translator.open(inventory, &self.container_context());
        packets.extend(translator.update_inventory(inventory));
        self.upstream.extend(packets);
    }

    /// Shows the player's own inventory, as the client asked.
    pub fn open_player_inventory(&mut self) {
        if self.open_window.is_some() {
            return;
        }
        self.player_inventory_mut();
        self.open_window = Some(PLAYER_WINDOW_ID);
        self.finish_open(PLAYER_WINDOW_ID);
    }

    /// Forgets a container and restores the blocks placed for it.
    /// `notify_client` is set when the server closed it.
    pub fn close_inventory(&mut self, java_id: i32, notify_client: bool) {
        if self.open_window == Some(java_id) {
            self.open_window = None;
        }
        if java_id == PLAYER_WINDOW_ID {
            if notify_client {
                self.send_upstream_packet(ContainerCloseClientbound {
                    window_id: java_id as u8,
                    server_initiated: true,
                });
            }
            return;
        }
        let Some(inventory) = self.inventories.remove(&java_id) else {
            return;
        };
        if notify_client {
            self.send_upstream_packet(ContainerCloseClientbound {
                window_id: inventory.bedrock_id() as u8,
                server_initiated: true,
            });
        }
        let packets = inventory.kind.translator().close(&inventory, &self.container_context());
        self.upstream.extend(packets);
    }
}
