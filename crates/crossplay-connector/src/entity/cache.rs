use super::components::*;
use super::definition::{EntityKind, EntityRegistry};
use super::metadata::{MetadataBag, MetadataTarget};
use crossplay_protocol::bedrock::SetEntityData;
use crossplay_protocol::metadata::MetadataEntry;
use crossplay_types::Vec3d;
use hecs::{Entity, EntityBuilder, World};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Runtime id the client knows itself by.
pub const PLAYER_RUNTIME_ID: u64 = 1;

pub const PLAYER_WIDTH: f32 = 0.6;
pub const PLAYER_HEIGHT: f32 = 1.8;

/// Everything needed to spawn a tracked entity.
pub struct SpawnInfo {
    pub java_id: i32,
    pub uuid: Uuid,
    pub kind: EntityKind,
    pub dimensions: Dimensions,
    pub position: Vec3d,
    pub motion: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
}

/// Result of [`EntityCache::spawn`].
#[derive(Debug, Clone, Copy)]
pub struct Spawned {
    pub entity: Entity,
    pub runtime_id: u64,
    /// Runtime id of an entity that had the same Java id and was dropped.
    pub replaced: Option<u64>,
}

/// Entities known to one session, stored in an ECS world.
pub struct EntityCache {
    world: World,
    by_java_id: HashMap<i32, Entity>,
    player: Entity,
    next_runtime_id: u64,
}

impl EntityCache {
    pub fn new(player_uuid: Uuid) -> Self {
        let mut world = World::new();
        let dimensions = Dimensions {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        };
        let player = world.spawn((
            EntityIds {
                java_id: -1,
                runtime_id: PLAYER_RUNTIME_ID,
                uuid: player_uuid,
            },
            Kind(EntityKind::Player),
            Position(Vec3d::ZERO),
            Rotation {
                yaw: 0.0,
                pitch: 0.0,
                head_yaw: 0.0,
            },
            Motion(Vec3d::ZERO),
            OnGround(false),
            MetadataBag::for_spawn(&dimensions),
            dimensions,
            LocalPlayer,
        ));
        Self {
            world,
            by_java_id: HashMap::new(),
            player,
            next_runtime_id: PLAYER_RUNTIME_ID + 1,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    /// Binds the local player to the id the server assigned at login.
    pub fn bind_player(&mut self, java_id: i32) {
        if let Ok(mut ids) = self.world.get::<&mut EntityIds>(self.player) {
            if ids.java_id >= 0 {
                self.by_java_id.remove(&ids.java_id);
            }
            ids.java_id = java_id;
        }
        self.by_java_id.insert(java_id, self.player);
    }

    pub fn get(&self, java_id: i32) -> Option<Entity> {
        self.by_java_id.get(&java_id).copied()
    }

    pub fn ids(&self, entity: Entity) -> Option<EntityIds> {
        self.world.get::<&EntityIds>(entity).ok().map(|ids| *ids)
    }

    pub fn kind(&self, entity: Entity) -> Option<EntityKind> {
        self.world.get::<&Kind>(entity).ok().map(|kind| kind.0)
    }

    /// Spawns a tracked entity. A live entity with the same Java id is
    /// replaced and its runtime id reported so the client can drop it.
    pub fn spawn(&mut self, registry: &EntityRegistry, info: SpawnInfo) -> Spawned {
        let mut replaced = None;
        if self.by_java_id.contains_key(&info.java_id) {
            warn!("Entity {} spawned twice, replacing it", info.java_id);
            replaced = self.remove(info.java_id);
        }
        let runtime_id = self.next_runtime_id;
        self.next_runtime_id += 1;

        let mut builder = EntityBuilder::new();
        builder
            .add(EntityIds {
                java_id: info.java_id,
                runtime_id,
                uuid: info.uuid,
            })
            .add(Kind(info.kind))
            .add(Position(info.position))
            .add(Rotation {
                yaw: info.yaw,
                pitch: info.pitch,
                head_yaw: info.head_yaw,
            })
            .add(Motion(info.motion))
            .add(OnGround(false))
            .add(MetadataBag::for_spawn(&info.dimensions))
            .add(info.dimensions);
        registry.add_components(info.kind, &mut builder);

        let entity = self.world.spawn(builder.build());
        self.by_java_id.insert(info.java_id, entity);
        Spawned {
            entity,
            runtime_id,
            replaced,
        }
    }

    /// Despawns by Java id. The local player is never removed.
    pub fn remove(&mut self, java_id: i32) -> Option<u64> {
        let entity = *self.by_java_id.get(&java_id)?;
        if entity == self.player {
            debug!("Ignoring removal of the local player");
            return None;
        }
        self.by_java_id.remove(&java_id);
        let runtime_id = self.ids(entity)?.runtime_id;
        let _ = self.world.despawn(entity);
        Some(runtime_id)
    }

    /// Applies a metadata packet's entries in order. Returns false when the
    /// entity is not tracked.
    pub fn apply_metadata(
        &mut self,
        registry: &EntityRegistry,
        java_id: i32,
        entries: &[MetadataEntry],
    ) -> bool {
        let Some(entity) = self.get(java_id) else {
            return false;
        };
        let Some(kind) = self.kind(entity) else {
            return false;
        };
        let Ok((bag, dimensions, tame, creeper)) = self.world.query_one_mut::<(
            &mut MetadataBag,
            &Dimensions,
            Option<&mut TameState>,
            Option<&mut CreeperState>,
        )>(entity) else {
            return false;
        };
        let mut target = MetadataTarget {
            bag,
            dimensions,
            tame,
            creeper,
        };
        for entry in entries {
            registry.apply(kind, &mut target, entry);
        }
        true
    }

    pub fn metadata_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, MetadataBag>> {
        self.world.get::<&mut MetadataBag>(entity).ok()
    }

    /// One entity data update per entity with pending changes.
    pub fn flush_dirty(&mut self, tick: u64) -> Vec<SetEntityData> {
        let mut updates: Vec<SetEntityData> = self
            .world
            .query_mut::<(&EntityIds, &mut MetadataBag)>()
            .into_iter()
            .filter(|(_, (_, bag))| bag.is_dirty())
            .map(|(_, (ids, bag))| SetEntityData {
                runtime_id: ids.runtime_id,
                metadata: bag.take_dirty(),
                tick,
            })
            .collect();
        updates.sort_by_key(|update| update.runtime_id);
        updates
    }

    /// Drops every tracked entity except the local player.
    pub fn clear(&mut self) {
        let player = self.player;
        let others: Vec<Entity> = self
            .world
            .iter()
            .map(|e| e.entity())
            .filter(|&e| e != player)
            .collect();
        for entity in others {
            let _ = self.world.despawn(entity);
        }
        self.by_java_id.retain(|_, e| *e == player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplay_protocol::metadata::{EntityDataKey, EntityDataValue, EntityFlag, MetadataValue};

    fn wolf(java_id: i32) -> SpawnInfo {
        SpawnInfo {
            java_id,
            uuid: Uuid::new_v4(),
            kind: EntityKind::Wolf,
            dimensions: Dimensions { width: 0.6, height: 0.85 },
            position: Vec3d::new(1.0, 64.0, 1.0),
            motion: Vec3d::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            head_yaw: 0.0,
        }
    }

    #[test]
    fn test_spawn_assigns_runtime_ids_and_family_components() {
        let registry = EntityRegistry::build().unwrap();
        let mut cache = EntityCache::new(Uuid::new_v4());
        let first = cache.spawn(&registry, wolf(10));
        let second_id = cache.spawn(&registry, wolf(11)).runtime_id;
        let (first, first_id) = (first.entity, first.runtime_id);
        assert_eq!(cache.spawn(&registry, wolf(12)).replaced, None);
        assert_eq!(first_id, PLAYER_RUNTIME_ID + 1);
        assert_eq!(second_id, PLAYER_RUNTIME_ID + 2);
        assert!(cache.world().get::<&TameState>(first).is_ok());
        assert!(cache.world().get::<&CreeperState>(first).is_err());
        assert_eq!(cache.get(10), Some(first));
    }

    #[test]
    fn test_flush_sends_one_update_per_entity() {
        let registry = EntityRegistry::build().unwrap();
        let mut cache = EntityCache::new(Uuid::new_v4());
        cache.spawn(&registry, wolf(10));
        cache.spawn(&registry, wolf(11));
        assert!(cache.apply_metadata(
            &registry,
            10,
            &[
                MetadataEntry::new(17, MetadataValue::Byte(0x04)),
                MetadataEntry::new(20, MetadataValue::VarInt(14)),
                MetadataEntry::new(19, MetadataValue::Boolean(true)),
            ],
        ));
        let updates = cache.flush_dirty(7);
        assert_eq!(updates.len(), 1);
        let update = &updates[0];
        assert_eq!(update.tick, 7);
        assert_eq!(update.metadata.get(&EntityDataKey::Color), Some(&EntityDataValue::Byte(14)));
        let EntityDataValue::Long(flags) = update.metadata[&EntityDataKey::Flags] else {
            panic!("flags are not a long");
        };
        assert_ne!(flags & EntityFlag::Tamed.mask(), 0);
        assert_ne!(flags & EntityFlag::Interested.mask(), 0);
        assert!(cache.flush_dirty(8).is_empty());
    }

    #[test]
    fn test_metadata_for_unknown_entity() {
        let registry = EntityRegistry::build().unwrap();
        let mut cache = EntityCache::new(Uuid::new_v4());
        assert!(!cache.apply_metadata(&registry, 99, &[MetadataEntry::new(0, MetadataValue::Byte(1))]));
    }

    #[test]
    fn test_local_player_survives_removal_and_clear() {
        let registry = EntityRegistry::build().unwrap();
        let mut cache = EntityCache::new(Uuid::new_v4());
        cache.bind_player(5);
        cache.spawn(&registry, wolf(10));
        assert_eq!(cache.remove(5), None);
        assert_eq!(cache.remove(10), Some(PLAYER_RUNTIME_ID + 1));
        cache.spawn(&registry, wolf(11));
        cache.clear();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(5), Some(cache.player()));
        assert_eq!(cache.get(11), None);
    }

    #[test]
    fn test_respawn_replaces_entity() {
        let registry = EntityRegistry::build().unwrap();
        let mut cache = EntityCache::new(Uuid::new_v4());
        cache.spawn(&registry, wolf(10));
        let spawned = cache.spawn(&registry, wolf(10));
        assert_eq!(spawned.runtime_id, PLAYER_RUNTIME_ID + 2);
        assert_eq!(spawned.replaced, Some(PLAYER_RUNTIME_ID + 1));
        assert_eq!(cache.len(), 2);
    }
}
