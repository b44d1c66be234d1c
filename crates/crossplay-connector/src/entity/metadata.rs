use super::components::{CreeperState, Dimensions, TameState};
use crate::error::MetadataError;
use crossplay_protocol::metadata::{
    EntityDataKey, EntityDataMap, EntityDataValue, EntityFlag, MetadataValue, Pose,
};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Outgoing Bedrock entity data, tracking which keys changed since the last flush.
#[derive(Debug, Default)]
pub struct MetadataBag {
    flags: i64,
    flags2: i64,
    values: EntityDataMap,
    dirty: BTreeSet<EntityDataKey>,
}

impl MetadataBag {
    /// Defaults every spawned entity starts with.
    pub fn for_spawn(dimensions: &Dimensions) -> Self {
        let mut bag = Self::default();
        bag.set_flag(EntityFlag::HasGravity, true);
        bag.set_flag(EntityFlag::HasCollision, true);
        bag.set_flag(EntityFlag::CanShowName, true);
        bag.put(EntityDataKey::Scale, EntityDataValue::Float(1.0));
        bag.put(EntityDataKey::Color, EntityDataValue::Byte(0));
        bag.put(EntityDataKey::Nametag, EntityDataValue::String(String::new()));
        bag.put(EntityDataKey::AirSupply, EntityDataValue::Short(300));
        bag.put(EntityDataKey::MaxAirSupply, EntityDataValue::Short(300));
        bag.put(EntityDataKey::BoundingBoxWidth, EntityDataValue::Float(dimensions.width));
        bag.put(EntityDataKey::BoundingBoxHeight, EntityDataValue::Float(dimensions.height));
        bag.dirty.clear();
        bag
    }

    pub fn flag(&self, flag: EntityFlag) -> bool {
        let word = match flag.data_key() {
            EntityDataKey::Flags => self.flags,
            _ => self.flags2,
        };
        word & flag.mask() != 0
    }

    pub fn set_flag(&mut self, flag: EntityFlag, value: bool) {
        let key = flag.data_key();
        let word = match key {
            EntityDataKey::Flags => &mut self.flags,
            _ => &mut self.flags2,
        };
        let updated = if value {
            *word | flag.mask()
        } else {
            *word & !flag.mask()
        };
        if updated != *word {
            *word = updated;
            self.dirty.insert(key);
        }
    }

    /// Stores a value; only an actual change marks the key dirty.
    pub fn put(&mut self, key: EntityDataKey, value: EntityDataValue) {
        debug_assert!(!matches!(key, EntityDataKey::Flags | EntityDataKey::Flags2));
        if self.values.get(&key) != Some(&value) {
            self.values.insert(key, value);
            self.dirty.insert(key);
        }
    }

    pub fn get(&self, key: EntityDataKey) -> Option<&EntityDataValue> {
        self.values.get(&key)
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn value_of(&self, key: EntityDataKey) -> Option<EntityDataValue> {
        match key {
            EntityDataKey::Flags => Some(EntityDataValue::Long(self.flags)),
            EntityDataKey::Flags2 => Some(EntityDataValue::Long(self.flags2)),
            _ => self.values.get(&key).cloned(),
        }
    }

    /// Everything, for spawn packets. Clears the dirty set.
    pub fn snapshot(&mut self) -> EntityDataMap {
        self.dirty.clear();
        let mut map = self.values.clone();
        map.insert(EntityDataKey::Flags, EntityDataValue::Long(self.flags));
        map.insert(EntityDataKey::Flags2, EntityDataValue::Long(self.flags2));
        map
    }

    /// Only the keys changed since the last flush.
    pub fn take_dirty(&mut self) -> EntityDataMap {
        std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|key| self.value_of(key).map(|value| (key, value)))
            .collect()
    }
}

/// The components a metadata handler may read or write.
pub struct MetadataTarget<'a> {
    pub bag: &'a mut MetadataBag,
    pub dimensions: &'a Dimensions,
    pub tame: Option<&'a mut TameState>,
    pub creeper: Option<&'a mut CreeperState>,
}

fn mismatch(expected: &'static str, value: &MetadataValue) -> MetadataError {
    MetadataError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

pub(crate) fn as_byte(value: &MetadataValue) -> Result<i8, MetadataError> {
    match value {
        MetadataValue::Byte(b) => Ok(*b),
        other => Err(mismatch("byte", other)),
    }
}

pub(crate) fn as_bool(value: &MetadataValue) -> Result<bool, MetadataError> {
    match value {
        MetadataValue::Boolean(b) => Ok(*b),
        other => Err(mismatch("boolean", other)),
    }
}

pub(crate) fn as_varint(value: &MetadataValue) -> Result<i32, MetadataError> {
    match value {
        MetadataValue::VarInt(v) => Ok(*v),
        other => Err(mismatch("varint", other)),
    }
}

pub(crate) fn as_float(value: &MetadataValue) -> Result<f32, MetadataError> {
    match value {
        MetadataValue::Float(f) => Ok(*f),
        other => Err(mismatch("float", other)),
    }
}

pub(crate) fn as_opt_chat(value: &MetadataValue) -> Result<Option<&str>, MetadataError> {
    match value {
        MetadataValue::OptChat(text) => Ok(text.as_deref()),
        other => Err(mismatch("optional chat", other)),
    }
}

pub(crate) fn as_opt_uuid(value: &MetadataValue) -> Result<Option<Uuid>, MetadataError> {
    match value {
        MetadataValue::OptUuid(uuid) => Ok(*uuid),
        other => Err(mismatch("optional uuid", other)),
    }
}

pub(crate) fn as_pose(value: &MetadataValue) -> Result<Pose, MetadataError> {
    match value {
        MetadataValue::Pose(pose) => Ok(*pose),
        other => Err(mismatch("pose", other)),
    }
}
