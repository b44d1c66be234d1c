use super::metadata::MetadataTarget;
use crate::error::{MetadataError, RegistrationError};
use crossplay_protocol::metadata::{MetadataEntry, MetadataValue};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Behavior families. Abstract families have no Java type of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Base,
    Living,
    Mob,
    Ageable,
    Tameable,
    Wolf,
    Cat,
    Creeper,
    Zombie,
    Ghast,
    Slime,
    Pig,
    Skeleton,
    Player,
    Arrow,
    Item,
}

pub type MetadataHandler = fn(&mut MetadataTarget<'_>, &MetadataValue) -> Result<(), MetadataError>;

/// Adds family-specific components to a freshly spawned entity.
pub type EntityFactory = fn(&mut hecs::EntityBuilder);

pub struct KindDefinition {
    pub kind: EntityKind,
    pub parent: Option<EntityKind>,
    pub java_types: &'static [&'static str],
    /// Property ids this family owns. Ids in range without a handler are
    /// known and deliberately dropped.
    pub properties: RangeInclusive<u8>,
    pub handlers: HashMap<u8, MetadataHandler>,
    pub factory: Option<EntityFactory>,
    /// Added to the Java feet position on the Bedrock side.
    pub y_offset: f32,
}

impl KindDefinition {
    pub fn new(kind: EntityKind, properties: RangeInclusive<u8>) -> Self {
        Self {
            kind,
            parent: None,
            java_types: &[],
            properties,
            handlers: HashMap::new(),
            factory: None,
            y_offset: 0.0,
        }
    }

    pub fn parent(mut self, parent: EntityKind) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn java_types(mut self, types: &'static [&'static str]) -> Self {
        self.java_types = types;
        self
    }

    pub fn handler(mut self, index: u8, handler: MetadataHandler) -> Self {
        debug_assert!(self.properties.contains(&index));
        self.handlers.insert(index, handler);
        self
    }

    pub fn factory(mut self, factory: EntityFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn y_offset(mut self, offset: f32) -> Self {
        self.y_offset = offset;
        self
    }
}

/// Outcome of resolving a property id against a kind and its ancestors.
#[derive(Clone, Copy)]
pub enum PropertyLookup {
    Handled {
        owner: EntityKind,
        handler: MetadataHandler,
    },
    Ignored {
        owner: EntityKind,
    },
    Unknown,
}

/// Kind definitions keyed by kind, resolved once at startup.
#[derive(Default)]
pub struct EntityRegistry {
    kinds: HashMap<EntityKind, KindDefinition>,
    by_java_type: HashMap<&'static str, EntityKind>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every vanilla family.
    pub fn build() -> Result<Self, RegistrationError> {
        let mut registry = Self::new();
        for definition in super::kinds::vanilla() {
            registry.register(definition)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    pub fn register(&mut self, definition: KindDefinition) -> Result<(), RegistrationError> {
        if self.kinds.contains_key(&definition.kind) {
            return Err(RegistrationError::DuplicateKind(definition.kind));
        }
        for &name in definition.java_types {
            if self.by_java_type.contains_key(name) {
                return Err(RegistrationError::DuplicateJavaType(name));
            }
        }
        for &name in definition.java_types {
            self.by_java_type.insert(name, definition.kind);
        }
        self.kinds.insert(definition.kind, definition);
        Ok(())
    }

    /// Every parent must exist and no chain may loop.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        for definition in self.kinds.values() {
            let mut current = definition;
            let mut depth = 0;
            while let Some(parent) = current.parent {
                current = self.kinds.get(&parent).ok_or(RegistrationError::MissingParent {
                    kind: current.kind,
                    parent,
                })?;
                depth += 1;
                if depth > self.kinds.len() {
                    return Err(RegistrationError::CyclicKind(definition.kind));
                }
            }
        }
        Ok(())
    }

    pub fn definition(&self, kind: EntityKind) -> Option<&KindDefinition> {
        self.kinds.get(&kind)
    }

    pub fn kind_for_java_type(&self, name: &str) -> Option<EntityKind> {
        let path = name.strip_prefix("minecraft:").unwrap_or(name);
        self.by_java_type.get(path).copied()
    }

    /// The kind followed by each ancestor, nearest first.
    fn lineage(&self, kind: EntityKind) -> impl Iterator<Item = &KindDefinition> + '_ {
        std::iter::successors(self.kinds.get(&kind), |def| {
            def.parent.and_then(|parent| self.kinds.get(&parent))
        })
    }

    pub fn lookup(&self, kind: EntityKind, index: u8) -> PropertyLookup {
        for def in self.lineage(kind) {
            if def.properties.contains(&index) {
                return match def.handlers.get(&index) {
                    Some(&handler) => PropertyLookup::Handled {
                        owner: def.kind,
                        handler,
                    },
                    None => PropertyLookup::Ignored { owner: def.kind },
                };
            }
        }
        PropertyLookup::Unknown
    }

    /// Runs the factories from the root family down to `kind`.
    pub fn add_components(&self, kind: EntityKind, builder: &mut hecs::EntityBuilder) {
        let mut factories: Vec<EntityFactory> = self.lineage(kind).filter_map(|d| d.factory).collect();
        factories.reverse();
        for factory in factories {
            factory(builder);
        }
    }

    pub fn y_offset(&self, kind: EntityKind) -> f32 {
        self.lineage(kind)
            .map(|d| d.y_offset)
            .find(|offset| *offset != 0.0)
            .unwrap_or(0.0)
    }

    /// Apply one Java metadata entry. Unknown ids and wrongly typed values
    /// are dropped; neither stops the rest of the packet.
    pub fn apply(&self, kind: EntityKind, target: &mut MetadataTarget<'_>, entry: &MetadataEntry) {
        match self.lookup(kind, entry.index) {
            PropertyLookup::Handled { owner, handler } => {
                if let Err(e) = handler(target, &entry.value) {
                    warn!(
                        "Dropping metadata {} for {:?} (handled by {:?}): {}",
                        entry.index, kind, owner, e
                    );
                }
            }
            PropertyLookup::Ignored { .. } => {}
            PropertyLookup::Unknown => {
                debug!("Unknown metadata index {} for {:?}", entry.index, kind);
            }
        }
    }
}
