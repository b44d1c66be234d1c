use crossplay_data::MappingData;
use crossplay_types::{BoundingBox, Direction};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Canonical id of air.
pub const AIR: u32 = 0;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no versions defined")]
    NoVersions,
    #[error("versions are not strictly increasing at protocol {0}")]
    UnorderedVersions(u32),
    #[error("remap table {from} -> {to} does not join two adjacent versions")]
    NonAdjacentRemap { from: u32, to: u32 },
    #[error("duplicate remap table {from} -> {to}")]
    DuplicateRemap { from: u32, to: u32 },
    #[error("block state {found} listed at index {expected}")]
    UnorderedBlockStates { expected: usize, found: u32 },
    #[error("block state {id} uses unknown shape {shape}")]
    UnknownShape { id: u32, shape: usize },
    #[error("legacy id {legacy} of protocol {version} remaps to unknown block state {target}")]
    InvalidRemapTarget { version: u32, legacy: u32, target: u32 },
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Scaffolding,
    DirtPath,
}

/// Selects the collision correction branch for a block state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionBehavior {
    Plain,
    /// Snow layers: hitbox height depends on the layer count.
    StepHazard { layers: u8 },
    /// Doors: hitbox side depends on facing and open state.
    Directional { facing: Direction, open: bool },
    /// Needs a position nudge before the main correction.
    SurfaceAdjust(SurfaceKind),
    None,
}

#[derive(Debug, Clone)]
pub struct BlockState {
    pub id: u32,
    pub name: String,
    pub properties: BTreeMap<String, String>,
    pub bedrock_id: u32,
    pub boxes: Vec<BoundingBox>,
    pub behavior: CollisionBehavior,
}

impl BlockState {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// A legacy-to-canonical mapping for one server version, flattened from
/// every hop between that version and the canonical one.
#[derive(Debug, Default)]
pub struct RemapChain {
    pub version: u32,
    pub hops: usize,
    map: HashMap<u32, u32>,
}

impl RemapChain {
    pub fn remap(&self, legacy: u32) -> u32 {
        self.map.get(&legacy).copied().unwrap_or(legacy)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Immutable after [`BlockRegistry::build`]; shared by every session.
#[derive(Debug)]
pub struct BlockRegistry {
    states: Vec<BlockState>,
    by_name: HashMap<String, Vec<u32>>,
    chains: HashMap<u32, Arc<RemapChain>>,
    canonical_version: u32,
}

fn snow_boxes(layers: u8) -> Vec<BoundingBox> {
    // You sink one layer into snow, so the hitbox is one layer shorter.
    if layers > 1 {
        let height = (layers - 1) as f64 * 0.125;
        vec![BoundingBox::new(0.5, height / 2.0, 0.5, 1.0, height, 1.0)]
    } else {
        Vec::new()
    }
}

fn derive_behavior(name: &str, properties: &BTreeMap<String, String>, has_boxes: bool) -> CollisionBehavior {
    let path = name.strip_prefix("minecraft:").unwrap_or(name);
    match path {
        "snow" => {
            let layers = properties
                .get("layers")
                .and_then(|l| l.parse().ok())
                .unwrap_or(1);
            CollisionBehavior::StepHazard { layers }
        }
        "scaffolding" => CollisionBehavior::SurfaceAdjust(SurfaceKind::Scaffolding),
        "dirt_path" | "grass_path" => CollisionBehavior::SurfaceAdjust(SurfaceKind::DirtPath),
        _ if path.ends_with("_door") => {
            match properties.get("facing").and_then(|f| Direction::from_name(f)) {
                Some(facing) => CollisionBehavior::Directional {
                    facing,
                    open: properties.get("open").is_some_and(|o| o == "true"),
                },
                None => {
                    warn!("Door {} has no horizontal facing, treating as plain", name);
                    CollisionBehavior::Plain
                }
            }
        }
        _ if !has_boxes => CollisionBehavior::None,
        _ => CollisionBehavior::Plain,
    }
}

impl BlockRegistry {
    /// Validate the mapping data and build the shared registry.
    pub fn build(data: &MappingData) -> Result<Self, RegistryError> {
        let versions: Vec<u32> = data.versions.iter().map(|v| v.protocol).collect();
        let canonical_version = *versions.last().ok_or(RegistryError::NoVersions)?;
        for pair in versions.windows(2) {
            if pair[1] <= pair[0] {
                return Err(RegistryError::UnorderedVersions(pair[1]));
            }
        }

        let mut states = Vec::with_capacity(data.blocks.len());
        let mut by_name: HashMap<String, Vec<u32>> = HashMap::new();
        for (index, entry) in data.blocks.iter().enumerate() {
            if entry.id as usize != index {
                return Err(RegistryError::UnorderedBlockStates {
                    expected: index,
                    found: entry.id,
                });
            }
            let shape = data.shapes.get(entry.shape).ok_or(RegistryError::UnknownShape {
                id: entry.id,
                shape: entry.shape,
            })?;
            let mut boxes: Vec<BoundingBox> = shape.iter().map(|b| BoundingBox::from_array(*b)).collect();
            for b in &boxes {
                if b.is_degenerate() {
                    warn!("Block state {} ({}) has a degenerate collision box {:?}", entry.id, entry.name, b);
                }
            }
            let behavior = derive_behavior(&entry.name, &entry.properties, !boxes.is_empty());
            if let CollisionBehavior::StepHazard { layers } = behavior {
                boxes = snow_boxes(layers);
            }
            by_name.entry(entry.name.clone()).or_default().push(entry.id);
            states.push(BlockState {
                id: entry.id,
                name: entry.name.clone(),
                properties: entry.properties.clone(),
                bedrock_id: entry.bedrock_id,
                boxes,
                behavior,
            });
        }

        // Index tables by source version, one per adjacent pair.
        let mut tables: HashMap<u32, &HashMap<u32, u32>> = HashMap::new();
        for table in &data.remaps {
            let adjacent = versions
                .windows(2)
                .any(|pair| pair[0] == table.from && pair[1] == table.to);
            if !adjacent {
                return Err(RegistryError::NonAdjacentRemap {
                    from: table.from,
                    to: table.to,
                });
            }
            if tables.insert(table.from, &table.blocks).is_some() {
                return Err(RegistryError::DuplicateRemap {
                    from: table.from,
                    to: table.to,
                });
            }
        }

        let mut chains = HashMap::with_capacity(versions.len());
        for (start, &version) in versions.iter().enumerate() {
            let hops: Vec<&HashMap<u32, u32>> = versions[start..versions.len() - 1]
                .iter()
                .filter_map(|v| tables.get(v).copied())
                .collect();

            // Ids absent from every hop pass through unchanged, so only the
            // union of the table keys needs a flattened entry.
            let keys: HashSet<u32> = hops.iter().flat_map(|t| t.keys().copied()).collect();
            let mut map = HashMap::with_capacity(keys.len());
            for legacy in keys {
                let target = hops
                    .iter()
                    .fold(legacy, |id, table| table.get(&id).copied().unwrap_or(id));
                if target as usize >= states.len() {
                    return Err(RegistryError::InvalidRemapTarget {
                        version,
                        legacy,
                        target,
                    });
                }
                if target != legacy {
                    map.insert(legacy, target);
                }
            }
            debug!(
                "Remap chain for protocol {}: {} hops, {} remapped ids",
                version,
                hops.len(),
                map.len()
            );
            chains.insert(
                version,
                Arc::new(RemapChain {
                    version,
                    hops: hops.len(),
                    map,
                }),
            );
        }

        Ok(Self {
            states,
            by_name,
            chains,
            canonical_version,
        })
    }

    pub fn canonical_version(&self) -> u32 {
        self.canonical_version
    }

    pub fn is_supported(&self, version: u32) -> bool {
        self.chains.contains_key(&version)
    }

    pub fn chain(&self, version: u32) -> Result<Arc<RemapChain>, RegistryError> {
        self.chains
            .get(&version)
            .cloned()
            .ok_or(RegistryError::UnsupportedVersion(version))
    }

    /// Walk a legacy id of the given server version forward to its canonical id.
    pub fn remap_legacy_id(&self, version: u32, legacy: u32) -> Result<u32, RegistryError> {
        Ok(self.chain(version)?.remap(legacy))
    }

    pub fn state(&self, id: u32) -> Option<&BlockState> {
        self.states.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn bounding_boxes_for(&self, id: u32) -> &[BoundingBox] {
        self.state(id).map(|s| s.boxes.as_slice()).unwrap_or(&[])
    }

    /// Unknown ids have no collision.
    pub fn collision_behavior(&self, id: u32) -> CollisionBehavior {
        self.state(id)
            .map(|s| s.behavior)
            .unwrap_or(CollisionBehavior::None)
    }

    pub fn bedrock_runtime_id(&self, id: u32) -> u32 {
        match self.state(id) {
            Some(state) => state.bedrock_id,
            None => self.states.first().map(|air| air.bedrock_id).unwrap_or(0),
        }
    }

    /// Find a state by name and a subset of its properties.
    pub fn find(&self, name: &str, properties: &[(&str, &str)]) -> Option<u32> {
        self.by_name.get(name)?.iter().copied().find(|&id| {
            let state = &self.states[id as usize];
            properties
                .iter()
                .all(|(k, v)| state.property(k) == Some(*v))
        })
    }
}

/// A session's view of the registry, bound to the connected server version.
#[derive(Debug, Clone)]
pub struct BlockView {
    registry: Arc<BlockRegistry>,
    chain: Arc<RemapChain>,
}

impl BlockView {
    pub fn new(registry: Arc<BlockRegistry>, version: u32) -> Result<Self, RegistryError> {
        let chain = registry.chain(version)?;
        Ok(Self { registry, chain })
    }

    pub fn version(&self) -> u32 {
        self.chain.version
    }

    pub fn to_canonical(&self, legacy: u32) -> u32 {
        self.chain.remap(legacy)
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplay_data::{BlockStateEntry, RemapTable, VersionEntry};

    fn bundled() -> BlockRegistry {
        BlockRegistry::build(&MappingData::bundled().unwrap()).unwrap()
    }

    fn entry(id: u32, name: &str, shape: usize) -> BlockStateEntry {
        BlockStateEntry {
            id,
            name: name.to_string(),
            properties: BTreeMap::new(),
            bedrock_id: id + 100,
            shape,
        }
    }

    fn small_data() -> MappingData {
        MappingData {
            versions: vec![
                VersionEntry { protocol: 1, name: "a".into() },
                VersionEntry { protocol: 2, name: "b".into() },
                VersionEntry { protocol: 3, name: "c".into() },
            ],
            blocks: (0..6).map(|i| entry(i, "minecraft:stone", 1)).collect(),
            shapes: vec![vec![], vec![[0.5, 0.5, 0.5, 1.0, 1.0, 1.0]]],
            remaps: vec![
                RemapTable { from: 1, to: 2, blocks: HashMap::from([(1, 2), (4, 5)]) },
                RemapTable { from: 2, to: 3, blocks: HashMap::from([(2, 3), (5, 4)]) },
            ],
        }
    }

    #[test]
    fn test_chain_walks_every_hop_in_order() {
        let registry = BlockRegistry::build(&small_data()).unwrap();
        // 1 -> 2 -> 3
        assert_eq!(registry.remap_legacy_id(1, 1).unwrap(), 3);
        // 4 -> 5 -> 4
        assert_eq!(registry.remap_legacy_id(1, 4).unwrap(), 4);
        // Starting one hop later only applies the last table.
        assert_eq!(registry.remap_legacy_id(2, 1).unwrap(), 1);
        assert_eq!(registry.remap_legacy_id(2, 2).unwrap(), 3);
        assert_eq!(registry.chain(1).unwrap().hops, 2);
        assert_eq!(registry.chain(3).unwrap().hops, 0);
    }

    #[test]
    fn test_missing_entries_pass_through() {
        let registry = BlockRegistry::build(&small_data()).unwrap();
        assert_eq!(registry.remap_legacy_id(1, 0).unwrap(), 0);
        assert_eq!(registry.remap_legacy_id(1, 3).unwrap(), 3);
    }

    #[test]
    fn test_missing_hop_table_is_passthrough() {
        let mut data = small_data();
        data.remaps.remove(0);
        let registry = BlockRegistry::build(&data).unwrap();
        assert_eq!(registry.remap_legacy_id(1, 1).unwrap(), 1);
        assert_eq!(registry.remap_legacy_id(1, 2).unwrap(), 3);
    }

    #[test]
    fn test_unsupported_version() {
        let registry = BlockRegistry::build(&small_data()).unwrap();
        assert!(matches!(
            registry.remap_legacy_id(99, 1),
            Err(RegistryError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_build_rejects_bad_data() {
        let mut data = small_data();
        data.remaps.push(RemapTable { from: 1, to: 3, blocks: HashMap::new() });
        assert!(matches!(
            BlockRegistry::build(&data),
            Err(RegistryError::NonAdjacentRemap { from: 1, to: 3 })
        ));

        let mut data = small_data();
        data.remaps[1].blocks.insert(0, 40);
        assert!(matches!(
            BlockRegistry::build(&data),
            Err(RegistryError::InvalidRemapTarget { target: 40, .. })
        ));

        let mut data = small_data();
        data.blocks[2].shape = 9;
        assert!(matches!(
            BlockRegistry::build(&data),
            Err(RegistryError::UnknownShape { id: 2, shape: 9 })
        ));

        let mut data = small_data();
        data.versions.swap(0, 1);
        assert!(matches!(BlockRegistry::build(&data), Err(RegistryError::UnorderedVersions(_))));
    }

    #[test]
    fn test_canonical_ids_are_fixed_points_for_every_version() {
        let registry = bundled();
        let canonical = registry.canonical_version();
        for version in [763, 765, 767] {
            for legacy in 0..registry.len() as u32 {
                let id = registry.remap_legacy_id(version, legacy).unwrap();
                assert_eq!(registry.remap_legacy_id(canonical, id).unwrap(), id);
            }
        }
    }

    #[test]
    fn test_bundled_chain_moves_doors_and_paths() {
        let registry = bundled();
        let path = registry.find("minecraft:dirt_path", &[]).unwrap();
        // dirt_path sat after the snow layers in 1.20.1.
        assert_eq!(registry.remap_legacy_id(763, 13).unwrap(), path);
        let door = registry
            .find("minecraft:oak_door", &[("facing", "north"), ("half", "lower"), ("open", "false")])
            .unwrap();
        assert_eq!(registry.remap_legacy_id(765, 20).unwrap(), door);
        assert_eq!(registry.remap_legacy_id(763, 20).unwrap(), door);
    }

    #[test]
    fn test_snow_boxes() {
        let registry = bundled();
        let one = registry.find("minecraft:snow", &[("layers", "1")]).unwrap();
        assert!(registry.bounding_boxes_for(one).is_empty());
        assert_eq!(registry.collision_behavior(one), CollisionBehavior::StepHazard { layers: 1 });

        let eight = registry.find("minecraft:snow", &[("layers", "8")]).unwrap();
        let boxes = registry.bounding_boxes_for(eight);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].size_y, 7.0 * 0.125);
        assert_eq!(boxes[0].min(crossplay_types::Axis::Y), 0.0);
    }

    #[test]
    fn test_behavior_tags() {
        let registry = bundled();
        let stone = registry.find("minecraft:stone", &[]).unwrap();
        assert_eq!(registry.collision_behavior(stone), CollisionBehavior::Plain);
        assert_eq!(registry.collision_behavior(AIR), CollisionBehavior::None);
        let door = registry
            .find("minecraft:oak_door", &[("facing", "east"), ("open", "true")])
            .unwrap();
        assert_eq!(
            registry.collision_behavior(door),
            CollisionBehavior::Directional { facing: Direction::East, open: true }
        );
        let scaffolding = registry.find("minecraft:scaffolding", &[]).unwrap();
        assert_eq!(
            registry.collision_behavior(scaffolding),
            CollisionBehavior::SurfaceAdjust(SurfaceKind::Scaffolding)
        );
        assert_eq!(registry.collision_behavior(9999), CollisionBehavior::None);
        assert!(registry.bounding_boxes_for(9999).is_empty());
    }

    #[test]
    fn test_block_view() {
        let registry = Arc::new(bundled());
        let view = BlockView::new(registry.clone(), 763).unwrap();
        assert_eq!(view.to_canonical(13), registry.find("minecraft:dirt_path", &[]).unwrap());
        assert!(BlockView::new(registry, 1).is_err());
    }
}
