//! Mapping data models: version list, canonical block states, collision
//! shapes and version-pair remap tables.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const VERSIONS_FILE: &str = "versions.json";
const BLOCKS_FILE: &str = "blocks.json";
const COLLISION_FILE: &str = "collision.json";
const REMAP_DIR: &str = "remap";

const BUNDLED_VERSIONS: &str = include_str!("../../../data/mappings/versions.json");
const BUNDLED_BLOCKS: &str = include_str!("../../../data/mappings/blocks.json");
const BUNDLED_COLLISION: &str = include_str!("../../../data/mappings/collision.json");

#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A supported Java protocol version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionEntry {
    pub protocol: u32,
    pub name: String,
}

/// A canonical (latest version) Java block state.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockStateEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    pub bedrock_id: u32,
    /// Index into the collision shape table.
    pub shape: usize,
}

/// Substitutions for one hop between two adjacent versions.
#[derive(Debug, Clone, Deserialize)]
pub struct RemapTable {
    pub from: u32,
    pub to: u32,
    pub blocks: HashMap<u32, u32>,
}

/// Each shape is a list of `[cx, cy, cz, sx, sy, sz]` boxes relative to the block origin.
pub type ShapeTable = Vec<Vec<[f64; 6]>>;

/// All mapping inputs needed to build a block registry.
#[derive(Debug, Clone)]
pub struct MappingData {
    /// Oldest first; the last entry is the canonical version.
    pub versions: Vec<VersionEntry>,
    pub blocks: Vec<BlockStateEntry>,
    pub shapes: ShapeTable,
    pub remaps: Vec<RemapTable>,
}

fn parse<T: serde::de::DeserializeOwned>(file: &str, contents: &str) -> Result<T, DataError> {
    serde_json::from_str(contents).map_err(|source| DataError::Json {
        file: file.to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl MappingData {
    /// The mapping files compiled into the binary.
    pub fn bundled() -> Result<Self, DataError> {
        let mut remaps = Vec::with_capacity(crate::BUNDLED_REMAPS.len());
        for (name, contents) in crate::BUNDLED_REMAPS {
            remaps.push(parse(name, contents)?);
        }
        Ok(Self {
            versions: parse(VERSIONS_FILE, BUNDLED_VERSIONS)?,
            blocks: parse(BLOCKS_FILE, BUNDLED_BLOCKS)?,
            shapes: parse(COLLISION_FILE, BUNDLED_COLLISION)?,
            remaps,
        })
    }

    /// Load the same layout from a directory on disk.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        let versions: Vec<VersionEntry> = parse(VERSIONS_FILE, &read(&dir.join(VERSIONS_FILE))?)?;
        let blocks: Vec<BlockStateEntry> = parse(BLOCKS_FILE, &read(&dir.join(BLOCKS_FILE))?)?;
        let shapes: ShapeTable = parse(COLLISION_FILE, &read(&dir.join(COLLISION_FILE))?)?;

        let remap_dir = dir.join(REMAP_DIR);
        let mut entries: Vec<_> = std::fs::read_dir(&remap_dir)
            .map_err(|source| DataError::Io {
                path: remap_dir.clone(),
                source,
            })?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut remaps = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            remaps.push(parse(&name, &read(&path)?)?);
        }

        debug!(
            "Loaded mappings from {}: {} versions, {} block states, {} remap tables",
            dir.display(),
            versions.len(),
            blocks.len(),
            remaps.len()
        );

        Ok(Self {
            versions,
            blocks,
            shapes,
            remaps,
        })
    }

    pub fn canonical_version(&self) -> Option<u32> {
        self.versions.last().map(|v| v.protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_mappings_parse() {
        let data = MappingData::bundled().unwrap();
        assert_eq!(data.canonical_version(), Some(767));
        assert_eq!(data.versions.len(), 3);
        assert_eq!(data.remaps.len(), 2);
        assert!(data.blocks.iter().enumerate().all(|(i, b)| b.id as usize == i));
        assert!(data.blocks.iter().all(|b| b.shape < data.shapes.len()));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERSIONS_FILE), BUNDLED_VERSIONS).unwrap();
        std::fs::write(dir.path().join(BLOCKS_FILE), BUNDLED_BLOCKS).unwrap();
        std::fs::write(dir.path().join(COLLISION_FILE), "[[], [[0.5, 0.5, 0.5, 1, 1, 1]]]").unwrap();
        std::fs::create_dir(dir.path().join(REMAP_DIR)).unwrap();
        std::fs::write(
            dir.path().join(REMAP_DIR).join("765_767.json"),
            r#"{"from": 765, "to": 767, "blocks": {"3": 4}}"#,
        )
        .unwrap();

        let data = MappingData::load(dir.path()).unwrap();
        assert_eq!(data.shapes.len(), 2);
        assert_eq!(data.remaps[0].blocks.get(&3), Some(&4));
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERSIONS_FILE), "{ not json").unwrap();
        match MappingData::load(dir.path()) {
            Err(DataError::Json { file, .. }) => assert_eq!(file, VERSIONS_FILE),
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_reports_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MappingData::load(&dir.path().join("nope")),
            Err(DataError::Io { .. })
        ));
    }
}
