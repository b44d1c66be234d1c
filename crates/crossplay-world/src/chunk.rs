use crate::registry::{BlockView, AIR};
use bytes::{BufMut, BytesMut};
use crossplay_protocol::{read_i16, read_long_array, read_u8, read_varint, write_varint, CodecError, CodecResult};
use crossplay_types::{BlockPos, ChunkPos};
use std::collections::HashMap;
use tracing::debug;

/// Total number of sections in a chunk (from y=-64 to y=320, 384 blocks / 16 = 24 sections).
pub const SECTION_COUNT: usize = 24;
/// Minimum Y coordinate.
pub const MIN_Y: i32 = -64;

/// Palettes larger than this use global ids directly.
const MAX_INDIRECT_BLOCK_BITS: u8 = 8;
/// Direct entries are global ids and never wider than a u32.
const MAX_DIRECT_BITS: u8 = 32;
const MAX_INDIRECT_BIOME_BITS: u8 = 3;

/// A 16x16x16 chunk section holding canonical block state ids.
#[derive(Clone)]
pub struct ChunkSection {
    /// Block count (non-air) for the section.
    pub block_count: i16,
    /// Block state palette.
    pub palette: Vec<u32>,
    /// If palette has 1 entry: single-valued (no data array needed).
    /// If palette has >1 entry: indices into palette, packed into longs.
    pub block_data: Option<Vec<i64>>,
    /// Bits per entry for the block data.
    pub bits_per_entry: u8,
    /// Flat block state array for mutation. Populated on first set_block call.
    /// Layout: [y * 256 + z * 16 + x] = state_id
    blocks: Option<Box<[u32; 4096]>>,
}

impl ChunkSection {
    /// Create an empty (all air) section.
    pub fn empty() -> Self {
        Self::single_value(AIR)
    }

    /// Create a single-value section (all blocks are the same state ID).
    pub fn single_value(state_id: u32) -> Self {
        Self {
            block_count: if state_id == AIR { 0 } else { 4096 },
            palette: vec![state_id],
            block_data: None,
            bits_per_entry: 0,
            blocks: None,
        }
    }

    /// Decode a Java paletted section, remapping every id to its canonical form.
    pub fn read_from(buf: &mut BytesMut, view: &BlockView) -> CodecResult<Self> {
        let block_count = read_i16(buf)?;
        let bits = read_u8(buf)?;

        let section = if bits == 0 {
            let id = read_varint(buf)? as u32;
            // Single-valued containers still carry an (empty) data array.
            read_long_array(buf)?;
            let mut section = Self::single_value(view.to_canonical(id));
            section.block_count = block_count;
            section
        } else if bits <= MAX_INDIRECT_BLOCK_BITS {
            let bits = bits.max(4);
            let len = read_varint(buf)?;
            if len <= 0 {
                return Err(CodecError::InvalidPalette(format!("palette length {len}")));
            }
            let mut palette = Vec::with_capacity(len as usize);
            for _ in 0..len {
                palette.push(view.to_canonical(read_varint(buf)? as u32));
            }
            let data = read_long_array(buf)?;
            let expected = (4096 + (64 / bits as usize) - 1) / (64 / bits as usize);
            if data.len() < expected {
                return Err(CodecError::InvalidPalette(format!(
                    "{} longs for {} bits per entry",
                    data.len(),
                    bits
                )));
            }
            Self {
                block_count,
                palette,
                block_data: Some(data),
                bits_per_entry: bits,
                blocks: None,
            }
        } else {
            // Direct palette: entries are global ids, so expand and remap each one.
            if bits > MAX_DIRECT_BITS {
                return Err(CodecError::InvalidPalette(format!("{bits} bits per entry")));
            }
            let data = read_long_array(buf)?;
            let entries_per_long = 64 / bits as usize;
            if data.len() * entries_per_long < 4096 {
                return Err(CodecError::InvalidPalette(format!(
                    "{} longs for {} bits per entry",
                    data.len(),
                    bits
                )));
            }
            let mask = (1u64 << bits) - 1;
            let mut blocks = Box::new([AIR; 4096]);
            for (i, block) in blocks.iter_mut().enumerate() {
                let long_index = i / entries_per_long;
                let bit_index = (i % entries_per_long) * bits as usize;
                let id = ((data[long_index] as u64 >> bit_index) & mask) as u32;
                *block = view.to_canonical(id);
            }
            let mut section = Self::empty();
            section.blocks = Some(blocks);
            section.rebuild_palette();
            section
        };

        skip_biomes(buf)?;
        Ok(section)
    }

    /// Get a single block's state ID.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> u32 {
        let index = y * 256 + z * 16 + x;
        // If we have a flat blocks array, use it directly
        if let Some(ref blocks) = self.blocks {
            return blocks[index];
        }
        // Otherwise decode from palette
        if self.palette.len() == 1 {
            return self.palette[0];
        }
        if let Some(ref data) = self.block_data {
            let entries_per_long = 64 / self.bits_per_entry as usize;
            let long_index = index / entries_per_long;
            let bit_index = (index % entries_per_long) * self.bits_per_entry as usize;
            let mask = (1u64 << self.bits_per_entry) - 1;
            let palette_idx = ((data[long_index] as u64 >> bit_index) & mask) as usize;
            self.palette.get(palette_idx).copied().unwrap_or(AIR)
        } else {
            AIR
        }
    }

    /// Set a single block in this section. Returns the old state ID.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, state_id: u32) -> u32 {
        let index = y * 256 + z * 16 + x;
        let blocks = self.blocks_mut();
        let old = blocks[index];
        blocks[index] = state_id;
        self.rebuild_palette();
        old
    }

    /// Every block in `[y * 256 + z * 16 + x]` order.
    pub fn blocks(&self) -> Box<[u32; 4096]> {
        match self.blocks {
            Some(ref blocks) => blocks.clone(),
            None => {
                let mut blocks = Box::new([AIR; 4096]);
                for (i, block) in blocks.iter_mut().enumerate() {
                    *block = self.get_block(i % 16, i / 256, (i / 16) % 16);
                }
                blocks
            }
        }
    }

    /// Populate the flat blocks array from the palette encoding.
    fn blocks_mut(&mut self) -> &mut [u32; 4096] {
        if self.blocks.is_none() {
            self.blocks = Some(self.blocks());
        }
        self.blocks.get_or_insert_with(|| Box::new([AIR; 4096]))
    }

    /// Rebuild palette and packed data from the flat blocks array.
    fn rebuild_palette(&mut self) {
        let Some(blocks) = self.blocks.as_ref() else {
            return;
        };

        let mut palette = Vec::new();
        let mut palette_map = HashMap::new();
        let mut indices = [0u16; 4096];
        let mut block_count: i16 = 0;

        for (i, &state_id) in blocks.iter().enumerate() {
            if state_id != AIR {
                block_count += 1;
            }
            let idx = *palette_map.entry(state_id).or_insert_with(|| {
                let idx = palette.len();
                palette.push(state_id);
                idx
            });
            indices[i] = idx as u16;
        }

        self.block_count = block_count;

        if palette.len() == 1 {
            self.palette = palette;
            self.block_data = None;
            self.bits_per_entry = 0;
            return;
        }

        let bits_per_entry = std::cmp::max(4, (palette.len() as f64).log2().ceil() as u8);
        let entries_per_long = 64 / bits_per_entry as usize;
        let longs_needed = (4096 + entries_per_long - 1) / entries_per_long;
        let mask = (1u64 << bits_per_entry) - 1;

        let mut data = vec![0i64; longs_needed];
        for (i, &idx) in indices.iter().enumerate() {
            let long_index = i / entries_per_long;
            let bit_index = (i % entries_per_long) * bits_per_entry as usize;
            data[long_index] |= ((idx as u64 & mask) << bit_index) as i64;
        }

        self.palette = palette;
        self.block_data = Some(data);
        self.bits_per_entry = bits_per_entry;
    }

    /// Serialize in the Java section layout.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_i16(self.block_count);

        if self.bits_per_entry == 0 {
            buf.put_u8(0);
            write_varint(buf, self.palette[0] as i32);
            write_varint(buf, 0);
        } else {
            buf.put_u8(self.bits_per_entry);
            write_varint(buf, self.palette.len() as i32);
            for &entry in &self.palette {
                write_varint(buf, entry as i32);
            }
            let data = self.block_data.as_deref().unwrap_or(&[]);
            write_varint(buf, data.len() as i32);
            for &long in data {
                buf.put_i64(long);
            }
        }

        // Biomes: single-valued
        buf.put_u8(0);
        write_varint(buf, 0);
        write_varint(buf, 0);
    }
}

fn skip_biomes(buf: &mut BytesMut) -> CodecResult<()> {
    let bits = read_u8(buf)?;
    if bits == 0 {
        read_varint(buf)?;
    } else if bits <= MAX_INDIRECT_BIOME_BITS {
        let len = read_varint(buf)?;
        for _ in 0..len {
            read_varint(buf)?;
        }
    }
    read_long_array(buf)?;
    Ok(())
}

/// A full chunk column (24 sections).
#[derive(Clone)]
pub struct Chunk {
    pub sections: Vec<ChunkSection>,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            sections: (0..SECTION_COUNT).map(|_| ChunkSection::empty()).collect(),
        }
    }

    /// Decode a Java chunk payload (all sections, bottom to top).
    pub fn read_from(data: &[u8], view: &BlockView) -> CodecResult<Self> {
        let mut buf = BytesMut::from(data);
        let mut sections = Vec::with_capacity(SECTION_COUNT);
        for _ in 0..SECTION_COUNT {
            sections.push(ChunkSection::read_from(&mut buf, view)?);
        }
        Ok(Self { sections })
    }

    /// Serialize all sections into the chunk data byte array.
    pub fn serialize_sections(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for section in &self.sections {
            section.write_to(&mut buf);
        }
        buf.to_vec()
    }

    /// Get block state at chunk-local coordinates.
    /// local_x/local_z: 0..15, world_y: absolute world Y coordinate.
    pub fn get_block(&self, local_x: usize, world_y: i32, local_z: usize) -> u32 {
        if world_y < MIN_Y {
            return AIR;
        }
        let section_idx = ((world_y - MIN_Y) / 16) as usize;
        if section_idx >= SECTION_COUNT {
            return AIR;
        }
        let local_y = ((world_y - MIN_Y) % 16) as usize;
        self.sections[section_idx].get_block(local_x, local_y, local_z)
    }

    /// Set block state at chunk-local coordinates. Returns the old state ID.
    pub fn set_block(&mut self, local_x: usize, world_y: i32, local_z: usize, state_id: u32) -> u32 {
        if world_y < MIN_Y {
            return AIR;
        }
        let section_idx = ((world_y - MIN_Y) / 16) as usize;
        if section_idx >= SECTION_COUNT {
            return AIR;
        }
        let local_y = ((world_y - MIN_Y) % 16) as usize;
        self.sections[section_idx].set_block(local_x, local_y, local_z, state_id)
    }
}

/// Read access to canonical block states by world position.
pub trait BlockAccess {
    fn block_at(&self, pos: BlockPos) -> u32;
}

impl BlockAccess for HashMap<BlockPos, u32> {
    fn block_at(&self, pos: BlockPos) -> u32 {
        self.get(&pos).copied().unwrap_or(AIR)
    }
}

/// Per-session mirror of the chunks the server has sent.
pub struct ChunkCache {
    enabled: bool,
    chunks: HashMap<ChunkPos, Chunk>,
}

impl ChunkCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            chunks: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn insert(&mut self, pos: ChunkPos, chunk: Chunk) {
        if self.enabled {
            self.chunks.insert(pos, chunk);
        }
    }

    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn unload(&mut self, pos: ChunkPos) {
        if self.chunks.remove(&pos).is_some() {
            debug!("Unloaded chunk {}, {}", pos.x, pos.z);
        }
    }

    /// Updates a cached block. Blocks in chunks that were never sent are dropped.
    pub fn set_block(&mut self, pos: BlockPos, state_id: u32) {
        if let Some(chunk) = self.chunks.get_mut(&pos.chunk_pos()) {
            chunk.set_block(
                pos.x.rem_euclid(16) as usize,
                pos.y,
                pos.z.rem_euclid(16) as usize,
                state_id,
            );
        }
    }
}

impl BlockAccess for ChunkCache {
    fn block_at(&self, pos: BlockPos) -> u32 {
        match self.chunks.get(&pos.chunk_pos()) {
            Some(chunk) => chunk.get_block(
                pos.x.rem_euclid(16) as usize,
                pos.y,
                pos.z.rem_euclid(16) as usize,
            ),
            None => AIR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockRegistry;
    use crossplay_data::MappingData;
    use std::sync::Arc;

    fn view(version: u32) -> BlockView {
        let registry = Arc::new(BlockRegistry::build(&MappingData::bundled().unwrap()).unwrap());
        BlockView::new(registry, version).unwrap()
    }

    #[test]
    fn test_empty_section() {
        let section = ChunkSection::empty();
        assert_eq!(section.get_block(0, 0, 0), AIR);
        assert_eq!(section.block_count, 0);
    }

    #[test]
    fn test_set_block_rebuilds_palette() {
        let mut section = ChunkSection::empty();
        assert_eq!(section.set_block(3, 4, 5, 1), AIR);
        assert_eq!(section.get_block(3, 4, 5), 1);
        assert_eq!(section.get_block(5, 4, 3), AIR);
        assert_eq!(section.block_count, 1);
        assert_eq!(section.bits_per_entry, 4);
        assert_eq!(section.palette.len(), 2);
    }

    #[test]
    fn test_section_roundtrip_through_java_layout() {
        let mut section = ChunkSection::empty();
        for x in 0..16 {
            section.set_block(x, 0, 0, 1);
            section.set_block(x, 1, 2, 4);
        }
        let mut buf = BytesMut::new();
        section.write_to(&mut buf);

        let decoded = ChunkSection::read_from(&mut buf, &view(767)).unwrap();
        assert!(buf.is_empty());
        assert_eq!(decoded.get_block(7, 0, 0), 1);
        assert_eq!(decoded.get_block(7, 1, 2), 4);
        assert_eq!(decoded.get_block(7, 2, 2), AIR);
        assert_eq!(decoded.block_count, 32);
    }

    #[test]
    fn test_section_ids_are_remapped_on_decode() {
        // Legacy 1.20.1 id 13 is dirt_path.
        let mut section = ChunkSection::empty();
        section.set_block(0, 0, 0, 13);
        let mut buf = BytesMut::new();
        section.write_to(&mut buf);

        let view = view(763);
        let decoded = ChunkSection::read_from(&mut buf, &view).unwrap();
        let path = view.registry().find("minecraft:dirt_path", &[]).unwrap();
        assert_eq!(decoded.get_block(0, 0, 0), path);
    }

    #[test]
    fn test_direct_palette_decode() {
        let mut buf = BytesMut::new();
        buf.put_i16(4096);
        buf.put_u8(15);
        // 4 entries of 15 bits per long
        write_varint(&mut buf, 1024);
        for _ in 0..1024 {
            let long = 1u64 | (1u64 << 15) | (1u64 << 30) | (1u64 << 45);
            buf.put_i64(long as i64);
        }
        buf.put_u8(0);
        write_varint(&mut buf, 0);
        write_varint(&mut buf, 0);

        let decoded = ChunkSection::read_from(&mut buf, &view(767)).unwrap();
        assert_eq!(decoded.get_block(15, 15, 15), 1);
        assert_eq!(decoded.palette, vec![1]);
    }

    #[test]
    fn test_oversized_direct_entries_are_rejected() {
        for bits in [33u8, 64, 255] {
            let mut buf = BytesMut::new();
            buf.put_i16(4096);
            buf.put_u8(bits);
            write_varint(&mut buf, 4096);
            let result = ChunkSection::read_from(&mut buf, &view(767));
            assert!(matches!(result, Err(CodecError::InvalidPalette(_))), "{bits} bits");
        }
    }

    #[test]
    fn test_truncated_section_is_an_error() {
        let mut buf = BytesMut::from(&[0x00, 0x10, 0x04][..]);
        assert!(ChunkSection::read_from(&mut buf, &view(767)).is_err());
    }

    #[test]
    fn test_chunk_cache_lookup() {
        let view = view(767);
        let mut chunk = Chunk::new();
        chunk.set_block(1, 64, 2, 1);
        let data = chunk.serialize_sections();

        let mut cache = ChunkCache::new(true);
        cache.insert(ChunkPos::new(-1, 0), Chunk::read_from(&data, &view).unwrap());
        assert_eq!(cache.block_at(BlockPos::new(-15, 64, 2)), 1);
        assert_eq!(cache.block_at(BlockPos::new(-15, 65, 2)), AIR);
        assert_eq!(cache.block_at(BlockPos::new(100, 64, 2)), AIR);
        assert_eq!(cache.block_at(BlockPos::new(-15, -100, 2)), AIR);

        cache.set_block(BlockPos::new(-15, 65, 2), 4);
        assert_eq!(cache.block_at(BlockPos::new(-15, 65, 2)), 4);

        cache.unload(ChunkPos::new(-1, 0));
        assert_eq!(cache.block_at(BlockPos::new(-15, 64, 2)), AIR);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let mut cache = ChunkCache::new(false);
        cache.insert(ChunkPos::new(0, 0), Chunk::new());
        assert!(cache.is_empty());
    }
}
