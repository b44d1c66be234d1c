use crate::session::Session;
use anyhow::Context;
use crossplay_protocol::bedrock::{update_block_flags, LevelChunk, SubChunk, UpdateBlock};
use crossplay_protocol::java::{BlockUpdate, ChunkData, UnloadChunk};
use crossplay_types::ChunkPos;
use crossplay_world::{BlockRegistry, Chunk, ChunkSection, MIN_Y};
use std::collections::HashMap;

/// Lowest sub-chunk index; sections start at y = -64.
const FIRST_SUB_CHUNK: i8 = (MIN_Y / 16) as i8;

/// Re-encodes a section in Bedrock runtime ids and XZY index order.
fn to_sub_chunk(registry: &BlockRegistry, section: &ChunkSection, y_index: i8) -> SubChunk {
    let blocks = section.blocks();
    let mut palette = Vec::new();
    let mut palette_index: HashMap<u32, u16> = HashMap::new();
    let mut indices = vec![0u16; 4096];
    for x in 0..16 {
        for z in 0..16 {
            for y in 0..16 {
                let bedrock_id = registry.bedrock_runtime_id(blocks[(y << 8) | (z << 4) | x]);
                let index = *palette_index.entry(bedrock_id).or_insert_with(|| {
                    palette.push(bedrock_id);
                    (palette.len() - 1) as u16
                });
                indices[(x << 8) | (z << 4) | y] = index;
            }
        }
    }
    SubChunk {
        y_index,
        palette,
        indices,
    }
}

pub(super) fn translate_chunk(session: &mut Session, packet: &ChunkData) -> anyhow::Result<()> {
    let chunk = Chunk::read_from(&packet.data, session.block_view())
        .with_context(|| format!("decoding chunk {}, {}", packet.chunk_x, packet.chunk_z))?;

    let registry = session.block_registry();
    let sub_chunks = chunk
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| to_sub_chunk(registry, section, FIRST_SUB_CHUNK + i as i8))
        .collect();

    session
        .chunk_cache_mut()
        .insert(ChunkPos::new(packet.chunk_x, packet.chunk_z), chunk);
    session.send_upstream_packet(LevelChunk {
        chunk_x: packet.chunk_x,
        chunk_z: packet.chunk_z,
        sub_chunks,
    });
    Ok(())
}

pub(super) fn translate_unload(session: &mut Session, packet: &UnloadChunk) -> anyhow::Result<()> {
    session
        .chunk_cache_mut()
        .unload(ChunkPos::new(packet.chunk_x, packet.chunk_z));
    Ok(())
}

pub(super) fn translate_block_update(session: &mut Session, packet: &BlockUpdate) -> anyhow::Result<()> {
    let canonical = session.block_view().to_canonical(packet.block_state as u32);
    let runtime_id = session.block_registry().bedrock_runtime_id(canonical);
    session.chunk_cache_mut().set_block(packet.position, canonical);
    session.send_upstream_packet(UpdateBlock {
        position: packet.position,
        runtime_id,
        flags: update_block_flags::NEIGHBORS | update_block_flags::NETWORK,
        layer: 0,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{registries, test_session};
    use crate::session::SessionConfig;
    use crossplay_protocol::bedrock::BedrockPacket;
    use crossplay_types::BlockPos;
    use crossplay_world::{BlockAccess, SECTION_COUNT};
    use uuid::Uuid;

    #[test]
    fn test_chunk_is_cached_and_forwarded() {
        let mut session = test_session();
        let stone = session.block_registry().find("minecraft:stone", &[]).unwrap();
        let mut chunk = Chunk::new();
        chunk.set_block(1, 64, 2, stone);

        translate_chunk(
            &mut session,
            &ChunkData {
                chunk_x: 0,
                chunk_z: 0,
                data: chunk.serialize_sections(),
            },
        )
        .unwrap();
        assert_eq!(session.chunk_cache().block_at(BlockPos::new(1, 64, 2)), stone);

        let packets = session.take_upstream();
        let BedrockPacket::LevelChunk(level) = &packets[0] else {
            panic!("expected a level chunk");
        };
        assert_eq!(level.sub_chunks.len(), SECTION_COUNT);
        assert_eq!(level.sub_chunks[0].y_index, -4);

        // y = 64 is section 8, local y 0.
        let sub = &level.sub_chunks[8];
        let stone_bedrock = session.block_registry().bedrock_runtime_id(stone);
        let index = sub.indices[(1 << 8) | (2 << 4)] as usize;
        assert_eq!(sub.palette[index], stone_bedrock);
        assert_eq!(sub.palette.len(), 2);
    }

    #[test]
    fn test_legacy_block_update_is_remapped() {
        let config = SessionConfig {
            protocol_version: 763,
            cache_chunks: true,
        };
        let mut session = Session::new(1, Uuid::new_v4(), &config, &registries()).unwrap();
        translate_chunk(
            &mut session,
            &ChunkData {
                chunk_x: 0,
                chunk_z: 0,
                data: Chunk::new().serialize_sections(),
            },
        )
        .unwrap();
        session.take_upstream();

        // Legacy 1.20.1 id 13 is dirt_path.
        translate_block_update(
            &mut session,
            &BlockUpdate {
                position: BlockPos::new(3, 60, 3),
                block_state: 13,
            },
        )
        .unwrap();
        let path = session.block_registry().find("minecraft:dirt_path", &[]).unwrap();
        assert_eq!(session.chunk_cache().block_at(BlockPos::new(3, 60, 3)), path);
        let packets = session.take_upstream();
        assert!(matches!(
            &packets[0],
            BedrockPacket::UpdateBlock(u) if u.runtime_id == session.block_registry().bedrock_runtime_id(path)
        ));
    }

    #[test]
    fn test_truncated_chunk_fails() {
        let mut session = test_session();
        let result = translate_chunk(
            &mut session,
            &ChunkData {
                chunk_x: 0,
                chunk_z: 0,
                data: vec![0, 1],
            },
        );
        assert!(result.is_err());
        assert!(session.chunk_cache().is_empty());
    }

    #[test]
    fn test_unload_forgets_blocks() {
        let mut session = test_session();
        translate_chunk(
            &mut session,
            &ChunkData {
                chunk_x: 2,
                chunk_z: 2,
                data: Chunk::new().serialize_sections(),
            },
        )
        .unwrap();
        assert_eq!(session.chunk_cache().len(), 1);
        translate_unload(&mut session, &UnloadChunk { chunk_x: 2, chunk_z: 2 }).unwrap();
        assert!(session.chunk_cache().is_empty());
    }
}
