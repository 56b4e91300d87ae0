//! Payload formats of the two chunk messages.
//!
//! All integers are little-endian.
//!
//! | Message | Layout |
//! |---------|--------|
//! | request | `chunk_x: i32`, `chunk_z: i32` |
//! | data    | `chunk_x: i32`, `chunk_z: i32`, `blocks: [u8; 65536]` |
//!
//! Each block byte is a [`BlockType`] ordinal, flattened as
//! `x + 16 * (z + 16 * y)`.

use log::warn;

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{BlockGrid, ChunkCoord, CHUNK_VOLUME};
use crate::engine_state::voxels::generation::flat_blocks;
use crate::error::DecodeError;

const COORD_BYTES: usize = 8;

/// A decoded chunk data message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkData {
    /// Which chunk the blocks belong to
    pub coord: ChunkCoord,
    /// Every block of the chunk
    pub blocks: BlockGrid,
}

fn write_coord(out: &mut Vec<u8>, coord: ChunkCoord) {
    out.extend_from_slice(&coord.x.to_le_bytes());
    out.extend_from_slice(&coord.z.to_le_bytes());
}

fn read_coord(bytes: &[u8]) -> Result<ChunkCoord, DecodeError> {
    if bytes.len() < COORD_BYTES {
        return Err(DecodeError::TooShort {
            expected: COORD_BYTES,
            actual: bytes.len(),
        });
    }
    let x = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let z = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    Ok(ChunkCoord::new(x, z))
}

/// Payload of a [`super::packet::MsgId::ChunkRequest`]: the chunk x and z as `i32` LE.
pub fn encode_chunk_request(coord: ChunkCoord) -> Vec<u8> {
    let mut out = Vec::with_capacity(COORD_BYTES);
    write_coord(&mut out, coord);
    out
}

/// Reads a chunk request payload.
///
/// # Errors
/// [`DecodeError::TooShort`] if fewer than 8 bytes arrive.
pub fn decode_chunk_request(bytes: &[u8]) -> Result<ChunkCoord, DecodeError> {
    read_coord(bytes)
}

/// Serializes a chunk's blocks with their coordinate.
pub fn encode_chunk_data(coord: ChunkCoord, blocks: &BlockGrid) -> Vec<u8> {
    let mut out = Vec::with_capacity(COORD_BYTES + CHUNK_VOLUME);
    write_coord(&mut out, coord);
    out.extend(blocks.as_slice().iter().map(|block_type| block_type.ordinal()));
    out
}

/// Parses a chunk data payload.
///
/// # Errors
/// * [`DecodeError::TooShort`] if the coordinate header is cut off
/// * [`DecodeError::LengthMismatch`] unless exactly 65536 block bytes follow
/// * [`DecodeError::UnknownBlockType`] for a byte that names no block type
pub fn decode_chunk_data(bytes: &[u8]) -> Result<ChunkData, DecodeError> {
    let coord = read_coord(bytes)?;
    let body = &bytes[COORD_BYTES..];
    if body.len() != CHUNK_VOLUME {
        warn!(
            "Chunk payload for {coord} carries {} block bytes instead of {CHUNK_VOLUME}",
            body.len()
        );
        return Err(DecodeError::LengthMismatch {
            expected: CHUNK_VOLUME,
            actual: body.len(),
        });
    }

    let blocks = body
        .iter()
        .enumerate()
        .map(|(index, ordinal)| {
            BlockType::from_ordinal(*ordinal).ok_or(DecodeError::UnknownBlockType {
                ordinal: *ordinal,
                index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let blocks = BlockGrid::from_vec(blocks).ok_or(DecodeError::LengthMismatch {
        expected: CHUNK_VOLUME,
        actual: body.len(),
    })?;

    Ok(ChunkData { coord, blocks })
}

/// The chunk data payload a flat-world authority answers every request with.
pub fn flat_chunk_payload(coord: ChunkCoord) -> Vec<u8> {
    encode_chunk_data(coord, &flat_blocks())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_payload_layout() {
        let payload = flat_chunk_payload(ChunkCoord::new(-2, 7));
        assert_eq!(payload.len(), COORD_BYTES + CHUNK_VOLUME);
        assert_eq!(&payload[0..4], &(-2i32).to_le_bytes());
        assert_eq!(&payload[4..8], &7i32.to_le_bytes());
        // y = 0 is bedrock, y = 63 is grass
        assert_eq!(payload[COORD_BYTES], BlockType::Bedrock.ordinal());
        assert_eq!(payload[COORD_BYTES + 63 * 256 + 5], BlockType::Grass.ordinal());
        assert_eq!(payload[COORD_BYTES + 64 * 256], BlockType::Air.ordinal());

        let decoded = decode_chunk_data(&payload).unwrap();
        assert_eq!(decoded.coord, ChunkCoord::new(-2, 7));
        assert_eq!(decoded.blocks, flat_blocks());
    }

    #[test]
    fn truncated_payloads_are_rejected() {
        assert_eq!(
            decode_chunk_data(&[1, 2, 3]),
            Err(DecodeError::TooShort { expected: 8, actual: 3 })
        );
        let mut payload = flat_chunk_payload(ChunkCoord::new(0, 0));
        payload.pop();
        assert_eq!(
            decode_chunk_data(&payload),
            Err(DecodeError::LengthMismatch {
                expected: CHUNK_VOLUME,
                actual: CHUNK_VOLUME - 1
            })
        );
    }

    #[test]
    fn unknown_ordinals_are_rejected() {
        let mut payload = flat_chunk_payload(ChunkCoord::new(0, 0));
        payload[COORD_BYTES + 300] = 200;
        assert_eq!(
            decode_chunk_data(&payload),
            Err(DecodeError::UnknownBlockType { ordinal: 200, index: 300 })
        );
    }

    #[test]
    fn request_round_trip() {
        let bytes = encode_chunk_request(ChunkCoord::new(i32::MIN, 42));
        assert_eq!(decode_chunk_request(&bytes), Ok(ChunkCoord::new(i32::MIN, 42)));
    }
}
