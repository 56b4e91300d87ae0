//! # Network
//!
//! Chunk replication between an authority that owns the world and clients
//! that stream it. Only the byte formats live here; sockets and sessions are
//! left to the embedding application, which plugs in through
//! [`ChunkRequester`] and feeds received bytes to a [`packet::PacketReader`].

pub mod chunk_codec;
pub mod packet;

pub use chunk_codec::{
    decode_chunk_data, decode_chunk_request, encode_chunk_data, encode_chunk_request, flat_chunk_payload, ChunkData,
};
pub use packet::{MsgId, Packet, PacketReader};

use crate::engine_state::voxels::chunk::ChunkCoord;
use crate::error::DecodeError;

/// Sends chunk requests to the remote authority.
///
/// Implementations must not block; the answer arrives later through
/// [`crate::engine_state::voxels::world::VoxelWorld::apply_chunk_payload`].
pub trait ChunkRequester: Send + Sync {
    fn request_chunk(&self, coord: ChunkCoord);
}

/// Builds the request packet for one chunk.
pub fn chunk_request_packet(coord: ChunkCoord) -> Packet {
    Packet::new(MsgId::ChunkRequest, encode_chunk_request(coord))
}

/// Answers a packet the way the flat-world authority does.
///
/// # Returns
/// A chunk data packet for a chunk request; `None` for anything else.
pub fn serve_flat_request(packet: &Packet) -> Result<Option<Packet>, DecodeError> {
    match packet.msg_id {
        MsgId::ChunkRequest => {
            let coord = decode_chunk_request(&packet.payload)?;
            Ok(Some(Packet::new(MsgId::ChunkData, flat_chunk_payload(coord))))
        }
        MsgId::ChunkData => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_authority_answers_requests() {
        let request = chunk_request_packet(ChunkCoord::new(4, -9));
        let answer = serve_flat_request(&request).unwrap().unwrap();
        assert_eq!(answer.msg_id, MsgId::ChunkData);
        assert_eq!(decode_chunk_data(&answer.payload).unwrap().coord, ChunkCoord::new(4, -9));
        assert_eq!(serve_flat_request(&answer).unwrap(), None);
    }
}
