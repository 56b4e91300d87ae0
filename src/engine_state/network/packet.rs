//! Packet framing.
//!
//! Every packet is a 6-byte header followed by its payload:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 2 | message id, `u16` LE |
//! | 2 | 4 | payload length, `i32` LE |
//! | 6 | n | payload |

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::DecodeError;

/// Size of the packet header in bytes.
pub const HEADER_LEN: usize = 6;

/// Largest payload either side sends or accepts. A chunk data payload is
/// 65 544 bytes.
pub const MAX_PAYLOAD_LEN: usize = 1 << 20;

/// Message ids understood by both sides.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum MsgId {
    /// Client asks for one chunk
    ChunkRequest = 1,
    /// Authority answers with one chunk's blocks
    ChunkData = 2,
}

impl MsgId {
    /// `None` for ids this side does not know.
    pub fn from_u16(id: u16) -> Option<MsgId> {
        <MsgId as FromPrimitive>::from_u16(id)
    }
}

/// One framed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// What the payload holds
    pub msg_id: MsgId,
    /// Raw message body
    pub payload: Vec<u8>,
}

impl Packet {
    /// A packet carrying `payload`.
    pub fn new(msg_id: MsgId, payload: Vec<u8>) -> Self {
        Self { msg_id, payload }
    }

    /// Header plus payload.
    ///
    /// # Errors
    /// [`DecodeError::PayloadTooLarge`] if the payload exceeds [`MAX_PAYLOAD_LEN`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        let too_large = DecodeError::PayloadTooLarge {
            len: self.payload.len(),
            max: MAX_PAYLOAD_LEN,
        };
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return Err(too_large);
        }
        let len = i32::try_from(self.payload.len()).map_err(|_| too_large)?;

        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&(self.msg_id as u16).to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Parses one packet from the start of `bytes`.
    ///
    /// # Returns
    /// The packet and the number of bytes it occupied.
    ///
    /// # Errors
    /// [`DecodeError::TooShort`] if the packet is not complete yet, or the
    /// header errors [`DecodeError::UnknownMessage`],
    /// [`DecodeError::NegativeLength`] and [`DecodeError::PayloadTooLarge`].
    pub fn from_bytes(bytes: &[u8]) -> Result<(Packet, usize), DecodeError> {
        let (msg_id, len) = parse_header(bytes)?;
        let total = HEADER_LEN + len;
        if bytes.len() < total {
            return Err(DecodeError::TooShort {
                expected: total,
                actual: bytes.len(),
            });
        }
        Ok((Packet::new(msg_id, bytes[HEADER_LEN..total].to_vec()), total))
    }
}

fn parse_header(bytes: &[u8]) -> Result<(MsgId, usize), DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TooShort {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let id = u16::from_le_bytes([bytes[0], bytes[1]]);
    let len = i32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
    let len = usize::try_from(len).map_err(|_| DecodeError::NegativeLength(len))?;
    if len > MAX_PAYLOAD_LEN {
        return Err(DecodeError::PayloadTooLarge {
            len,
            max: MAX_PAYLOAD_LEN,
        });
    }
    let msg_id = MsgId::from_u16(id).ok_or(DecodeError::UnknownMessage(id))?;
    Ok((msg_id, len))
}

/// Reassembles packets from a byte stream that arrives in arbitrary pieces.
#[derive(Debug, Default)]
pub struct PacketReader {
    buffer: Vec<u8>,
}

impl PacketReader {
    /// A reader with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes held back as the start of an incomplete packet.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Takes every complete packet out of the buffer.
    ///
    /// A malformed header makes the stream unusable: the buffer is cleared
    /// and the error returned.
    pub fn drain_packets(&mut self) -> Result<Vec<Packet>, DecodeError> {
        let mut packets = Vec::new();
        let mut consumed = 0;

        loop {
            match Packet::from_bytes(&self.buffer[consumed..]) {
                Ok((packet, used)) => {
                    packets.push(packet);
                    consumed += used;
                }
                Err(DecodeError::TooShort { .. }) => break,
                Err(err) => {
                    self.buffer.clear();
                    return Err(err);
                }
            }
        }

        self.buffer.drain(..consumed);
        Ok(packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let bytes = Packet::new(MsgId::ChunkData, vec![9, 8, 7]).to_bytes().unwrap();
        assert_eq!(bytes, vec![2, 0, 3, 0, 0, 0, 9, 8, 7]);
    }

    #[test]
    fn reader_keeps_partial_tail() {
        let first = Packet::new(MsgId::ChunkRequest, vec![1; 8]);
        let second = Packet::new(MsgId::ChunkData, vec![2; 20]);
        let mut stream = first.to_bytes().unwrap();
        stream.extend(second.to_bytes().unwrap());

        let mut reader = PacketReader::new();
        reader.push(&stream[..10]);
        assert!(reader.drain_packets().unwrap().is_empty());
        reader.push(&stream[10..20]);
        assert_eq!(reader.drain_packets().unwrap(), vec![first]);
        assert_eq!(reader.pending(), 6);
        reader.push(&stream[20..]);
        assert_eq!(reader.drain_packets().unwrap(), vec![second]);
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn bad_headers() {
        let mut bytes = Packet::new(MsgId::ChunkData, vec![]).to_bytes().unwrap();
        bytes[0] = 77;
        assert_eq!(Packet::from_bytes(&bytes), Err(DecodeError::UnknownMessage(77)));

        let mut bytes = Packet::new(MsgId::ChunkData, vec![]).to_bytes().unwrap();
        bytes[2..6].copy_from_slice(&(-5i32).to_le_bytes());
        assert_eq!(Packet::from_bytes(&bytes), Err(DecodeError::NegativeLength(-5)));

        let mut reader = PacketReader::new();
        reader.push(&bytes);
        assert!(reader.drain_packets().is_err());
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn oversized_payloads_are_refused() {
        let packet = Packet::new(MsgId::ChunkData, vec![0; MAX_PAYLOAD_LEN + 1]);
        assert_eq!(
            packet.to_bytes(),
            Err(DecodeError::PayloadTooLarge {
                len: MAX_PAYLOAD_LEN + 1,
                max: MAX_PAYLOAD_LEN
            })
        );
        assert!(Packet::new(MsgId::ChunkData, vec![0; MAX_PAYLOAD_LEN]).to_bytes().is_ok());

        // a header announcing close to i32::MAX bytes is rejected before any payload arrives
        let mut header = Packet::new(MsgId::ChunkData, vec![]).to_bytes().unwrap();
        header[2..6].copy_from_slice(&(i32::MAX - 1).to_le_bytes());
        let mut reader = PacketReader::new();
        reader.push(&header);
        assert_eq!(
            reader.drain_packets(),
            Err(DecodeError::PayloadTooLarge {
                len: (i32::MAX - 1) as usize,
                max: MAX_PAYLOAD_LEN
            })
        );
        assert_eq!(reader.pending(), 0);
    }
}
