//! # Errors
//!
//! Error types surfaced by the public API. Lookups that the world treats as
//! "empty space" (non-resident chunks, out-of-range heights) never produce an
//! error; these enums cover malformed input, configuration and the chunk
//! lifecycle failures a caller can act on.

use std::io;

use thiserror::Error;

/// Failure to decode bytes received from the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the fixed-size header requires.
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Bytes needed
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// A chunk payload whose block section is not exactly one chunk long.
    #[error("chunk payload length mismatch: expected {expected} block bytes, got {actual}")]
    LengthMismatch {
        /// Bytes in one chunk
        expected: usize,
        /// Bytes received
        actual: usize,
    },

    /// A block byte that does not name any known block type.
    #[error("unknown block type ordinal {ordinal} at index {index}")]
    UnknownBlockType {
        /// The offending byte
        ordinal: u8,
        /// Its position in the block section
        index: usize,
    },

    /// A packet header carrying a message id this side does not understand.
    #[error("unknown message id {0}")]
    UnknownMessage(u16),

    /// A packet header announcing a negative payload length.
    #[error("negative payload length {0}")]
    NegativeLength(i32),

    /// A packet payload longer than the framing allows, sent or received.
    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        /// Announced or actual payload length
        len: usize,
        /// The framing limit
        max: usize,
    },
}

/// Failure to load or validate a [`crate::config::WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The config file is not valid JSON for [`crate::config::WorldConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised by [`crate::engine_state::voxels::world::VoxelWorld`] operations
/// that address a specific chunk.
#[derive(Debug, Error)]
pub enum WorldError {
    /// No chunk is loaded at this coordinate.
    #[error("chunk ({x}, {z}) is not resident")]
    ChunkNotResident {
        /// Chunk x
        x: i32,
        /// Chunk z
        z: i32,
    },

    /// The chunk is in the errored state and will not be rebuilt.
    #[error("chunk ({x}, {z}) failed permanently: {reason}")]
    ChunkErrored {
        /// Chunk x
        x: i32,
        /// Chunk z
        z: i32,
        /// Why generation failed
        reason: String,
    },

    /// A received chunk payload was malformed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The world could not be configured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure of the on-disk chunk loader.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// There is no on-disk chunk format; every load reports this.
    #[error("loading chunk ({x}, {z}) from disk is not implemented")]
    NotImplemented {
        /// Chunk x
        x: i32,
        /// Chunk z
        z: i32,
    },
}
