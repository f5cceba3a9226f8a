//! Error types for wire-level framing and record codecs.

use thiserror::Error;

/// Errors produced while framing, delimiting, or (de)serializing messages.
///
/// Every variant is fatal for the channel that encounters it: a peer that
/// produces a malformed prefix or an oversized message is broken or
/// malicious, and the stream position can no longer be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A message of length zero was framed or decoded.
    #[error("zero-length message")]
    ZeroLength,

    /// Message length exceeds the channel maximum.
    #[error("message too large: {size} bytes (max {max})")]
    TooLarge {
        /// Length carried by the prefix or requested by the writer.
        size: usize,
        /// Hard limit in force.
        max: usize,
    },

    /// A protocol record failed to encode or decode.
    #[error("record codec failed: {0}")]
    Codec(String),
}
