//! Wire types for the Farview remote-desktop protocol.
//!
//! Three layers live here:
//!
//! - [`framing`] — the variable-length prefix that delimits every message on
//!   the stream (1-4 bytes, base-128 little-endian with continuation bits).
//! - [`handshake`] — the three CBOR records exchanged in plaintext while the
//!   channel negotiates its session key.
//! - [`video`] — the screen-update packet the host encoder produces.
//!
//! This crate holds no I/O and no cryptography; it only defines what the
//! bytes on the wire look like.

mod codec;
pub mod errors;
pub mod framing;
pub mod handshake;
pub mod video;

pub use errors::FrameError;
pub use framing::{
    LengthDecoder, LengthPrefix, MAX_ENCODABLE_LENGTH, MAX_MESSAGE_SIZE, decode_length,
    encode_length,
};
pub use handshake::{SrpClientKeyExchange, SrpIdentify, SrpServerKeyExchange};
pub use video::{VideoEncoding, VideoFrameFormat, VideoPacket, VideoPixelFormat, VideoRect};
