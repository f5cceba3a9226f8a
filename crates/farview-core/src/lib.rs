//! Framed encrypted channel for the Farview remote-desktop protocol.
//!
//! The channel is a length-prefixed, ordered, bidirectional message
//! transport over a reliable stream, with a two-phase lifecycle: a
//! plaintext `Connected` phase that runs the SRP-6a handshake, then an
//! `Encrypted` phase in which every message is AEAD-protected.
//!
//! The protocol logic lives in the Sans-IO [`Channel`] state machine; the
//! optional `transport` feature adds a tokio TCP driver around it. Drivers
//! for other reactors only need to feed the machine its events and execute
//! the actions it returns.

pub mod channel;
pub mod error;
pub mod handshake;

#[cfg(feature = "transport")]
pub mod transport;

pub use channel::{Channel, ChannelAction, ChannelState, HANDSHAKE_MESSAGE_ID};
pub use error::ChannelError;
pub use handshake::{Encryptor, Role};

#[cfg(feature = "transport")]
pub use transport::{ChannelEvent, ChannelHandle, accept, connect};
