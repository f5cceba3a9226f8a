//! Channel-level error taxonomy.
//!
//! Every error that reaches the channel is fatal for it: the channel emits
//! a single close action carrying the error and drops its queues. Recovery
//! (reconnect, re-handshake) belongs to whoever owns the channel.

use thiserror::Error;

use farview_crypto::{CryptoError, HandshakeError};
use farview_proto::FrameError;

/// Anything that can terminate a channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Socket-level failure: reset, refused, half-open timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed length prefix, zero-length or oversize message.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Key exchange rejected: bad group, bad sizes, invalid public value,
    /// unknown user, empty credentials.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// AEAD authentication failure or nonce exhaustion.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A handshake record arrived that the current step cannot accept.
    #[error("unexpected handshake message")]
    UnexpectedHandshake,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_message() {
        let err = ChannelError::from(FrameError::ZeroLength);
        assert_eq!(err.to_string(), "zero-length message");

        let err = ChannelError::from(CryptoError::AeadFailure);
        assert_eq!(err.to_string(), "message authentication failed");
    }
}
