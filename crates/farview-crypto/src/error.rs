//! Error types for key exchange and session encryption.

use thiserror::Error;

/// Errors raised while negotiating the session key.
///
/// All of them abort the handshake; none is recoverable by retrying the
/// same exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// Username or password was empty at construction.
    #[error("empty credentials")]
    EmptyCredentials,

    /// The presented `(N, g)` pair is not one of the permitted groups.
    #[error("bad group parameters: modulus of {len} bytes not recognised")]
    BadGroupParameters {
        /// Byte length of the rejected modulus.
        len: usize,
    },

    /// Salt shorter than the protocol minimum.
    #[error("salt too short: {len} bytes (min {min})")]
    SaltTooShort {
        /// Received length.
        len: usize,
        /// Minimum accepted.
        min: usize,
    },

    /// Peer public value shorter than the protocol minimum.
    #[error("public value too short: {len} bytes (min {min})")]
    PublicValueTooShort {
        /// Received length.
        len: usize,
        /// Minimum accepted.
        min: usize,
    },

    /// Peer public value is congruent to zero mod N.
    #[error("invalid public value")]
    InvalidPublicValue,

    /// IV is not exactly 96 bits.
    #[error("bad iv length: {len} bytes")]
    BadIvLength {
        /// Received length.
        len: usize,
    },

    /// No verifier is stored for the named user.
    #[error("unknown user")]
    UnknownUser,

    /// A step was invoked before its prerequisites completed.
    #[error("key exchange incomplete")]
    ExchangeIncomplete,
}

/// Errors raised by the per-message AEAD layer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Authentication tag did not verify; the message was forged,
    /// corrupted, or sealed under a different key.
    #[error("message authentication failed")]
    AeadFailure,

    /// The per-direction message counter is exhausted; continuing would
    /// repeat a nonce.
    #[error("nonce counter exhausted")]
    NonceExhausted,
}
