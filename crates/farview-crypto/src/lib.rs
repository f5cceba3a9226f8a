//! SRP-6a key exchange and AEAD session encryption.
//!
//! This crate holds the cryptographic half of the Farview channel: the
//! password-authenticated key exchange that both endpoints run while the
//! channel is still in plaintext, and the per-direction AEAD state that
//! protects every message afterwards.
//!
//! # Key lifecycle
//!
//! ```text
//! password ──calc_x──> x ──g^x mod N──> verifier (stored responder-side)
//!
//! initiator: a (1024 random bits) ──> A = g^a mod N
//! responder: b (1024 random bits) ──> B = (k·v + g^b) mod N
//!
//! both:      S (shared secret)  ──BLAKE2s-256──> K (32-byte session key)
//!            K + per-direction 96-bit IV ──> SessionCipher
//! ```
//!
//! The raw shared secret `S` never leaves this crate and is never
//! transmitted. Password material, ephemeral private values, IVs, and the
//! session key are zeroised when their owners drop.
//!
//! # Security
//!
//! - Only three fixed safe-prime groups (4096/6144/8192 bits) are accepted;
//!   a peer presenting any other modulus is refused before any secret is
//!   derived, which forecloses small-subgroup and downgrade attacks.
//! - Public values congruent to zero mod N are rejected on both sides.
//! - AEAD nonces combine a random 96-bit IV with a monotonic per-direction
//!   counter, so a nonce never repeats under one key.
//!
//! No I/O and no message parsing happens here; the channel layer drives
//! these types and moves their outputs on the wire.

pub mod cipher;
pub mod error;
pub mod srp;

pub use cipher::{EncryptionMethod, IV_SIZE, KEY_SIZE, SessionCipher, SessionKey, TAG_SIZE};
pub use error::{CryptoError, HandshakeError};
pub use srp::client::{ClientExchange, SrpClientContext};
pub use srp::groups::{GROUP_4096, GROUP_6144, GROUP_8192, SrpGroup};
pub use srp::server::{MemoryVerifierStore, ServerExchange, SrpServerContext, VerifierEntry,
    VerifierStore};
