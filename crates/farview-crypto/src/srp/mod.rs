//! SRP-6a password-authenticated key exchange.
//!
//! Split by concern: [`groups`] holds the frozen prime tables, [`math`] the
//! pure modular arithmetic, [`client`] and [`server`] the per-role exchange
//! contexts that the channel's handshake machine drives.

pub mod client;
pub mod groups;
pub mod math;
pub mod server;

/// Minimum accepted salt length in bytes.
pub const MIN_SALT_LEN: usize = 64;

/// Minimum accepted length of the responder public value `B` in bytes.
pub const MIN_B_LEN: usize = 128;

/// Length of the ephemeral private values `a` and `b` in bytes (1024 bits).
pub const EPHEMERAL_LEN: usize = 128;
