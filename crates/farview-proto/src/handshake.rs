//! Key-exchange records.
//!
//! Three records are exchanged in plaintext while the channel is in its
//! connected-but-not-yet-encrypted phase, all carried as ordinary framed
//! messages with the reserved handshake id:
//!
//! ```text
//! initiator                         responder
//!     │── SrpIdentify ──────────────────>│
//!     │<── SrpServerKeyExchange ─────────│
//!     │── SrpClientKeyExchange ─────────>│
//! ```
//!
//! Field names follow the SRP-6a literature: `N` (the group prime) travels
//! as `number`, `g` as `generator`, the public values as `b` and `a`. The
//! records are CBOR maps; the crypto layer interprets the byte strings.

use serde::{Deserialize, Serialize};

use crate::codec::{from_cbor, to_cbor};
use crate::errors::FrameError;

/// First handshake message: the initiator names itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrpIdentify {
    /// UTF-8 username the responder uses for its verifier lookup.
    pub username: String,
}

/// Second handshake message: the responder's group and public value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrpServerKeyExchange {
    /// Group prime `N`, big-endian. Must match one of the permitted groups
    /// byte for byte.
    pub number: Vec<u8>,
    /// Group generator `g`, big-endian.
    pub generator: Vec<u8>,
    /// Per-user salt `s`, at least 64 bytes.
    pub salt: Vec<u8>,
    /// Responder public value `B`, big-endian, at least 128 bytes.
    pub b: Vec<u8>,
    /// 96-bit IV the responder will encrypt with.
    pub iv: Vec<u8>,
}

/// Third handshake message: the initiator's public value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrpClientKeyExchange {
    /// Initiator public value `A`, big-endian.
    pub a: Vec<u8>,
    /// 96-bit IV the initiator will encrypt with.
    pub iv: Vec<u8>,
}

impl SrpIdentify {
    /// Serialize to CBOR.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        from_cbor(bytes)
    }
}

impl SrpServerKeyExchange {
    /// Serialize to CBOR.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        from_cbor(bytes)
    }
}

impl SrpClientKeyExchange {
    /// Serialize to CBOR.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_round_trip() {
        let record = SrpIdentify { username: "alice".to_string() };
        let decoded = SrpIdentify::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn server_key_exchange_round_trip() {
        let record = SrpServerKeyExchange {
            number: vec![0xFF; 512],
            generator: vec![5],
            salt: vec![0xAB; 64],
            b: vec![0x42; 512],
            iv: vec![0x01; 12],
        };
        let decoded = SrpServerKeyExchange::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn client_key_exchange_round_trip() {
        let record = SrpClientKeyExchange { a: vec![0x24; 512], iv: vec![0x02; 12] };
        let decoded = SrpClientKeyExchange::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(SrpIdentify::decode(&[0xC3, 0x00, 0xFF]), Err(FrameError::Codec(_))));
        assert!(matches!(SrpServerKeyExchange::decode(&[]), Err(FrameError::Codec(_))));
    }

    #[test]
    fn record_types_are_not_interchangeable() {
        let identify = SrpIdentify { username: "alice".to_string() }.encode().unwrap();
        assert!(SrpServerKeyExchange::decode(&identify).is_err());
    }
}
