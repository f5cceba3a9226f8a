//! Fuzz target for handshake record parsing.
//!
//! # Invariants
//!
//! - CBOR decoding of arbitrary bytes never panics for any record type
//! - A record that decodes re-encodes and decodes to the same value

#![no_main]

use farview_proto::{SrpClientKeyExchange, SrpIdentify, SrpServerKeyExchange};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = SrpIdentify::decode(data) {
        let reencoded = record.encode().expect("decoded record re-encodes");
        assert_eq!(SrpIdentify::decode(&reencoded).expect("round trip"), record);
    }

    if let Ok(record) = SrpServerKeyExchange::decode(data) {
        let reencoded = record.encode().expect("decoded record re-encodes");
        assert_eq!(SrpServerKeyExchange::decode(&reencoded).expect("round trip"), record);
    }

    if let Ok(record) = SrpClientKeyExchange::decode(data) {
        let reencoded = record.encode().expect("decoded record re-encodes");
        assert_eq!(SrpClientKeyExchange::decode(&reencoded).expect("round trip"), record);
    }
});
