//! Fuzz target for the variable-length prefix decoder.
//!
//! # Invariants
//!
//! - The byte-at-a-time decoder never panics on any input
//! - A completed decode is either a policy error or a length in
//!   `1..=MAX_MESSAGE_SIZE`
//! - The stateful decoder agrees with the pure `decode_length`
//! - Re-encoding an accepted length reproduces the consumed prefix bytes

#![no_main]

use farview_proto::{LengthDecoder, MAX_MESSAGE_SIZE, decode_length, encode_length};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = LengthDecoder::new();
    let mut completed = None;

    for (index, &byte) in data.iter().enumerate() {
        match decoder.push(byte) {
            Ok(None) => {}
            Ok(Some(size)) => {
                completed = Some((size, index + 1));
                break;
            }
            Err(_) => return,
        }
    }

    let Some((size, consumed)) = completed else {
        return;
    };

    assert!(size >= 1 && size <= MAX_MESSAGE_SIZE);

    let (pure_value, pure_consumed) = decode_length(data).expect("stateful decode implies pure");
    assert_eq!(pure_value as usize, size);
    assert_eq!(pure_consumed, consumed);

    // Canonical encodings round-trip exactly; non-canonical ones (spurious
    // continuation bits with zero groups) may re-encode shorter but must
    // carry the same value.
    let reencoded = encode_length(size).expect("accepted length re-encodes");
    let (value, _) = decode_length(reencoded.as_slice()).expect("re-encoded prefix decodes");
    assert_eq!(value as usize, size);
});
