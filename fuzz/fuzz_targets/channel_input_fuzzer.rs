//! Fuzz target for the channel state machine's receive path.
//!
//! Drives a responder channel with arbitrary socket bytes, delivered in
//! arbitrary slices. The machine must never panic; every outcome is
//! either progress or a single close action, after which all further
//! input is ignored.

#![no_main]

use arbitrary::Arbitrary;
use farview_core::{Channel, ChannelAction, Encryptor, Role};
use farview_crypto::{EncryptionMethod, MemoryVerifierStore};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    chunks: Vec<Vec<u8>>,
}

fn saw_close(actions: &[ChannelAction]) -> bool {
    actions.iter().any(|action| matches!(action, ChannelAction::Close(_)))
}

fuzz_target!(|input: Input| {
    let responder = Encryptor::responder(
        EncryptionMethod::SrpChaCha20Poly1305,
        Box::new(MemoryVerifierStore::new()),
    );
    let mut channel = Channel::new(Role::Responder, responder);

    let mut closed = saw_close(&channel.on_connected());

    for chunk in &input.chunks {
        let actions = channel.on_data(chunk);

        if closed {
            // Input after a close must be a no-op.
            assert!(actions.is_empty());
            continue;
        }

        closed = saw_close(&actions);
    }
});
