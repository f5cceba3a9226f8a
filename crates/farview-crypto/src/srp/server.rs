//! Responder-side key exchange context and verifier storage.
//!
//! The responder never sees the password. It stores, per user, a salt and
//! the verifier `v = g^x mod N`, computed once at provisioning time by
//! [`VerifierEntry::generate`]. During a handshake the context samples an
//! ephemeral `b`, publishes `B = (k·v + g^b) mod N`, and derives the same
//! session key the initiator does.

use std::collections::HashMap;

use num_bigint::BigUint;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::cipher::{EncryptionMethod, IV_SIZE, SessionCipher, SessionKey};
use crate::error::HandshakeError;
use crate::srp::groups::SrpGroup;
use crate::srp::{EPHEMERAL_LEN, MIN_SALT_LEN, math};

/// Stored credential material for one user: the group it was generated
/// under, the salt, and the verifier.
#[derive(Debug, Clone)]
pub struct VerifierEntry {
    /// Group the verifier was computed in.
    pub group: &'static SrpGroup,
    /// Per-user salt, 64 bytes as generated.
    pub salt: Vec<u8>,
    /// Verifier `v = g^x mod N`, big-endian.
    pub verifier: Vec<u8>,
}

impl VerifierEntry {
    /// Provision an entry from a plaintext password.
    ///
    /// This is the only place the responder side ever touches the
    /// password; callers should drop it immediately afterwards.
    pub fn generate(
        group: &'static SrpGroup,
        username: &str,
        password: &str,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut salt = vec![0u8; MIN_SALT_LEN];
        rng.fill_bytes(&mut salt);

        let x = math::calc_x(&salt, username, password);
        let verifier = math::calc_verifier(&x, &group.prime(), &group.generator());

        Self { group, salt, verifier: verifier.to_bytes_be() }
    }
}

/// Lookup seam the responder uses to find credential material.
///
/// Account management lives outside the core; anything that can map a
/// username to a [`VerifierEntry`] can back a handshake.
pub trait VerifierStore {
    /// Credential material for `username`, if provisioned.
    fn find(&self, username: &str) -> Option<VerifierEntry>;
}

/// In-memory verifier store, sufficient for tests and small deployments.
#[derive(Debug, Default)]
pub struct MemoryVerifierStore {
    users: HashMap<String, VerifierEntry>,
}

impl MemoryVerifierStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for `username`.
    pub fn insert(&mut self, username: impl Into<String>, entry: VerifierEntry) {
        self.users.insert(username.into(), entry);
    }
}

impl VerifierStore for MemoryVerifierStore {
    fn find(&self, username: &str) -> Option<VerifierEntry> {
        self.users.get(username).cloned()
    }
}

/// The responder's key exchange message, field for field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerExchange {
    /// Group modulus `N`, big-endian.
    pub number: Vec<u8>,
    /// Group generator `g`, big-endian.
    pub generator: Vec<u8>,
    /// Per-user salt.
    pub salt: Vec<u8>,
    /// Public value `B`, padded to the modulus width.
    pub b: Vec<u8>,
    /// 96-bit IV for the responder-to-initiator direction.
    pub iv: [u8; IV_SIZE],
}

struct PeerState {
    a_pub: BigUint,
    decrypt_iv: [u8; IV_SIZE],
}

impl Drop for PeerState {
    fn drop(&mut self) {
        self.decrypt_iv.zeroize();
    }
}

/// Responder (server) SRP-6a context.
pub struct SrpServerContext {
    method: EncryptionMethod,
    entry: VerifierEntry,
    b: Zeroizing<Vec<u8>>,
    b_pub: BigUint,
    encrypt_iv: [u8; IV_SIZE],
    peer: Option<PeerState>,
}

impl SrpServerContext {
    /// Start an exchange for a looked-up user: samples the 1024-bit
    /// ephemeral `b`, computes `B`, and samples the send-direction IV.
    pub fn new(method: EncryptionMethod, entry: VerifierEntry, rng: &mut dyn RngCore) -> Self {
        let n = entry.group.prime();
        let g = entry.group.generator();
        let v = BigUint::from_bytes_be(&entry.verifier);

        let mut b = Zeroizing::new(vec![0u8; EPHEMERAL_LEN]);
        rng.fill_bytes(b.as_mut_slice());

        let b_pub = math::calc_b_pub(&BigUint::from_bytes_be(&b), &v, &n, &g);

        let mut encrypt_iv = [0u8; IV_SIZE];
        rng.fill_bytes(&mut encrypt_iv);

        Self { method, entry, b, b_pub, encrypt_iv, peer: None }
    }

    /// The key exchange message to send to the initiator. `B` is padded
    /// to the modulus width so its length always clears the protocol
    /// minimum.
    pub fn server_key_exchange(&self) -> ServerExchange {
        let group = self.entry.group;

        ServerExchange {
            number: group.prime_bytes().to_vec(),
            generator: group.generator_bytes().to_vec(),
            salt: self.entry.salt.clone(),
            b: math::pad(&self.b_pub, group.prime_len()),
            iv: self.encrypt_iv,
        }
    }

    /// Accept the initiator's public value and IV.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::BadIvLength` for an IV that is not 96 bits
    /// - `HandshakeError::InvalidPublicValue` when `A ≡ 0 mod N`
    pub fn read_client_key_exchange(
        &mut self,
        a_pub: &[u8],
        iv: &[u8],
    ) -> Result<(), HandshakeError> {
        let decrypt_iv: [u8; IV_SIZE] =
            iv.try_into().map_err(|_| HandshakeError::BadIvLength { len: iv.len() })?;

        let a_pub = BigUint::from_bytes_be(a_pub);
        if math::is_zero_mod(&a_pub, &self.entry.group.prime()) {
            return Err(HandshakeError::InvalidPublicValue);
        }

        self.peer = Some(PeerState { a_pub, decrypt_iv });
        Ok(())
    }

    /// Derive the session key.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::ExchangeIncomplete` before the client key
    ///   exchange has been read
    pub fn session_key(&self) -> Result<SessionKey, HandshakeError> {
        let peer = self.peer.as_ref().ok_or(HandshakeError::ExchangeIncomplete)?;

        let n = self.entry.group.prime();
        let v = BigUint::from_bytes_be(&self.entry.verifier);
        let b = BigUint::from_bytes_be(&self.b);

        let u = math::calc_u(&peer.a_pub, &self.b_pub, &n);
        let shared = math::calc_server_key(&n, &peer.a_pub, &v, &u, &b);

        Ok(SessionKey::new(math::session_key_hash(&shared)))
    }

    /// Build the per-direction AEAD state for the established channel.
    ///
    /// # Errors
    ///
    /// Same conditions as [`session_key`](Self::session_key).
    pub fn session_cipher(&self) -> Result<SessionCipher, HandshakeError> {
        let key = self.session_key()?;
        let peer = self.peer.as_ref().ok_or(HandshakeError::ExchangeIncomplete)?;

        Ok(SessionCipher::new(self.method, &key, self.encrypt_iv, peer.decrypt_iv))
    }
}

impl Drop for SrpServerContext {
    fn drop(&mut self) {
        self.encrypt_iv.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::srp::groups::GROUP_4096;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn entry() -> VerifierEntry {
        VerifierEntry::generate(&GROUP_4096, "alice", "s3cret!", &mut rng())
    }

    #[test]
    fn generated_entry_has_full_salt() {
        let entry = entry();
        assert_eq!(entry.salt.len(), MIN_SALT_LEN);
        assert!(!entry.verifier.is_empty());
    }

    #[test]
    fn exchange_message_is_well_formed() {
        let context = SrpServerContext::new(EncryptionMethod::SrpAes256Gcm, entry(), &mut rng());
        let exchange = context.server_key_exchange();

        assert_eq!(exchange.number.len(), 512);
        assert_eq!(exchange.b.len(), 512);
        assert_eq!(exchange.generator, vec![5]);
        assert_eq!(exchange.salt.len(), MIN_SALT_LEN);
    }

    #[test]
    fn zero_a_is_rejected() {
        let mut context =
            SrpServerContext::new(EncryptionMethod::SrpAes256Gcm, entry(), &mut rng());

        let result = context.read_client_key_exchange(&[0u8; 512], &[0u8; 12]);
        assert!(matches!(result, Err(HandshakeError::InvalidPublicValue)));

        let result =
            context.read_client_key_exchange(GROUP_4096.prime_bytes(), &[0u8; 12]);
        assert!(matches!(result, Err(HandshakeError::InvalidPublicValue)));
    }

    #[test]
    fn key_before_exchange_is_an_error() {
        let context = SrpServerContext::new(EncryptionMethod::SrpAes256Gcm, entry(), &mut rng());
        assert!(matches!(context.session_key(), Err(HandshakeError::ExchangeIncomplete)));
    }

    #[test]
    fn store_lookup_round_trips() {
        let mut store = MemoryVerifierStore::new();
        store.insert("alice", entry());

        assert!(store.find("alice").is_some());
        assert!(store.find("bob").is_none());
    }
}
