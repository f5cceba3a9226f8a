//! Per-message AEAD encryption for the established channel.
//!
//! After the key exchange completes, each endpoint installs a
//! [`SessionCipher`] holding independent state for the two directions:
//! the 96-bit IV it announced (seal side) and the IV the peer announced
//! (open side), each paired with a monotonic message counter.
//!
//! The nonce for message `n` is the direction IV with `n` as a 64-bit
//! little-endian integer XORed into the trailing eight bytes. Both peers
//! advance their counters in lockstep because the underlying stream is
//! ordered and lossless; any reordering or truncation surfaces as an
//! authentication failure, which is fatal for the channel.

use aes_gcm::{Aes256Gcm, aead::Aead, aead::KeyInit};
use chacha20poly1305::ChaCha20Poly1305;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// AEAD key size in bytes (both methods use 256-bit keys).
pub const KEY_SIZE: usize = 32;

/// AEAD IV size in bytes (both methods use 96-bit nonces).
pub const IV_SIZE: usize = 12;

/// Authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Negotiated AEAD method for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMethod {
    /// SRP key exchange, AES-256-GCM message protection.
    SrpAes256Gcm,
    /// SRP key exchange, ChaCha20-Poly1305 message protection.
    SrpChaCha20Poly1305,
}

/// The 32-byte symmetric session key.
///
/// Wiped when dropped. The only way to obtain one is through a completed
/// key exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey {
    key: [u8; KEY_SIZE],
}

impl SessionKey {
    /// Wrap raw key bytes (a completed exchange, or a test vector).
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

enum AeadState {
    Aes(Box<Aes256Gcm>),
    ChaCha(Box<ChaCha20Poly1305>),
}

/// One direction of traffic: cipher instance, IV, message counter.
struct Direction {
    aead: AeadState,
    iv: [u8; IV_SIZE],
    counter: u64,
}

impl Direction {
    fn new(method: EncryptionMethod, key: &SessionKey, iv: [u8; IV_SIZE]) -> Self {
        let aead = match method {
            EncryptionMethod::SrpAes256Gcm => {
                AeadState::Aes(Box::new(Aes256Gcm::new(key.as_bytes().into())))
            }
            EncryptionMethod::SrpChaCha20Poly1305 => {
                AeadState::ChaCha(Box::new(ChaCha20Poly1305::new(key.as_bytes().into())))
            }
        };

        Self { aead, iv, counter: 0 }
    }

    /// Nonce for the current counter value: IV with the counter XORed,
    /// little-endian, into bytes 4..12.
    fn nonce(&self) -> [u8; IV_SIZE] {
        let mut nonce = self.iv;
        for (nonce_byte, counter_byte) in
            nonce[IV_SIZE - 8..].iter_mut().zip(self.counter.to_le_bytes())
        {
            *nonce_byte ^= counter_byte;
        }
        nonce
    }

    fn advance(&mut self) -> Result<(), CryptoError> {
        self.counter = self.counter.checked_add(1).ok_or(CryptoError::NonceExhausted)?;
        Ok(())
    }
}

impl Drop for Direction {
    fn drop(&mut self) {
        self.iv.zeroize();
    }
}

/// Symmetric state protecting an established channel.
///
/// `seal` covers the messages this endpoint sends; `open` covers the
/// messages it receives. The two counters advance independently, one step
/// per message.
pub struct SessionCipher {
    seal: Direction,
    open: Direction,
}

impl SessionCipher {
    /// Build the per-direction state from a completed key exchange.
    ///
    /// `encrypt_iv` is the IV this endpoint announced to its peer;
    /// `decrypt_iv` is the IV the peer announced.
    pub fn new(
        method: EncryptionMethod,
        key: &SessionKey,
        encrypt_iv: [u8; IV_SIZE],
        decrypt_iv: [u8; IV_SIZE],
    ) -> Self {
        Self {
            seal: Direction::new(method, key, encrypt_iv),
            open: Direction::new(method, key, decrypt_iv),
        }
    }

    /// Seal one outgoing message. Returns ciphertext with the 16-byte tag
    /// appended.
    ///
    /// # Errors
    ///
    /// - `CryptoError::NonceExhausted` when the send counter would wrap
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = self.seal.nonce();

        let Ok(ciphertext) = (match &self.seal.aead {
            AeadState::Aes(aead) => aead.encrypt((&nonce).into(), plaintext),
            AeadState::ChaCha(aead) => aead.encrypt((&nonce).into(), plaintext),
        }) else {
            unreachable!("AEAD encryption cannot fail with a valid key and nonce");
        };

        self.seal.advance()?;
        Ok(ciphertext)
    }

    /// Open one incoming message.
    ///
    /// # Errors
    ///
    /// - `CryptoError::AeadFailure` when the tag does not verify
    /// - `CryptoError::NonceExhausted` when the receive counter would wrap
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = self.open.nonce();

        let plaintext = match &self.open.aead {
            AeadState::Aes(aead) => aead.decrypt((&nonce).into(), ciphertext),
            AeadState::ChaCha(aead) => aead.decrypt((&nonce).into(), ciphertext),
        }
        .map_err(|_| CryptoError::AeadFailure)?;

        self.open.advance()?;
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SessionKey {
        SessionKey::new([byte; KEY_SIZE])
    }

    fn pair(method: EncryptionMethod) -> (SessionCipher, SessionCipher) {
        let a_iv = [0x11; IV_SIZE];
        let b_iv = [0x22; IV_SIZE];

        // Peer A seals with a_iv, peer B opens with a_iv, and vice versa.
        let a = SessionCipher::new(method, &key(7), a_iv, b_iv);
        let b = SessionCipher::new(method, &key(7), b_iv, a_iv);
        (a, b)
    }

    #[test]
    fn round_trip_both_methods() {
        for method in [EncryptionMethod::SrpAes256Gcm, EncryptionMethod::SrpChaCha20Poly1305] {
            let (mut a, mut b) = pair(method);

            for message in [&b"hello"[..], &[0u8; 1024][..], &b"x"[..]] {
                let sealed = a.encrypt(message).unwrap();
                assert_eq!(sealed.len(), message.len() + TAG_SIZE);
                assert_eq!(b.decrypt(&sealed).unwrap(), message);
            }
        }
    }

    #[test]
    fn counters_advance_per_direction() {
        let (mut a, mut b) = pair(EncryptionMethod::SrpChaCha20Poly1305);

        let first = a.encrypt(b"same").unwrap();
        let second = a.encrypt(b"same").unwrap();
        assert_ne!(first, second, "distinct nonces must yield distinct ciphertexts");

        assert_eq!(b.decrypt(&first).unwrap(), b"same");
        assert_eq!(b.decrypt(&second).unwrap(), b"same");
    }

    #[test]
    fn out_of_order_delivery_fails_authentication() {
        let (mut a, mut b) = pair(EncryptionMethod::SrpAes256Gcm);

        let first = a.encrypt(b"one").unwrap();
        let second = a.encrypt(b"two").unwrap();

        assert_eq!(b.decrypt(&second), Err(CryptoError::AeadFailure));

        // A failed open does not consume a counter step; in-order delivery
        // still verifies. The channel above treats the failure as fatal.
        assert_eq!(b.decrypt(&first).unwrap(), b"one");
        assert_eq!(b.decrypt(&second).unwrap(), b"two");
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let mut a = SessionCipher::new(
            EncryptionMethod::SrpAes256Gcm,
            &key(1),
            [0x11; IV_SIZE],
            [0x22; IV_SIZE],
        );
        let mut b = SessionCipher::new(
            EncryptionMethod::SrpAes256Gcm,
            &key(2),
            [0x22; IV_SIZE],
            [0x11; IV_SIZE],
        );

        let sealed = a.encrypt(b"secret").unwrap();
        assert_eq!(b.decrypt(&sealed), Err(CryptoError::AeadFailure));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let (mut a, mut b) = pair(EncryptionMethod::SrpChaCha20Poly1305);

        let mut sealed = a.encrypt(b"payload").unwrap();
        sealed[0] ^= 0xFF;
        assert_eq!(b.decrypt(&sealed), Err(CryptoError::AeadFailure));
    }

    #[test]
    fn nonce_layout_xors_counter_into_tail() {
        let mut direction =
            Direction::new(EncryptionMethod::SrpAes256Gcm, &key(0), [0xA0; IV_SIZE]);

        assert_eq!(direction.nonce(), [0xA0; IV_SIZE]);

        direction.counter = 1;
        let nonce = direction.nonce();
        assert_eq!(&nonce[..4], &[0xA0; 4]);
        assert_eq!(nonce[4], 0xA0 ^ 0x01);
        assert_eq!(&nonce[5..], &[0xA0; 7]);
    }
}
