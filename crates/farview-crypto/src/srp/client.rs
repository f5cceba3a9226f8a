//! Initiator-side key exchange context.
//!
//! Owns the identity and password for the duration of the handshake and
//! walks the initiator's half of the exchange: validate the responder's
//! group and public value, produce `A` and the send-direction IV, then
//! derive the session key. Password material and the ephemeral private
//! value are wiped when the context drops.

use num_bigint::BigUint;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::cipher::{EncryptionMethod, IV_SIZE, SessionCipher, SessionKey};
use crate::error::HandshakeError;
use crate::srp::groups::{SrpGroup, verify_group};
use crate::srp::{EPHEMERAL_LEN, MIN_B_LEN, MIN_SALT_LEN, math};

/// The initiator's reply to a server key exchange: its public value `A`
/// and the IV it will encrypt with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientExchange {
    /// Public value `A`, big-endian.
    pub a: Vec<u8>,
    /// 96-bit IV for the initiator-to-responder direction.
    pub iv: [u8; IV_SIZE],
}

/// Per-exchange state, populated once the server key exchange is read.
struct ExchangeState {
    group: &'static SrpGroup,
    salt: Vec<u8>,
    b_pub: BigUint,
    a: Zeroizing<Vec<u8>>,
    a_pub: BigUint,
    encrypt_iv: [u8; IV_SIZE],
    decrypt_iv: [u8; IV_SIZE],
}

impl Drop for ExchangeState {
    fn drop(&mut self) {
        self.encrypt_iv.zeroize();
        self.decrypt_iv.zeroize();
    }
}

/// Initiator (client) SRP-6a context.
pub struct SrpClientContext {
    method: EncryptionMethod,
    username: String,
    password: Zeroizing<String>,
    exchange: Option<ExchangeState>,
}

impl SrpClientContext {
    /// Create a context for the given identity.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::EmptyCredentials` when either string is empty
    pub fn new(
        method: EncryptionMethod,
        username: &str,
        password: &str,
    ) -> Result<Self, HandshakeError> {
        if username.is_empty() || password.is_empty() {
            return Err(HandshakeError::EmptyCredentials);
        }

        Ok(Self {
            method,
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
            exchange: None,
        })
    }

    /// Identity sent in the opening handshake message.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Negotiated AEAD method.
    pub fn method(&self) -> EncryptionMethod {
        self.method
    }

    /// Validate the responder's key exchange and produce this side's reply.
    ///
    /// Checks, in order: salt length, `B` length, group membership (the
    /// `(N, g)` pair must match a permitted table byte for byte), IV
    /// length. Then samples the 1024-bit ephemeral `a`, computes
    /// `A = g^a mod N` (resampling in the degenerate `A ≡ 0` case), and
    /// samples the send-direction IV.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::SaltTooShort` when `|s| < 64`
    /// - `HandshakeError::PublicValueTooShort` when `|B| < 128`
    /// - `HandshakeError::BadGroupParameters` for an unrecognised `(N, g)`
    /// - `HandshakeError::BadIvLength` for an IV that is not 96 bits
    pub fn read_server_key_exchange(
        &mut self,
        number: &[u8],
        generator: &[u8],
        salt: &[u8],
        b_pub: &[u8],
        iv: &[u8],
        rng: &mut dyn RngCore,
    ) -> Result<ClientExchange, HandshakeError> {
        if salt.len() < MIN_SALT_LEN {
            return Err(HandshakeError::SaltTooShort { len: salt.len(), min: MIN_SALT_LEN });
        }

        if b_pub.len() < MIN_B_LEN {
            return Err(HandshakeError::PublicValueTooShort { len: b_pub.len(), min: MIN_B_LEN });
        }

        let Some(group) = verify_group(number, generator) else {
            return Err(HandshakeError::BadGroupParameters { len: number.len() });
        };

        let decrypt_iv: [u8; IV_SIZE] =
            iv.try_into().map_err(|_| HandshakeError::BadIvLength { len: iv.len() })?;

        let n = group.prime();
        let g = group.generator();

        let mut a = Zeroizing::new(vec![0u8; EPHEMERAL_LEN]);
        let a_pub = loop {
            rng.fill_bytes(a.as_mut_slice());
            let candidate = math::calc_a_pub(&BigUint::from_bytes_be(&a), &n, &g);
            if !math::is_zero_mod(&candidate, &n) {
                break candidate;
            }
        };

        let mut encrypt_iv = [0u8; IV_SIZE];
        rng.fill_bytes(&mut encrypt_iv);

        let reply = ClientExchange { a: a_pub.to_bytes_be(), iv: encrypt_iv };

        self.exchange = Some(ExchangeState {
            group,
            salt: salt.to_vec(),
            b_pub: BigUint::from_bytes_be(b_pub),
            a,
            a_pub,
            encrypt_iv,
            decrypt_iv,
        });

        Ok(reply)
    }

    /// Derive the session key.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::ExchangeIncomplete` before the server key
    ///   exchange has been read
    /// - `HandshakeError::InvalidPublicValue` when `B ≡ 0 mod N`
    pub fn session_key(&self) -> Result<SessionKey, HandshakeError> {
        let exchange = self.exchange.as_ref().ok_or(HandshakeError::ExchangeIncomplete)?;

        let n = exchange.group.prime();
        let g = exchange.group.generator();

        if math::is_zero_mod(&exchange.b_pub, &n) {
            return Err(HandshakeError::InvalidPublicValue);
        }

        let u = math::calc_u(&exchange.a_pub, &exchange.b_pub, &n);
        let x = math::calc_x(&exchange.salt, &self.username, &self.password);
        let a = BigUint::from_bytes_be(&exchange.a);

        let shared = math::calc_client_key(&n, &g, &exchange.b_pub, &x, &a, &u);

        Ok(SessionKey::new(math::session_key_hash(&shared)))
    }

    /// Build the per-direction AEAD state for the established channel.
    ///
    /// # Errors
    ///
    /// Same conditions as [`session_key`](Self::session_key).
    pub fn session_cipher(&self) -> Result<SessionCipher, HandshakeError> {
        let key = self.session_key()?;
        let exchange = self.exchange.as_ref().ok_or(HandshakeError::ExchangeIncomplete)?;

        Ok(SessionCipher::new(self.method, &key, exchange.encrypt_iv, exchange.decrypt_iv))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::srp::groups::GROUP_4096;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn valid_context() -> SrpClientContext {
        SrpClientContext::new(EncryptionMethod::SrpAes256Gcm, "alice", "s3cret!").unwrap()
    }

    #[test]
    fn empty_credentials_are_rejected() {
        for (user, pass) in [("", "p"), ("u", ""), ("", "")] {
            let result = SrpClientContext::new(EncryptionMethod::SrpAes256Gcm, user, pass);
            assert!(matches!(result, Err(HandshakeError::EmptyCredentials)));
        }
    }

    #[test]
    fn short_salt_is_rejected() {
        let mut context = valid_context();
        let result = context.read_server_key_exchange(
            GROUP_4096.prime_bytes(),
            GROUP_4096.generator_bytes(),
            &[0u8; 63],
            &[1u8; 512],
            &[0u8; 12],
            &mut rng(),
        );
        assert!(matches!(result, Err(HandshakeError::SaltTooShort { len: 63, .. })));
    }

    #[test]
    fn short_public_value_is_rejected() {
        let mut context = valid_context();
        let result = context.read_server_key_exchange(
            GROUP_4096.prime_bytes(),
            GROUP_4096.generator_bytes(),
            &[0u8; 64],
            &[1u8; 127],
            &[0u8; 12],
            &mut rng(),
        );
        assert!(matches!(result, Err(HandshakeError::PublicValueTooShort { len: 127, .. })));
    }

    #[test]
    fn unrecognised_group_is_rejected_before_sending_a() {
        let mut context = valid_context();

        // 2048-bit modulus: legal nowhere in the tables.
        let result = context.read_server_key_exchange(
            &[0xFFu8; 256],
            &[2],
            &[0u8; 64],
            &[1u8; 512],
            &[0u8; 12],
            &mut rng(),
        );
        assert!(matches!(result, Err(HandshakeError::BadGroupParameters { len: 256 })));
        assert!(context.exchange.is_none(), "no A may exist after a rejected group");
    }

    #[test]
    fn tampered_modulus_is_rejected() {
        let mut context = valid_context();

        let mut number = GROUP_4096.prime_bytes().to_vec();
        number[17] ^= 0x40;

        let result = context.read_server_key_exchange(
            &number,
            GROUP_4096.generator_bytes(),
            &[0u8; 64],
            &[1u8; 512],
            &[0u8; 12],
            &mut rng(),
        );
        assert!(matches!(result, Err(HandshakeError::BadGroupParameters { .. })));
    }

    #[test]
    fn degenerate_b_fails_key_derivation() {
        for b_bytes in [vec![0u8; 512], GROUP_4096.prime_bytes().to_vec()] {
            let mut context = valid_context();
            context
                .read_server_key_exchange(
                    GROUP_4096.prime_bytes(),
                    GROUP_4096.generator_bytes(),
                    &[0u8; 64],
                    &b_bytes,
                    &[0u8; 12],
                    &mut rng(),
                )
                .unwrap();

            assert!(matches!(context.session_key(), Err(HandshakeError::InvalidPublicValue)));
        }
    }

    #[test]
    fn key_before_exchange_is_an_error() {
        let context = valid_context();
        assert!(matches!(context.session_key(), Err(HandshakeError::ExchangeIncomplete)));
    }
}
