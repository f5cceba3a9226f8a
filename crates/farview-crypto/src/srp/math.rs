//! SRP-6a modular arithmetic.
//!
//! Pure functions over [`BigUint`]; no randomness and no state. The
//! protocol hash `H` is SHA-256 throughout; multi-precision values are
//! left-zero-padded to the modulus width (`PAD`) before hashing, per
//! SRP-6a:
//!
//! ```text
//! k = H(PAD(N) | PAD(g))
//! u = H(PAD(A) | PAD(B))
//! x = H(s | H(I ":" p))
//! v = g^x mod N
//! client: S = (B - k*g^x) ^ (a + u*x) mod N
//! server: S = (A * v^u) ^ b mod N
//! ```
//!
//! The session key is not `S` itself but a 256-bit digest of its minimal
//! big-endian encoding, see [`session_key_hash`].

use blake2::Blake2s256;
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

/// Left-zero-pad the big-endian encoding of `value` to `len` bytes.
///
/// Values wider than `len` are returned at their natural width; callers
/// only pass values already reduced mod N.
pub fn pad(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= len {
        return bytes;
    }

    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}

fn hash_to_int(parts: &[&[u8]]) -> BigUint {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    BigUint::from_bytes_be(&hasher.finalize())
}

/// `u = H(PAD(A) | PAD(B))`.
pub fn calc_u(a_pub: &BigUint, b_pub: &BigUint, n: &BigUint) -> BigUint {
    let len = n.to_bytes_be().len();
    hash_to_int(&[&pad(a_pub, len), &pad(b_pub, len)])
}

/// `x = H(s | H(I ":" p))`.
pub fn calc_x(salt: &[u8], username: &str, password: &str) -> BigUint {
    let inner = Sha256::new()
        .chain_update(username.as_bytes())
        .chain_update(b":")
        .chain_update(password.as_bytes())
        .finalize();

    hash_to_int(&[salt, &inner])
}

/// `k = H(PAD(N) | PAD(g))`.
pub fn calc_k(n: &BigUint, g: &BigUint) -> BigUint {
    let len = n.to_bytes_be().len();
    hash_to_int(&[&pad(n, len), &pad(g, len)])
}

/// Initiator public value `A = g^a mod N`.
pub fn calc_a_pub(a: &BigUint, n: &BigUint, g: &BigUint) -> BigUint {
    g.modpow(a, n)
}

/// Responder public value `B = (k*v + g^b) mod N`.
pub fn calc_b_pub(b: &BigUint, v: &BigUint, n: &BigUint, g: &BigUint) -> BigUint {
    let k = calc_k(n, g);
    (&k * v + g.modpow(b, n)) % n
}

/// Password verifier `v = g^x mod N`, the value stored responder-side.
pub fn calc_verifier(x: &BigUint, n: &BigUint, g: &BigUint) -> BigUint {
    g.modpow(x, n)
}

/// Initiator shared secret `S = (B - k*g^x) ^ (a + u*x) mod N`.
pub fn calc_client_key(
    n: &BigUint,
    g: &BigUint,
    b_pub: &BigUint,
    x: &BigUint,
    a: &BigUint,
    u: &BigUint,
) -> BigUint {
    let k = calc_k(n, g);
    let kgx = (&k * g.modpow(x, n)) % n;

    // (B - k*g^x) mod N without leaving the non-negative range.
    let base = ((b_pub % n) + n - kgx) % n;
    let exponent = a + u * x;

    base.modpow(&exponent, n)
}

/// Responder shared secret `S = (A * v^u) ^ b mod N`.
pub fn calc_server_key(
    n: &BigUint,
    a_pub: &BigUint,
    v: &BigUint,
    u: &BigUint,
    b: &BigUint,
) -> BigUint {
    let base = (a_pub * v.modpow(u, n)) % n;
    base.modpow(b, n)
}

/// True when `value` is congruent to zero mod N (degenerate public value).
pub fn is_zero_mod(value: &BigUint, n: &BigUint) -> bool {
    (value % n).is_zero()
}

/// Derive the 32-byte session key: BLAKE2s-256 over the minimal
/// big-endian encoding of the shared secret.
pub fn session_key_hash(shared: &BigUint) -> [u8; 32] {
    Blake2s256::digest(shared.to_bytes_be()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: u64) -> BigUint {
        BigUint::from(value)
    }

    #[test]
    fn pad_widens_but_never_truncates() {
        assert_eq!(pad(&int(0x0102), 4), vec![0, 0, 1, 2]);
        assert_eq!(pad(&int(0x0102_0304), 2), vec![1, 2, 3, 4]);
    }

    #[test]
    fn both_sides_agree_on_a_toy_group() {
        // The key agreement is pure algebra given v = g^x; exercise it on a
        // small prime where every step is easy to eyeball.
        let n = int(7919);
        let g = int(5);

        let x = int(1234);
        let a = int(2171);
        let b = int(4321);

        let v = calc_verifier(&x, &n, &g);
        let a_pub = calc_a_pub(&a, &n, &g);
        let b_pub = calc_b_pub(&b, &v, &n, &g);

        let u = calc_u(&a_pub, &b_pub, &n);

        let client = calc_client_key(&n, &g, &b_pub, &x, &a, &u);
        let server = calc_server_key(&n, &a_pub, &v, &u, &b);

        assert_eq!(client, server);
    }

    #[test]
    fn wrong_password_diverges_on_a_toy_group() {
        let n = int(7919);
        let g = int(5);

        let x = int(1234);
        let wrong_x = int(1235);
        let a = int(2171);
        let b = int(4321);

        let v = calc_verifier(&x, &n, &g);
        let a_pub = calc_a_pub(&a, &n, &g);
        let b_pub = calc_b_pub(&b, &v, &n, &g);
        let u = calc_u(&a_pub, &b_pub, &n);

        let client = calc_client_key(&n, &g, &b_pub, &wrong_x, &a, &u);
        let server = calc_server_key(&n, &a_pub, &v, &u, &b);

        assert_ne!(client, server);
    }

    #[test]
    fn calc_x_separates_identity_and_password() {
        let salt = [0x55u8; 64];

        let x1 = calc_x(&salt, "alice", "secret");
        let x2 = calc_x(&salt, "alice", "secret2");
        let x3 = calc_x(&salt, "alice2", "secret");
        // The ':' separator means ("ab", "c") and ("a", "bc") must differ.
        let x4 = calc_x(&salt, "ab", "c");
        let x5 = calc_x(&salt, "a", "bc");

        assert_ne!(x1, x2);
        assert_ne!(x1, x3);
        assert_ne!(x4, x5);
    }

    #[test]
    fn session_key_hash_is_stable_and_wide() {
        let key = session_key_hash(&int(123_456_789));
        assert_eq!(key, session_key_hash(&int(123_456_789)));
        assert_ne!(key, session_key_hash(&int(123_456_788)));
    }

    #[test]
    fn zero_mod_detection() {
        let n = int(97);
        assert!(is_zero_mod(&int(0), &n));
        assert!(is_zero_mod(&int(194), &n));
        assert!(!is_zero_mod(&int(96), &n));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Padding widens to exactly `len` when the value fits and
            /// never changes the value itself.
            #[test]
            fn pad_is_width_exact_and_lossless(value in any::<u64>(), len in 8usize..64) {
                let padded = pad(&int(value), len);

                prop_assert_eq!(padded.len(), len);
                prop_assert_eq!(BigUint::from_bytes_be(&padded), int(value));
            }

            /// Key agreement holds for arbitrary exponents on the toy
            /// group, not just hand-picked ones.
            #[test]
            fn agreement_holds_for_arbitrary_exponents(
                x in 1u64..7000,
                a in 1u64..7000,
                b in 1u64..7000,
            ) {
                let n = int(7919);
                let g = int(5);

                let v = calc_verifier(&int(x), &n, &g);
                let a_pub = calc_a_pub(&int(a), &n, &g);
                let b_pub = calc_b_pub(&int(b), &v, &n, &g);
                let u = calc_u(&a_pub, &b_pub, &n);

                let client = calc_client_key(&n, &g, &b_pub, &int(x), &int(a), &u);
                let server = calc_server_key(&n, &a_pub, &v, &u, &int(b));

                prop_assert_eq!(client, server);
            }
        }
    }
}
