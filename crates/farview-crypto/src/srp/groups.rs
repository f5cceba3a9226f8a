//! The permitted SRP groups.
//!
//! Exactly three safe-prime groups are recognised, the 4096-, 6144-, and
//! 8192-bit MODP groups (generators 5, 5, and 19). The tables are frozen:
//! a peer's `(N, g)` pair is accepted only when it matches one of these
//! byte for byte. Groups below 4096 bits are deliberately absent.

use std::sync::OnceLock;

use num_bigint::BigUint;

const PRIME_4096_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199FFFFFFFFFFFFFFFF",
);

const PRIME_6144_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026",
    "C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE",
    "B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B",
    "DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC",
    "F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E",
    "59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA",
    "CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76",
    "F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468",
    "043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DCC4024FFFFFFFFFFFFFFFF",
);

const PRIME_8192_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026",
    "C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE",
    "B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B",
    "DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC",
    "F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E",
    "59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA",
    "CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76",
    "F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468",
    "043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DBE115974A3926F12FEE5E4",
    "38777CB6A932DF8CD8BEC4D073B931BA3BC832B68D9DD300741FA7BF8AFC47ED",
    "2576F6936BA424663AAB639C5AE4F5683423B4742BF1C978238F16CBA64BF089",
    "996CAA048827D3CFE6B496B3B0FAF12AFF4FEDF72617D20268CCE3E6B0B2B3BE",
    "6E4C368D62AC55B1027939B6F589CE98B91D6346C8132F950B1BF2A7B732AB3C",
    "CC97B2908EE0F95D6DDBB47BEB2FB5A4BD7AEC6B147E90A04601B1B1A6C7F0C4",
    "57CCB2357F84F0CB5C3098B5154BCACD6A9A0338B4B6F12C41D5B9AED82F92C5",
    "4009438B481C6CD7889A002ED5EE382BC9190DA6FC026E479558E4475677E9AA",
    "9E3050E2765694DFC81F56E880B96E7160C980DD98EDD3DFFFFFFFFFFFFFFFFF",
);

/// One permitted group: the modulus `N` and generator `g`.
pub struct SrpGroup {
    /// Modulus size in bits.
    pub bits: u32,
    prime_hex: &'static str,
    generator: &'static [u8],
    prime_cell: OnceLock<Vec<u8>>,
}

impl SrpGroup {
    /// Big-endian bytes of the modulus `N`.
    pub fn prime_bytes(&self) -> &[u8] {
        self.prime_cell.get_or_init(|| {
            let Ok(bytes) = hex::decode(self.prime_hex) else {
                unreachable!("group prime tables are valid hex");
            };
            bytes
        })
    }

    /// Big-endian bytes of the generator `g`.
    pub fn generator_bytes(&self) -> &'static [u8] {
        self.generator
    }

    /// Modulus byte length (512, 768, or 1024).
    pub fn prime_len(&self) -> usize {
        (self.bits / 8) as usize
    }

    /// The modulus as a big integer.
    pub fn prime(&self) -> BigUint {
        BigUint::from_bytes_be(self.prime_bytes())
    }

    /// The generator as a big integer.
    pub fn generator(&self) -> BigUint {
        BigUint::from_bytes_be(self.generator)
    }
}

impl std::fmt::Debug for SrpGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SrpGroup").field("bits", &self.bits).finish_non_exhaustive()
    }
}

/// The 4096-bit group, generator 5.
pub static GROUP_4096: SrpGroup = SrpGroup {
    bits: 4096,
    prime_hex: PRIME_4096_HEX,
    generator: &[5],
    prime_cell: OnceLock::new(),
};

/// The 6144-bit group, generator 5.
pub static GROUP_6144: SrpGroup = SrpGroup {
    bits: 6144,
    prime_hex: PRIME_6144_HEX,
    generator: &[5],
    prime_cell: OnceLock::new(),
};

/// The 8192-bit group, generator 19.
pub static GROUP_8192: SrpGroup = SrpGroup {
    bits: 8192,
    prime_hex: PRIME_8192_HEX,
    generator: &[19],
    prime_cell: OnceLock::new(),
};

/// All permitted groups, smallest first.
pub static GROUPS: [&SrpGroup; 3] = [&GROUP_4096, &GROUP_6144, &GROUP_8192];

/// Find the permitted group matching a presented `(N, g)` pair.
///
/// The match is byte-exact on both values; `None` means the pair is not
/// permitted, whatever its mathematical properties.
pub fn verify_group(number: &[u8], generator: &[u8]) -> Option<&'static SrpGroup> {
    let group = GROUPS.iter().copied().find(|group| group.prime_len() == number.len())?;

    if group.prime_bytes() != number || group.generator_bytes() != generator {
        return None;
    }

    Some(group)
}
